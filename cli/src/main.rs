use anyhow::Result;
use clap::{Parser, Subcommand};
use ranksift::shell::{self, ShellOptions};
use ranksift::{index_dataset, open_index, render};
use ranksift_core::{Language, Normalizer, NormalizerConfig, SearchConfig, SearchEngine};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "ranksift")]
#[command(about = "Index CSV/JSON datasets and search them with cosine re-ranking", long_about = None)]
struct Cli {
    /// Stemming language; must match the one the index was built with
    #[arg(long, global = true, default_value = "english")]
    language: Language,
    /// Extra stopwords, comma-separated
    #[arg(long, global = true, value_delimiter = ',')]
    stopwords: Vec<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from every CSV/JSON/JSONL file in a dataset directory
    Build {
        #[arg(long, default_value = "dataset")]
        dataset: PathBuf,
        /// Output index directory
        #[arg(long, default_value = "index")]
        index: PathBuf,
    },
    /// Run one query against a built index
    Search {
        #[arg(long, default_value = "index")]
        index: PathBuf,
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = SearchConfig::default().default_top_k)]
        top_k: usize,
        /// Print hits as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Interactive menu (default)
    Shell {
        #[arg(long, default_value = "dataset")]
        dataset: PathBuf,
        #[arg(long, default_value = "index")]
        index: PathBuf,
        #[arg(long, default_value_t = SearchConfig::default().default_top_k)]
        top_k: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let normalizer = Normalizer::new(&NormalizerConfig {
        language: cli.language,
        extra_stopwords: cli.stopwords,
        ..Default::default()
    });
    let engine = SearchEngine::new(normalizer, SearchConfig::default());

    let command = cli.command.unwrap_or(Commands::Shell {
        dataset: PathBuf::from("dataset"),
        index: PathBuf::from("index"),
        top_k: SearchConfig::default().default_top_k,
    });
    match command {
        Commands::Build { dataset, index } => {
            let snapshot = index_dataset(&engine, &dataset, &index)?;
            println!("Indexed {} documents into {}", snapshot.num_docs(), index.display());
        }
        Commands::Search { index, query, top_k, json } => {
            open_index(&engine, &index)?;
            let hits = engine.search(&query, top_k)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else {
                print!("{}", render::format_results(&hits, |id| engine.document(id)));
            }
        }
        Commands::Shell { dataset, index, top_k } => {
            let opts = ShellOptions { dataset, index, top_k };
            shell::run(&engine, &opts, io::stdin().lock(), io::stdout().lock())?;
        }
    }
    Ok(())
}
