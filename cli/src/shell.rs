//! The numbered interactive menu.

use crate::{index_dataset, open_index, render};
use anyhow::Result;
use ranksift_core::persist::SnapshotPaths;
use ranksift_core::SearchEngine;
use std::io::{BufRead, Write};
use std::path::PathBuf;

pub struct ShellOptions {
    pub dataset: PathBuf,
    pub index: PathBuf,
    pub top_k: usize,
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, text: &str) -> Result<Option<String>> {
    write!(output, "{text}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Runs until the user picks exit or input ends.
pub fn run<R: BufRead, W: Write>(engine: &SearchEngine, opts: &ShellOptions, mut input: R, mut output: W) -> Result<()> {
    loop {
        writeln!(output, "\n=== RANKSIFT INFORMATION RETRIEVAL ===")?;
        writeln!(output, "1. Index dataset")?;
        writeln!(output, "2. Search")?;
        writeln!(output, "3. Exit")?;
        let Some(choice) = prompt(&mut input, &mut output, "Choose (1/2/3): ")? else { break };

        match choice.as_str() {
            "1" => match index_dataset(engine, &opts.dataset, &opts.index) {
                Ok(snapshot) => writeln!(output, "[INFO] Indexed {} documents.", snapshot.num_docs())?,
                Err(e) => writeln!(output, "[ERROR] {e:#}")?,
            },
            "2" => {
                if !engine.is_ready() && SnapshotPaths::new(&opts.index).exists() {
                    if let Err(e) = open_index(engine, &opts.index) {
                        writeln!(output, "[ERROR] {e:#}")?;
                    }
                }
                if !engine.is_ready() {
                    writeln!(output, "[!] No index yet. Run option 1 first.")?;
                    continue;
                }
                let Some(query) = prompt(&mut input, &mut output, "Enter query: ")? else { break };
                if query.is_empty() {
                    continue;
                }
                match engine.search(&query, opts.top_k) {
                    Ok(hits) => write!(output, "{}", render::format_results(&hits, |id| engine.document(id)))?,
                    Err(e) => writeln!(output, "[ERROR] {e}")?,
                }
            }
            "3" => {
                writeln!(output, "Done.")?;
                break;
            }
            _ => writeln!(output, "Invalid choice.")?,
        }
    }
    Ok(())
}
