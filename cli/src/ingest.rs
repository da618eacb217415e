//! Reads a dataset directory into uniform `Document` records.

use anyhow::{Context, Result};
use ranksift_core::Document;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use walkdir::WalkDir;

const TITLE_COLUMNS: &[&str] = &["judul", "title", "headline"];
const CONTENT_COLUMNS: &[&str] = &["isi", "content", "text", "body", "abstrak", "abstract"];

#[derive(Debug, Deserialize)]
struct InputDoc {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

/// Collects documents from every `.csv`, `.json` and `.jsonl` file under `dataset`.
/// Ids are sequential across files in path order.
pub fn load_documents(dataset: &Path) -> Result<Vec<Document>> {
    if !dataset.exists() {
        anyhow::bail!("dataset folder '{}' not found", dataset.display());
    }
    let mut docs = Vec::new();
    for entry in WalkDir::new(dataset).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else { continue };
        let before = docs.len();
        match ext.to_ascii_lowercase().as_str() {
            "csv" => read_csv(path, &mut docs)?,
            "jsonl" => read_jsonl(path, &mut docs)?,
            "json" => read_json(path, &mut docs)?,
            _ => continue,
        }
        tracing::info!(path = %path.display(), documents = docs.len() - before, "read dataset file");
    }
    tracing::info!(total = docs.len(), "documents loaded");
    Ok(docs)
}

/// UTF-8 first, Latin-1 when the bytes are not valid UTF-8.
fn decode(bytes: Vec<u8>, path: &Path) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path.display(), "not valid utf-8, falling back to latin-1");
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    }
}

fn find_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| candidates.contains(&h.trim().to_lowercase().as_str()))
}

fn read_csv(path: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let text = decode(bytes, path);
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(text.as_bytes());
    let headers = reader.headers().with_context(|| format!("csv header of {}", path.display()))?.clone();
    let title_col = find_column(&headers, TITLE_COLUMNS);
    let content_col = find_column(&headers, CONTENT_COLUMNS);
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let source = path.display().to_string();

    for record in reader.records() {
        let record = record.with_context(|| format!("csv record in {}", path.display()))?;
        let id = docs.len().to_string();
        let title = match title_col {
            Some(i) => record.get(i).unwrap_or("").to_string(),
            None => format!("{file_name}_{id}"),
        };
        let content = match content_col {
            Some(i) => record.get(i).unwrap_or("").to_string(),
            None => record.iter().collect::<Vec<_>>().join(" "),
        };
        docs.push(Document { id, title, content, source: source.clone() });
    }
    Ok(())
}

fn push_input(doc: InputDoc, source: &str, docs: &mut Vec<Document>) {
    let id = docs.len().to_string();
    docs.push(Document {
        id,
        title: doc.title.unwrap_or_default(),
        content: doc.content.or(doc.body).unwrap_or_default(),
        source: source.to_string(),
    });
}

fn read_jsonl(path: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let source = path.display().to_string();
    for line in BufReader::new(f).lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputDoc = serde_json::from_str(&line).with_context(|| format!("json line in {}", path.display()))?;
        push_input(doc, &source, docs);
    }
    Ok(())
}

fn read_json(path: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let source = path.display().to_string();
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                push_input(serde_json::from_value(v)?, &source, docs);
            }
        }
        serde_json::Value::Object(_) => push_input(serde_json::from_value(json)?, &source, docs),
        _ => tracing::warn!(path = %path.display(), "ignoring json that is neither object nor array"),
    }
    Ok(())
}
