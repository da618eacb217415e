use anyhow::{Context, Result};
use ranksift_core::persist::{load_snapshot, save_snapshot, MetaFile, SnapshotPaths};
use ranksift_core::{CorpusSnapshot, SearchEngine};
use std::path::Path;
use std::sync::Arc;

pub mod ingest;
pub mod render;
pub mod shell;

/// Ingest `dataset`, build and activate a snapshot, then persist it under `index_dir`.
/// A persistence failure is reported but the freshly built snapshot stays active.
pub fn index_dataset(engine: &SearchEngine, dataset: &Path, index_dir: &Path) -> Result<Arc<CorpusSnapshot>> {
    let docs = ingest::load_documents(dataset)?;
    let snapshot = engine.build(&docs).context("building index")?;

    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into());
    let meta = MetaFile::for_snapshot(&snapshot, created_at);
    save_snapshot(&SnapshotPaths::new(index_dir), &snapshot, &meta)
        .with_context(|| format!("saving index to {}", index_dir.display()))?;
    tracing::info!(num_docs = meta.num_docs, num_terms = meta.num_terms, "index build complete");
    Ok(snapshot)
}

/// Load the snapshot stored under `index_dir` and make it the engine's active one.
pub fn open_index(engine: &SearchEngine, index_dir: &Path) -> Result<MetaFile> {
    let (snapshot, meta) = load_snapshot(&SnapshotPaths::new(index_dir))
        .with_context(|| format!("loading index from {}", index_dir.display()))?;
    engine.install(snapshot);
    Ok(meta)
}
