use crate::engine::CorpusSnapshot;
use crate::error::{Error, Result};
use crate::index::InvertedIndex;
use crate::vectors::VectorStore;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub generation: u64,
    pub num_docs: u32,
    pub num_terms: u32,
    pub stemmer: String,
    pub created_at: String,
    pub version: u32,
}

impl MetaFile {
    pub fn for_snapshot(snapshot: &CorpusSnapshot, created_at: impl Into<String>) -> Self {
        Self {
            generation: snapshot.generation(),
            num_docs: snapshot.num_docs() as u32,
            num_terms: snapshot.vectors().vocabulary().len() as u32,
            stemmer: snapshot.stemmer().to_string(),
            created_at: created_at.into(),
            version: FORMAT_VERSION,
        }
    }
}

pub struct SnapshotPaths {
    pub root: PathBuf,
}

impl SnapshotPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn index(&self) -> PathBuf { self.root.join("index.bin") }
    fn vectors(&self) -> PathBuf { self.root.join("vectors.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }

    pub fn exists(&self) -> bool {
        self.meta().is_file()
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let name = self.root.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "index".into());
        self.root.with_file_name(format!(".{name}.{suffix}"))
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut f = File::create(path)?;
    f.write_all(bytes)?;
    f.sync_all()?;
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let mut f = File::open(path)
        .map_err(|e| Error::Persistence(format!("cannot open {}: {e}", path.display())))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(buf)
}

pub fn save_index(paths: &SnapshotPaths, index: &InvertedIndex) -> Result<()> {
    fs::create_dir_all(&paths.root)?;
    write_file(&paths.index(), &index.serialize()?)
}

pub fn load_index(paths: &SnapshotPaths) -> Result<InvertedIndex> {
    InvertedIndex::deserialize(&read_file(&paths.index())?)
}

pub fn save_vectors(paths: &SnapshotPaths, vectors: &VectorStore) -> Result<()> {
    fs::create_dir_all(&paths.root)?;
    write_file(&paths.vectors(), &vectors.serialize()?)
}

pub fn load_vectors(paths: &SnapshotPaths) -> Result<VectorStore> {
    VectorStore::deserialize(&read_file(&paths.vectors())?)
}

pub fn save_meta(paths: &SnapshotPaths, meta: &MetaFile) -> Result<()> {
    fs::create_dir_all(&paths.root)?;
    let json = serde_json::to_string_pretty(meta)?;
    write_file(&paths.meta(), json.as_bytes())
}

pub fn load_meta(paths: &SnapshotPaths) -> Result<MetaFile> {
    let buf = read_file(&paths.meta())?;
    Ok(serde_json::from_slice(&buf)?)
}

/// Write all artifacts into a staging directory, then swap it over `paths.root`.
/// The previous directory is only removed once the new one is in place.
pub fn save_snapshot(paths: &SnapshotPaths, snapshot: &CorpusSnapshot, meta: &MetaFile) -> Result<()> {
    let staging = SnapshotPaths::new(paths.sibling("staging"));
    if staging.root.exists() {
        fs::remove_dir_all(&staging.root)?;
    }
    save_index(&staging, snapshot.index())?;
    save_vectors(&staging, snapshot.vectors())?;
    save_meta(&staging, meta)?;

    let retired = paths.sibling("old");
    if retired.exists() {
        fs::remove_dir_all(&retired)?;
    }
    let had_previous = paths.root.exists();
    if had_previous {
        fs::rename(&paths.root, &retired)?;
    }
    if let Err(e) = fs::rename(&staging.root, &paths.root) {
        if had_previous {
            // put the previous snapshot back before reporting
            if let Err(restore) = fs::rename(&retired, &paths.root) {
                tracing::warn!(
                    retired = %retired.display(),
                    error = %restore,
                    "could not restore previous snapshot"
                );
            }
        }
        return Err(e.into());
    }
    // the new snapshot is in place; a leftover retired directory is only clutter
    if had_previous {
        if let Err(e) = fs::remove_dir_all(&retired) {
            tracing::warn!(retired = %retired.display(), error = %e, "could not remove previous snapshot");
        }
    }
    tracing::info!(root = %paths.root.display(), generation = meta.generation, "snapshot saved");
    Ok(())
}

/// Load a snapshot, verifying that both artifacts and the metadata come from one build.
pub fn load_snapshot(paths: &SnapshotPaths) -> Result<(CorpusSnapshot, MetaFile)> {
    let meta = load_meta(paths)?;
    if meta.version != FORMAT_VERSION {
        return Err(Error::Persistence(format!("unsupported format version {}", meta.version)));
    }
    let index = load_index(paths)?;
    let vectors = load_vectors(paths)?;
    if index.generation() != meta.generation {
        return Err(Error::Persistence(format!(
            "index.bin generation {} does not match meta.json generation {}",
            index.generation(),
            meta.generation
        )));
    }
    let snapshot = CorpusSnapshot::from_parts(index, vectors, meta.stemmer.clone())?;
    tracing::debug!(root = %paths.root.display(), num_docs = meta.num_docs, "snapshot loaded");
    Ok((snapshot, meta))
}
