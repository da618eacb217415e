use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::index::InvertedIndex;
use crate::query;
use crate::tokenizer::Normalizer;
use crate::vectors::{cosine_similarity, VectorStore};
use crate::Document;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

static GENERATION_SEQ: AtomicU64 = AtomicU64::new(0);

/// A fresh identifier tying together artifacts produced by one build.
pub(crate) fn next_generation() -> u64 {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos() as u64).unwrap_or(0);
    nanos.wrapping_add(GENERATION_SEQ.fetch_add(1, Ordering::Relaxed))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub score: f32,
}

/// Inverted index and vector store derived from the same normalized corpus.
#[derive(Debug, Serialize, Deserialize)]
pub struct CorpusSnapshot {
    generation: u64,
    stemmer: String,
    index: InvertedIndex,
    vectors: VectorStore,
}

impl CorpusSnapshot {
    /// Normalize every document once and derive both artifacts from that result.
    pub fn build(documents: &[Document], normalizer: &Normalizer) -> Result<Self> {
        if documents.is_empty() {
            return Err(Error::CorpusEmpty);
        }
        tracing::info!(total = documents.len(), "preprocessing and vectorizing documents");
        let normalized = normalizer.normalize_corpus(documents);

        let generation = next_generation();
        let index = InvertedIndex::from_normalized(documents, &normalized, generation)?;
        let vectors = VectorStore::from_normalized(documents, &normalized, generation)?;
        tracing::info!(
            num_docs = index.num_docs(),
            num_terms = vectors.vocabulary().len(),
            stem_cache = normalizer.cache().len(),
            "corpus snapshot built"
        );
        Ok(Self { generation, stemmer: normalizer.stemmer_name().to_string(), index, vectors })
    }

    /// Reassemble a snapshot from separately stored parts, rejecting mismatched generations.
    pub fn from_parts(index: InvertedIndex, vectors: VectorStore, stemmer: String) -> Result<Self> {
        if !index.is_ready() || !vectors.is_ready() {
            return Err(Error::Persistence("snapshot part was never built".into()));
        }
        if index.generation() != vectors.generation() {
            return Err(Error::Persistence(format!(
                "index generation {} does not match vector store generation {}",
                index.generation(),
                vectors.generation()
            )));
        }
        Ok(Self { generation: index.generation(), stemmer, index, vectors })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stemmer(&self) -> &str {
        &self.stemmer
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn vectors(&self) -> &VectorStore {
        &self.vectors
    }

    pub fn num_docs(&self) -> usize {
        self.index.num_docs()
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.vectors.document(id)
    }

    /// Candidate retrieval from the index, then cosine re-ranking over term-frequency vectors.
    pub fn search(
        &self,
        expression: &str,
        top_k: usize,
        config: &SearchConfig,
        normalizer: &Normalizer,
    ) -> Result<Vec<SearchHit>> {
        let Some(parsed) = query::parse(expression)? else {
            return Ok(Vec::new());
        };
        let limit = config.candidate_limit(top_k);
        let candidates = self.index.evaluate(&parsed, limit, normalizer)?;
        if candidates.is_empty() {
            tracing::debug!(expression, "no candidates");
            return Ok(Vec::new());
        }

        let q_vec = self.vectors.vectorize(&parsed.positive_text(), normalizer)?;
        let mut ranked: Vec<SearchHit> = candidates
            .into_iter()
            .map(|(doc_id, _)| {
                let score = match self.vectors.row(&doc_id) {
                    Some(row) => cosine_similarity(&q_vec, row),
                    None => 0.0,
                };
                SearchHit { doc_id, score }
            })
            .collect();
        // stable sort keeps candidate order among equal scores
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(top_k);
        tracing::debug!(expression, hits = ranked.len(), limit, "re-ranked candidates");
        Ok(ranked)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let snapshot: Self = bincode::deserialize(bytes)?;
        if snapshot.index.generation() != snapshot.generation || snapshot.vectors.generation() != snapshot.generation {
            return Err(Error::Persistence("snapshot parts come from different builds".into()));
        }
        Ok(snapshot)
    }
}

/// Owns the normalizer and the active snapshot; rebuilds swap the snapshot in whole.
pub struct SearchEngine {
    normalizer: Normalizer,
    config: SearchConfig,
    active: RwLock<Option<Arc<CorpusSnapshot>>>,
}

impl SearchEngine {
    pub fn new(normalizer: Normalizer, config: SearchConfig) -> Self {
        Self { normalizer, config, active: RwLock::new(None) }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Build a new snapshot and make it active. On failure the previous snapshot stays active.
    pub fn build(&self, documents: &[Document]) -> Result<Arc<CorpusSnapshot>> {
        let snapshot = Arc::new(CorpusSnapshot::build(documents, &self.normalizer)?);
        *self.active.write() = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Activate a snapshot produced elsewhere, e.g. loaded from disk.
    pub fn install(&self, snapshot: CorpusSnapshot) -> Arc<CorpusSnapshot> {
        if snapshot.stemmer() != self.normalizer.stemmer_name() {
            tracing::warn!(
                snapshot = snapshot.stemmer(),
                normalizer = self.normalizer.stemmer_name(),
                "snapshot was built with a different stemmer; query terms may not match"
            );
        }
        let snapshot = Arc::new(snapshot);
        *self.active.write() = Some(Arc::clone(&snapshot));
        snapshot
    }

    pub fn is_ready(&self) -> bool {
        self.active.read().is_some()
    }

    pub fn snapshot(&self) -> Result<Arc<CorpusSnapshot>> {
        self.active.read().clone().ok_or(Error::IndexNotReady)
    }

    pub fn search(&self, expression: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        self.snapshot()?.search(expression, top_k, &self.config, &self.normalizer)
    }

    pub fn document(&self, id: &str) -> Option<Document> {
        self.active.read().as_ref().and_then(|s| s.document(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SearchEngine {
        SearchEngine::new(Normalizer::default(), SearchConfig::default())
    }

    #[test]
    fn search_before_build_is_not_ready() {
        assert!(matches!(engine().search("cat", 5), Err(Error::IndexNotReady)));
    }

    #[test]
    fn failed_rebuild_keeps_previous_snapshot() {
        let engine = engine();
        let first = engine.build(&[Document::new("0", "t", "cat on mat", "")]).unwrap();
        assert!(matches!(engine.build(&[]), Err(Error::CorpusEmpty)));
        assert_eq!(engine.snapshot().unwrap().generation(), first.generation());
    }

    #[test]
    fn mismatched_parts_are_rejected() {
        let normalizer = Normalizer::default();
        let docs = [Document::new("0", "t", "cat on mat", "")];
        let a = CorpusSnapshot::build(&docs, &normalizer).unwrap();
        let b = CorpusSnapshot::build(&docs, &normalizer).unwrap();
        let err = CorpusSnapshot::from_parts(a.index, b.vectors, "english".into()).unwrap_err();
        assert!(err.is_persistence());
    }
}
