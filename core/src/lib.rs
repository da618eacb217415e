//! Small-scale document retrieval: normalize, index, retrieve candidates, re-rank by cosine similarity.

pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod tokenizer;
pub mod vectors;

use serde::{Deserialize, Serialize};

pub use config::{Language, NormalizerConfig, SearchConfig};
pub use engine::{CorpusSnapshot, SearchEngine, SearchHit};
pub use error::{Error, Result};
pub use index::InvertedIndex;
pub use tokenizer::{Normalizer, Stem, StemCache};
pub use vectors::{cosine_similarity, TermVector, VectorStore, Vocabulary};

/// Position of a document within one build.
pub type DocId = u32;
/// Column of a term in the vocabulary.
pub type TermId = u32;

/// A corpus record. `id` must be unique within one build; `content` is kept raw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub source: String,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self { id: id.into(), title: title.into(), content: content.into(), source: source.into() }
    }
}
