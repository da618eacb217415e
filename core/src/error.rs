//! Error types for ranksift.

use thiserror::Error;

/// Result type alias for ranksift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the retrieval core.
#[derive(Error, Debug)]
pub enum Error {
    /// The query expression could not be parsed.
    #[error("query syntax error at position {position}: {message}")]
    QuerySyntax { position: usize, message: String },

    /// The inverted index was queried before any build.
    #[error("index not ready: build the index first")]
    IndexNotReady,

    /// The vector store was used before any build.
    #[error("vector store not ready: build the index first")]
    VectorStoreNotReady,

    /// A build was requested with zero documents.
    #[error("cannot build an index from an empty corpus")]
    CorpusEmpty,

    /// Two documents in one build share an id.
    #[error("duplicate document id: {0}")]
    DuplicateDocument(String),

    /// Persisted artifacts are missing, inconsistent or unreadable.
    #[error("persistence error: {0}")]
    Persistence(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] bincode::Error),

    #[error(transparent)]
    Metadata(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        Error::QuerySyntax { position, message: message.into() }
    }

    /// True for every failure raised while reading or writing artifacts.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Error::Persistence(_) | Error::Io(_) | Error::Serialization(_) | Error::Metadata(_)
        )
    }
}
