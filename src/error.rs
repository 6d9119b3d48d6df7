//! Error types for hadith ingestion and search.

use thiserror::Error;

use crate::models::IngestProgress;
use crate::utils::retry::Retryable;

/// Errors related to the remote embedding service.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Transport failure, timeout or non-success status.
    #[error("embedding service unavailable: {0}")]
    Unavailable(String),

    /// Success response whose body does not match the expected shape.
    #[error("embedding service protocol error: {0}")]
    Protocol(String),
}

impl Retryable for EmbeddingError {
    fn is_retryable(&self) -> bool {
        match self {
            EmbeddingError::Unavailable(msg) => {
                let msg = msg.to_lowercase();
                msg.contains("connect")
                    || msg.contains("timed out")
                    || msg.contains("502")
                    || msg.contains("503")
                    || msg.contains("504")
            }
            EmbeddingError::Protocol(_) => false,
        }
    }
}

/// Errors related to the relational record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to PostgreSQL: {0}")]
    Connection(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("record store write failed: {0}")]
    Write(String),

    #[error("record store query failed: {0}")]
    Query(String),
}

impl Retryable for StoreError {
    fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}

/// Errors related to vector index operations.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("failed to connect to Qdrant: {0}")]
    Connection(String),

    #[error("collection error: {0}")]
    Collection(String),

    #[error("upsert error: {0}")]
    Upsert(String),

    #[error("search error: {0}")]
    Search(String),

    #[error("vector has dimension {actual}, index expects {expected}")]
    DimensionMismatch { expected: u64, actual: u64 },
}

impl Retryable for VectorStoreError {
    fn is_retryable(&self) -> bool {
        match self {
            VectorStoreError::Connection(_) => true,
            VectorStoreError::Collection(msg) => {
                let msg = msg.to_lowercase();
                msg.contains("unavailable")
                    || msg.contains("connection")
                    || msg.contains("timeout")
                    || msg.contains("transport")
            }
            _ => false,
        }
    }
}

/// Errors returned by the ingestion pipeline.
///
/// Every variant raised after validation carries the progress made before
/// the failure, so a caller can decide how to resubmit.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("too many records in one request: {count} (maximum {max})")]
    PayloadTooLarge { count: usize, max: usize },

    #[error("record store error after {} inserted: {source}", .progress.inserted_count)]
    Store {
        #[source]
        source: StoreError,
        progress: IngestProgress,
    },

    #[error("embedding error after {} embedded: {source}", .progress.embedded_count)]
    Embedding {
        #[source]
        source: EmbeddingError,
        progress: IngestProgress,
    },

    #[error("vector index error after {} embedded: {source}", .progress.embedded_count)]
    VectorIndex {
        #[source]
        source: VectorStoreError,
        progress: IngestProgress,
    },

    #[error("ingestion timed out after {timeout_secs}s")]
    Timeout {
        timeout_secs: u64,
        progress: IngestProgress,
    },
}

impl IngestError {
    /// Progress recorded before the failure, when any write was attempted.
    pub fn progress(&self) -> Option<IngestProgress> {
        match self {
            IngestError::Store { progress, .. }
            | IngestError::Embedding { progress, .. }
            | IngestError::VectorIndex { progress, .. }
            | IngestError::Timeout { progress, .. } => Some(*progress),
            _ => None,
        }
    }

    /// True when the caller supplied bad input and nothing was written.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            IngestError::Validation(_) | IngestError::PayloadTooLarge { .. }
        )
    }
}

/// Underlying cause of an unavailable search, kept for logging.
#[derive(Debug, Error)]
pub enum SearchFailure {
    #[error("embedding: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector index: {0}")]
    VectorIndex(#[from] VectorStoreError),

    #[error("timed out after {0}s")]
    Timeout(u64),
}

/// Errors returned by the query pipeline.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("search unavailable")]
    Unavailable(#[source] SearchFailure),
}

impl SearchError {
    pub fn is_validation(&self) -> bool {
        matches!(self, SearchError::InvalidQuery(_))
    }
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("path error: {0}")]
    Path(String),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Application-level errors that wrap domain errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("search error: {0}")]
    Search(#[from] SearchError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("record store error: {0}")]
    Store(#[from] StoreError),

    #[error("vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_error_progress() {
        let progress = IngestProgress {
            inserted_count: 5,
            embedded_count: 0,
        };
        let err = IngestError::Embedding {
            source: EmbeddingError::Unavailable("status 503".to_string()),
            progress,
        };
        assert_eq!(err.progress(), Some(progress));
        assert!(!err.is_validation());
        assert!(err.to_string().contains("after 0 embedded"));

        let err = IngestError::PayloadTooLarge {
            count: 2001,
            max: 2000,
        };
        assert_eq!(err.progress(), None);
        assert!(err.is_validation());
    }

    #[test]
    fn test_search_unavailable_hides_cause_in_message() {
        let err = SearchError::Unavailable(SearchFailure::Embedding(
            EmbeddingError::Unavailable("connection refused".to_string()),
        ));
        assert_eq!(err.to_string(), "search unavailable");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(EmbeddingError::Unavailable("status 503".to_string()).is_retryable());
        assert!(!EmbeddingError::Protocol("bad json".to_string()).is_retryable());
        assert!(StoreError::Connection("refused".to_string()).is_retryable());
        assert!(!StoreError::Write("constraint".to_string()).is_retryable());
        assert!(VectorStoreError::Connection("refused".to_string()).is_retryable());
        assert!(
            !VectorStoreError::DimensionMismatch {
                expected: 768,
                actual: 3
            }
            .is_retryable()
        );
    }
}
