//! Vector index abstraction.
//!
//! The index holds one logical collection of points. Backends own the
//! nearest-neighbor ranking; callers never re-score.

mod qdrant;

pub use qdrant::QdrantIndex;

use async_trait::async_trait;

use crate::error::VectorStoreError;
use crate::models::{EmbeddedPoint, ScoredPoint};

/// Remote nearest-neighbor index over embedded points.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Declared dimensionality of every stored vector.
    fn dimension(&self) -> u64;

    /// Name of the index collection.
    fn collection(&self) -> &str;

    /// Create the collection if missing. Already existing is not an error.
    async fn ensure_collection(&self) -> Result<(), VectorStoreError>;

    /// Insert points as one batch.
    async fn upsert(&self, points: Vec<EmbeddedPoint>) -> Result<(), VectorStoreError>;

    /// Nearest neighbors of `vector` with payload attached, best first.
    async fn search(&self, vector: Vec<f32>, limit: u64)
    -> Result<Vec<ScoredPoint>, VectorStoreError>;

    async fn health_check(&self) -> Result<bool, VectorStoreError>;

    /// Number of stored points, or `None` if the collection does not exist.
    async fn points_count(&self) -> Result<Option<u64>, VectorStoreError>;
}

/// Reject vectors whose length differs from the index dimension.
pub fn check_dimension(expected: u64, vector: &[f32]) -> Result<(), VectorStoreError> {
    let actual = vector.len() as u64;
    if actual != expected {
        return Err(VectorStoreError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_dimension() {
        assert!(check_dimension(3, &[0.1, 0.2, 0.3]).is_ok());
        assert!(matches!(
            check_dimension(768, &[0.1, 0.2]),
            Err(VectorStoreError::DimensionMismatch {
                expected: 768,
                actual: 2
            })
        ));
    }
}
