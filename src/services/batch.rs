use crate::error::{EmbeddingError, VectorStoreError};
use crate::models::{EmbeddedPoint, PointPayload, StoredHadith};
use crate::services::embedding::Embedder;
use crate::services::selection::{SelectedText, select_text};
use crate::services::vector_store::{VectorIndex, check_dimension};

/// A stored hadith paired with the text chosen for its embedding.
#[derive(Debug, Clone, Copy)]
pub struct EmbedJob<'a> {
    pub origin_id: i64,
    pub number: &'a str,
    pub selected: SelectedText<'a>,
}

impl<'a> EmbedJob<'a> {
    /// `None` when the hadith has no text to embed.
    pub fn from_stored(stored: &'a StoredHadith) -> Option<Self> {
        select_text(&stored.hadith.texts).map(|selected| Self {
            origin_id: stored.id,
            number: &stored.hadith.number,
            selected,
        })
    }
}

/// Failure inside one batch, before progress is attached by the pipeline.
#[derive(Debug)]
pub enum BatchError {
    Embedding(EmbeddingError),
    VectorIndex(VectorStoreError),
}

/// Embed one batch in a single call and upsert its points in a single call.
///
/// Returns the number of points written.
pub async fn process_batch(
    embedder: &dyn Embedder,
    index: &dyn VectorIndex,
    collection_code: &str,
    jobs: &[EmbedJob<'_>],
    snippet_chars: usize,
) -> Result<usize, BatchError> {
    if jobs.is_empty() {
        return Ok(0);
    }

    let texts: Vec<String> = jobs.iter().map(|job| job.selected.text.to_string()).collect();
    let embeddings = embedder.embed(&texts).await.map_err(BatchError::Embedding)?;

    if embeddings.len() != jobs.len() {
        return Err(BatchError::Embedding(EmbeddingError::Protocol(format!(
            "expected {} embeddings, got {}",
            jobs.len(),
            embeddings.len()
        ))));
    }

    let dimension = index.dimension();
    let points = jobs
        .iter()
        .zip(embeddings)
        .map(|(job, vector)| {
            check_dimension(dimension, &vector)?;
            let payload = PointPayload::hadith(
                job.origin_id,
                collection_code,
                job.number,
                job.selected.lang,
                job.selected.text,
                snippet_chars,
            );
            Ok(EmbeddedPoint::new(vector, payload))
        })
        .collect::<Result<Vec<_>, VectorStoreError>>()
        .map_err(BatchError::VectorIndex)?;

    let written = points.len();
    index.upsert(points).await.map_err(BatchError::VectorIndex)?;

    Ok(written)
}
