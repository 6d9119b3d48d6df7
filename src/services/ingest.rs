//! Ingestion pipeline: record store first, then embeddings, then the index.
//!
//! Writes are at-least-once. A failure part way leaves earlier rows and
//! points in place; the returned error carries the counts reached so far.

use std::sync::Arc;
use std::time::Duration;

use crate::error::IngestError;
use crate::models::{CollectionRef, HadithInput, IngestConfig, IngestProgress, NewHadith, StoredHadith};
use crate::services::batch::{BatchError, EmbedJob, process_batch};
use crate::services::embedding::Embedder;
use crate::services::record_store::RecordStore;
use crate::services::vector_store::VectorIndex;

/// Preconditions of an ingestion request; nothing is written when these fail.
pub fn validate_request(
    collection: &CollectionRef,
    records: &[HadithInput],
    max_records: usize,
) -> Result<(), IngestError> {
    if collection.code.trim().is_empty() {
        return Err(IngestError::Validation(
            "collection code must not be empty".to_string(),
        ));
    }
    if collection.title.trim().is_empty() {
        return Err(IngestError::Validation(
            "collection title must not be empty".to_string(),
        ));
    }
    if records.is_empty() {
        return Err(IngestError::Validation(
            "at least one hadith is required".to_string(),
        ));
    }
    if records.len() > max_records {
        return Err(IngestError::PayloadTooLarge {
            count: records.len(),
            max: max_records,
        });
    }
    Ok(())
}

/// Progress of one ingestion call; logged on drop unless the call finished.
#[derive(Default)]
struct ProgressTracker {
    progress: IngestProgress,
    finished: bool,
}

impl ProgressTracker {
    fn finish(mut self) -> IngestProgress {
        self.finished = true;
        self.progress
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(
                inserted = self.progress.inserted_count,
                embedded = self.progress.embedded_count,
                "ingestion aborted"
            );
        }
    }
}

pub struct IngestPipeline {
    store: Arc<dyn RecordStore>,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    config: IngestConfig,
}

impl IngestPipeline {
    pub fn new(
        store: Arc<dyn RecordStore>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        config: IngestConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            index,
            config,
        }
    }

    /// Check preconditions without touching any store.
    pub fn validate(
        &self,
        collection: &CollectionRef,
        records: &[HadithInput],
    ) -> Result<(), IngestError> {
        validate_request(collection, records, self.config.max_records)
    }

    /// Store every record, then embed and index the ones that have text.
    #[tracing::instrument(
        skip_all,
        fields(collection = %collection.code, records = records.len())
    )]
    pub async fn ingest(
        &self,
        collection: &CollectionRef,
        records: Vec<HadithInput>,
    ) -> Result<IngestProgress, IngestError> {
        self.validate(collection, &records)?;

        let mut tracker = ProgressTracker::default();
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let outcome =
            tokio::time::timeout(timeout, self.run(collection, records, &mut tracker.progress)).await;
        let progress = tracker.finish();

        match outcome {
            Ok(Ok(())) => {
                tracing::info!(
                    inserted = progress.inserted_count,
                    embedded = progress.embedded_count,
                    "ingestion complete"
                );
                Ok(progress)
            }
            Ok(Err(e)) => {
                tracing::error!(
                    inserted = progress.inserted_count,
                    embedded = progress.embedded_count,
                    error = %e,
                    "ingestion failed"
                );
                Err(e)
            }
            Err(_) => {
                tracing::error!(
                    inserted = progress.inserted_count,
                    embedded = progress.embedded_count,
                    timeout_secs = self.config.timeout_secs,
                    "ingestion timed out"
                );
                Err(IngestError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                    progress,
                })
            }
        }
    }

    async fn run(
        &self,
        collection: &CollectionRef,
        records: Vec<HadithInput>,
        progress: &mut IngestProgress,
    ) -> Result<(), IngestError> {
        let collection_id = self
            .store
            .upsert_collection(&collection.code, &collection.title)
            .await
            .map_err(|source| IngestError::Store {
                source,
                progress: *progress,
            })?;

        let mut stored = Vec::with_capacity(records.len());
        for record in records {
            let hadith = NewHadith::from(record);
            let id = self
                .store
                .insert_hadith(collection_id, &hadith)
                .await
                .map_err(|source| IngestError::Store {
                    source,
                    progress: *progress,
                })?;
            progress.inserted_count += 1;
            stored.push(StoredHadith {
                id,
                collection_id,
                hadith,
            });
        }

        let jobs: Vec<EmbedJob<'_>> = stored.iter().filter_map(EmbedJob::from_stored).collect();
        if jobs.is_empty() {
            tracing::info!("no hadith has text to embed");
            return Ok(());
        }

        let batch_size = self.config.batch_size.max(1);
        let total_batches = jobs.len().div_ceil(batch_size);
        for (batch_index, batch) in jobs.chunks(batch_size).enumerate() {
            let written = process_batch(
                self.embedder.as_ref(),
                self.index.as_ref(),
                &collection.code,
                batch,
                self.config.snippet_chars,
            )
            .await
            .map_err(|e| match e {
                BatchError::Embedding(source) => IngestError::Embedding {
                    source,
                    progress: *progress,
                },
                BatchError::VectorIndex(source) => IngestError::VectorIndex {
                    source,
                    progress: *progress,
                },
            })?;

            progress.embedded_count += written;
            tracing::debug!(
                batch = batch_index + 1,
                of = total_batches,
                size = written,
                "batch indexed"
            );
        }

        Ok(())
    }
}
