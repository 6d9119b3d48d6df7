mod batch;
mod context;
mod embedding;
mod ingest;
mod query;
mod record_store;
mod selection;
mod vector_store;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{EmbedJob, process_batch};
pub use context::Services;
pub use embedding::{Embedder, EmbeddingClient, HealthResponse};
pub use ingest::{IngestPipeline, validate_request};
pub use query::QueryPipeline;
pub use record_store::{PgRecordStore, RecordStore, StoreStats};
pub use selection::{LANGUAGE_PRIORITY, SelectedText, select_text};
pub use vector_store::{QdrantIndex, VectorIndex, check_dimension};
