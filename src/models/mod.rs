mod config;
mod hadith;
mod point;
mod search;

pub use config::{
    Config, DEFAULT_COLLECTION, DEFAULT_EMBEDDING_DIMENSION, DEFAULT_EMBEDDING_URL,
    DEFAULT_INGEST_BATCH_SIZE, DEFAULT_MAX_RECORDS, DEFAULT_MAX_SEARCH_LIMIT,
    DEFAULT_POSTGRES_URL, DEFAULT_QDRANT_URL, DEFAULT_SEARCH_LIMIT, DEFAULT_SNIPPET_CHARS,
    EmbeddingConfig, IngestConfig, OutputConfig, RecordStoreConfig, SearchConfig,
    VectorStoreConfig,
};
pub use hadith::{
    CollectionRef, HadithInput, IngestProgress, Language, NewHadith, StoredHadith, TextVariants,
    UploadDocument,
};
pub use point::{EmbeddedPoint, IndexPointId, OriginType, PointPayload, ScoredPoint};
pub use search::{OutputFormat, SearchHit, SearchQuery, SearchResults};
