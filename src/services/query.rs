//! Query pipeline: embed the query, ask the index, pass its ranking through.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{EmbeddingError, SearchError, SearchFailure};
use crate::models::{ScoredPoint, SearchConfig, SearchHit, SearchQuery, SearchResults};
use crate::services::embedding::Embedder;
use crate::services::vector_store::VectorIndex;

pub struct QueryPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    config: SearchConfig,
}

impl QueryPipeline {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>, config: SearchConfig) -> Self {
        Self {
            embedder,
            index,
            config,
        }
    }

    /// Requested limit if within `(0, max_limit]`, otherwise the default.
    pub fn effective_limit(&self, requested: i64) -> u64 {
        match u64::try_from(requested) {
            Ok(limit) if limit > 0 && limit <= self.config.max_limit => limit,
            _ => self.config.default_limit,
        }
    }

    /// Nearest hits for `query`, in the index's ranking order.
    #[tracing::instrument(skip_all, fields(query = %query))]
    pub async fn search(&self, query: &str, limit: i64) -> Result<Vec<SearchHit>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidQuery(
                "query must not be empty".to_string(),
            ));
        }

        let limit = self.effective_limit(limit);

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let outcome = match tokio::time::timeout(timeout, self.run(query, limit)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(SearchFailure::Timeout(self.config.timeout_secs)),
        };

        outcome.map_err(|cause| {
            tracing::error!(cause = %cause, "search unavailable");
            SearchError::Unavailable(cause)
        })
    }

    /// Run a request and time it, for the CLI and other front ends.
    pub async fn execute(&self, request: &SearchQuery) -> Result<SearchResults, SearchError> {
        let start = Instant::now();
        let hits = self.search(&request.query, request.limit).await?;
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(hits = hits.len(), duration_ms, "search complete");
        Ok(SearchResults::new(request.query.clone(), hits, duration_ms))
    }

    async fn run(&self, query: &str, limit: u64) -> Result<Vec<SearchHit>, SearchFailure> {
        let vectors = self.embedder.embed(&[query.to_string()]).await?;
        let vector = vectors.into_iter().next().ok_or_else(|| {
            EmbeddingError::Protocol("no embedding returned for query".to_string())
        })?;

        let points = self.index.search(vector, limit).await?;
        Ok(points.into_iter().map(to_hit).collect())
    }
}

fn to_hit(point: ScoredPoint) -> SearchHit {
    SearchHit {
        id: point.id.map(|id| id.to_string()).unwrap_or_default(),
        score: point.score,
        payload: point.payload,
    }
}
