//! In-memory stand-ins for the remote collaborators, recording every call.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::{EmbeddingError, StoreError, VectorStoreError};
use crate::models::{EmbeddedPoint, NewHadith, ScoredPoint};
use crate::services::embedding::Embedder;
use crate::services::record_store::RecordStore;
use crate::services::vector_store::VectorIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRow {
    pub id: i64,
    pub code: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HadithRow {
    pub id: i64,
    pub collection_id: i64,
    pub hadith: NewHadith,
}

/// Record store keeping rows in vectors, with collection codes unique.
#[derive(Default)]
pub struct FakeRecordStore {
    collections: Mutex<Vec<CollectionRow>>,
    hadiths: Mutex<Vec<HadithRow>>,
    fail_on_insert: Option<usize>,
}

impl FakeRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the insert with this zero-based index.
    pub fn failing_on_insert(index: usize) -> Self {
        Self {
            fail_on_insert: Some(index),
            ..Self::default()
        }
    }

    pub fn collections(&self) -> Vec<CollectionRow> {
        self.collections.lock().unwrap().clone()
    }

    pub fn hadiths(&self) -> Vec<HadithRow> {
        self.hadiths.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for FakeRecordStore {
    async fn upsert_collection(&self, code: &str, title: &str) -> Result<i64, StoreError> {
        let mut collections = self.collections.lock().unwrap();
        if let Some(row) = collections.iter_mut().find(|row| row.code == code) {
            row.title = title.to_string();
            return Ok(row.id);
        }
        let id = collections.len() as i64 + 1;
        collections.push(CollectionRow {
            id,
            code: code.to_string(),
            title: title.to_string(),
        });
        Ok(id)
    }

    async fn insert_hadith(
        &self,
        collection_id: i64,
        hadith: &NewHadith,
    ) -> Result<i64, StoreError> {
        let mut hadiths = self.hadiths.lock().unwrap();
        if self.fail_on_insert == Some(hadiths.len()) {
            return Err(StoreError::Write("connection reset".to_string()));
        }
        let id = hadiths.len() as i64 + 1;
        hadiths.push(HadithRow {
            id,
            collection_id,
            hadith: hadith.clone(),
        });
        Ok(id)
    }
}

/// Embedder returning constant vectors of a fixed dimension.
pub struct FakeEmbedder {
    dimension: usize,
    calls: Mutex<Vec<Vec<String>>>,
    fail_on_call: Option<usize>,
}

impl FakeEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            calls: Mutex::new(Vec::new()),
            fail_on_call: None,
        }
    }

    /// Fail the call with this zero-based index as an unavailable service.
    pub fn failing_on_call(dimension: usize, call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::new(dimension)
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.calls().iter().map(Vec::len).collect()
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut calls = self.calls.lock().unwrap();
        let call = calls.len();
        calls.push(texts.to_vec());
        if self.fail_on_call == Some(call) {
            return Err(EmbeddingError::Unavailable("status 503".to_string()));
        }
        Ok(texts.iter().map(|_| vec![0.5; self.dimension]).collect())
    }
}

/// Vector index holding upserted batches and answering searches from a
/// fixed result list.
pub struct FakeVectorIndex {
    dimension: u64,
    upserts: Mutex<Vec<Vec<EmbeddedPoint>>>,
    searches: Mutex<Vec<(Vec<f32>, u64)>>,
    results: Vec<ScoredPoint>,
}

impl FakeVectorIndex {
    pub fn new(dimension: u64) -> Self {
        Self {
            dimension,
            upserts: Mutex::new(Vec::new()),
            searches: Mutex::new(Vec::new()),
            results: Vec::new(),
        }
    }

    pub fn with_results(mut self, results: Vec<ScoredPoint>) -> Self {
        self.results = results;
        self
    }

    pub fn upserts(&self) -> Vec<Vec<EmbeddedPoint>> {
        self.upserts.lock().unwrap().clone()
    }

    pub fn points(&self) -> Vec<EmbeddedPoint> {
        self.upserts().into_iter().flatten().collect()
    }

    pub fn searches(&self) -> Vec<(Vec<f32>, u64)> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorIndex for FakeVectorIndex {
    fn dimension(&self) -> u64 {
        self.dimension
    }

    fn collection(&self) -> &str {
        "documents"
    }

    async fn ensure_collection(&self) -> Result<(), VectorStoreError> {
        Ok(())
    }

    async fn upsert(&self, points: Vec<EmbeddedPoint>) -> Result<(), VectorStoreError> {
        self.upserts.lock().unwrap().push(points);
        Ok(())
    }

    async fn search(
        &self,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredPoint>, VectorStoreError> {
        self.searches.lock().unwrap().push((vector, limit));
        Ok(self.results.iter().take(limit as usize).cloned().collect())
    }

    async fn health_check(&self) -> Result<bool, VectorStoreError> {
        Ok(true)
    }

    async fn points_count(&self) -> Result<Option<u64>, VectorStoreError> {
        Ok(Some(self.points().len() as u64))
    }
}
