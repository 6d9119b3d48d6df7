//! Points stored in the vector index.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::hadith::Language;
use crate::utils::snippet;

/// Kind of record a point was embedded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginType {
    Hadith,
}

impl fmt::Display for OriginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OriginType::Hadith => write!(f, "hadith"),
        }
    }
}

/// Typed payload attached to every point.
///
/// Converted to the index's generic key-value map only by the index adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPayload {
    pub origin_type: OriginType,
    /// Row id of the record in the record store; not enforced by the index.
    pub origin_id: i64,
    pub collection_code: String,
    pub number: String,
    pub lang: Language,
    pub title: String,
    pub snippet: String,
}

impl PointPayload {
    pub fn hadith(
        origin_id: i64,
        collection_code: &str,
        number: &str,
        lang: Language,
        text: &str,
        snippet_chars: usize,
    ) -> Self {
        Self {
            origin_type: OriginType::Hadith,
            origin_id,
            collection_code: collection_code.to_string(),
            number: number.to_string(),
            lang,
            title: format!("Hadith {} ({})", number, collection_code),
            snippet: snippet(text, snippet_chars),
        }
    }
}

/// One vector with its payload, ready for upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedPoint {
    /// Freshly generated; unrelated to the record's own id.
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: PointPayload,
}

impl EmbeddedPoint {
    pub fn new(vector: Vec<f32>, payload: PointPayload) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            vector,
            payload,
        }
    }
}

/// Point identifier as the index reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexPointId {
    Num(u64),
    Uuid(String),
}

impl fmt::Display for IndexPointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexPointId::Num(n) => write!(f, "{}", n),
            IndexPointId::Uuid(s) => f.write_str(s),
        }
    }
}

/// Raw nearest-neighbor hit returned by the index, in its ranking order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint {
    pub id: Option<IndexPointId>,
    pub score: f32,
    pub payload: serde_json::Map<String, serde_json::Value>,
}
