//! Qdrant vector index backend.

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointId, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use std::collections::HashMap;
use std::time::Duration;

use super::{VectorIndex, check_dimension};
use crate::error::VectorStoreError;
use crate::models::{EmbeddedPoint, IndexPointId, PointPayload, ScoredPoint, VectorStoreConfig};

/// Qdrant-backed vector index using cosine distance.
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
    dimension: u64,
}

impl QdrantIndex {
    pub fn new(config: &VectorStoreConfig) -> Result<Self, VectorStoreError> {
        // Health is probed explicitly by the status command
        let mut builder = Qdrant::from_url(&config.url)
            .timeout(Duration::from_secs(config.timeout_secs))
            .skip_compatibility_check();

        if let Some(ref api_key) = config.api_key {
            builder = builder.api_key(api_key.clone());
        }

        let client = builder
            .build()
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            collection: config.collection.clone(),
            dimension: config.dimension,
        })
    }

    fn to_point(point: EmbeddedPoint) -> Result<PointStruct, VectorStoreError> {
        let payload = payload_to_qdrant(&point.payload)?;
        Ok(PointStruct::new(point.id, point.vector, payload))
    }
}

/// Typed payload becomes a generic map only here, at the wire boundary.
fn payload_to_qdrant(payload: &PointPayload) -> Result<Payload, VectorStoreError> {
    match serde_json::to_value(payload) {
        Ok(serde_json::Value::Object(map)) => Ok(Payload::from(map)),
        Ok(other) => Err(VectorStoreError::Upsert(format!(
            "payload is not an object: {}",
            other
        ))),
        Err(e) => Err(VectorStoreError::Upsert(e.to_string())),
    }
}

fn payload_to_json(
    payload: HashMap<String, QdrantValue>,
) -> serde_json::Map<String, serde_json::Value> {
    payload
        .into_iter()
        .map(|(key, value)| (key, value.into_json()))
        .collect()
}

fn point_id_from_qdrant(id: Option<PointId>) -> Option<IndexPointId> {
    match id?.point_id_options? {
        PointIdOptions::Num(num) => Some(IndexPointId::Num(num)),
        PointIdOptions::Uuid(uuid) => Some(IndexPointId::Uuid(uuid)),
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    fn dimension(&self) -> u64 {
        self.dimension
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    async fn ensure_collection(&self) -> Result<(), VectorStoreError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
        if exists {
            return Ok(());
        }

        let create_collection = CreateCollectionBuilder::new(&self.collection)
            .vectors_config(VectorParamsBuilder::new(self.dimension, Distance::Cosine));

        match self.client.create_collection(create_collection).await {
            Ok(_) => {
                tracing::info!(
                    collection = %self.collection,
                    dimension = self.dimension,
                    "created vector collection"
                );
                Ok(())
            }
            // Another process created it between the check and the create
            Err(e) if e.to_string().to_lowercase().contains("already exists") => Ok(()),
            Err(e) => Err(VectorStoreError::Collection(e.to_string())),
        }
    }

    async fn upsert(&self, points: Vec<EmbeddedPoint>) -> Result<(), VectorStoreError> {
        if points.is_empty() {
            return Ok(());
        }

        for point in &points {
            check_dimension(self.dimension, &point.vector)?;
        }

        let points = points
            .into_iter()
            .map(Self::to_point)
            .collect::<Result<Vec<_>, _>>()?;

        let upsert = UpsertPointsBuilder::new(&self.collection, points).wait(true);

        self.client
            .upsert_points(upsert)
            .await
            .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;

        Ok(())
    }

    async fn search(
        &self,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredPoint>, VectorStoreError> {
        check_dimension(self.dimension, &vector)?;

        let search =
            SearchPointsBuilder::new(&self.collection, vector, limit).with_payload(true);

        let response = self
            .client
            .search_points(search)
            .await
            .map_err(|e| VectorStoreError::Search(e.to_string()))?;

        Ok(response
            .result
            .into_iter()
            .map(|point| ScoredPoint {
                id: point_id_from_qdrant(point.id),
                score: point.score,
                payload: payload_to_json(point.payload),
            })
            .collect())
    }

    async fn health_check(&self) -> Result<bool, VectorStoreError> {
        self.client
            .health_check()
            .await
            .map(|_| true)
            .map_err(|e| VectorStoreError::Connection(e.to_string()))
    }

    async fn points_count(&self) -> Result<Option<u64>, VectorStoreError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
        if !exists {
            return Ok(None);
        }

        let info = self
            .client
            .collection_info(&self.collection)
            .await
            .map_err(|e| VectorStoreError::Collection(e.to_string()))?;

        Ok(Some(
            info.result.and_then(|r| r.points_count).unwrap_or(0),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;

    #[test]
    fn test_index_from_config() {
        let index = QdrantIndex::new(&VectorStoreConfig::default()).unwrap();
        assert_eq!(index.collection(), "documents");
        assert_eq!(index.dimension(), 768);
    }

    #[test]
    fn test_payload_to_qdrant_keeps_all_fields() {
        let payload = PointPayload::hadith(9, "bukhari", "1", Language::Russian, "текст", 280);
        let converted: serde_json::Value = payload_to_qdrant(&payload).unwrap().into();

        assert_eq!(converted["origin_type"], "hadith");
        assert_eq!(converted["origin_id"], 9);
        assert_eq!(converted["collection_code"], "bukhari");
        assert_eq!(converted["number"], "1");
        assert_eq!(converted["lang"], "ru");
        assert_eq!(converted["title"], "Hadith 1 (bukhari)");
        assert_eq!(converted["snippet"], "текст");
    }

    #[test]
    fn test_payload_to_json() {
        let mut payload = HashMap::new();
        payload.insert("lang".to_string(), QdrantValue::from("en"));
        payload.insert("origin_id".to_string(), QdrantValue::from(12_i64));

        let json = payload_to_json(payload);
        assert_eq!(json["lang"], "en");
        assert_eq!(json["origin_id"], 12);
    }

    #[test]
    fn test_point_id_from_qdrant() {
        assert_eq!(
            point_id_from_qdrant(Some(PointId::from(7_u64))),
            Some(IndexPointId::Num(7))
        );
        assert_eq!(
            point_id_from_qdrant(Some(PointId::from("6f1c2b1e-0000-4000-8000-000000000000"))),
            Some(IndexPointId::Uuid(
                "6f1c2b1e-0000-4000-8000-000000000000".to_string()
            ))
        );
        assert_eq!(point_id_from_qdrant(None), None);
    }

    #[tokio::test]
    async fn test_upsert_rejects_wrong_dimension_before_sending() {
        let index = QdrantIndex::new(&VectorStoreConfig {
            url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        })
        .unwrap();
        let payload = PointPayload::hadith(1, "muslim", "2", Language::English, "text", 280);

        let err = index
            .upsert(vec![EmbeddedPoint::new(vec![0.0; 3], payload)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VectorStoreError::DimensionMismatch {
                expected: 768,
                actual: 3
            }
        ));
    }
}
