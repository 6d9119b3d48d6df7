//! PostgreSQL storage for hadith collections and records.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::error::StoreError;
use crate::models::{NewHadith, RecordStoreConfig};

const CREATE_TABLES: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS hadith_collections (
        id SERIAL PRIMARY KEY,
        code TEXT UNIQUE NOT NULL,
        title TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS hadiths (
        id SERIAL PRIMARY KEY,
        collection_id INT NOT NULL REFERENCES hadith_collections(id) ON DELETE CASCADE,
        number TEXT NOT NULL,
        text_ar TEXT,
        text_ru TEXT,
        text_en TEXT,
        grade TEXT,
        topics TEXT[]
    )
    "#,
];

const UPSERT_COLLECTION: &str = r#"
    INSERT INTO hadith_collections (code, title)
    VALUES ($1, $2)
    ON CONFLICT (code) DO UPDATE SET title = EXCLUDED.title
    RETURNING id
"#;

const INSERT_HADITH: &str = r#"
    INSERT INTO hadiths (collection_id, number, text_ar, text_ru, text_en, grade, topics)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING id
"#;

/// Durable storage of source records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create the collection, or overwrite its title if the code exists.
    async fn upsert_collection(&self, code: &str, title: &str) -> Result<i64, StoreError>;

    /// Always inserts a new row; numbers are not deduplicated.
    async fn insert_hadith(&self, collection_id: i64, hadith: &NewHadith)
    -> Result<i64, StoreError>;
}

/// Row counts reported by the status command.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreStats {
    pub collections: u64,
    pub hadiths: u64,
}

pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub async fn connect(config: &RecordStoreConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_max)
            .acquire_timeout(Duration::from_secs(config.pool_acquire_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Create both tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in CREATE_TABLES {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Schema(e.to_string()))?;
        }
        tracing::info!("record store schema ready");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| true)
            .map_err(|e| StoreError::Connection(e.to_string()))
    }

    pub async fn stats(&self) -> Result<StoreStats, StoreError> {
        let (collections, hadiths): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM hadith_collections), (SELECT COUNT(*) FROM hadiths)",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(StoreStats {
            collections: collections as u64,
            hadiths: hadiths as u64,
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn upsert_collection(&self, code: &str, title: &str) -> Result<i64, StoreError> {
        let (id,): (i32,) = sqlx::query_as(UPSERT_COLLECTION)
            .bind(code)
            .bind(title)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Write(format!("upsert collection {}: {}", code, e)))?;

        Ok(i64::from(id))
    }

    async fn insert_hadith(
        &self,
        collection_id: i64,
        hadith: &NewHadith,
    ) -> Result<i64, StoreError> {
        let collection_id = i32::try_from(collection_id)
            .map_err(|_| StoreError::Write(format!("collection id {} out of range", collection_id)))?;
        let topics = (!hadith.topics.is_empty()).then_some(hadith.topics.as_slice());

        let (id,): (i32,) = sqlx::query_as(INSERT_HADITH)
            .bind(collection_id)
            .bind(&hadith.number)
            .bind(hadith.texts.ar.as_deref())
            .bind(hadith.texts.ru.as_deref())
            .bind(hadith.texts.en.as_deref())
            .bind(hadith.grade.as_deref())
            .bind(topics)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Write(format!("insert hadith {}: {}", hadith.number, e)))?;

        Ok(i64::from(id))
    }
}
