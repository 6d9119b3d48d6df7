use anyhow::Result;

use crate::cli::output::{BackendStatus, StatusInfo, get_formatter};
use crate::models::{Config, OutputFormat};
use crate::services::{EmbeddingClient, PgRecordStore, QdrantIndex, VectorIndex};

pub async fn handle_status(format: OutputFormat, _verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

    let mut record_store = backend(redact_credentials(&config.record_store.url));
    let (mut collections, mut hadiths) = (None, None);
    match PgRecordStore::connect(&config.record_store).await {
        Ok(store) => {
            match store.stats().await {
                Ok(stats) => {
                    record_store.connected = true;
                    collections = Some(stats.collections);
                    hadiths = Some(stats.hadiths);
                }
                // Reachable, but tables are missing until `hsearch init`
                Err(e) => {
                    record_store.connected = store.health_check().await.unwrap_or(false);
                    record_store.error = Some(e.to_string());
                }
            }
            store.close().await;
        }
        Err(e) => record_store.error = Some(e.to_string()),
    }

    let mut embedder = backend(config.embedding.url.clone());
    let mut embedding_model = None;
    match EmbeddingClient::new(&config.embedding) {
        Ok(client) => match client.health_check().await {
            Ok(health) => {
                embedder.connected = true;
                embedding_model = health.model;
            }
            Err(e) => embedder.error = Some(e.to_string()),
        },
        Err(e) => embedder.error = Some(e.to_string()),
    }

    let mut vector_store = backend(config.vector_store.url.clone());
    let mut points = None;
    match QdrantIndex::new(&config.vector_store) {
        Ok(index) => match index.health_check().await {
            Ok(connected) => {
                vector_store.connected = connected;
                points = index.points_count().await.ok().flatten();
            }
            Err(e) => vector_store.error = Some(e.to_string()),
        },
        Err(e) => vector_store.error = Some(e.to_string()),
    }

    let status = StatusInfo {
        record_store,
        collections,
        hadiths,
        embedder,
        embedding_model,
        vector_store,
        collection: config.vector_store.collection.clone(),
        points,
    };

    print!("{}", formatter.format_status(&status));

    if !status.all_connected() {
        eprintln!();
        eprintln!("Warning: some backends are unreachable. Check the URLs with: hsearch config show");
    } else if status.hadiths.is_none() || status.points.is_none() {
        eprintln!();
        eprintln!("Hint: storage is not initialised yet. Run: hsearch init");
    }

    Ok(())
}

fn backend(url: String) -> BackendStatus {
    BackendStatus {
        url,
        connected: false,
        error: None,
    }
}

/// Hide the user and password part of a connection URL.
fn redact_credentials(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
