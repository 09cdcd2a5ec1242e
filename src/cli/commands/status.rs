use anyhow::Result;

use crate::cli::output::{StatusInfo, get_formatter};
use crate::models::{Config, OutputFormat};
use crate::services::{CollectionSchema, EmbeddingClient, QdrantBackend, VectorStore};

pub async fn handle_status(format: OutputFormat, _verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

    let schema = CollectionSchema::from_catalog(&config.catalog);
    let (vector_store_connected, points) =
        if let Ok(store) = QdrantBackend::new(&config.vector_store, &schema) {
            let connected = store.health_check().await.unwrap_or(false);
            let points = if connected {
                store
                    .collection_info()
                    .await
                    .ok()
                    .flatten()
                    .map(|info| info.points_count)
            } else {
                None
            };
            (connected, points)
        } else {
            (false, None)
        };

    let embedding_connected = match EmbeddingClient::new(&config.embedding) {
        Ok(client) => client.health_check().await.is_ok(),
        Err(_) => false,
    };

    let status = StatusInfo {
        vector_store_url: config.vector_store.url.clone(),
        vector_store_connected,
        collection: config.vector_store.collection.clone(),
        points,
        embedding_url: config.embedding.url.clone(),
        embedding_connected,
        bucket: config.object_store.bucket.clone(),
        prefix: config.object_store.prefix.clone(),
    };

    print!("{}", formatter.format_status(&status));

    if !vector_store_connected {
        eprintln!();
        eprintln!("Warning: Qdrant not running. Start with: docker-compose up -d qdrant");
    } else if points.is_none() {
        eprintln!();
        eprintln!(
            "Hint: collection '{}' does not exist yet. Create it with: catalog-loader load",
            config.vector_store.collection
        );
    }

    Ok(())
}
