//! Catalog load pipeline: read the parquet file, make sure the collection
//! exists, then upsert every batch in order.

use indicatif::ProgressBar;
use tracing::info;

use super::batch::{LoadStats, PointBatches, upload_batches};
use super::catalog::CatalogReader;
use super::embedding::Embedder;
use super::vector_store::{CollectionSchema, VectorStore, ensure_collection};
use crate::error::AppError;
use crate::models::LoadSettings;

pub async fn run_load(
    settings: &LoadSettings,
    store: &dyn VectorStore,
    embedder: Option<&dyn Embedder>,
    progress: &ProgressBar,
) -> Result<LoadStats, AppError> {
    let reader = CatalogReader::open(&settings.input)?;
    let records = reader.read_records(&settings.catalog)?;
    info!(
        input = %settings.input.display(),
        rows = records.len(),
        "catalog loaded"
    );

    let schema = CollectionSchema::from_catalog(&settings.catalog);
    let created = ensure_collection(store, &schema).await?;

    progress.set_length(records.len() as u64);
    let batches = PointBatches::new(&records, settings.catalog.batch_size);
    let mut stats = upload_batches(
        store,
        embedder,
        batches,
        &settings.catalog.text_columns,
        progress,
    )
    .await?;
    progress.finish_and_clear();

    stats.collection_created = created;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::models::{CatalogConfig, EmbeddingConfig, VectorStoreConfig};
    use crate::services::catalog::testing::write_catalog_fixture;
    use crate::services::vector_store::testing::MemoryStore;
    use tempfile::tempdir;

    fn settings(input: PathBuf, batch_size: usize) -> LoadSettings {
        LoadSettings {
            input,
            embed_missing: false,
            catalog: CatalogConfig {
                batch_size,
                ..Default::default()
            },
            vector_store: VectorStoreConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_load_creates_collection_and_upserts_all_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("products.parquet");
        let rows: Vec<(i64, String)> = (0..5).map(|i| (i, format!("item {i}"))).collect();
        let rows: Vec<(i64, &str)> = rows.iter().map(|(c, n)| (*c, n.as_str())).collect();
        write_catalog_fixture(&path, &rows);

        let store = MemoryStore::default();
        let stats = run_load(&settings(path, 2), &store, None, &ProgressBar::hidden())
            .await
            .unwrap();

        assert!(stats.collection_created);
        assert_eq!(stats.rows, 5);
        assert_eq!(stats.batches, 3);
        assert_eq!(stats.missing_dense, 5);
        assert_eq!(*store.create_calls.lock().unwrap(), 1);
        let ids: Vec<u64> = store
            .batches
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_empty_catalog_still_ensures_collection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.parquet");
        write_catalog_fixture(&path, &[]);

        let store = MemoryStore::default();
        let stats = run_load(&settings(path, 128), &store, None, &ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(stats.batches, 0);
        assert_eq!(*store.create_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_existing_collection_is_reused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("products.parquet");
        write_catalog_fixture(&path, &[(1, "Strap top")]);

        let store = MemoryStore::with_schema(CollectionSchema::from_catalog(
            &CatalogConfig::default(),
        ));
        let stats = run_load(&settings(path, 128), &store, None, &ProgressBar::hidden())
            .await
            .unwrap();

        assert!(!stats.collection_created);
        assert_eq!(*store.create_calls.lock().unwrap(), 0);
    }
}
