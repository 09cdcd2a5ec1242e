//! Vector store abstraction layer.
//!
//! The load pipeline talks to the store only through the [`VectorStore`]
//! trait so batching and collection setup can be exercised without a server.

mod qdrant;

pub use qdrant::QdrantBackend;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::VectorStoreError;
use crate::models::{CatalogConfig, Point};

/// Vector layout of the collection: one named dense vector compared by
/// cosine distance and one named sparse vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSchema {
    pub dense_name: String,
    pub dense_dim: u64,
    pub sparse_name: String,
}

impl CollectionSchema {
    pub fn from_catalog(catalog: &CatalogConfig) -> Self {
        Self {
            dense_name: catalog.dense_vector_name.clone(),
            dense_dim: catalog.dense_dim,
            sparse_name: catalog.sparse_vector_name.clone(),
        }
    }
}

/// Collection descriptor reported after a load.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    pub status: String,
    pub points_count: u64,
    pub indexed_vectors_count: u64,
    pub segments_count: u64,
    /// Dimensionality of each named dense vector.
    pub dense_vectors: Vec<(String, u64)>,
    pub sparse_vectors: Vec<String>,
}

impl CollectionInfo {
    pub fn dense_size(&self, name: &str) -> Option<u64> {
        self.dense_vectors
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, size)| *size)
    }
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Check if the vector store is healthy and accessible.
    async fn health_check(&self) -> Result<bool, VectorStoreError>;

    async fn collection_exists(&self) -> Result<bool, VectorStoreError>;

    /// Get information about the collection.
    /// Returns None if the collection doesn't exist.
    async fn collection_info(&self) -> Result<Option<CollectionInfo>, VectorStoreError>;

    /// Create the collection with the given vector layout.
    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), VectorStoreError>;

    /// Insert or replace a batch of points in a single call.
    async fn upsert_points(&self, points: Vec<Point>) -> Result<(), VectorStoreError>;

    fn collection(&self) -> &str;
}

/// Create the collection unless it already exists.
///
/// Returns `true` when the collection was created. An existing collection is
/// reused as is; a dense size that differs from `schema` is only logged.
pub async fn ensure_collection(
    store: &dyn VectorStore,
    schema: &CollectionSchema,
) -> Result<bool, VectorStoreError> {
    if store.collection_exists().await? {
        if let Some(info) = store.collection_info().await? {
            match info.dense_size(&schema.dense_name) {
                Some(size) if size != schema.dense_dim => warn!(
                    collection = store.collection(),
                    vector = %schema.dense_name,
                    existing = size,
                    expected = schema.dense_dim,
                    "existing collection has a different dense vector size"
                ),
                None => warn!(
                    collection = store.collection(),
                    vector = %schema.dense_name,
                    "existing collection has no dense vector with this name"
                ),
                _ => {}
            }
        }
        return Ok(false);
    }

    store.create_collection(schema).await?;
    info!(
        collection = store.collection(),
        dense_dim = schema.dense_dim,
        "created collection"
    );
    Ok(true)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// In-memory store recording every call.
    #[derive(Default)]
    pub struct MemoryStore {
        pub schema: Mutex<Option<CollectionSchema>>,
        pub batches: Mutex<Vec<Vec<Point>>>,
        pub create_calls: Mutex<usize>,
        /// Upsert call index (0-based) that fails.
        pub fail_on_batch: Option<usize>,
    }

    impl MemoryStore {
        pub fn with_schema(schema: CollectionSchema) -> Self {
            Self {
                schema: Mutex::new(Some(schema)),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl VectorStore for MemoryStore {
        async fn health_check(&self) -> Result<bool, VectorStoreError> {
            Ok(true)
        }

        async fn collection_exists(&self) -> Result<bool, VectorStoreError> {
            Ok(self.schema.lock().unwrap().is_some())
        }

        async fn collection_info(&self) -> Result<Option<CollectionInfo>, VectorStoreError> {
            let schema = self.schema.lock().unwrap().clone();
            Ok(schema.map(|s| CollectionInfo {
                name: "memory".to_string(),
                status: "Green".to_string(),
                points_count: self.batches.lock().unwrap().iter().map(Vec::len).sum::<usize>()
                    as u64,
                dense_vectors: vec![(s.dense_name, s.dense_dim)],
                sparse_vectors: vec![s.sparse_name],
                ..Default::default()
            }))
        }

        async fn create_collection(
            &self,
            schema: &CollectionSchema,
        ) -> Result<(), VectorStoreError> {
            *self.create_calls.lock().unwrap() += 1;
            *self.schema.lock().unwrap() = Some(schema.clone());
            Ok(())
        }

        async fn upsert_points(&self, points: Vec<Point>) -> Result<(), VectorStoreError> {
            let mut batches = self.batches.lock().unwrap();
            if self.fail_on_batch == Some(batches.len()) {
                return Err(VectorStoreError::UpsertError("connection reset".to_string()));
            }
            batches.push(points);
            Ok(())
        }

        fn collection(&self) -> &str {
            "memory"
        }
    }
}
