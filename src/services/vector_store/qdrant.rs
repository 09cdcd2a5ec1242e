//! Qdrant vector store backend implementation.

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::vectors_config::Config as VectorsConfigKind;
use qdrant_client::qdrant::{
    CollectionStatus, CreateCollectionBuilder, Distance, NullValue, PointStruct,
    SparseVectorParamsBuilder, SparseVectorsConfigBuilder, UpsertPointsBuilder, Value, Vector,
    VectorParamsBuilder, VectorsConfigBuilder,
};
use std::collections::HashMap;

use super::{CollectionInfo, CollectionSchema, VectorStore};
use crate::error::VectorStoreError;
use crate::models::{PayloadValue, Point, VectorStoreConfig};

/// Qdrant vector store backend.
pub struct QdrantBackend {
    client: Qdrant,
    collection: String,
    dense_name: String,
    sparse_name: String,
}

impl QdrantBackend {
    /// Create a new Qdrant backend writing points with the vector names of `schema`.
    pub fn new(
        config: &VectorStoreConfig,
        schema: &CollectionSchema,
    ) -> Result<Self, VectorStoreError> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(ref api_key) = config.api_key {
            builder = builder.api_key(api_key.clone());
        }

        let client = builder
            .build()
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            collection: config.collection.clone(),
            dense_name: schema.dense_name.clone(),
            sparse_name: schema.sparse_name.clone(),
        })
    }

    fn to_point_struct(&self, point: Point) -> PointStruct {
        let mut vectors: HashMap<String, Vector> = HashMap::new();
        // rows without a dense vector are stored with the sparse vector only
        if !point.dense.is_empty() {
            vectors.insert(self.dense_name.clone(), Vector::from(point.dense));
        }
        vectors.insert(
            self.sparse_name.clone(),
            Vector::new_sparse(point.sparse.indices, point.sparse.values),
        );

        let payload: HashMap<String, Value> = point
            .payload
            .into_iter()
            .map(|(k, v)| (k, payload_value(v)))
            .collect();

        PointStruct::new(point.id, vectors, payload)
    }
}

fn payload_value(value: PayloadValue) -> Value {
    match value {
        PayloadValue::Null => Value {
            kind: Some(Kind::NullValue(NullValue::NullValue.into())),
        },
        PayloadValue::Bool(b) => b.into(),
        PayloadValue::Integer(n) => n.into(),
        PayloadValue::Float(f) => f.into(),
        PayloadValue::Text(s) => s.into(),
    }
}

#[async_trait]
impl VectorStore for QdrantBackend {
    async fn health_check(&self) -> Result<bool, VectorStoreError> {
        self.client
            .health_check()
            .await
            .map(|_| true)
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))
    }

    async fn collection_exists(&self) -> Result<bool, VectorStoreError> {
        self.client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| VectorStoreError::CollectionError(e.to_string()))
    }

    async fn collection_info(&self) -> Result<Option<CollectionInfo>, VectorStoreError> {
        let response = match self.client.collection_info(&self.collection).await {
            Ok(response) => response,
            Err(e) => {
                let msg = e.to_string();
                if msg.contains("not found") || msg.contains("doesn't exist") {
                    return Ok(None);
                }
                return Err(VectorStoreError::CollectionError(msg));
            }
        };

        let Some(result) = response.result else {
            return Ok(None);
        };

        let status = CollectionStatus::try_from(result.status)
            .map(|s| s.as_str_name().to_string())
            .unwrap_or_else(|_| "Unknown".to_string());

        let params = result.config.and_then(|c| c.params);
        let mut dense_vectors: Vec<(String, u64)> = match params
            .as_ref()
            .and_then(|p| p.vectors_config.as_ref())
            .and_then(|v| v.config.as_ref())
        {
            Some(VectorsConfigKind::ParamsMap(map)) => map
                .map
                .iter()
                .map(|(name, p)| (name.clone(), p.size))
                .collect(),
            Some(VectorsConfigKind::Params(p)) => vec![(String::new(), p.size)],
            None => Vec::new(),
        };
        dense_vectors.sort();

        let mut sparse_vectors: Vec<String> = params
            .as_ref()
            .and_then(|p| p.sparse_vectors_config.as_ref())
            .map(|s| s.map.keys().cloned().collect())
            .unwrap_or_default();
        sparse_vectors.sort();

        Ok(Some(CollectionInfo {
            name: self.collection.clone(),
            status,
            points_count: result.points_count.unwrap_or(0),
            indexed_vectors_count: result.indexed_vectors_count.unwrap_or(0),
            segments_count: result.segments_count,
            dense_vectors,
            sparse_vectors,
        }))
    }

    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), VectorStoreError> {
        let mut vectors = VectorsConfigBuilder::default();
        vectors.add_named_vector_params(
            &schema.dense_name,
            VectorParamsBuilder::new(schema.dense_dim, Distance::Cosine),
        );

        let mut sparse_vectors = SparseVectorsConfigBuilder::default();
        sparse_vectors
            .add_named_vector_params(&schema.sparse_name, SparseVectorParamsBuilder::default());

        let create_collection = CreateCollectionBuilder::new(&self.collection)
            .vectors_config(vectors)
            .sparse_vectors_config(sparse_vectors);

        self.client
            .create_collection(create_collection)
            .await
            .map_err(|e| VectorStoreError::CollectionError(e.to_string()))?;

        Ok(())
    }

    async fn upsert_points(&self, points: Vec<Point>) -> Result<(), VectorStoreError> {
        if points.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = points
            .into_iter()
            .map(|point| self.to_point_struct(point))
            .collect();

        let upsert = UpsertPointsBuilder::new(&self.collection, points).wait(true);

        self.client
            .upsert_points(upsert)
            .await
            .map_err(|e| VectorStoreError::UpsertError(e.to_string()))?;

        Ok(())
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}
