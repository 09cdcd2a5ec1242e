use serde::{Deserialize, Serialize};

use super::format::OutputFormat;
use crate::error::ConfigError;

pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";
pub const DEFAULT_COLLECTION: &str = "products";
pub const DEFAULT_EMBEDDING_URL: &str = "http://localhost:11411";
pub const DEFAULT_BATCH_SIZE: usize = 128;
/// Dimensionality of BAAI/bge-small-en-v1.5 embeddings.
pub const DEFAULT_DENSE_DIM: u64 = 384;
pub const DEFAULT_BUCKET: &str = "qdrant-nextjs-demo-product-images";
pub const DEFAULT_PREFIX: &str = "images/";
pub const DEFAULT_WORKERS: usize = 20;
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub object_store: ObjectStoreConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    pub fn config_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|p| p.join("catalog-loader").join("config.toml"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            return Self::load_from(&path);
        }
        Ok(Self::default())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<std::path::PathBuf, ConfigError> {
        let path = Self::config_path().ok_or_else(|| {
            ConfigError::PathError("could not determine config directory".to_string())
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    #[serde(default = "default_qdrant_url")]
    pub url: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_qdrant_url() -> String {
    DEFAULT_QDRANT_URL.to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            url: default_qdrant_url(),
            collection: default_collection(),
            api_key: None,
        }
    }
}

/// Column layout of the catalog file and the shape of the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<std::path::PathBuf>,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_dense_dim")]
    pub dense_dim: u64,

    #[serde(default = "default_dense_name")]
    pub dense_vector_name: String,

    #[serde(default = "default_sparse_name")]
    pub sparse_vector_name: String,

    #[serde(default = "default_dense_column")]
    pub dense_column: String,

    #[serde(default = "default_sparse_indices_column")]
    pub sparse_indices_column: String,

    #[serde(default = "default_sparse_values_column")]
    pub sparse_values_column: String,

    #[serde(default = "default_payload_columns")]
    pub payload_columns: Vec<String>,

    /// Columns joined to build the text sent to the embedding server.
    #[serde(default = "default_text_columns")]
    pub text_columns: Vec<String>,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_dense_dim() -> u64 {
    DEFAULT_DENSE_DIM
}

fn default_dense_name() -> String {
    "dense".to_string()
}

fn default_sparse_name() -> String {
    "sparse".to_string()
}

fn default_dense_column() -> String {
    "dense_embedding".to_string()
}

fn default_sparse_indices_column() -> String {
    "sparse_indices".to_string()
}

fn default_sparse_values_column() -> String {
    "sparse_values".to_string()
}

fn default_payload_columns() -> Vec<String> {
    [
        "product_code",
        "prod_name",
        "product_group_name",
        "colour_group_name",
        "department_name",
        "section_name",
        "garment_group_name",
        "detail_desc",
        "image_url",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_text_columns() -> Vec<String> {
    vec!["prod_name".to_string(), "detail_desc".to_string()]
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            input: None,
            batch_size: default_batch_size(),
            dense_dim: default_dense_dim(),
            dense_vector_name: default_dense_name(),
            sparse_vector_name: default_sparse_name(),
            dense_column: default_dense_column(),
            sparse_indices_column: default_sparse_indices_column(),
            sparse_values_column: default_sparse_values_column(),
            payload_columns: default_payload_columns(),
            text_columns: default_text_columns(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_url")]
    pub url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_embedding_url() -> String {
    DEFAULT_EMBEDDING_URL.to_string()
}

fn default_timeout() -> u64 {
    120
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    #[serde(default = "default_bucket")]
    pub bucket: String,

    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint for S3-compatible stores (MinIO, localstack).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            prefix: default_prefix(),
            workers: default_workers(),
            region: default_region(),
            endpoint: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub default_format: OutputFormat,
}
