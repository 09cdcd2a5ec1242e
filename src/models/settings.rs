//! Immutable run settings, merged once from the config file and CLI flags.

use std::path::PathBuf;

use super::config::{CatalogConfig, EmbeddingConfig, VectorStoreConfig};
use crate::error::ConfigError;

/// Settings for one `load` run.
#[derive(Debug, Clone)]
pub struct LoadSettings {
    pub input: PathBuf,
    pub embed_missing: bool,
    pub catalog: CatalogConfig,
    pub vector_store: VectorStoreConfig,
    pub embedding: EmbeddingConfig,
}

impl LoadSettings {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.catalog.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.catalog.dense_dim == 0 {
            return Err(ConfigError::ValidationError(
                "dense dimension must be at least 1".to_string(),
            ));
        }
        if self.catalog.dense_vector_name == self.catalog.sparse_vector_name {
            return Err(ConfigError::ValidationError(format!(
                "dense and sparse vectors cannot share the name '{}'",
                self.catalog.dense_vector_name
            )));
        }
        if self.embed_missing
            && let Some(column) = self
                .catalog
                .text_columns
                .iter()
                .find(|c| !self.catalog.payload_columns.contains(c))
        {
            return Err(ConfigError::ValidationError(format!(
                "text column '{column}' must also be a payload column"
            )));
        }
        Ok(self)
    }
}

/// Settings for one `upload-images` run.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub path: PathBuf,
    pub bucket: String,
    pub prefix: String,
    pub workers: usize,
    pub region: String,
    pub endpoint: Option<String>,
    pub extract: bool,
    pub exclude: Vec<String>,
    pub assume_yes: bool,
}

impl UploadSettings {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::ValidationError(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "bucket name must not be empty".to_string(),
            ));
        }
        for pattern in &self.exclude {
            glob::Pattern::new(pattern).map_err(|e| {
                ConfigError::ValidationError(format!("invalid exclude pattern '{pattern}': {e}"))
            })?;
        }
        Ok(self)
    }
}
