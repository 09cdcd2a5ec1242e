//! Error types for the catalog loader.

use std::path::PathBuf;

use thiserror::Error;

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("path error: {0}")]
    PathError(String),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Errors raised while reading the columnar catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to open catalog {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read parquet data: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("row {row} is not a record: {reason}")]
    InvalidRow { row: usize, reason: String },
}

/// Errors related to embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("failed to connect to embedding server: {0}")]
    ConnectionError(String),

    #[error("embedding server error: {0}")]
    ServerError(String),

    #[error("embedding request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
}

/// Errors related to vector store operations.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("failed to connect to Qdrant: {0}")]
    ConnectionError(String),

    #[error("collection error: {0}")]
    CollectionError(String),

    #[error("upsert error: {0}")]
    UpsertError(String),
}

/// Errors related to object storage.
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("credentials error: {0}")]
    Credentials(String),

    #[error("invalid region: {0}")]
    Region(String),

    #[error("bucket {bucket} is not reachable: {reason}")]
    BucketUnreachable { bucket: String, reason: String },

    #[error("put {key} failed with status {status}")]
    PutRejected { key: String, status: u16 },

    #[error("S3 error: {0}")]
    S3(#[from] s3::error::S3Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors of the image upload pipeline.
///
/// The first group is fatal and aborts the run; `Transfer` is recorded per
/// file in the upload report and never aborts anything.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("path {} does not exist", .0.display())]
    PathNotFound(PathBuf),

    #[error("{} is not a zip file or directory", .0.display())]
    InvalidInput(PathBuf),

    #[error("failed to extract {}: {reason}", .path.display())]
    Extract { path: PathBuf, reason: String },

    #[error("directory walk error: {0}")]
    WalkError(String),

    #[error("no images found in {}", .0.display())]
    NoImagesFound(PathBuf),

    #[error("error accessing bucket: {0}")]
    Bucket(ObjectStoreError),

    #[error("{0}")]
    Transfer(String),
}

/// Application-level errors that wrap domain errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),

    #[error("upload error: {0}")]
    Upload(#[from] UploadError),
}
