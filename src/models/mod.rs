mod config;
mod format;
mod record;
mod settings;
mod upload;

pub use config::{
    CatalogConfig, Config, DEFAULT_BATCH_SIZE, DEFAULT_BUCKET, DEFAULT_COLLECTION,
    DEFAULT_DENSE_DIM, DEFAULT_PREFIX, DEFAULT_QDRANT_URL, DEFAULT_REGION, DEFAULT_WORKERS,
    EmbeddingConfig, ObjectStoreConfig, OutputConfig, VectorStoreConfig,
};
pub use format::OutputFormat;
pub use record::{PayloadValue, Point, Record, SparseVector};
pub use settings::{LoadSettings, UploadSettings};
pub use upload::{UploadOutcome, UploadReport, UploadTask};
