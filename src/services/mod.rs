mod batch;
mod catalog;
mod embedding;
mod image_upload;
mod load;
pub mod object_store;
mod uploader;
pub mod vector_store;

pub use batch::{LoadStats, PointBatches, fill_missing_dense, upload_batches};
pub use catalog::CatalogReader;
pub use embedding::{Embedder, EmbeddingClient};
pub use image_upload::{
    PreparedUpload, UploadSummary, enumerate, execute, locate_images, prepare,
};
pub use load::run_load;
pub use object_store::{ObjectStore, ObjectUrls, S3ObjectStore, object_urls};
pub use uploader::{upload_all, upload_one};
pub use vector_store::{
    CollectionInfo, CollectionSchema, QdrantBackend, VectorStore, ensure_collection,
};
