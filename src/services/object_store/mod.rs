//! Object storage abstraction for the image upload.

mod s3_bucket;

pub use s3_bucket::S3ObjectStore;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ObjectStoreError;
use crate::models::DEFAULT_REGION;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn bucket(&self) -> &str;

    /// Fail unless the bucket exists and is accessible with the current credentials.
    async fn check_bucket(&self) -> Result<(), ObjectStoreError>;

    /// Store `content` under `key` in a single request.
    async fn put_object(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ObjectStoreError>;

    /// Region the bucket lives in.
    async fn bucket_region(&self) -> Result<String, ObjectStoreError>;
}

/// Public URLs of an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectUrls {
    pub global: String,
    pub regional: Option<String>,
}

/// Virtual-hosted style URLs for `key`; the regional form needs a known region.
pub fn object_urls(bucket: &str, key: &str, region: Option<&str>) -> ObjectUrls {
    ObjectUrls {
        global: format!("https://{bucket}.s3.amazonaws.com/{key}"),
        regional: region.map(|region| {
            let region = if region.is_empty() {
                DEFAULT_REGION
            } else {
                region
            };
            format!("https://{bucket}.s3.{region}.amazonaws.com/{key}")
        }),
    }
}
