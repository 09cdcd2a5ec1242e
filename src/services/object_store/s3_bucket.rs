//! S3 object store backed by rust-s3.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::{debug, instrument};

use super::ObjectStore;
use crate::error::ObjectStoreError;
use crate::models::{DEFAULT_REGION, UploadSettings};

/// Placeholder region rust-s3 reports when it cannot read the location
/// constraint. S3 answers with an empty constraint for us-east-1 buckets.
const UNPARSED_REGION: &str = "Custom";

pub struct S3ObjectStore {
    name: String,
    bucket: Bucket,
}

impl S3ObjectStore {
    /// Build a client for `settings.bucket`.
    ///
    /// Credentials come from the usual AWS sources (environment, profile,
    /// instance metadata). A custom endpoint switches to path-style requests.
    pub fn new(settings: &UploadSettings) -> Result<Self, ObjectStoreError> {
        let credentials =
            Credentials::default().map_err(|e| ObjectStoreError::Credentials(e.to_string()))?;
        Self::with_credentials(settings, credentials)
    }

    pub fn with_credentials(
        settings: &UploadSettings,
        credentials: Credentials,
    ) -> Result<Self, ObjectStoreError> {
        let region = match settings.endpoint {
            Some(ref endpoint) => Region::Custom {
                region: settings.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => settings
                .region
                .parse::<Region>()
                .map_err(|e| ObjectStoreError::Region(e.to_string()))?,
        };

        let bucket = Bucket::new(&settings.bucket, region, credentials)?;
        let bucket = if settings.endpoint.is_some() {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(Self {
            name: settings.bucket.clone(),
            bucket,
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.name
    }

    #[instrument(name = "Check bucket", skip(self), fields(bucket = %self.name))]
    async fn check_bucket(&self) -> Result<(), ObjectStoreError> {
        let unreachable = |reason: String| ObjectStoreError::BucketUnreachable {
            bucket: self.name.clone(),
            reason,
        };

        let (_, status) = self
            .bucket
            .location()
            .await
            .map_err(|e| unreachable(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(unreachable(format!("status {status}")));
        }
        Ok(())
    }

    async fn put_object(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &content, content_type)
            .await?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(ObjectStoreError::PutRejected {
                key: key.to_string(),
                status,
            });
        }
        debug!(key, bytes = content.len(), "stored object");
        Ok(())
    }

    async fn bucket_region(&self) -> Result<String, ObjectStoreError> {
        let (region, _) = self.bucket.location().await?;
        Ok(region_name(&region))
    }
}

/// Name of the region a bucket lives in; an empty or unreadable location
/// constraint means us-east-1.
fn region_name(region: &Region) -> String {
    match region {
        Region::Custom { region, .. }
            if region.trim().is_empty() || region == UNPARSED_REGION =>
        {
            DEFAULT_REGION.to_string()
        }
        other => other.to_string(),
    }
}
