//! Image upload pipeline: resolve the input, enumerate images, check the
//! bucket, then transfer.

use std::path::PathBuf;
use std::sync::Arc;

use indicatif::ProgressBar;
use serde::Serialize;
use tracing::info;

use super::object_store::{ObjectStore, ObjectUrls, object_urls};
use super::uploader::upload_all;
use crate::error::UploadError;
use crate::models::{UploadReport, UploadSettings, UploadTask};
use crate::utils::archive::{ResolvedInput, extract_archive, extraction_dir, resolve_input};
use crate::utils::file::{find_images, total_size};

/// Images found on disk and ready to be confirmed.
#[derive(Debug)]
pub struct PreparedUpload {
    /// Directory the images were enumerated from.
    pub root: PathBuf,
    pub tasks: Vec<UploadTask>,
    pub total_bytes: u64,
}

/// Resolve the input and extract it when it is an archive.
///
/// Returns the directory images will be enumerated from.
pub fn locate_images(settings: &UploadSettings) -> Result<PathBuf, UploadError> {
    match resolve_input(&settings.path, settings.extract)? {
        ResolvedInput::Archive(archive) => {
            let dest = extraction_dir(&archive);
            info!(archive = %archive.display(), dest = %dest.display(), "extracting archive");
            extract_archive(&archive, &dest)?;
            Ok(dest)
        }
        ResolvedInput::Directory(dir) => Ok(dir),
    }
}

/// List the images under `root` and total their size.
pub fn enumerate(root: PathBuf, settings: &UploadSettings) -> Result<PreparedUpload, UploadError> {
    let tasks = find_images(&root, &settings.prefix, &settings.exclude)?;
    if tasks.is_empty() {
        return Err(UploadError::NoImagesFound(root));
    }

    let total_bytes = total_size(&tasks).map_err(|e| UploadError::WalkError(e.to_string()))?;
    Ok(PreparedUpload {
        root,
        tasks,
        total_bytes,
    })
}

pub fn prepare(settings: &UploadSettings) -> Result<PreparedUpload, UploadError> {
    let root = locate_images(settings)?;
    enumerate(root, settings)
}

/// Check the bucket once and upload every task.
///
/// An unreachable bucket is fatal and nothing is transferred.
pub async fn execute(
    store: Arc<dyn ObjectStore>,
    tasks: Vec<UploadTask>,
    workers: usize,
    progress: &ProgressBar,
) -> Result<UploadReport, UploadError> {
    store.check_bucket().await.map_err(UploadError::Bucket)?;
    info!(bucket = store.bucket(), files = tasks.len(), workers, "starting upload");
    Ok(upload_all(store, tasks, workers, progress).await)
}

/// What gets reported once an upload run finishes.
#[derive(Debug, Serialize)]
pub struct UploadSummary {
    pub bucket: String,
    pub report: UploadReport,
    /// Example URLs, present when at least one file was uploaded.
    pub urls: Option<ObjectUrls>,
}

impl UploadSummary {
    pub async fn build(store: &dyn ObjectStore, report: UploadReport) -> Self {
        let urls = match report.successful.iter().map(|t| t.key.as_str()).min() {
            Some(key) => {
                let region = store.bucket_region().await.ok();
                Some(object_urls(store.bucket(), key, region.as_deref()))
            }
            None => None,
        };
        Self {
            bucket: store.bucket().to_string(),
            report,
            urls,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::services::object_store::testing::MemoryBucket;
    use crate::utils::archive::testing::write_zip;
    use tempfile::tempdir;

    fn settings(path: PathBuf) -> UploadSettings {
        UploadSettings {
            path,
            bucket: "test-bucket".to_string(),
            prefix: "images/".to_string(),
            workers: 4,
            region: "us-east-1".to_string(),
            endpoint: None,
            extract: true,
            exclude: Vec::new(),
            assume_yes: true,
        }
    }

    #[tokio::test]
    async fn test_directory_upload_skips_non_images() {
        let dir = tempdir().unwrap();
        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            fs::write(dir.path().join(name), b"img").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), b"text").unwrap();

        let prepared = prepare(&settings(dir.path().to_path_buf())).unwrap();
        assert_eq!(prepared.tasks.len(), 3);
        assert_eq!(prepared.total_bytes, 9);

        let bucket = Arc::new(MemoryBucket::default());
        let report = execute(bucket.clone(), prepared.tasks, 4, &ProgressBar::hidden())
            .await
            .unwrap();
        assert_eq!(report.successful.len(), 3);
        assert!(report.failed.is_empty());

        let summary = UploadSummary::build(bucket.as_ref(), report).await;
        let urls = summary.urls.unwrap();
        assert_eq!(urls.global, "https://test-bucket.s3.amazonaws.com/images/a.jpg");
        assert_eq!(
            urls.regional.as_deref(),
            Some("https://test-bucket.s3.eu-west-1.amazonaws.com/images/a.jpg")
        );
    }

    #[tokio::test]
    async fn test_denied_keys_are_reported() {
        let dir = tempdir().unwrap();
        for i in 0..10 {
            fs::write(dir.path().join(format!("{i}.png")), b"x").unwrap();
        }
        let prepared = prepare(&settings(dir.path().to_path_buf())).unwrap();
        let bucket = Arc::new(MemoryBucket {
            denied_keys: ["images/3.png", "images/8.png"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            ..Default::default()
        });

        let report = execute(bucket.clone(), prepared.tasks, 4, &ProgressBar::hidden())
            .await
            .unwrap();
        assert_eq!(report.successful.len(), 8);
        assert_eq!(report.failed.len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_bucket_uploads_nothing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        let prepared = prepare(&settings(dir.path().to_path_buf())).unwrap();
        let bucket = Arc::new(MemoryBucket {
            reachable: false,
            ..Default::default()
        });

        let result = execute(bucket.clone(), prepared.tasks, 4, &ProgressBar::hidden()).await;
        assert!(matches!(result, Err(UploadError::Bucket(_))));
        assert_eq!(bucket.put_count(), 0);
    }

    #[tokio::test]
    async fn test_zip_with_nested_folder() {
        let dir = tempdir().unwrap();
        let zip_path = dir.path().join("photos.zip");
        write_zip(
            &zip_path,
            &[
                ("photos/1.jpg", &b"1"[..]),
                ("photos/2.jpg", &b"2"[..]),
                ("photos/3.png", &b"3"[..]),
                ("photos/4.gif", &b"4"[..]),
                ("photos/5.webp", &b"5"[..]),
            ],
        );

        let prepared = prepare(&settings(zip_path)).unwrap();
        assert_eq!(prepared.root, dir.path().join("photos"));
        let keys: Vec<&str> = prepared.tasks.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "images/photos/1.jpg",
                "images/photos/2.jpg",
                "images/photos/3.png",
                "images/photos/4.gif",
                "images/photos/5.webp",
            ]
        );

        let bucket = Arc::new(MemoryBucket::default());
        let report = execute(bucket.clone(), prepared.tasks, 2, &ProgressBar::hidden())
            .await
            .unwrap();
        assert_eq!(report.successful.len(), 5);
    }

    #[test]
    fn test_archive_is_located_before_enumeration() {
        let dir = tempdir().unwrap();
        let zip_path = dir.path().join("photos.zip");
        write_zip(&zip_path, &[("photos/1.jpg", &b"1"[..])]);

        let settings = settings(zip_path);
        let root = locate_images(&settings).unwrap();
        assert_eq!(root, dir.path().join("photos"));
        assert!(root.join("photos/1.jpg").is_file());

        let prepared = enumerate(root.clone(), &settings).unwrap();
        assert_eq!(prepared.root, root);
        assert_eq!(prepared.tasks.len(), 1);
        assert_eq!(prepared.total_bytes, 1);
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("readme.md"), b"x").unwrap();
        assert!(matches!(
            prepare(&settings(dir.path().to_path_buf())),
            Err(UploadError::NoImagesFound(_))
        ));
    }

    #[tokio::test]
    async fn test_summary_without_successes_has_no_urls() {
        let bucket = MemoryBucket::default();
        let summary = UploadSummary::build(&bucket, UploadReport::with_total(0)).await;
        assert!(summary.urls.is_none());
    }
}
