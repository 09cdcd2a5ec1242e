//! Image upload command implementation.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::output::get_formatter;
use crate::models::{Config, OutputFormat, UploadSettings};
use crate::services::{
    ObjectStore, PreparedUpload, S3ObjectStore, UploadSummary, enumerate, execute, locate_images,
};
use crate::utils::file::format_gb;

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Zip archive or directory holding the images
    #[arg(required = true)]
    pub path: PathBuf,

    /// Destination bucket
    #[arg(long, env = "IMAGE_BUCKET")]
    pub bucket: Option<String>,

    /// Maximum number of concurrent uploads
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Key prefix for uploaded objects
    #[arg(long)]
    pub prefix: Option<String>,

    /// Treat the path as a directory even if it is a zip file
    #[arg(long)]
    pub no_extract: bool,

    /// File patterns to exclude (can be specified multiple times)
    #[arg(long, short = 'e')]
    pub exclude: Vec<String>,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl UploadArgs {
    fn into_settings(self, config: Config) -> Result<UploadSettings> {
        let object_store = config.object_store;
        let settings = UploadSettings {
            path: self.path,
            bucket: self.bucket.unwrap_or(object_store.bucket),
            prefix: self.prefix.unwrap_or(object_store.prefix),
            workers: self.workers.unwrap_or(object_store.workers),
            region: object_store.region,
            endpoint: object_store.endpoint,
            extract: !self.no_extract,
            exclude: self.exclude,
            assume_yes: self.yes,
        };
        Ok(settings.validate()?)
    }
}

/// Scan results shown before confirmation.
fn scan_summary(prepared: &PreparedUpload) -> String {
    format!(
        "Found {} images\nTotal size: {}\n",
        prepared.tasks.len(),
        format_gb(prepared.total_bytes)
    )
}

/// A trimmed, case-insensitive `y` confirms.
fn is_confirmation(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

pub async fn handle_upload(args: UploadArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);
    let settings = args.into_settings(config)?;

    let root = locate_images(&settings)?;
    eprintln!("\nScanning for images in {}...", root.display());
    let prepared = enumerate(root, &settings)?;
    eprint!("{}", scan_summary(&prepared));

    if !settings.assume_yes {
        eprint!(
            "\nUpload {} images to s3://{}/{}? (y/n): ",
            prepared.tasks.len(),
            settings.bucket,
            settings.prefix
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !is_confirmation(&input) {
            println!("{}", formatter.format_message("Upload cancelled").trim_end());
            return Ok(());
        }
    }

    if verbose {
        eprintln!(
            "Uploading with {} workers to s3://{}/{}",
            settings.workers, settings.bucket, settings.prefix
        );
    }

    let store: Arc<dyn ObjectStore> = Arc::new(
        S3ObjectStore::new(&settings).context("failed to configure S3 client")?,
    );

    let pb = ProgressBar::new(prepared.tasks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .context("invalid progress template")?
            .progress_chars("#>-"),
    );

    let report = execute(Arc::clone(&store), prepared.tasks, settings.workers, &pb).await?;
    let summary = UploadSummary::build(store.as_ref(), report).await;
    print!("{}", formatter.format_upload_summary(&summary));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UploadTask;

    fn args(path: &str) -> UploadArgs {
        UploadArgs {
            path: PathBuf::from(path),
            bucket: None,
            workers: None,
            prefix: None,
            no_extract: false,
            exclude: Vec::new(),
            yes: false,
        }
    }

    #[test]
    fn test_confirmation_answers() {
        assert!(is_confirmation("y\n"));
        assert!(is_confirmation("  Y "));
        assert!(!is_confirmation("yes\n"));
        assert!(!is_confirmation("n"));
        assert!(!is_confirmation(""));
    }

    #[test]
    fn test_scan_summary_lines() {
        let prepared = PreparedUpload {
            root: PathBuf::from("photos"),
            tasks: vec![
                UploadTask::new("photos/a.jpg", "images/a.jpg"),
                UploadTask::new("photos/b.png", "images/b.png"),
            ],
            total_bytes: 1_610_612_736,
        };
        assert_eq!(
            scan_summary(&prepared),
            "Found 2 images\nTotal size: 1.50 GB\n"
        );
    }

    #[test]
    fn test_defaults_come_from_config() {
        let settings = args("images.zip").into_settings(Config::default()).unwrap();
        assert_eq!(settings.bucket, "qdrant-nextjs-demo-product-images");
        assert_eq!(settings.prefix, "images/");
        assert_eq!(settings.workers, 20);
        assert!(settings.extract);
    }

    #[test]
    fn test_flags_override_config() {
        let settings = UploadArgs {
            bucket: Some("other".to_string()),
            workers: Some(4),
            no_extract: true,
            ..args("photos")
        }
        .into_settings(Config::default())
        .unwrap();
        assert_eq!(settings.bucket, "other");
        assert_eq!(settings.workers, 4);
        assert!(!settings.extract);
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let result = UploadArgs {
            workers: Some(0),
            ..args("photos")
        }
        .into_settings(Config::default());
        assert!(result.is_err());
    }
}
