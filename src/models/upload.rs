//! Image upload tasks and their aggregated results.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::UploadError;

/// A file to upload and the object key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct UploadTask {
    pub local_path: PathBuf,
    pub key: String,
}

impl UploadTask {
    pub fn new(local_path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            local_path: local_path.into(),
            key: key.into(),
        }
    }
}

/// Result of a single upload attempt.
#[derive(Debug)]
pub struct UploadOutcome {
    pub task: UploadTask,
    pub result: Result<(), UploadError>,
}

/// Tally of a finished upload run.
#[derive(Debug, Default, Serialize)]
pub struct UploadReport {
    pub total: usize,
    pub successful: Vec<UploadTask>,
    pub failed: Vec<(UploadTask, String)>,
}

impl UploadReport {
    pub fn with_total(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: UploadOutcome) {
        match outcome.result {
            Ok(()) => self.successful.push(outcome.task),
            Err(e) => self.failed.push((outcome.task, e.to_string())),
        }
    }

    pub fn completed(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.completed() == self.total
    }
}
