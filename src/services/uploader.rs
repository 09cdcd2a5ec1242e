//! Concurrent upload of image files to an object store.

use std::collections::BTreeMap;
use std::sync::Arc;

use indicatif::ProgressBar;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, warn};

use super::object_store::ObjectStore;
use crate::error::UploadError;
use crate::models::{UploadOutcome, UploadReport, UploadTask};
use crate::utils::file::content_type;

/// Read one file and store it under its key.
pub async fn upload_one(store: &dyn ObjectStore, task: &UploadTask) -> Result<(), UploadError> {
    let content = tokio::fs::read(&task.local_path)
        .await
        .map_err(|e| UploadError::Transfer(e.to_string()))?;

    store
        .put_object(&task.key, content, content_type(&task.local_path))
        .await
        .map_err(|e| UploadError::Transfer(e.to_string()))
}

/// Upload every task with at most `workers` transfers in flight.
///
/// A failing file is recorded in the report and never stops the others. The
/// returned report always accounts for every task.
pub async fn upload_all(
    store: Arc<dyn ObjectStore>,
    tasks: Vec<UploadTask>,
    workers: usize,
    progress: &ProgressBar,
) -> UploadReport {
    let mut report = UploadReport::with_total(tasks.len());
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let (tx, mut rx) = mpsc::unbounded_channel::<(usize, UploadOutcome)>();

    let mut pending: BTreeMap<usize, UploadTask> = BTreeMap::new();
    for (index, task) in tasks.into_iter().enumerate() {
        pending.insert(index, task.clone());

        let store = Arc::clone(&store);
        let semaphore = Arc::clone(&semaphore);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => upload_one(store.as_ref(), &task).await,
                Err(e) => Err(UploadError::Transfer(e.to_string())),
            };
            let _ = tx.send((index, UploadOutcome { task, result }));
        });
    }
    drop(tx);

    while let Some((index, outcome)) = rx.recv().await {
        pending.remove(&index);
        if let Err(ref e) = outcome.result {
            debug!(key = %outcome.task.key, error = %e, "upload failed");
        }
        report.record(outcome);
        progress.inc(1);
    }

    // Tasks that panicked never reported back.
    for (_, task) in pending {
        warn!(key = %task.key, "upload task ended without a result");
        report.record(UploadOutcome {
            task,
            result: Err(UploadError::Transfer(
                "upload task ended without a result".to_string(),
            )),
        });
        progress.inc(1);
    }

    progress.finish_and_clear();
    report
}
