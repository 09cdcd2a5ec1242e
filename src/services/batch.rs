//! Batching of catalog records into points and the sequential upsert loop.

use std::time::Instant;

use indicatif::ProgressBar;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::{Point, Record};
use crate::services::{Embedder, VectorStore};

/// Lazy sequence of point batches over a slice of records.
///
/// Batches follow row order; only the last one may be shorter than
/// `batch_size`. Creating a new iterator over the same records replays the
/// same batches.
pub struct PointBatches<'a> {
    records: &'a [Record],
    batch_size: usize,
    offset: usize,
}

impl<'a> PointBatches<'a> {
    pub fn new(records: &'a [Record], batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be at least 1");
        Self {
            records,
            batch_size,
            offset: 0,
        }
    }

    /// Number of batches the full sequence yields.
    pub fn batch_count(&self) -> usize {
        self.records.len().div_ceil(self.batch_size)
    }
}

impl Iterator for PointBatches<'_> {
    type Item = Vec<Point>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.records.len() {
            return None;
        }
        let end = (self.offset + self.batch_size).min(self.records.len());
        let batch = self.records[self.offset..end]
            .iter()
            .cloned()
            .map(Point::from)
            .collect();
        self.offset = end;
        Some(batch)
    }
}

/// Counters of a finished load.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadStats {
    pub rows: u64,
    pub batches: u64,
    pub embedded: u64,
    pub missing_dense: u64,
    pub collection_created: bool,
    pub duration_ms: u64,
}

/// Fill empty dense vectors of `points` through `embedder`.
///
/// Points with no usable text keep their empty dense vector. Returns the
/// number of points that received a vector.
pub async fn fill_missing_dense(
    embedder: &dyn Embedder,
    points: &mut [Point],
    text_columns: &[String],
) -> Result<u64, AppError> {
    let (targets, texts): (Vec<usize>, Vec<String>) = points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.dense.is_empty())
        .map(|(i, p)| (i, p.embedding_text(text_columns)))
        .filter(|(_, text)| !text.is_empty())
        .unzip();

    if texts.is_empty() {
        return Ok(0);
    }

    let embeddings = embedder.embed_batch(texts).await?;
    let filled = targets.len() as u64;
    for (index, embedding) in targets.into_iter().zip(embeddings) {
        points[index].dense = embedding;
    }
    Ok(filled)
}

/// Upsert every batch in order, one store call per batch.
///
/// The first failing call aborts the run; batches already written stay in
/// the collection.
pub async fn upload_batches(
    store: &dyn VectorStore,
    embedder: Option<&dyn Embedder>,
    batches: PointBatches<'_>,
    text_columns: &[String],
    progress: &ProgressBar,
) -> Result<LoadStats, AppError> {
    let start_time = Instant::now();
    let mut stats = LoadStats::default();

    for (index, mut batch) in batches.enumerate() {
        if let Some(embedder) = embedder {
            stats.embedded += fill_missing_dense(embedder, &mut batch, text_columns).await?;
        }
        stats.missing_dense += batch.iter().filter(|p| p.dense.is_empty()).count() as u64;

        let rows = batch.len() as u64;
        debug!(batch = index, rows, "upserting batch");
        store.upsert_points(batch).await?;

        stats.rows += rows;
        stats.batches += 1;
        progress.inc(rows);
    }

    if stats.missing_dense > 0 {
        warn!(
            count = stats.missing_dense,
            "rows stored without a dense vector"
        );
    }

    stats.duration_ms = start_time.elapsed().as_millis() as u64;
    Ok(stats)
}
