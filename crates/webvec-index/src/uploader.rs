//! Moves a finalized batch into the vector index.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use webvec_core::{OutputBatch, Result, UploadConfig, WebvecError};

use crate::client::{IndexSpec, IndexStats, VectorIndex};
use crate::retry::PollPolicy;

/// Outcome of a completed upload.
#[derive(Debug, Clone)]
pub struct UploadReport {
    pub uploaded: usize,
    pub batches: usize,
    /// True when the uploader had to create the target index.
    pub created_index: bool,
    /// Post-upload stats, when the service could report them.
    pub stats: Option<IndexStats>,
}

/// Uploads records in fixed-size batches, creating the target index if it
/// is absent.
///
/// The batch dimension is validated before any network call, and index
/// creation is confirmed with bounded polling before the first upsert.
/// Batches go out in record order; a failed upsert stops the run
/// immediately and the error reports how many records made it in, so a
/// retry can resume knowing what the index already holds. Cancellation is
/// not a failure and surfaces as [`WebvecError::Cancelled`]; upserts are
/// idempotent by id, so a cancelled upload can simply be rerun.
pub struct BatchUploader {
    index: Arc<dyn VectorIndex>,
    config: UploadConfig,
    poll: PollPolicy,
    cancel: CancellationToken,
}

impl std::fmt::Debug for BatchUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchUploader")
            .field("config", &self.config)
            .field("poll", &self.poll)
            .finish_non_exhaustive()
    }
}

impl BatchUploader {
    pub fn new(index: Arc<dyn VectorIndex>, config: UploadConfig) -> Result<Self> {
        config.validate()?;
        let poll = PollPolicy::from_config(&config);
        Ok(Self {
            index,
            config,
            poll,
            cancel: CancellationToken::new(),
        })
    }

    /// Replaces the cancellation token; cancelling it stops the upload at
    /// the next batch boundary.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn upload(&self, index_name: &str, batch: &OutputBatch) -> Result<UploadReport> {
        let dimension = batch.validate_dimension()?;
        let created_index = self.ensure_index(index_name, dimension).await?;

        let namespace = batch.namespace.as_deref();
        let mut uploaded = 0usize;
        let mut batches = 0usize;

        for (i, records) in batch.records.chunks(self.config.batch_size).enumerate() {
            if self.cancel.is_cancelled() {
                return Err(WebvecError::Cancelled);
            }
            if i > 0 && !self.config.pacing_delay.is_zero() {
                tokio::time::sleep(self.config.pacing_delay).await;
            }

            let accepted = self
                .index
                .upsert(index_name, namespace, records)
                .await
                .map_err(|e| WebvecError::Upload {
                    uploaded,
                    reason: e.to_string(),
                })?;
            if accepted != records.len() {
                warn!(
                    batch = i + 1,
                    sent = records.len(),
                    accepted,
                    "service accepted fewer records than sent"
                );
            }
            uploaded += records.len();
            batches += 1;
            debug!(batch = batches, uploaded, total = batch.len(), "batch upserted");
        }

        let stats = match self.index.describe_index_stats(index_name).await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!(index = index_name, error = %e, "could not fetch post-upload stats");
                None
            }
        };

        info!(
            index = index_name,
            uploaded, batches, created_index, "upload complete"
        );
        Ok(UploadReport {
            uploaded,
            batches,
            created_index,
            stats,
        })
    }

    /// Deletes the index if present, waits for the deletion to take effect,
    /// then uploads, which recreates the index with the batch's dimension.
    pub async fn recreate(&self, index_name: &str, batch: &OutputBatch) -> Result<UploadReport> {
        let existing = self.index.list_indexes().await?;
        if existing.iter().any(|n| n == index_name) {
            info!(index = index_name, "deleting existing index");
            self.index.delete_index(index_name).await?;
            let index = self.index.clone();
            let name = index_name.to_string();
            self.poll
                .wait_until("index deletion", || {
                    let index = index.clone();
                    let name = name.clone();
                    async move { Ok(!index.list_indexes().await?.iter().any(|n| *n == name)) }
                })
                .await?;
        }
        self.upload(index_name, batch).await
    }

    /// Makes sure the target index exists with the batch's dimension.
    /// Returns true when the index had to be created.
    async fn ensure_index(&self, index_name: &str, dimension: usize) -> Result<bool> {
        let existing = self.index.list_indexes().await?;
        if existing.iter().any(|n| n == index_name) {
            match self.index.describe_index_stats(index_name).await {
                Ok(stats) if stats.dimension != dimension => {
                    return Err(WebvecError::Config(format!(
                        "index {index_name} has dimension {} but the batch has {dimension}",
                        stats.dimension
                    )));
                }
                Ok(_) => {}
                Err(e) => warn!(index = index_name, error = %e, "could not verify index dimension"),
            }
            return Ok(false);
        }

        info!(index = index_name, dimension, "index absent, creating");
        self.index
            .create_index(&IndexSpec {
                name: index_name.to_string(),
                dimension,
                metric: self.config.metric.clone(),
                cloud: self.config.cloud.clone(),
                region: self.config.region.clone(),
            })
            .await?;

        let index = self.index.clone();
        let name = index_name.to_string();
        self.poll
            .wait_until("index readiness", || {
                let index = index.clone();
                let name = name.clone();
                async move { Ok(index.list_indexes().await?.iter().any(|n| *n == name)) }
            })
            .await?;
        Ok(true)
    }
}
