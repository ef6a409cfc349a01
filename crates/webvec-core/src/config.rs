//! Configuration structs for the pipeline and uploader.
//!
//! Everything the pipeline needs flows through these structs explicitly;
//! there is no ambient global configuration. Defaults mirror the values the
//! pipeline was tuned with: 2000-character chunks with 200 characters of
//! overlap, 100-record upload batches.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, WebvecError};

/// Controls the sentence-respecting chunker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Approximate overlap between consecutive chunks, in characters. The
    /// chunker seeds each new chunk with `chunk_overlap / 10` trailing words
    /// of the previous one, assuming roughly ten characters per word.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            chunk_overlap: 200,
        }
    }
}

impl ChunkingConfig {
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.chunk_overlap = overlap;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(WebvecError::Config(
                "chunk size must be greater than 0".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(WebvecError::Config(
                "chunk overlap must be less than chunk size".to_string(),
            ));
        }
        Ok(())
    }
}

/// Controls URL fetching.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout. Fetches are never retried.
    pub timeout: Duration,
    pub user_agent: String,
    /// Politeness delay between consecutive URLs.
    pub pacing_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("webvec/{}", env!("CARGO_PKG_VERSION")),
            pacing_delay: Duration::from_secs(1),
        }
    }
}

impl FetchConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }
}

/// Controls the batch uploader and index creation.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Records per upsert call.
    pub batch_size: usize,
    /// Delay between batches to respect service rate limits. Pacing, not a
    /// correctness mechanism.
    pub pacing_delay: Duration,
    /// Distance metric used when the uploader has to create the index.
    pub metric: String,
    pub cloud: String,
    pub region: String,
    /// Interval between readiness probes after an index create or delete.
    pub poll_interval: Duration,
    /// Probe attempts before giving up; indefinite polling is disallowed.
    pub poll_max_attempts: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            pacing_delay: Duration::from_millis(500),
            metric: "cosine".to_string(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            poll_interval: Duration::from_secs(2),
            poll_max_attempts: 30,
        }
    }
}

impl UploadConfig {
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }

    pub fn with_metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = metric.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(WebvecError::Config(
                "batch size must be greater than 0".to_string(),
            ));
        }
        if self.poll_max_attempts == 0 {
            return Err(WebvecError::Config(
                "poll attempts must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Top-level configuration for an ingestion run.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub chunking: ChunkingConfig,
    pub fetch: FetchConfig,
    /// Namespace recorded on the output batch for the eventual upload.
    pub namespace: Option<String>,
}

impl PipelineConfig {
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chunking_config_is_valid() {
        assert!(ChunkingConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let config = ChunkingConfig::default().with_chunk_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn overlap_must_stay_below_chunk_size() {
        let config = ChunkingConfig::default()
            .with_chunk_size(100)
            .with_overlap(100);
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let config = UploadConfig::default().with_batch_size(0);
        assert!(config.validate().is_err());
    }
}
