//! JSON interchange format for record batches.
//!
//! The file shape is `{vectors, namespace, metadata}` with each vector
//! carrying `{id, values, metadata}`. Field names are part of the contract:
//! files written here are consumed by other tooling that upserts them
//! directly, so renames are breaking changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use webvec_core::{BatchSummary, OutputBatch, Result, VectorRecord};

/// Run-level bookkeeping stored alongside the vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub total_vectors: usize,
    pub total_chunks: usize,
    pub created_at: DateTime<Utc>,
    pub sources: Vec<String>,
}

/// On-disk representation of a finalized batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorFile {
    pub vectors: Vec<VectorRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub metadata: FileMetadata,
}

impl VectorFile {
    pub fn from_batch(batch: OutputBatch) -> Self {
        Self {
            metadata: FileMetadata {
                total_vectors: batch.summary.total_records,
                total_chunks: batch.summary.total_chunks_considered,
                created_at: batch.summary.created_at,
                sources: batch.summary.distinct_sources,
            },
            vectors: batch.records,
            namespace: batch.namespace,
        }
    }

    pub fn into_batch(self) -> OutputBatch {
        OutputBatch {
            summary: BatchSummary {
                total_records: self.metadata.total_vectors,
                total_chunks_considered: self.metadata.total_chunks,
                created_at: self.metadata.created_at,
                distinct_sources: self.metadata.sources,
            },
            records: self.vectors,
            namespace: self.namespace,
        }
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&json)?)
    }
}
