//! Data model for the fetch → extract → chunk → embed → package pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Result, WebvecError};

/// Classification of fetched content, decided from the URL and the declared
/// content type of the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Html,
    Pdf,
    Text,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Html => "html",
            ContentType::Pdf => "pdf",
            ContentType::Text => "text",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fetched document after extraction: one normalized text blob plus its
/// provenance. Immutable; consumed once by the chunker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub source_url: String,
    pub content_type: ContentType,
    pub raw_text: String,
}

impl Document {
    pub fn new(
        source_url: impl Into<String>,
        content_type: ContentType,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            content_type,
            raw_text: raw_text.into(),
        }
    }

    /// True when extraction produced no usable text; such documents yield
    /// zero chunks and drop out of the pipeline.
    pub fn is_empty(&self) -> bool {
        self.raw_text.trim().is_empty()
    }
}

/// A bounded span of a document's text sized for embedding.
///
/// `index` values within a document are contiguous from 0. `start_offset`
/// and `end_offset` are character positions into the normalized text and are
/// approximate once overlap text is re-seeded into a new chunk; they track
/// the growing buffer, not exact back-references into the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub index: usize,
    pub source_url: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// Provenance and content metadata attached to every vector record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub text: String,
    pub source: String,
    pub url: String,
    pub chunk_index: usize,
    pub start_offset: usize,
    pub end_offset: usize,
    pub content_type: ContentType,
    pub generated_at: DateTime<Utc>,
}

/// One chunk packaged with its identifier and embedding, ready for upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    #[serde(rename = "values")]
    pub embedding: Vec<f32>,
    pub metadata: RecordMetadata,
}

impl VectorRecord {
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }
}

/// Run-level accounting captured when a batch is finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_records: usize,
    pub total_chunks_considered: usize,
    pub created_at: DateTime<Utc>,
    pub distinct_sources: Vec<String>,
}

/// The finalized output of an ingestion run: every record that survived
/// embedding, in submission order. Never mutated after finalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputBatch {
    pub records: Vec<VectorRecord>,
    pub namespace: Option<String>,
    pub summary: BatchSummary,
}

impl OutputBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The shared embedding dimension, or `None` for an empty batch.
    pub fn dimension(&self) -> Option<usize> {
        self.records.first().map(VectorRecord::dimension)
    }

    /// Validates that every record carries a non-empty embedding of the same
    /// length and returns that length. A mismatch is a configuration error,
    /// not something to coerce.
    pub fn validate_dimension(&self) -> Result<usize> {
        let first = self
            .dimension()
            .ok_or_else(|| WebvecError::Config("batch contains no records".to_string()))?;
        if first == 0 {
            return Err(WebvecError::Config(
                "first record has an empty embedding".to_string(),
            ));
        }
        for record in &self.records {
            if record.dimension() != first {
                return Err(WebvecError::Config(format!(
                    "embedding dimension mismatch: record {} has {} values, expected {}",
                    record.id,
                    record.dimension(),
                    first
                )));
            }
        }
        Ok(first)
    }
}

/// Incrementally accumulates records across documents, then finalizes into
/// an immutable [`OutputBatch`].
#[derive(Debug, Default)]
pub struct BatchBuilder {
    records: Vec<VectorRecord>,
    chunks_considered: usize,
    sources: BTreeSet<String>,
    namespace: Option<String>,
}

impl BatchBuilder {
    pub fn new(namespace: Option<String>) -> Self {
        Self {
            namespace,
            ..Default::default()
        }
    }

    /// Counts a chunk that entered the embedding stage, whether or not it
    /// produces a record.
    pub fn note_chunk(&mut self) {
        self.chunks_considered += 1;
    }

    pub fn push(&mut self, record: VectorRecord) {
        self.sources.insert(record.metadata.source.clone());
        self.records.push(record);
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Consumes the builder; the resulting batch is never mutated again.
    pub fn finalize(self) -> OutputBatch {
        OutputBatch {
            summary: BatchSummary {
                total_records: self.records.len(),
                total_chunks_considered: self.chunks_considered,
                created_at: Utc::now(),
                distinct_sources: self.sources.into_iter().collect(),
            },
            records: self.records,
            namespace: self.namespace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(id: &str, dim: usize) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            embedding: vec![0.5; dim],
            metadata: RecordMetadata {
                text: "text".to_string(),
                source: "https://example.com/a".to_string(),
                url: "https://example.com/a".to_string(),
                chunk_index: 0,
                start_offset: 0,
                end_offset: 4,
                content_type: ContentType::Text,
                generated_at: Utc::now(),
            },
        }
    }

    #[test]
    fn builder_tracks_distinct_sources_and_chunk_counts() {
        let mut builder = BatchBuilder::new(Some("docs".to_string()));
        builder.note_chunk();
        builder.note_chunk();
        builder.note_chunk();
        let mut a = record("a_chunk_0", 4);
        a.metadata.source = "https://example.com/a".to_string();
        let mut b = record("b_chunk_0", 4);
        b.metadata.source = "https://example.com/b".to_string();
        builder.push(a);
        builder.push(b);

        let batch = builder.finalize();
        assert_eq!(batch.summary.total_records, 2);
        assert_eq!(batch.summary.total_chunks_considered, 3);
        assert_eq!(batch.summary.distinct_sources.len(), 2);
        assert_eq!(batch.namespace.as_deref(), Some("docs"));
    }

    #[test]
    fn dimension_validation_accepts_uniform_batch() {
        let mut builder = BatchBuilder::new(None);
        builder.push(record("a_chunk_0", 384));
        builder.push(record("a_chunk_1", 384));
        let batch = builder.finalize();
        assert_eq!(batch.validate_dimension().unwrap(), 384);
    }

    #[test]
    fn dimension_validation_rejects_mismatch() {
        let mut builder = BatchBuilder::new(None);
        builder.push(record("a_chunk_0", 384));
        builder.push(record("a_chunk_1", 768));
        let batch = builder.finalize();
        assert!(matches!(
            batch.validate_dimension(),
            Err(WebvecError::Config(_))
        ));
    }

    #[test]
    fn dimension_validation_rejects_empty_batch() {
        let batch = BatchBuilder::new(None).finalize();
        assert!(batch.validate_dimension().is_err());
    }

    #[test]
    fn content_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ContentType::Pdf).unwrap(),
            "\"pdf\""
        );
    }
}
