//! Core types for the webvec ingestion and upload pipeline.
//!
//! This crate holds everything the pipeline crates share: the document and
//! record data model, the configuration structs, the error taxonomy, and the
//! [`Embedder`] trait that abstracts over embedding backends.

pub mod config;
pub mod embedder;
pub mod error;
pub mod types;

pub use config::{ChunkingConfig, FetchConfig, PipelineConfig, UploadConfig};
pub use embedder::{Embedder, FixedEmbedder};
pub use error::{Result, WebvecError};
pub use types::{
    BatchBuilder, BatchSummary, Chunk, ContentType, Document, OutputBatch, RecordMetadata,
    VectorRecord,
};
