//! Document ingestion for webvec.
//!
//! Turns a list of URLs into an [`webvec_core::OutputBatch`] of vector
//! records: fetch the URL, extract a normalized text blob (HTML, PDF, or
//! plain text), split it into overlapping sentence-respecting chunks, embed
//! each chunk, and assemble the surviving chunks into records with
//! deterministic identifiers.
//!
//! Per-URL failures are recoverable: a URL that cannot be fetched or
//! extracted is logged and skipped, and a chunk whose embedding call fails
//! is excluded from the batch. Only cancellation and invalid configuration
//! abort a run.

pub mod chunker;
pub mod embedder;
pub mod extract;
pub mod fetcher;
pub mod ids;
pub mod pipeline;

pub use chunker::SentenceChunker;
pub use embedder::RemoteEmbedder;
pub use extract::{ExtractionOutcome, ExtractorRegistry, TextExtractor};
pub use fetcher::{Fetched, Fetcher};
pub use ids::chunk_id;
pub use pipeline::{IngestionPipeline, IngestionReport, PipelineStats};
