//! Vector index integration for webvec.
//!
//! Covers what happens after ingestion: persisting an
//! [`webvec_core::OutputBatch`] to the JSON interchange format, talking to
//! the external vector-database service ([`VectorIndex`] and its HTTP
//! implementation), moving a batch into an index with bounded readiness
//! polling and partial-failure reporting ([`BatchUploader`]), and
//! refreshing a saved file with a different embedding model ([`reembed`]).

pub mod client;
pub mod format;
pub mod reembed;
pub mod retry;
pub mod uploader;

pub use client::{HttpVectorIndex, IndexSpec, IndexStats, VectorIndex};
pub use format::{FileMetadata, VectorFile};
pub use reembed::{reembed, ReembedReport};
pub use retry::PollPolicy;
pub use uploader::{BatchUploader, UploadReport};
