//! Error taxonomy for the pipeline.
//!
//! Recoverable conditions (a failed fetch, an unreadable PDF, a chunk whose
//! embedding call failed) never surface through this type during a run; the
//! pipeline logs them and continues. The variants here are what callers see
//! when an operation genuinely cannot proceed.

/// Errors surfaced by pipeline and upload operations.
#[derive(Debug, thiserror::Error)]
pub enum WebvecError {
    /// A URL could not be fetched. Non-fatal at the run level: the pipeline
    /// catches this per URL, logs it, and moves on.
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Text extraction failed in a way that could not be recovered by the
    /// fallback extractor.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// An embedding call failed. Non-fatal per chunk: the affected chunk is
    /// excluded from the output batch.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// An index lifecycle call (list, create, delete, describe) failed.
    #[error("index operation failed: {0}")]
    Index(String),

    /// A batch upsert failed. Carries the number of records uploaded before
    /// the failing batch so the caller can report partial progress.
    #[error("upload aborted after {uploaded} records: {reason}")]
    Upload { uploaded: usize, reason: String },

    /// Invalid configuration or input, detected before any network call
    /// where feasible (dimension mismatch, empty batch, bad chunk sizes).
    #[error("configuration error: {0}")]
    Config(String),

    /// The cooperative cancellation signal fired.
    #[error("operation cancelled")]
    Cancelled,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WebvecError>;
