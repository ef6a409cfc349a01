//! CLI command implementations

pub mod index;
pub mod ingest;
pub mod reembed;
pub mod upload;
