//! Re-embedding of previously saved vector files.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use webvec_core::{Embedder, Result, WebvecError};

use crate::format::VectorFile;

/// Texts sent per `embed_many` call while refreshing a file.
const EMBED_BATCH: usize = 100;

/// Outcome of a re-embedding pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReembedReport {
    pub records: usize,
    pub old_dimension: usize,
    pub new_dimension: usize,
}

/// Replaces every record's embedding with one generated from its stored
/// `metadata.text`, leaving ids and metadata untouched.
///
/// Switching to a model with a different dimension is the point: the
/// refreshed file can be uploaded into a new index without re-fetching or
/// re-chunking any source. Unlike the ingestion pipeline, a failed
/// embedding call here is fatal; dropping records from an existing file
/// would silently shrink it.
pub async fn reembed(
    file: &mut VectorFile,
    embedder: &dyn Embedder,
    cancel: &CancellationToken,
) -> Result<ReembedReport> {
    let old_dimension = file
        .vectors
        .first()
        .map(|r| r.embedding.len())
        .ok_or_else(|| WebvecError::Config("file contains no vectors".to_string()))?;
    let new_dimension = embedder.dimension();

    for chunk in file.vectors.chunks_mut(EMBED_BATCH) {
        if cancel.is_cancelled() {
            return Err(WebvecError::Cancelled);
        }
        let texts: Vec<String> = chunk.iter().map(|r| r.metadata.text.clone()).collect();
        let embeddings = embedder.embed_many(&texts).await?;
        if embeddings.len() != chunk.len() {
            return Err(WebvecError::Embedding(format!(
                "requested {} embeddings, received {}",
                chunk.len(),
                embeddings.len()
            )));
        }
        for (record, embedding) in chunk.iter_mut().zip(embeddings) {
            record.embedding = embedding;
        }
        debug!(batch = texts.len(), "re-embedded batch");
    }

    info!(
        records = file.vectors.len(),
        old_dimension, new_dimension, "re-embedding complete"
    );
    Ok(ReembedReport {
        records: file.vectors.len(),
        old_dimension,
        new_dimension,
    })
}
