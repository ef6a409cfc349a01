//! Ingest command: URLs to a vector file.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use webvec_core::{ChunkingConfig, Embedder, PipelineConfig};
use webvec_index::VectorFile;
use webvec_ingest::{IngestionPipeline, RemoteEmbedder};

#[allow(clippy::too_many_arguments)]
pub async fn run(
    urls: &[String],
    output: &Path,
    embedder_url: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    namespace: Option<String>,
    cancel: CancellationToken,
) -> Result<()> {
    let embedder = RemoteEmbedder::connect(embedder_url)
        .await
        .context("connecting to the embedding service")?;
    println!(
        "{} {} (dimension {})",
        "Embedding model:".bold(),
        embedder.model(),
        embedder.dimension()
    );

    let config = PipelineConfig {
        chunking: ChunkingConfig::default()
            .with_chunk_size(chunk_size)
            .with_overlap(chunk_overlap),
        namespace,
        ..PipelineConfig::default()
    };
    let pipeline =
        IngestionPipeline::new(config, Arc::new(embedder))?.with_cancellation(cancel);

    let report = pipeline.run(urls).await?;
    let stats = &report.stats;
    println!(
        "{} {} of {} urls ({} failed), {} chunks, {} embedded, {} skipped",
        "Processed".green().bold(),
        stats.urls_processed,
        urls.len(),
        stats.urls_failed,
        stats.chunks_created,
        stats.chunks_embedded,
        stats.chunks_skipped
    );

    let records = report.batch.len();
    VectorFile::from_batch(report.batch)
        .save(output)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    println!(
        "{} {} records to {}",
        "Saved".green().bold(),
        records,
        output.display()
    );
    Ok(())
}
