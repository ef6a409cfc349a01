//! Reembed command: refresh a saved vector file with a different model.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use webvec_core::Embedder;
use webvec_index::{reembed, VectorFile};
use webvec_ingest::RemoteEmbedder;

pub async fn run(
    input: &Path,
    output: Option<&Path>,
    embedder_url: &str,
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

    let mut file = VectorFile::load(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    let report = reembed(&mut file, &embedder, &cancel).await?;

    let target = output.unwrap_or(input);
    file.save(target)
        .await
        .with_context(|| format!("writing {}", target.display()))?;
    println!(
        "{} {} records from dimension {} to {} in {}",
        "Re-embedded".green().bold(),
        report.records,
        report.old_dimension,
        report.new_dimension,
        target.display()
    );
    Ok(())
}
