//! Upload command: a vector file into the index.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use webvec_core::UploadConfig;
use webvec_index::{BatchUploader, HttpVectorIndex, VectorFile};

#[allow(clippy::too_many_arguments)]
pub async fn run(
    api_url: &str,
    api_key: Option<&str>,
    input: &Path,
    index: &str,
    namespace: Option<String>,
    batch_size: usize,
    recreate: bool,
    cancel: CancellationToken,
) -> Result<()> {
    let Some(api_key) = api_key else {
        bail!("an api key is required; pass --api-key or set WEBVEC_API_KEY");
    };

    let file = VectorFile::load(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    let mut batch = file.into_batch();
    if batch.is_empty() {
        bail!("{} contains no vectors", input.display());
    }
    if let Some(ns) = namespace {
        batch.namespace = Some(ns);
    }
    println!(
        "{} {} records (dimension {})",
        "Loaded".bold(),
        batch.len(),
        batch.validate_dimension()?
    );

    let client = HttpVectorIndex::builder(api_url).api_key(api_key).build()?;
    let uploader = BatchUploader::new(
        Arc::new(client),
        UploadConfig::default().with_batch_size(batch_size),
    )?
    .with_cancellation(cancel);

    let report = if recreate {
        uploader.recreate(index, &batch).await?
    } else {
        uploader.upload(index, &batch).await?
    };

    println!(
        "{} {} records in {} batches to {}{}",
        "Uploaded".green().bold(),
        report.uploaded,
        report.batches,
        index,
        if report.created_index {
            " (index created)"
        } else {
            ""
        }
    );
    if let Some(stats) = report.stats {
        println!(
            "{} {} vectors, dimension {}",
            "Index now holds".bold(),
            stats.total_count,
            stats.dimension
        );
        for (name, count) in &stats.namespaces {
            println!("  {name}: {count}");
        }
    }
    Ok(())
}
