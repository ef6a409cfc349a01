//! Index management commands.

use anyhow::{bail, Result};
use colored::Colorize;
use std::sync::Arc;

use crate::IndexCommands;
use webvec_core::UploadConfig;
use webvec_index::{HttpVectorIndex, IndexSpec, PollPolicy, VectorIndex};

pub async fn run(api_url: &str, api_key: Option<&str>, cmd: IndexCommands) -> Result<()> {
    let Some(api_key) = api_key else {
        bail!("an api key is required; pass --api-key or set WEBVEC_API_KEY");
    };
    let client: Arc<dyn VectorIndex> = Arc::new(
        HttpVectorIndex::builder(api_url).api_key(api_key).build()?,
    );

    match cmd {
        IndexCommands::List => {
            let names = client.list_indexes().await?;
            if names.is_empty() {
                println!("no indexes");
            }
            for name in names {
                println!("{name}");
            }
        }
        IndexCommands::Describe { name } => {
            let stats = client.describe_index_stats(&name).await?;
            println!("{}: {}", "Index".bold(), name);
            println!("{}: {}", "Dimension".bold(), stats.dimension);
            println!("{}: {}", "Vectors".bold(), stats.total_count);
            if !stats.namespaces.is_empty() {
                println!("{}", "Namespaces:".bold());
                for (ns, count) in &stats.namespaces {
                    println!("  {ns}: {count}");
                }
            }
        }
        IndexCommands::Create {
            name,
            dimension,
            metric,
        } => {
            let defaults = UploadConfig::default();
            client
                .create_index(&IndexSpec {
                    name: name.clone(),
                    dimension,
                    metric,
                    cloud: defaults.cloud.clone(),
                    region: defaults.region.clone(),
                })
                .await?;
            let probe_client = client.clone();
            let probe_name = name.clone();
            PollPolicy::from_config(&defaults)
                .wait_until("index readiness", || {
                    let client = probe_client.clone();
                    let name = probe_name.clone();
                    async move { Ok(client.list_indexes().await?.iter().any(|n| *n == name)) }
                })
                .await?;
            println!("{} {name}", "Created".green().bold());
        }
        IndexCommands::Delete { name } => {
            client.delete_index(&name).await?;
            println!("{} {name}", "Deleted".green().bold());
        }
    }
    Ok(())
}
