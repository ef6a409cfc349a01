//! webvec CLI
//!
//! Fetches web content, chunks and embeds it, and loads the resulting
//! vectors into a vector index.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "webvec",
    version,
    about = "Turn web pages into vector index records",
    long_about = "Fetches URLs, extracts their text (HTML, PDF, or plain), splits it into\n\
                  overlapping sentence-respecting chunks, embeds each chunk, and uploads\n\
                  the records to a vector index in fixed-size batches."
)]
struct Cli {
    /// Vector index service URL
    #[arg(
        long,
        env = "WEBVEC_API_URL",
        default_value = "http://localhost:6333",
        global = true
    )]
    api_url: String,

    /// Vector index API key
    #[arg(short = 'k', long, env = "WEBVEC_API_KEY", global = true)]
    api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, chunk, and embed URLs into a vector file
    Ingest {
        /// URLs to process
        #[arg(required = true)]
        urls: Vec<String>,

        /// Output path for the vector file
        #[arg(short, long, default_value = "vectors.json")]
        output: PathBuf,

        /// Embedding service URL
        #[arg(
            long,
            env = "WEBVEC_EMBEDDER_URL",
            default_value = "http://localhost:8000"
        )]
        embedder_url: String,

        /// Maximum chunk size in characters
        #[arg(long, default_value_t = 2000)]
        chunk_size: usize,

        /// Approximate overlap between consecutive chunks in characters
        #[arg(long, default_value_t = 200)]
        chunk_overlap: usize,

        /// Namespace recorded on the output batch
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Upload a vector file into an index
    Upload {
        /// Vector file produced by `ingest`
        input: PathBuf,

        /// Target index name
        #[arg(short, long)]
        index: String,

        /// Override the namespace stored in the file
        #[arg(short, long)]
        namespace: Option<String>,

        /// Records per upsert call
        #[arg(long, default_value_t = 100)]
        batch_size: usize,

        /// Delete and recreate the index before uploading
        #[arg(long)]
        recreate: bool,
    },

    /// Re-embed an existing vector file with a different model
    Reembed {
        /// Vector file produced by `ingest`
        input: PathBuf,

        /// Where to write the refreshed file (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Embedding service URL
        #[arg(
            long,
            env = "WEBVEC_EMBEDDER_URL",
            default_value = "http://localhost:8000"
        )]
        embedder_url: String,
    },

    /// Inspect and manage indexes
    #[command(subcommand)]
    Index(IndexCommands),
}

#[derive(Subcommand)]
enum IndexCommands {
    /// List index names
    List,
    /// Show index stats
    Describe {
        /// Index name
        name: String,
    },
    /// Create an index
    Create {
        /// Index name
        name: String,
        /// Embedding dimension
        #[arg(short, long)]
        dimension: usize,
        /// Distance metric
        #[arg(short, long, default_value = "cosine")]
        metric: String,
    },
    /// Delete an index
    Delete {
        /// Index name
        name: String,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,webvec={level},webvec_core={level},webvec_ingest={level},webvec_index={level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Cancelled on the first Ctrl-C; the second one kills the process.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let handle = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("interrupt received, stopping after the current step");
            handle.cancel();
        }
    });
    token
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_logging(cli.verbose);

    let cancel = cancel_on_ctrl_c();
    let result = match cli.command {
        Commands::Ingest {
            urls,
            output,
            embedder_url,
            chunk_size,
            chunk_overlap,
            namespace,
        } => {
            commands::ingest::run(
                &urls,
                &output,
                &embedder_url,
                chunk_size,
                chunk_overlap,
                namespace,
                cancel,
            )
            .await
        }
        Commands::Upload {
            input,
            index,
            namespace,
            batch_size,
            recreate,
        } => {
            commands::upload::run(
                &cli.api_url,
                cli.api_key.as_deref(),
                &input,
                &index,
                namespace,
                batch_size,
                recreate,
                cancel,
            )
            .await
        }
        Commands::Reembed {
            input,
            output,
            embedder_url,
        } => commands::reembed::run(&input, output.as_deref(), &embedder_url, cancel).await,
        Commands::Index(cmd) => commands::index::run(&cli.api_url, cli.api_key.as_deref(), cmd).await,
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "Error".red().bold());
            if cli.verbose {
                if let Some(source) = e.source() {
                    eprintln!("{}: {source}", "Caused by".yellow());
                }
            }
            ExitCode::FAILURE
        }
    }
}
