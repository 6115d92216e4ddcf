//! Folio CLI - gallery image ingestion from the command line.
//!
//! Runs the same pipeline the gallery upload endpoint uses: detect the
//! container, decode and orient, extract capture metadata, and derive the
//! thumb/medium/full WebP renditions.
//!
//! # Usage
//!
//! ```bash
//! # Ingest a photo into the "travel" category
//! folio process IMG_4512.HEIC --category travel
//!
//! # Inspect the result without writing renditions
//! folio process beach.jpg --category travel --no-write
//!
//! # View configuration
//! folio config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Folio - gallery image ingestion pipeline.
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest an image: renditions, metadata and storage paths
    Process(cli::process::ProcessArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match folio_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `folio config path`."
            );
            folio_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Folio v{}", folio_core::VERSION);

    match cli.command {
        Commands::Process(args) => cli::process::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
