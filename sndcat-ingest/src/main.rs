//! sndcat-ingest - Sound Catalog Ingest
//!
//! Validates candidate asset ids, resolves their names against the asset
//! details API, tags them, and merges them into the sound catalog file.
//!
//! Exit codes: `0` success, `1` pipeline or configuration error, `2` missing
//! input file, `3` catalog write failure.

use anyhow::{Context, Result};
use clap::Parser;
use sndcat_common::config::{load_toml_config, resolve_config_path};
use sndcat_ingest::services::CommitOutcome;
use sndcat_ingest::{run_ingest, CliOverrides, IngestError, IngestSettings};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Command-line arguments for sndcat-ingest
#[derive(Parser, Debug)]
#[command(name = "sndcat-ingest")]
#[command(about = "Merge new sound asset ids into the sound catalog")]
#[command(version)]
struct Args {
    /// Catalog file to update
    #[arg(long, env = "SNDCAT_CATALOG")]
    catalog: Option<PathBuf>,

    /// Candidate id file
    #[arg(long, env = "SNDCAT_CANDIDATES")]
    candidates: Option<PathBuf>,

    /// TOML config file (falls back to SNDCAT_CONFIG, then the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the merged catalog instead of writing it
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Retries per id after the first attempt
    #[arg(long, env = "SNDCAT_RETRIES")]
    retries: Option<u32>,

    /// Base backoff delay in milliseconds
    #[arg(long, env = "SNDCAT_BASE_DELAY_MS")]
    base_delay_ms: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            let code = e
                .downcast_ref::<IngestError>()
                .map(IngestError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config_path = resolve_config_path(args.config.as_deref());
    let toml_config = match load_toml_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_tracing("info");
            return Err(e).context("Failed to load configuration");
        }
    };

    init_tracing(&toml_config.logging.level);

    info!("Starting sndcat-ingest (Sound Catalog Ingest)");
    info!(
        "sndcat-ingest v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) if path.exists() => info!("Config: {}", path.display()),
        _ => info!("No config file found, using defaults"),
    }

    let cli = CliOverrides {
        catalog_path: args.catalog,
        candidates_path: args.candidates,
        retries: args.retries,
        base_delay_ms: args.base_delay_ms,
    };
    let settings = IngestSettings::resolve(&cli, &toml_config)?;
    info!("Catalog: {}", settings.catalog_path.display());
    info!("Candidates: {}", settings.candidates_path.display());

    let outcome = run_ingest(&settings, args.dry_run).await?;

    if let CommitOutcome::Previewed { rendered } = &outcome.commit {
        print!("{}", rendered);
    }

    Ok(())
}

/// Install the global subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
