//! vehicle-health - telemetry scoring service
//!
//! # Usage
//!
//! ```bash
//! # Serve /predict and /health (default command)
//! vehicle-health serve --config vehicle_health.toml
//!
//! # Score one sample offline
//! vehicle-health score --input sample.json
//!
//! # Derive a baseline table from a reference dataset
//! vehicle-health baseline derive --csv demo.csv --subsystem engine \
//!     --features engine_temp_c,engine_rpm --out baseline/engine.json
//! ```
//!
//! # Environment Variables
//!
//! - `VEHICLE_HEALTH_CONFIG`: config file path (when `--config` is not given)
//! - `RUST_LOG`: logging level (default: info)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use vehicle_health::api::{create_app, sample_from_payload, ApiState};
use vehicle_health::baseline::{derive_from_csv, DefaultMode};
use vehicle_health::config::{LogFormat, ServiceConfig};
use vehicle_health::scoring::Orchestrator;
use vehicle_health::types::Subsystem;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "vehicle-health")]
#[command(about = "Vehicle telemetry health scoring service")]
#[command(version)]
struct CliArgs {
    /// Path to the service config (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Override the server address (default: "0.0.0.0:8000")
        #[arg(short, long)]
        addr: Option<String>,
    },
    /// Score one sample file and print the report as JSON
    Score {
        /// JSON file holding `{"data": {...}}`
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Baseline table tools
    Baseline {
        #[command(subcommand)]
        action: BaselineAction,
    },
}

#[derive(Subcommand, Debug)]
enum BaselineAction {
    /// Compute mean, median and std per feature from a CSV reference dataset
    Derive {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        subsystem: Subsystem,
        /// Comma-separated feature columns to keep
        #[arg(long, value_delimiter = ',', required = true)]
        features: Vec<String>,
        /// Use means instead of medians as missing-feature defaults
        #[arg(long)]
        mean_defaults: bool,
        #[arg(long)]
        out: PathBuf,
    },
}

// ============================================================================
// Commands
// ============================================================================

async fn run_server(config: &ServiceConfig, addr_override: Option<String>) -> Result<()> {
    let orchestrator =
        Orchestrator::from_config(config).context("Failed to load scoring resources")?;
    info!(policy = ?orchestrator.policy(), "Scoring pipelines loaded");
    for (subsystem, strategy) in orchestrator.strategies() {
        info!("  {:<8} {}", subsystem, strategy);
    }

    let state = ApiState::new(Arc::new(orchestrator), config.request.reject_unrecognized);
    let app = create_app(state, &config.server);

    let addr = addr_override.unwrap_or_else(|| config.server.addr.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("HTTP server listening on {}", addr);

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await
        .context("HTTP server error")?;

    info!("Graceful shutdown complete");
    Ok(())
}

fn run_score(config: &ServiceConfig, input: &Path) -> Result<()> {
    let orchestrator =
        Orchestrator::from_config(config).context("Failed to load scoring resources")?;

    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let payload: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", input.display()))?;
    let sample = sample_from_payload(&payload, config.request.reject_unrecognized)?;

    let report = orchestrator.score(&sample)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_baseline_derive(
    csv: &Path,
    subsystem: Subsystem,
    features: &[String],
    mode: DefaultMode,
    out: &Path,
) -> Result<()> {
    let stats = derive_from_csv(csv, subsystem, features, mode)
        .with_context(|| format!("Failed to derive baseline from {}", csv.display()))?;
    stats
        .save_to_file(out)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    info!(
        "Baseline for {} written to {} ({} features)",
        subsystem,
        out.display(),
        stats.features().len()
    );
    Ok(())
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

fn init_logging(format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // The log format comes from the config, so config loading logs through
    // a temporary text subscriber.
    let loader = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let config = tracing::subscriber::with_default(loader, || {
        ServiceConfig::load(args.config.as_deref())
    });
    let format = config.as_ref().map(|c| c.logging.format).unwrap_or_default();
    init_logging(format);
    let config = config.context("Failed to load service config")?;

    let result = match args.command.unwrap_or(Command::Serve { addr: None }) {
        Command::Serve { addr } => run_server(&config, addr).await,
        Command::Score { input } => run_score(&config, &input),
        Command::Baseline {
            action:
                BaselineAction::Derive {
                    csv,
                    subsystem,
                    features,
                    mean_defaults,
                    out,
                },
        } => {
            let mode = if mean_defaults {
                DefaultMode::Mean
            } else {
                DefaultMode::Median
            };
            run_baseline_derive(&csv, subsystem, &features, mode, &out)
        }
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
