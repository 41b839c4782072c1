//! etd-harvest - thesis metadata harvester
//!
//! Single run entry point: discover catalog bags, validate their bib
//! records, and write Dublin Core / missing-field reports to the output
//! directory.

use anyhow::{Context, Result};
use clap::Parser;
use etd_common::config::{load_config, resolve_api_key, ConfigOverrides};
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Command-line arguments for etd-harvest
#[derive(Parser, Debug)]
#[command(name = "etd-harvest")]
#[command(about = "Harvest thesis records and convert validated MARC21 to Dublin Core")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "ETD_CONFIG")]
    config: Option<PathBuf>,

    /// Catalog base URL
    #[arg(long, env = "ETD_CATALOG_URL")]
    catalog_url: Option<String>,

    /// Bibliographic service base URL
    #[arg(long, env = "ETD_ALMA_URL")]
    alma_url: Option<String>,

    /// MARC21 slim XML Schema
    #[arg(long, env = "ETD_SCHEMA_PATH")]
    schema: Option<PathBuf>,

    /// MARC21 to Dublin Core XSLT stylesheet
    #[arg(long, env = "ETD_STYLESHEET_PATH")]
    stylesheet: Option<PathBuf>,

    /// Output directory for Dublin Core and missing-field reports
    #[arg(short, long, env = "ETD_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Write the run summary as JSON here
    #[arg(long, env = "ETD_SUMMARY_PATH")]
    summary: Option<PathBuf>,

    /// Bags processed concurrently
    #[arg(long, env = "ETD_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Cancel the run after this many seconds
    #[arg(long, env = "ETD_RUN_TIMEOUT_SECS")]
    run_timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Installed first so config loading is logged; level refined below
    let log_level = etd_common::logging::init_logging("info")?;

    let mut config = load_config(args.config.as_deref()).context("Failed to load config")?;
    config.apply_overrides(ConfigOverrides {
        catalog_url: args.catalog_url,
        alma_url: args.alma_url,
        schema_path: args.schema,
        stylesheet_path: args.stylesheet,
        output_dir: args.output_dir,
        summary_path: args.summary,
        concurrency: args.concurrency,
        run_timeout_secs: args.run_timeout,
    });
    config.validate().context("Invalid configuration")?;

    log_level
        .set_level(&config.logging.level)
        .context("Invalid logging level")?;
    info!("Starting etd-harvest {}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {}", config.catalog.base_url);
    info!("Output: {}", config.output.directory.display());

    let api_key = resolve_api_key(&config)?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(
        cancel.clone(),
        config.pipeline.run_timeout_secs.map(Duration::from_secs),
    ));

    let summary = etd_harvest::run_harvest(&config, api_key, cancel)
        .await
        .context("Harvest run failed")?;

    summary.log();
    if let Some(path) = &config.output.summary_path {
        summary
            .write_json(path)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        info!("Summary written to {}", path.display());
    }

    Ok(())
}

/// Cancel the run on Ctrl+C, SIGTERM, or run timeout
async fn cancel_on_signal(cancel: CancellationToken, run_timeout: Option<Duration>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let timeout = async {
        match run_timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, draining in-flight bags"),
        _ = terminate => info!("Received terminate signal, draining in-flight bags"),
        _ = timeout => warn!("Run timeout reached, draining in-flight bags"),
        _ = cancel.cancelled() => return,
    }

    cancel.cancel();
}
