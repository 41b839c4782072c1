//! One full harvest pass built from configuration

use super::{Pipeline, PipelineSettings, RunSummary};
use crate::error::RunError;
use crate::services::{
    search_url, AlmaClient, BagDiscovery, CatalogClient, DirectorySubmissionSink,
    ReportNotificationSink, XmlEngine,
};
use crate::utils::RetryPolicy;
use chrono::Utc;
use etd_common::config::TomlConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

/// Discover bags, process each, and summarize
///
/// Fails only for run-fatal problems: resources that do not compile, client
/// setup, or discovery. Per-bag failures are inside the summary.
pub async fn run_harvest(
    config: &TomlConfig,
    api_key: String,
    cancel: CancellationToken,
) -> Result<RunSummary, RunError> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!(run_id = %run_id, "Harvest run starting");

    // Compile resources before touching the network
    let engine = Arc::new(XmlEngine::start(
        &config.resources.schema_path,
        &config.resources.stylesheet_path,
    )?);

    let retry = RetryPolicy::new(config.pipeline.max_attempts, config.pipeline.initial_backoff_ms);

    let start_url = search_url(
        &config.catalog.base_url,
        &config.catalog.project,
        &config.catalog.bag_pattern,
    )?;
    let catalog = CatalogClient::new(retry)?;
    let discovery = BagDiscovery::new(catalog, start_url, cancel.clone());
    let bags = discovery.collect().await?;

    let alma = AlmaClient::new(
        &config.alma.base_url,
        api_key,
        config.alma.requests_per_second,
        retry,
    )
    .map_err(|e| RunError::Client(e.to_string()))?;

    let settings = PipelineSettings {
        concurrency: config.pipeline.concurrency,
        fetch_timeout: Duration::from_secs(config.pipeline.fetch_timeout_secs),
    };
    let pipeline = Pipeline::new(
        Arc::new(alma),
        engine.clone(),
        engine,
        Arc::new(DirectorySubmissionSink::new(&config.output.directory)),
        Arc::new(ReportNotificationSink::new(&config.output.directory)),
        settings,
    );

    let outcomes = pipeline.run(bags, &cancel).await;
    Ok(RunSummary::from_outcomes(run_id, started_at, outcomes))
}
