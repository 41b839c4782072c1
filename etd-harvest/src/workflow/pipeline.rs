//! Per-bag pipeline orchestrator
//!
//! # Stages
//! `Discovered → Resolved → Fetched → Checked → {Ready | MissingFields | Suppressed | Errored}`
//!
//! - **Resolve**: MMS ID from the bag name
//! - **Fetch**: bib record from the bibliographic service (network, bounded by timeout)
//! - **Check**: field completeness and suppression, evaluated in parallel
//! - **Convert**: extract MARC → schema validation → Dublin Core transform
//!
//! # Error Handling
//! Per-bag failures become `Outcome::Errored` and never stop other bags.
//! Bags run concurrently up to the configured bound; results are re-sorted
//! into discovery order before they are returned.

use crate::error::{BibFetchError, ProcessError};
use crate::models::{Bag, BagOutcome, BibRecord, MissingFieldsReport, Outcome};
use crate::services::field_checker::{missing_fields, unavailable_report};
use crate::services::{
    extract_marc, is_suppressed, resolve_identifier, BibRecordSource, DublinCoreTransformer,
    MarcSchemaValidator, NotificationSink, SubmissionSink,
};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Scheduling limits for one run
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    /// Maximum bags in flight
    pub concurrency: usize,
    /// Upper bound for one bag's fetch, retries included
    pub fetch_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            fetch_timeout: Duration::from_secs(60),
        }
    }
}

/// Pipeline orchestrator
pub struct Pipeline {
    bib_source: Arc<dyn BibRecordSource>,
    validator: Arc<dyn MarcSchemaValidator>,
    transformer: Arc<dyn DublinCoreTransformer>,
    submission: Arc<dyn SubmissionSink>,
    notification: Arc<dyn NotificationSink>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        bib_source: Arc<dyn BibRecordSource>,
        validator: Arc<dyn MarcSchemaValidator>,
        transformer: Arc<dyn DublinCoreTransformer>,
        submission: Arc<dyn SubmissionSink>,
        notification: Arc<dyn NotificationSink>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            bib_source,
            validator,
            transformer,
            submission,
            notification,
            settings,
        }
    }

    /// Process every bag and return one outcome per bag, in discovery order
    ///
    /// Once `cancel` fires no new fetch is started; bags already fetching run
    /// to a terminal state and the rest are reported as cancelled.
    pub async fn run(&self, bags: Vec<Bag>, cancel: &CancellationToken) -> Vec<BagOutcome> {
        let total = bags.len();
        info!(bags = total, concurrency = self.settings.concurrency, "Pipeline starting");

        let mut outcomes: Vec<BagOutcome> = stream::iter(bags.into_iter().enumerate())
            .map(|(index, bag)| self.process_bag(index, bag, cancel))
            .buffer_unordered(self.settings.concurrency.max(1))
            .collect()
            .await;

        outcomes.sort_by_key(|o| o.index);
        info!(bags = total, "Pipeline finished");
        outcomes
    }

    /// Drive one bag to a terminal state
    pub async fn process_bag(
        &self,
        index: usize,
        bag: Bag,
        cancel: &CancellationToken,
    ) -> BagOutcome {
        let identifier = match resolve_identifier(&bag.name) {
            Ok(id) => id,
            Err(e) => {
                warn!(bag = %bag.name, error = %e, "Bag name did not resolve");
                return finish(index, bag, None, Outcome::Errored(e));
            }
        };
        debug!(bag = %bag.name, mmsid = %identifier, "Resolved");

        if cancel.is_cancelled() {
            return finish(index, bag, Some(identifier), Outcome::Errored(ProcessError::Cancelled));
        }

        let record = match self.fetch(&identifier).await {
            Ok(record) => record,
            Err(e) => {
                error!(bag = %bag.name, mmsid = %identifier, error = %e, "Bib fetch failed");
                self.notify(&bag, &unavailable_report()).await;
                return finish(index, bag, Some(identifier), Outcome::Errored(e.into()));
            }
        };
        debug!(bag = %bag.name, mmsid = %identifier, "Fetched");

        let outcome = self.evaluate(record).await;
        let outcome = match outcome {
            Outcome::Ready(document) => match self.submission.accept(&document, &bag).await {
                Ok(()) => Outcome::Ready(document),
                Err(e) => {
                    error!(bag = %bag.name, error = %e, "Submission sink failed");
                    Outcome::Errored(ProcessError::Submission(e.to_string()))
                }
            },
            Outcome::MissingFields(report) => {
                self.notify(&bag, &report).await;
                Outcome::MissingFields(report)
            }
            Outcome::Suppressed => {
                info!(bag = %bag.name, mmsid = %identifier, "Record suppressed from publishing");
                Outcome::Suppressed
            }
            Outcome::Errored(e) => {
                warn!(bag = %bag.name, mmsid = %identifier, error = %e, "Record conversion failed");
                Outcome::Errored(e)
            }
        };

        finish(index, bag, Some(identifier), outcome)
    }

    async fn fetch(&self, identifier: &str) -> Result<BibRecord, BibFetchError> {
        match tokio::time::timeout(self.settings.fetch_timeout, self.bib_source.fetch(identifier))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(BibFetchError::permanent(
                identifier,
                format!("timed out after {:?}", self.settings.fetch_timeout),
            )),
        }
    }

    /// CPU-bound stages off the async workers
    async fn evaluate(&self, record: BibRecord) -> Outcome {
        let validator = Arc::clone(&self.validator);
        let transformer = Arc::clone(&self.transformer);
        let identifier = record.identifier().to_string();

        tokio::task::spawn_blocking(move || {
            evaluate_record(&record, validator.as_ref(), transformer.as_ref())
        })
        .await
        .unwrap_or_else(|e| {
            Outcome::Errored(ProcessError::Transform(format!(
                "evaluation of {} aborted: {}",
                identifier, e
            )))
        })
    }

    async fn notify(&self, bag: &Bag, report: &MissingFieldsReport) {
        if let Err(e) = self.notification.notify(bag, report).await {
            error!(bag = %bag.name, error = %e, "Notification sink failed");
        }
    }
}

fn finish(index: usize, bag: Bag, identifier: Option<String>, outcome: Outcome) -> BagOutcome {
    debug!(bag = %bag.name, outcome = outcome.label(), "Bag complete");
    BagOutcome {
        index,
        bag,
        identifier,
        outcome,
    }
}

/// Checks and conversion for a fetched record
///
/// Missing fields take precedence over the suppression flag. Validation must
/// pass before the transformer is called.
pub fn evaluate_record(
    record: &BibRecord,
    validator: &dyn MarcSchemaValidator,
    transformer: &dyn DublinCoreTransformer,
) -> Outcome {
    match convert(record, validator, transformer) {
        Ok(outcome) => outcome,
        Err(e) => Outcome::Errored(e),
    }
}

fn convert(
    record: &BibRecord,
    validator: &dyn MarcSchemaValidator,
    transformer: &dyn DublinCoreTransformer,
) -> Result<Outcome, ProcessError> {
    let unparsable = |e: roxmltree::Error| {
        ProcessError::BibFetch(BibFetchError::permanent(
            record.identifier(),
            format!("unparsable response body: {}", e),
        ))
    };

    // Independent read-only checks; each parses its own view
    let (report, suppressed) = rayon::join(
        || record.document().map(|doc| missing_fields(&doc)),
        || record.document().map(|doc| is_suppressed(&doc)),
    );

    let report = report.map_err(unparsable)?;
    if !report.is_empty() {
        return Ok(Outcome::MissingFields(report));
    }
    if suppressed.map_err(unparsable)?? {
        return Ok(Outcome::Suppressed);
    }

    let doc = record.document().map_err(unparsable)?;
    let marc = extract_marc(record.identifier(), &doc)?;
    validator.validate(&marc)?;
    let dublin_core = transformer.transform(&marc)?;

    Ok(Outcome::Ready(dublin_core))
}
