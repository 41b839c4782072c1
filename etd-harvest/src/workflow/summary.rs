//! End-of-run summary

use crate::models::{BagOutcome, Outcome};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// One bag's line in the summary
#[derive(Debug, Clone, Serialize)]
pub struct SummaryEntry {
    /// Discovery position
    pub index: usize,
    pub bag: String,
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
    /// Error cause for errored bags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Outcomes of one run, partitioned and in discovery order
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub ready: Vec<SummaryEntry>,
    pub missing_fields: Vec<SummaryEntry>,
    pub suppressed: Vec<SummaryEntry>,
    pub errored: Vec<SummaryEntry>,
}

impl RunSummary {
    pub fn from_outcomes(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        mut outcomes: Vec<BagOutcome>,
    ) -> Self {
        outcomes.sort_by_key(|o| o.index);

        let mut summary = Self {
            run_id,
            started_at,
            finished_at: Utc::now(),
            total: outcomes.len(),
            ready: Vec::new(),
            missing_fields: Vec::new(),
            suppressed: Vec::new(),
            errored: Vec::new(),
        };

        for outcome in outcomes {
            let mut entry = SummaryEntry {
                index: outcome.index,
                bag: outcome.bag.name,
                identifier: outcome.identifier,
                missing_fields: Vec::new(),
                detail: None,
            };

            match outcome.outcome {
                Outcome::Ready(_) => summary.ready.push(entry),
                Outcome::MissingFields(report) => {
                    entry.missing_fields = report.fields().to_vec();
                    summary.missing_fields.push(entry);
                }
                Outcome::Suppressed => summary.suppressed.push(entry),
                Outcome::Errored(e) => {
                    entry.detail = Some(e.to_string());
                    summary.errored.push(entry);
                }
            }
        }

        summary
    }

    pub fn log(&self) {
        info!(
            run_id = %self.run_id,
            total = self.total,
            ready = self.ready.len(),
            missing_fields = self.missing_fields.len(),
            suppressed = self.suppressed.len(),
            errored = self.errored.len(),
            "Harvest run complete"
        );
        for entry in &self.missing_fields {
            info!(bag = %entry.bag, missing = ?entry.missing_fields, "Missing fields");
        }
        for entry in &self.errored {
            info!(bag = %entry.bag, cause = entry.detail.as_deref().unwrap_or(""), "Errored");
        }
    }

    pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, json)
    }
}
