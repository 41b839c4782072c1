//! Downstream collaborators at the pipeline's terminal branches
//!
//! SAF packaging/submission and owner notification live outside this crate.
//! The defaults here drop their inputs on disk for those tools to pick up.

use crate::error::SinkError;
use crate::models::{Bag, DublinCoreDocument, MissingFieldsReport};
use crate::services::resolve_identifier;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Receives Dublin Core documents that are ready for submission
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn accept(&self, document: &DublinCoreDocument, bag: &Bag) -> Result<(), SinkError>;
}

/// Receives reports for bags whose records lack required fields
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, bag: &Bag, report: &MissingFieldsReport) -> Result<(), SinkError>;
}

/// Bag name as a single safe path component
fn path_component(bag_name: &str) -> String {
    let cleaned: String = bag_name
        .chars()
        .map(|c| if c == '/' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

/// Writes `<root>/ready/<bag>/dublin_core.xml`
pub struct DirectorySubmissionSink {
    root: PathBuf,
}

impl DirectorySubmissionSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn document_path(&self, bag: &Bag) -> PathBuf {
        self.root
            .join("ready")
            .join(path_component(&bag.name))
            .join("dublin_core.xml")
    }
}

#[async_trait]
impl SubmissionSink for DirectorySubmissionSink {
    async fn accept(&self, document: &DublinCoreDocument, bag: &Bag) -> Result<(), SinkError> {
        if document.xml.trim().is_empty() {
            return Err(SinkError::Rejected(format!(
                "empty Dublin Core document for {}",
                document.identifier
            )));
        }

        let path = self.document_path(bag);
        write_file(&path, document.xml.as_bytes()).await?;

        info!(bag = %bag.name, path = %path.display(), "Dublin Core ready for submission");
        Ok(())
    }
}

#[derive(Serialize)]
struct MissingFieldsNotice<'a> {
    bag: &'a str,
    identifier: Option<String>,
    missing_fields: &'a MissingFieldsReport,
}

/// Logs the report and writes `<root>/missing/<bag>.json`
pub struct ReportNotificationSink {
    root: PathBuf,
}

impl ReportNotificationSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn report_path(&self, bag: &Bag) -> PathBuf {
        self.root
            .join("missing")
            .join(format!("{}.json", path_component(&bag.name)))
    }
}

#[async_trait]
impl NotificationSink for ReportNotificationSink {
    async fn notify(&self, bag: &Bag, report: &MissingFieldsReport) -> Result<(), SinkError> {
        warn!(
            bag = %bag.name,
            missing = ?report.fields(),
            "Record has missing fields"
        );

        let notice = MissingFieldsNotice {
            bag: &bag.name,
            identifier: resolve_identifier(&bag.name).ok(),
            missing_fields: report,
        };
        let json = serde_json::to_vec_pretty(&notice)?;
        write_file(&self.report_path(bag), &json).await
    }
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), SinkError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}
