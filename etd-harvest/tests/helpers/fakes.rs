//! In-memory stand-ins for the pipeline's collaborators

use async_trait::async_trait;
use etd_harvest::error::{BibFetchError, ProcessError, SinkError};
use etd_harvest::models::{Bag, BibRecord, DublinCoreDocument, MarcDocument, MissingFieldsReport};
use etd_harvest::services::{
    BibRecordSource, DublinCoreTransformer, MarcSchemaValidator, NotificationSink, SubmissionSink,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Serves canned bodies by MMS ID; unknown IDs are HTTP 404
#[derive(Default)]
pub struct FakeBibSource {
    bodies: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    pub fetches: AtomicUsize,
}

impl FakeBibSource {
    pub fn with_record(mut self, mmsid: &str, body: String) -> Self {
        self.bodies.insert(mmsid.to_string(), body);
        self
    }

    pub fn with_delay(mut self, mmsid: &str, delay: Duration) -> Self {
        self.delays.insert(mmsid.to_string(), delay);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BibRecordSource for FakeBibSource {
    async fn fetch(&self, identifier: &str) -> Result<BibRecord, BibFetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(identifier) {
            tokio::time::sleep(*delay).await;
        }
        match self.bodies.get(identifier) {
            Some(body) => BibRecord::parse(identifier, body.clone()),
            None => Err(BibFetchError::permanent(identifier, "HTTP 404")),
        }
    }
}

/// Accepts or rejects every record, counting calls
pub struct StaticValidator {
    violations: Option<Vec<String>>,
    pub calls: AtomicUsize,
}

impl StaticValidator {
    pub fn accepting() -> Self {
        Self { violations: None, calls: AtomicUsize::new(0) }
    }

    pub fn rejecting(violation: &str) -> Self {
        Self {
            violations: Some(vec![violation.to_string()]),
            calls: AtomicUsize::new(0),
        }
    }
}

impl MarcSchemaValidator for StaticValidator {
    fn validate(&self, _marc: &MarcDocument) -> Result<(), ProcessError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.violations {
            None => Ok(()),
            Some(v) => Err(ProcessError::SchemaValidation { violations: v.clone() }),
        }
    }
}

/// Wraps the MARC XML in a marker element and counts invocations
#[derive(Default)]
pub struct CountingTransformer {
    pub calls: AtomicUsize,
}

impl CountingTransformer {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DublinCoreTransformer for CountingTransformer {
    fn transform(&self, marc: &MarcDocument) -> Result<DublinCoreDocument, ProcessError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(DublinCoreDocument {
            identifier: marc.identifier.clone(),
            xml: format!("<dc>{}</dc>", marc.identifier),
        })
    }
}

/// Records accepted documents; optionally fails every call
#[derive(Default)]
pub struct RecordingSubmissions {
    pub accepted: Mutex<Vec<(String, DublinCoreDocument)>>,
    pub fail: bool,
}

#[async_trait]
impl SubmissionSink for RecordingSubmissions {
    async fn accept(&self, document: &DublinCoreDocument, bag: &Bag) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Rejected("disk full".to_string()));
        }
        self.accepted
            .lock()
            .unwrap()
            .push((bag.name.clone(), document.clone()));
        Ok(())
    }
}

/// Records every notification
#[derive(Default)]
pub struct RecordingNotifications {
    pub notices: Mutex<Vec<(String, MissingFieldsReport)>>,
}

impl RecordingNotifications {
    pub fn report_for(&self, bag: &str) -> Option<MissingFieldsReport> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == bag)
            .map(|(_, report)| report.clone())
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifications {
    async fn notify(&self, bag: &Bag, report: &MissingFieldsReport) -> Result<(), SinkError> {
        self.notices
            .lock()
            .unwrap()
            .push((bag.name.clone(), report.clone()));
        Ok(())
    }
}
