//! Terminal states of a bag's pipeline

use super::{Bag, DublinCoreDocument};
use crate::error::ProcessError;
use serde::Serialize;

/// Ordered names of fields that were absent or blank
///
/// Empty means the record is structurally complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MissingFieldsReport(Vec<String>);

impl MissingFieldsReport {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|f| f == field)
    }
}

/// Exactly one of these is produced per discovered bag
#[derive(Debug, Clone)]
pub enum Outcome {
    Ready(DublinCoreDocument),
    MissingFields(MissingFieldsReport),
    Suppressed,
    Errored(ProcessError),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Ready(_) => "ready",
            Outcome::MissingFields(_) => "missing_fields",
            Outcome::Suppressed => "suppressed",
            Outcome::Errored(_) => "errored",
        }
    }
}

/// Outcome tagged with the bag's discovery position
#[derive(Debug, Clone)]
pub struct BagOutcome {
    /// Zero-based position in discovery order
    pub index: usize,
    pub bag: Bag,
    /// MMS ID, when the bag name could be resolved
    pub identifier: Option<String>,
    pub outcome: Outcome,
}
