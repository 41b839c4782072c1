//! etd-harvest library interface
//!
//! Harvests digitized-thesis bags from the catalog, checks each bag's
//! bibliographic record for required fields and publishing suppression, and
//! converts complete, publishable records from MARC21 to Dublin Core.

pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

pub use crate::error::{DiscoveryError, ProcessError, RunError};
pub use crate::workflow::{run_harvest, Pipeline, PipelineSettings, RunSummary};
