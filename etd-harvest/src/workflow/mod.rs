//! Run orchestration: discovery, per-bag pipeline, summary

pub mod pipeline;
pub mod runner;
pub mod summary;

pub use pipeline::{evaluate_record, Pipeline, PipelineSettings};
pub use runner::run_harvest;
pub use summary::{RunSummary, SummaryEntry};
