//! Test Helper Utilities
//!
//! Shared fixtures and in-memory collaborators for etd-harvest tests

#![allow(dead_code, unused_imports)]

pub mod fakes;
pub mod fixtures;

pub use fakes::{
    CountingTransformer, FakeBibSource, RecordingNotifications, RecordingSubmissions,
    StaticValidator,
};
pub use fixtures::{bib_xml, complete_fields, resource_path};
