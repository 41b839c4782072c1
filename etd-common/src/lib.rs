//! # ETD Common Library
//!
//! Shared code for the ETD harvesting tools:
//! - Error type used by configuration and bootstrap code
//! - TOML/environment configuration loading
//! - Bibliographic service API key resolution
//! - Logging initialization

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
