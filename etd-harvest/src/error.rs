//! Error types for etd-harvest
//!
//! Two severities:
//! - [`DiscoveryError`] and [`EngineError`] end the run
//! - [`ProcessError`] ends one bag only and is reported alongside it

use thiserror::Error;

/// Catalog discovery failure; no bag list means nothing to process
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("Catalog returned HTTP {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Unparsable catalog page {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Pagination loop: page {url} was already visited")]
    PaginationLoop { url: String },

    #[error("Discovery cancelled")]
    Cancelled,
}

/// Bib record could not be retrieved for one identifier
#[derive(Debug, Clone, Error)]
#[error("Bib record {identifier} unavailable: {cause}")]
pub struct BibFetchError {
    pub identifier: String,
    pub cause: String,
    /// Worth retrying (connection failure, 429, 5xx)
    pub transient: bool,
}

impl BibFetchError {
    pub fn permanent(identifier: &str, cause: impl Into<String>) -> Self {
        Self {
            identifier: identifier.to_string(),
            cause: cause.into(),
            transient: false,
        }
    }

    pub fn transient(identifier: &str, cause: impl Into<String>) -> Self {
        Self {
            identifier: identifier.to_string(),
            cause: cause.into(),
            transient: true,
        }
    }
}

/// Per-bag failure; never propagates past the pipeline
#[derive(Debug, Clone, Error)]
pub enum ProcessError {
    #[error("Malformed bag name (no '_' before identifier): {0}")]
    MalformedBagName(String),

    #[error(transparent)]
    BibFetch(#[from] BibFetchError),

    #[error("suppress_from_publishing element absent")]
    SuppressionFieldAbsent,

    #[error("No MARC record element in bib record")]
    NoMarcRecord,

    #[error("MARC record failed schema validation: {}", violations.join("; "))]
    SchemaValidation { violations: Vec<String> },

    #[error("Dublin Core transform failed: {0}")]
    Transform(String),

    #[error("Submission sink rejected document: {0}")]
    Submission(String),

    #[error("Run cancelled before bag was processed")]
    Cancelled,
}

/// Schema or stylesheet could not be compiled at start-up
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("MARC21 schema {path} failed to compile: {message}")]
    Schema { path: String, message: String },

    #[error("Dublin Core stylesheet {path} failed to compile: {message}")]
    Stylesheet { path: String, message: String },

    #[error("XML engine thread failed: {0}")]
    Thread(String),
}

/// Downstream collaborator failed to take a result
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Rejected: {0}")]
    Rejected(String),
}

/// Run-fatal failure of the harvest as a whole
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] etd_common::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("Client setup failed: {0}")]
    Client(String),
}

/// Classifies errors for the retry helper
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for BibFetchError {
    fn is_transient(&self) -> bool {
        self.transient
    }
}

impl Transient for DiscoveryError {
    fn is_transient(&self) -> bool {
        match self {
            DiscoveryError::Network { .. } => true,
            DiscoveryError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// HTTP statuses retried by the clients
pub fn is_transient_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
