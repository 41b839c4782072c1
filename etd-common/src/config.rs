//! Configuration loading and API key resolution
//!
//! Configuration sources, highest priority first:
//! 1. Command-line arguments (applied through [`ConfigOverrides`])
//! 2. Environment variables (`ETD_CONFIG`, `ETD_ALMA_API_KEY`)
//! 3. TOML config file
//! 4. Built-in defaults

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ETD_CONFIG";

/// Environment variable holding the bibliographic service API key
pub const API_KEY_ENV_VAR: &str = "ETD_ALMA_API_KEY";

/// Full harvester configuration as read from TOML
///
/// Every section is optional in the file; missing keys take built-in defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    pub catalog: CatalogConfig,
    pub alma: AlmaConfig,
    pub resources: ResourcesConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Catalog search endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog base URL (the search path is appended)
    pub base_url: String,
    /// Value the `project` field must equal
    pub project: String,
    /// Regex the `bag` name must match
    pub bag_pattern: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cc.lib.ou.edu".to_string(),
            project: "private".to_string(),
            bag_pattern: "^share".to_string(),
        }
    }
}

/// Bibliographic service settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlmaConfig {
    pub base_url: String,
    /// API key; `ETD_ALMA_API_KEY` takes priority over this value
    pub api_key: Option<String>,
    pub requests_per_second: u32,
}

impl Default for AlmaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-na.hosted.exlibrisgroup.com".to_string(),
            api_key: None,
            requests_per_second: 10,
        }
    }
}

/// Local XML resources, compiled once per run
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourcesConfig {
    pub schema_path: PathBuf,
    pub stylesheet_path: PathBuf,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            schema_path: PathBuf::from("resources/MARC21slim.xsd"),
            stylesheet_path: PathBuf::from("resources/MARC21slim2RDFDC.xsl"),
        }
    }
}

/// Pipeline scheduling and retry settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum bags processed at once
    pub concurrency: usize,
    /// Upper bound for one bag's bib fetch, retries included
    pub fetch_timeout_secs: u64,
    /// Total attempts per external call, first try included (1 = no retry)
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    /// Cancel the run after this many seconds
    pub run_timeout_secs: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            fetch_timeout_secs: 60,
            max_attempts: 3,
            initial_backoff_ms: 250,
            run_timeout_secs: None,
        }
    }
}

/// Where results are written
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub summary_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            summary_path: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Values supplied on the command line; `None` leaves the TOML value alone
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub catalog_url: Option<String>,
    pub alma_url: Option<String>,
    pub schema_path: Option<PathBuf>,
    pub stylesheet_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub summary_path: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub run_timeout_secs: Option<u64>,
}

impl TomlConfig {
    /// Apply command-line overrides on top of file values
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(url) = overrides.catalog_url {
            self.catalog.base_url = url;
        }
        if let Some(url) = overrides.alma_url {
            self.alma.base_url = url;
        }
        if let Some(path) = overrides.schema_path {
            self.resources.schema_path = path;
        }
        if let Some(path) = overrides.stylesheet_path {
            self.resources.stylesheet_path = path;
        }
        if let Some(dir) = overrides.output_dir {
            self.output.directory = dir;
        }
        if let Some(path) = overrides.summary_path {
            self.output.summary_path = Some(path);
        }
        if let Some(n) = overrides.concurrency {
            self.pipeline.concurrency = n;
        }
        if let Some(secs) = overrides.run_timeout_secs {
            self.pipeline.run_timeout_secs = Some(secs);
        }
    }

    /// Reject values the harvester cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.concurrency == 0 {
            return Err(Error::Config("pipeline.concurrency must be at least 1".to_string()));
        }
        if self.pipeline.fetch_timeout_secs == 0 {
            return Err(Error::Config(
                "pipeline.fetch_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.pipeline.max_attempts == 0 {
            return Err(Error::Config("pipeline.max_attempts must be at least 1".to_string()));
        }
        if self.alma.requests_per_second == 0 {
            return Err(Error::Config(
                "alma.requests_per_second must be at least 1".to_string(),
            ));
        }
        for (key, url) in [
            ("catalog.base_url", &self.catalog.base_url),
            ("alma.base_url", &self.alma.base_url),
        ] {
            reqwest::Url::parse(url)
                .map_err(|e| Error::Config(format!("{} is not a valid URL ({}): {}", key, url, e)))?;
        }
        Ok(())
    }
}

/// Load and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Default per-user config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("etd-harvest").join("config.toml"))
}

/// Resolve and load configuration
///
/// An explicit path (CLI or `ETD_CONFIG`) must exist. The per-user default is
/// used only when present; otherwise built-in defaults apply.
pub fn load_config(cli_path: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = cli_path {
        info!("Loading config from {}", path.display());
        return load_toml_config(path);
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            info!("Loading config from {} ({})", path, CONFIG_ENV_VAR);
            return load_toml_config(Path::new(&path));
        }
    }

    if let Some(path) = default_config_path() {
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_toml_config(&path);
        }
    }

    info!("No config file found, using built-in defaults");
    Ok(TomlConfig::default())
}

/// Resolve the bibliographic service API key
///
/// **Priority:** ENV → TOML
pub fn resolve_api_key(toml_config: &TomlConfig) -> Result<String> {
    let env_key = std::env::var(API_KEY_ENV_VAR).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_config.alma.api_key.clone().filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "API key found in both {} and TOML config. Using environment (highest priority).",
            API_KEY_ENV_VAR
        );
    }

    if let Some(key) = env_key {
        info!("API key loaded from environment variable");
        return Ok(key.trim().to_string());
    }

    if let Some(key) = toml_key {
        info!("API key loaded from TOML config");
        return Ok(key.trim().to_string());
    }

    Err(Error::Config(format!(
        "Bibliographic service API key not configured. Please configure using one of:\n\
         1. Environment: {}=your-key-here\n\
         2. TOML config: [alma] api_key = \"your-key\"",
        API_KEY_ENV_VAR
    )))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
