//! Catalog entries

use serde::{Deserialize, Serialize};

/// Digitized-object container discovered in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Bag {
    /// Bag name, e.g. `share-thesis_99123456`
    #[serde(rename = "bag")]
    pub name: String,
    /// Catalog project tag
    #[serde(default)]
    pub project: Option<String>,
}

impl Bag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project: None,
        }
    }
}

/// One page of catalog search results
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    pub results: Vec<Bag>,
    /// URL of the following page; `null` or absent on the last page
    #[serde(default)]
    pub next: Option<String>,
}
