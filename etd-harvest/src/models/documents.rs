//! XML documents flowing through the pipeline

use crate::error::BibFetchError;
use serde::Serialize;

/// Raw bib record as returned by the bibliographic service
///
/// Construction checks the body is well-formed XML, so later stages only
/// deal with content problems.
#[derive(Debug, Clone)]
pub struct BibRecord {
    identifier: String,
    xml: String,
}

impl BibRecord {
    pub fn parse(identifier: &str, body: String) -> Result<Self, BibFetchError> {
        roxmltree::Document::parse(&body).map_err(|e| {
            BibFetchError::permanent(identifier, format!("unparsable response body: {}", e))
        })?;

        Ok(Self {
            identifier: identifier.to_string(),
            xml: body,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Parsed view over the record
    pub fn document(&self) -> Result<roxmltree::Document<'_>, roxmltree::Error> {
        roxmltree::Document::parse(&self.xml)
    }
}

/// Standalone MARC21 slim record extracted from a [`BibRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarcDocument {
    pub identifier: String,
    pub xml: String,
}

/// Dublin Core rendering of a schema-valid [`MarcDocument`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DublinCoreDocument {
    pub identifier: String,
    pub xml: String,
}
