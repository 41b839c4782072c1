//! Pipeline stages and external clients

pub mod alma_client;
pub mod catalog_client;
pub mod field_checker;
pub mod identifier;
pub mod marc_extractor;
pub mod sinks;
pub mod suppression;
pub mod xml_engine;

pub use alma_client::{AlmaClient, BibRecordSource};
pub use catalog_client::{search_url, BagDiscovery, CatalogClient, PageSource};
pub use field_checker::{missing_fields, unavailable_report, FieldRule, FIELD_RULES};
pub use identifier::resolve_identifier;
pub use marc_extractor::{extract_marc, MARC21_SLIM_NS};
pub use sinks::{DirectorySubmissionSink, NotificationSink, ReportNotificationSink, SubmissionSink};
pub use suppression::is_suppressed;
pub use xml_engine::{DublinCoreTransformer, MarcSchemaValidator, XmlEngine};
