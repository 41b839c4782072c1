//! Data model for one harvest run
//!
//! Every value here is created and consumed while processing a single bag.
//! Each stage derives a new value instead of mutating the previous one.

pub mod bag;
pub mod documents;
pub mod outcome;

pub use bag::{Bag, SearchPage};
pub use documents::{BibRecord, DublinCoreDocument, MarcDocument};
pub use outcome::{BagOutcome, MissingFieldsReport, Outcome};
