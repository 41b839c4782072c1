//! MMS ID resolution from bag names

use crate::error::ProcessError;

/// Extract the MMS ID: the segment after the last `_` in the bag name
///
/// A name without `_`, or with nothing after it, cannot key a bib lookup.
pub fn resolve_identifier(bag_name: &str) -> Result<String, ProcessError> {
    match bag_name.rsplit_once('_') {
        Some((_, id)) if !id.trim().is_empty() => Ok(id.to_string()),
        _ => Err(ProcessError::MalformedBagName(bag_name.to_string())),
    }
}
