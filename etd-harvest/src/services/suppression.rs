//! Publishing-suppression flag

use crate::error::ProcessError;
use roxmltree::Document;

/// Read `suppress_from_publishing` anywhere in the document
///
/// `TRUE` in any letter case means suppressed. An absent element is an error,
/// never a default of `false`.
pub fn is_suppressed(doc: &Document) -> Result<bool, ProcessError> {
    let flag = doc
        .descendants()
        .find(|n| n.has_tag_name("suppress_from_publishing"))
        .ok_or(ProcessError::SuppressionFieldAbsent)?;

    Ok(flag
        .text()
        .map(|t| t.trim().eq_ignore_ascii_case("TRUE"))
        .unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(xml: &str) -> Result<bool, ProcessError> {
        let doc = Document::parse(xml).unwrap();
        is_suppressed(&doc)
    }

    fn with_flag(value: &str) -> String {
        format!(
            "<bib><suppress_from_publishing>{}</suppress_from_publishing><record/></bib>",
            value
        )
    }

    #[test]
    fn test_true_in_any_case() {
        for value in ["true", "True", "TRUE"] {
            assert!(check(&with_flag(value)).unwrap(), "value {:?}", value);
        }
    }

    #[test]
    fn test_false_value() {
        assert!(!check(&with_flag("false")).unwrap());
    }

    #[test]
    fn test_empty_value_not_suppressed() {
        assert!(!check("<bib><suppress_from_publishing/></bib>").unwrap());
    }

    #[test]
    fn test_absent_flag_is_error() {
        assert!(matches!(
            check("<bib><record/></bib>"),
            Err(ProcessError::SuppressionFieldAbsent)
        ));
    }
}
