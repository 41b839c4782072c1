//! Field completeness checks against a bib record
//!
//! A fixed, ordered rule table maps report names to MARC datafield tags found at
//! `record/datafield[@tag=T]` below the document root. A rule with several tags
//! is a union: the first matching datafield in document order decides.
//!
//! A field is present only when that datafield exists and its text content
//! (all descendant text, trimmed) is non-empty.

use crate::models::MissingFieldsReport;
use roxmltree::{Document, Node};

/// Report entry used when the bib record could not be fetched at all
pub const RECORD_UNAVAILABLE: &str = "record unavailable";

/// One named field and the datafield tags that can satisfy it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    pub tags: &'static [&'static str],
}

/// Rule table; order defines report order, names are unique
pub const FIELD_RULES: &[FieldRule] = &[
    FieldRule { name: "Title", tags: &["245"] },
    FieldRule { name: "Author", tags: &["100"] },
    FieldRule { name: "Publish Year", tags: &["264", "260"] },
    FieldRule { name: "Thesis/Diss Tag", tags: &["502"] },
    FieldRule { name: "School", tags: &["690"] },
    FieldRule { name: "Subject Heading", tags: &["650"] },
];

/// Names of fields that are absent or blank, in rule-table order
pub fn missing_fields(doc: &Document) -> MissingFieldsReport {
    missing_fields_with(doc, FIELD_RULES)
}

pub fn missing_fields_with(doc: &Document, rules: &[FieldRule]) -> MissingFieldsReport {
    let fields = rules
        .iter()
        .filter(|rule| !is_present(doc, rule))
        .map(|rule| rule.name.to_string())
        .collect();

    MissingFieldsReport::new(fields)
}

/// Report for a bag whose record never arrived: every field counts as missing
pub fn unavailable_report() -> MissingFieldsReport {
    let mut fields = vec![RECORD_UNAVAILABLE.to_string()];
    fields.extend(FIELD_RULES.iter().map(|rule| rule.name.to_string()));
    MissingFieldsReport::new(fields)
}

fn is_present(doc: &Document, rule: &FieldRule) -> bool {
    first_match(doc, rule.tags)
        .map(|field| !text_content(field).trim().is_empty())
        .unwrap_or(false)
}

fn first_match<'a, 'input>(doc: &'a Document<'input>, tags: &[&str]) -> Option<Node<'a, 'input>> {
    doc.root_element()
        .children()
        .filter(|n| n.has_tag_name("record"))
        .flat_map(|record| record.children())
        .filter(|n| n.has_tag_name("datafield"))
        .find(|field| {
            field
                .attribute("tag")
                .map(|tag| tags.contains(&tag.trim()))
                .unwrap_or(false)
        })
}

fn text_content(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn bib(datafields: &str) -> String {
        format!(
            "<bib><mms_id>991</mms_id><record><leader>00000nam a2200000 i 4500</leader>{}</record>\
             <suppress_from_publishing>false</suppress_from_publishing></bib>",
            datafields
        )
    }

    fn field(tag: &str, text: &str) -> String {
        format!(
            "<datafield tag=\"{}\" ind1=\" \" ind2=\" \"><subfield code=\"a\">{}</subfield></datafield>",
            tag, text
        )
    }

    fn complete() -> String {
        ["245", "100", "264", "502", "690", "650"]
            .iter()
            .map(|t| field(t, "value"))
            .collect()
    }

    fn report(xml: &str) -> MissingFieldsReport {
        let doc = Document::parse(xml).unwrap();
        missing_fields(&doc)
    }

    #[test]
    fn test_rule_names_unique() {
        let names: HashSet<_> = FIELD_RULES.iter().map(|r| r.name).collect();
        assert_eq!(names.len(), FIELD_RULES.len());
    }

    #[test]
    fn test_complete_record_has_empty_report() {
        assert!(report(&bib(&complete())).is_empty());
    }

    #[test]
    fn test_empty_title_reported_present_author_not() {
        let fields = format!(
            "<datafield tag=\"245\" ind1=\"1\" ind2=\"0\"></datafield>{}",
            field("100", "Doe, Jane")
        );
        let report = report(&bib(&fields));

        assert!(report.contains("Title"));
        assert!(!report.contains("Author"));
    }

    #[test]
    fn test_blank_subfield_is_missing() {
        let report = report(&bib(&field("245", "   ")));
        assert!(report.contains("Title"));
    }

    #[test]
    fn test_missing_publish_year_when_neither_264_nor_260() {
        let fields: String = ["245", "100", "502", "690", "650"]
            .iter()
            .map(|t| field(t, "value"))
            .collect();
        let report = report(&bib(&fields));

        assert_eq!(report.fields(), &["Publish Year".to_string()]);
    }

    #[test]
    fn test_260_satisfies_publish_year() {
        let report = report(&bib(&field("260", "2019")));
        assert!(!report.contains("Publish Year"));
    }

    #[test]
    fn test_union_uses_first_match_in_document_order() {
        // Blank 260 precedes a filled 264; only the first is inspected
        let fields = format!("{}{}", field("260", ""), field("264", "2020"));
        let report = report(&bib(&fields));
        assert!(report.contains("Publish Year"));
    }

    #[test]
    fn test_report_follows_rule_order() {
        let report = report(&bib(""));
        let expected: Vec<String> = FIELD_RULES.iter().map(|r| r.name.to_string()).collect();
        assert_eq!(report.fields(), expected.as_slice());
    }

    #[test]
    fn test_datafield_outside_record_ignored() {
        let xml = format!("<bib>{}<record></record></bib>", field("245", "Stray"));
        assert!(report(&xml).contains("Title"));
    }

    #[test]
    fn test_unavailable_report_lists_marker_then_all_fields() {
        let report = unavailable_report();
        assert_eq!(report.fields()[0], RECORD_UNAVAILABLE);
        assert_eq!(report.fields().len(), FIELD_RULES.len() + 1);
    }
}
