//! Standalone MARC21 record extraction
//!
//! Alma embeds an un-namespaced `record` element in its bib document. The
//! schema and stylesheet expect MARC21 slim, so the subtree is re-serialised
//! with the slim namespace as its default namespace.

use crate::error::ProcessError;
use crate::models::MarcDocument;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use roxmltree::{Document, Node};

pub const MARC21_SLIM_NS: &str = "http://www.loc.gov/MARC21/slim";

/// Isolate the `record` child of the document root as a MARC21 slim document
pub fn extract_marc(identifier: &str, doc: &Document) -> Result<MarcDocument, ProcessError> {
    let record = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name("record"))
        .ok_or(ProcessError::NoMarcRecord)?;

    let xml = serialize_record(record)
        .map_err(|e| ProcessError::Transform(format!("MARC serialization failed: {}", e)))?;

    Ok(MarcDocument {
        identifier: identifier.to_string(),
        xml,
    })
}

fn serialize_record(record: Node) -> Result<String, String> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| e.to_string())?;
    write_element(&mut writer, record, true)?;

    String::from_utf8(writer.into_inner()).map_err(|e| e.to_string())
}

fn write_element(writer: &mut Writer<Vec<u8>>, node: Node, is_root: bool) -> Result<(), String> {
    let name = node.tag_name().name();
    let mut start = BytesStart::new(name);
    if is_root {
        start.push_attribute(("xmlns", MARC21_SLIM_NS));
    }
    // Namespaced attributes (xsi:schemaLocation etc.) would lose their prefix
    for attr in node.attributes().filter(|a| a.namespace().is_none()) {
        start.push_attribute((attr.name(), attr.value()));
    }

    if !node.has_children() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| e.to_string());
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| e.to_string())?;

    for child in node.children() {
        if child.is_element() {
            write_element(writer, child, false)?;
        } else if let Some(text) = child.text().filter(|_| child.is_text()) {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| e.to_string())?;
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| e.to_string())
}
