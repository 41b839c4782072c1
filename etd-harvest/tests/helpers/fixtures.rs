//! Bib record fixtures in the shape returned by the Alma bibs API

use std::path::PathBuf;

/// Datafields satisfying every completeness rule
pub fn complete_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("100", "Doe, Jane,"),
        ("245", "Sediment transport in prairie rivers /"),
        ("264", "2019"),
        ("502", "Thesis (M.S.)--University of Oklahoma, 2019."),
        ("650", "Sediment transport"),
        ("690", "Geography"),
    ]
}

/// Alma bib document; `suppress` of `None` omits the flag element
pub fn bib_xml(mmsid: &str, suppress: Option<&str>, fields: &[(&str, &str)]) -> String {
    let datafields: String = fields
        .iter()
        .map(|(tag, value)| {
            format!(
                "    <datafield tag=\"{}\" ind1=\"1\" ind2=\" \">\n      <subfield code=\"a\">{}</subfield>\n    </datafield>\n",
                tag, value
            )
        })
        .collect();

    let flag = suppress
        .map(|v| format!("  <suppress_from_publishing>{}</suppress_from_publishing>\n", v))
        .unwrap_or_default();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <bib>\n\
         \x20 <mms_id>{mmsid}</mms_id>\n\
         \x20 <record_format>marc21</record_format>\n\
         {flag}\
         \x20 <record>\n\
         \x20   <leader>00000nam a2200000 i 4500</leader>\n\
         \x20   <controlfield tag=\"001\">{mmsid}</controlfield>\n\
         \x20   <controlfield tag=\"008\">190514s2019    oku     sbm   000 0 eng d</controlfield>\n\
         {datafields}\
         \x20 </record>\n\
         </bib>\n"
    )
}

/// Path of a file shipped in the workspace `resources/` directory
pub fn resource_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("resources")
        .join(name)
}
