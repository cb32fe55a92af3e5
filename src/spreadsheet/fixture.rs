//! In-memory xlsx packages for tests.

use crate::spreadsheet::reference::index_to_reference;
use std::io::Cursor;
use std::io::Write;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Style indexes emitted in `styles.xml`
const STYLE_DATE: usize = 1;
const STYLE_CUSTOM_DATE: usize = 2;
const STYLE_TIME: usize = 3;

/// A cell to place in the generated worksheet
#[derive(Clone, Debug)]
pub(crate) enum FixtureCell {
    Blank,
    /// Text stored in the shared string table
    Text(String),
    /// Text stored inline
    Inline(String),
    Number(f64),
    /// Serial styled with the built-in date format 14
    Date(f64),
    /// Serial styled with a custom `yyyy-mm-dd` format
    CustomDate(f64),
    /// Serial styled with the built-in time format 20
    Time(f64),
    Boolean(bool),
    Error(String),
}

pub(crate) fn text(value: &str) -> FixtureCell {
    FixtureCell::Text(value.to_owned())
}

pub(crate) fn number(value: f64) -> FixtureCell {
    FixtureCell::Number(value)
}

pub(crate) fn date(serial: f64) -> FixtureCell {
    FixtureCell::Date(serial)
}

/// Builds a minimal but complete xlsx package
#[derive(Default)]
pub(crate) struct XlsxBuilder {
    rows: Vec<Vec<FixtureCell>>,
    date1904: bool,
    second_sheet: bool,
    sheet_xml: Option<String>,
    shared_strings_xml: Option<String>,
}

impl XlsxBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn row(mut self, cells: Vec<FixtureCell>) -> Self {
        self.rows.push(cells);
        self
    }

    pub(crate) fn date1904(mut self) -> Self {
        self.date1904 = true;
        self
    }

    /// Adds a second worksheet named `Other` after the first one
    pub(crate) fn second_sheet(mut self) -> Self {
        self.second_sheet = true;
        self
    }

    /// Replaces the generated first worksheet with the given document
    pub(crate) fn sheet_xml(mut self, xml: &str) -> Self {
        self.sheet_xml = Some(xml.to_owned());
        self
    }

    /// Replaces the generated shared string table with the given document
    pub(crate) fn shared_strings_xml(mut self, xml: &str) -> Self {
        self.shared_strings_xml = Some(xml.to_owned());
        self
    }

    pub(crate) fn build(self) -> Vec<u8> {
        let (generated_sheet, generated_strings) = self.render_sheet();
        let sheet = self.sheet_xml.clone().unwrap_or(generated_sheet);
        let strings = self.shared_strings_xml.clone().unwrap_or(generated_strings);

        let mut parts = vec![
            ("[Content_Types].xml", CONTENT_TYPES.to_owned()),
            ("_rels/.rels", ROOT_RELATIONSHIPS.to_owned()),
            ("xl/workbook.xml", self.render_workbook()),
            ("xl/_rels/workbook.xml.rels", self.render_relationships()),
            ("xl/styles.xml", STYLES.to_owned()),
            ("xl/sharedStrings.xml", strings),
            ("xl/worksheets/sheet1.xml", sheet),
        ];
        if self.second_sheet {
            parts.push(("xl/worksheets/sheet2.xml", OTHER_SHEET.to_owned()));
        }

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer.start_file(name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn render_workbook(&self) -> String {
        let mut xml = String::from(concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        ));
        if self.date1904 {
            xml.push_str(r#"<workbookPr date1904="1"/>"#);
        }
        xml.push_str(r#"<sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/>"#);
        if self.second_sheet {
            xml.push_str(r#"<sheet name="Other" sheetId="2" r:id="rId3"/>"#);
        }
        xml.push_str("</sheets></workbook>");
        xml
    }

    fn render_relationships(&self) -> String {
        let mut xml = String::from(concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
            r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        ));
        if self.second_sheet {
            xml.push_str(r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/>"#);
        }
        xml.push_str("</Relationships>");
        xml
    }

    fn render_sheet(&self) -> (String, String) {
        let mut strings = Vec::<String>::new();
        let mut xml = String::from(concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        ));
        for (row, cells) in self.rows.iter().enumerate() {
            xml.push_str(&format!(r#"<row r="{}">"#, row + 1));
            for (col, cell) in cells.iter().enumerate() {
                let reference = index_to_reference(row, col);
                let element = match cell {
                    FixtureCell::Blank => continue,
                    FixtureCell::Text(value) => {
                        strings.push(escape(value));
                        format!(r#"<c r="{reference}" t="s"><v>{}</v></c>"#, strings.len() - 1)
                    }
                    FixtureCell::Inline(value) => format!(
                        r#"<c r="{reference}" t="inlineStr"><is><t>{}</t></is></c>"#,
                        escape(value)
                    ),
                    FixtureCell::Number(value) => format!(r#"<c r="{reference}"><v>{value}</v></c>"#),
                    FixtureCell::Date(value) => {
                        format!(r#"<c r="{reference}" s="{STYLE_DATE}"><v>{value}</v></c>"#)
                    }
                    FixtureCell::CustomDate(value) => {
                        format!(r#"<c r="{reference}" s="{STYLE_CUSTOM_DATE}"><v>{value}</v></c>"#)
                    }
                    FixtureCell::Time(value) => {
                        format!(r#"<c r="{reference}" s="{STYLE_TIME}"><v>{value}</v></c>"#)
                    }
                    FixtureCell::Boolean(value) => {
                        format!(r#"<c r="{reference}" t="b"><v>{}</v></c>"#, u8::from(*value))
                    }
                    FixtureCell::Error(value) => {
                        format!(r#"<c r="{reference}" t="e"><v>{}</v></c>"#, escape(value))
                    }
                };
                xml.push_str(&element);
            }
            xml.push_str("</row>");
        }
        xml.push_str("</sheetData></worksheet>");

        let mut shared = String::from(concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        ));
        for string in strings {
            shared.push_str(&format!("<si><t>{string}</t></si>"));
        }
        shared.push_str("</sst>");
        (xml, shared)
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    "</Types>",
);

const ROOT_RELATIONSHIPS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    "</Relationships>",
);

const STYLES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy\-mm\-dd"/></numFmts>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="4">"#,
    r#"<xf numFmtId="0" xfId="0"/>"#,
    r#"<xf numFmtId="14" xfId="0" applyNumberFormat="1"/>"#,
    r#"<xf numFmtId="164" xfId="0" applyNumberFormat="1"/>"#,
    r#"<xf numFmtId="20" xfId="0" applyNumberFormat="1"/>"#,
    "</cellXfs></styleSheet>",
);

const OTHER_SHEET: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    r#"<row r="1"><c r="A1" t="inlineStr"><is><t>ignored</t></is></c></row>"#,
    "</sheetData></worksheet>",
);
