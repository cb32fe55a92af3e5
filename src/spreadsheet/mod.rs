//! # Workbook decoding
//!
//! Turns the raw bytes of an `.xlsx` upload into a rectangular grid of
//! [`RawCell`] values taken from the first worksheet. Shared strings, rich
//! text, date-styled numbers and both date systems are resolved here so the
//! rest of the pipeline only deals with plain values.
pub(crate) mod cell;
pub(crate) mod excel;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod xlsx;

#[cfg(test)]
pub(crate) mod fixture;

pub use crate::spreadsheet::cell::DateSystem;
pub use crate::spreadsheet::cell::RawCell;
use crate::spreadsheet::xlsx::XlsxWorkbook;
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

/// Errors raised while decoding a workbook
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("Invalid attribute value '{0}'")]
    AttributeValue(String),

    #[error("Unknown XML entity '&{0};'")]
    Entity(String),

    #[error("Missing workbook part '{0}'")]
    MissingPart(String),

    #[error("Workbook contains no worksheets")]
    NoSheets,

    #[error("Invalid cell value at '{reference}': {value}")]
    CellValue { reference: String, value: String },

    #[error("Sheet spans {rows} rows by {columns} columns, more than {limit} cells")]
    TooLarge { rows: usize, columns: usize, limit: usize },
}

/// Default cap on the cells of the decoded grid
pub const DEFAULT_MAX_CELLS: usize = 10_000_000;

/// Options that change how cells are decoded
#[derive(Clone, Debug)]
pub struct DecodeOptions {
    /// Decode error cells (`#N/A`, `#DIV/0!`) as null instead of failing
    pub error_as_null: bool,
    /// Largest grid (rows times columns) the decoder lays out
    pub max_cells: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            error_as_null: true,
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

/// The first worksheet of a workbook as a rectangular grid
#[derive(Clone, Debug, PartialEq)]
pub struct Workbook {
    pub sheet_name: String,
    pub date_system: DateSystem,
    /// Rows from the header row down to the last row with a cell under it,
    /// all as wide as the header row. Empty when the sheet holds no cells.
    pub rows: Vec<Vec<RawCell>>,
}

/// Decodes the first worksheet of an xlsx workbook held in memory.
pub fn decode_workbook(bytes: &[u8], options: &DecodeOptions) -> Result<Workbook, DecodeError> {
    let mut workbook = XlsxWorkbook::open(Cursor::new(bytes))?;
    let shared_strings = workbook.load_shared_strings()?;
    let sheet = workbook.read_first_sheet(&shared_strings, options.error_as_null)?;
    let date_system = workbook.date_system;
    let sheet_name = sheet.name.to_owned();
    let rows = sheet.into_rows(date_system, options.max_cells)?;
    debug!(
        sheet = %sheet_name,
        ?date_system,
        shared_strings = shared_strings.len(),
        rows = rows.len(),
        "decoded workbook"
    );
    Ok(Workbook {
        sheet_name,
        date_system,
        rows,
    })
}
