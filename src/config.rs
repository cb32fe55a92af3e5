//! Loader configuration and the catalog of known report kinds.

use crate::error::IngestError;
use crate::ingest::IngestOptions;
use crate::spreadsheet::DEFAULT_MAX_CELLS;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Suffix appended to the upper-cased report kind to name its table
pub const TABLE_SUFFIX: &str = "_DATA";

/// Settings for one report kind
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Header names an upload of this kind must carry, in display order
    pub required_columns: Vec<String>,
}

/// Top-level configuration, usually read from a TOML file.
///
/// ```toml
/// database = "uploads.duckdb"
/// date_column_suffix = "Date"
/// error_as_null = true
/// enforce_required_columns = true
/// max_cells = 10000000
///
/// [reports.SALES]
/// required_columns = ["Sales Org", "Plant"]
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Database file; an in-memory store when absent
    pub database: Option<PathBuf>,
    /// Headers ending with this (ignoring case) hold dates
    pub date_column_suffix: String,
    /// Decode spreadsheet error cells as null instead of rejecting the file
    pub error_as_null: bool,
    /// Reject uploads whose header row differs from the report's required columns
    pub enforce_required_columns: bool,
    /// Largest decoded sheet area, in cells, an upload may span
    pub max_cells: usize,
    pub reports: BTreeMap<String, ReportConfig>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            database: None,
            date_column_suffix: "Date".to_owned(),
            error_as_null: true,
            enforce_required_columns: false,
            max_cells: DEFAULT_MAX_CELLS,
            reports: BTreeMap::new(),
        }
    }
}

impl LoaderConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, IngestError> {
        toml::from_str(text).map_err(|error| IngestError::Config(error.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|error| IngestError::Config(format!("{}: {error}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn catalog(&self) -> ReportCatalog {
        ReportCatalog::new(
            self.reports
                .iter()
                .map(|(kind, report)| (kind.to_owned(), report.required_columns.to_owned())),
        )
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            date_column_suffix: self.date_column_suffix.to_owned(),
            error_as_null: self.error_as_null,
            enforce_required_columns: self.enforce_required_columns,
            max_cells: self.max_cells,
        }
    }
}

/// Known report kinds and their required columns.
///
/// An empty catalog accepts any well-formed report kind.
#[derive(Clone, Debug, Default)]
pub struct ReportCatalog {
    /// Required columns keyed by upper-cased report kind
    reports: BTreeMap<String, Vec<String>>,
}

impl ReportCatalog {
    pub fn new(reports: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        Self {
            reports: reports
                .into_iter()
                .map(|(kind, columns)| (kind.to_ascii_uppercase(), columns))
                .collect(),
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.reports.keys().map(String::as_str)
    }

    pub fn required_columns(&self, kind: &str) -> Option<&[String]> {
        self.reports.get(&kind.to_ascii_uppercase()).map(Vec::as_slice)
    }

    /// Validates a report kind and derives its table name (`SALES` → `SALES_DATA`).
    pub fn table_name(&self, kind: &str) -> Result<String, IngestError> {
        let pattern = Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("Hardcode regex pattern");
        let kind = kind.trim();
        let upper = kind.to_ascii_uppercase();
        if !pattern.is_match(kind) || (!self.reports.is_empty() && !self.reports.contains_key(&upper)) {
            return Err(IngestError::InvalidReportKind(kind.to_owned()));
        }
        Ok(format!("{upper}{TABLE_SUFFIX}"))
    }

    /// Compares trimmed header text with the report's required columns.
    ///
    /// Blank headers are ignored. A kind without configured columns accepts
    /// any header row.
    pub fn validate_headers(&self, kind: &str, headers: &[String]) -> Result<(), IngestError> {
        let Some(required) = self.required_columns(kind) else {
            return Ok(());
        };
        let headers: Vec<&str> = headers
            .iter()
            .map(|header| header.trim())
            .filter(|header| !header.is_empty())
            .collect();
        let mut missing = Vec::<String>::new();
        for column in required {
            if !headers.contains(&column.as_str()) && !missing.contains(column) {
                missing.push(column.to_owned());
            }
        }
        let mut extra = Vec::<String>::new();
        for header in headers {
            if !required.iter().any(|column| column == header) && !extra.iter().any(|it| it == header) {
                extra.push(header.to_owned());
            }
        }
        if missing.is_empty() && extra.is_empty() {
            Ok(())
        } else {
            Err(IngestError::HeaderMismatch { missing, extra })
        }
    }
}
