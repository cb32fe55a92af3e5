//! # Upload pipeline
//!
//! One upload runs strictly in sequence: decode the workbook, normalize the
//! header row, coerce date serials, infer column types, recreate the target
//! table and bulk load the rows. The first failure aborts the upload.
pub mod date;
pub mod header;

use crate::config::LoaderConfig;
use crate::config::ReportCatalog;
use crate::database::column::infer_columns;
use crate::database::loader::load_rows;
use crate::database::store::Store;
use crate::database::table::TableSchema;
use crate::error::IngestError;
use crate::ingest::date::coerce_date_columns;
use crate::ingest::header::normalize_headers;
use crate::spreadsheet::decode_workbook;
use crate::spreadsheet::DecodeOptions;
use crate::spreadsheet::DEFAULT_MAX_CELLS;
use crate::spreadsheet::RawCell;
use crate::spreadsheet::Workbook;
use std::sync::Arc;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Per-upload behavior switches
#[derive(Clone, Debug, PartialEq)]
pub struct IngestOptions {
    /// Headers ending with this (ignoring case) are date columns
    pub date_column_suffix: String,
    /// Decode spreadsheet error cells as null
    pub error_as_null: bool,
    /// Check the raw header row against the report's required columns
    pub enforce_required_columns: bool,
    /// Largest decoded grid accepted, in cells
    pub max_cells: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            date_column_suffix: "Date".to_owned(),
            error_as_null: true,
            enforce_required_columns: false,
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

/// Outcome of a successful upload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestReport {
    pub table_name: String,
    pub rows_written: usize,
}

/// Runs uploads against a store.
///
/// Cheap to share between threads; uploads for the same report kind are
/// serialized, other uploads run in parallel.
pub struct Ingestor {
    store: Arc<Store>,
    catalog: ReportCatalog,
    options: IngestOptions,
}

impl Ingestor {
    pub fn new(store: Arc<Store>, catalog: ReportCatalog, options: IngestOptions) -> Self {
        Self {
            store,
            catalog,
            options,
        }
    }

    /// Opens the configured database (in memory when none is set).
    pub fn from_config(config: &LoaderConfig) -> Result<Self, IngestError> {
        let store = match &config.database {
            Some(path) => Store::open(path)?,
            None => Store::in_memory()?,
        };
        Ok(Self::new(Arc::new(store), config.catalog(), config.ingest_options()))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn catalog(&self) -> &ReportCatalog {
        &self.catalog
    }

    /// Replaces the report's table with the content of an xlsx upload.
    pub fn ingest(&self, report: &str, bytes: &[u8]) -> Result<IngestReport, IngestError> {
        let table_name = self.catalog.table_name(report)?;
        info!(report, table = %table_name, bytes = bytes.len(), "upload started");
        let result = self.run(report, &table_name, bytes);
        match &result {
            Ok(outcome) => info!(table = %outcome.table_name, rows = outcome.rows_written, "upload finished"),
            Err(error) => warn!(table = %table_name, category = %error.category(), %error, "upload failed"),
        }
        result
    }

    fn run(&self, report: &str, table_name: &str, bytes: &[u8]) -> Result<IngestReport, IngestError> {
        let options = DecodeOptions {
            error_as_null: self.options.error_as_null,
            max_cells: self.options.max_cells,
        };
        let Workbook {
            sheet_name,
            date_system,
            mut rows,
        } = decode_workbook(bytes, &options)?;
        if rows.len() < 2 {
            return Err(IngestError::InsufficientData { rows: rows.len() });
        }
        let mut data = rows.split_off(1);
        let header_row = &rows[0];

        if self.options.enforce_required_columns {
            let raw: Vec<String> = header_row.iter().map(RawCell::to_text).collect();
            self.catalog.validate_headers(report, &raw)?;
        }

        let headers = normalize_headers(header_row);
        for row in data.iter_mut() {
            row.resize(headers.len(), RawCell::Null);
        }
        debug!(sheet = %sheet_name, rows = data.len(), ?headers, "decoded upload");

        let converted = coerce_date_columns(
            &headers,
            &mut data,
            date_system,
            &self.options.date_column_suffix,
        );
        let columns = infer_columns(&headers, &data);
        debug!(
            converted,
            types = ?columns.iter().map(|column| column.kind.as_str()).collect::<Vec<_>>(),
            "inferred columns"
        );

        let schema = TableSchema::new(table_name, columns);
        let rows_written = self.store.with_table_lock(table_name, || {
            let mut connection = self.store.acquire()?;
            let ddl = schema.ddl();
            debug!(%ddl, "recreating table");
            connection.execute_batch(&ddl)?;
            load_rows(&mut connection, &schema, &data)
        })?;
        Ok(IngestReport {
            table_name: table_name.to_owned(),
            rows_written,
        })
    }
}
