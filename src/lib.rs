//! # Spreadsheet Upload Loader
//!
//! Loads `.xlsx` uploads into DuckDB, one table per report kind. Each upload
//! fully replaces its table: the schema is inferred again from the file every
//! time.
//!
//! ## Pipeline
//!
//! - **Decode**: the first worksheet becomes a rectangular grid of cells
//!   (text, number, date, boolean or null), resolving shared strings, date
//!   formats and both spreadsheet date systems
//! - **Headers**: the first row becomes unique, whitespace-free column names
//!   (`Amount`, `Amount_2`, `Invoice_Date`)
//! - **Dates**: numeric serials in columns named `...Date` become calendar
//!   dates anchored at noon
//! - **Types**: each column is `DATE`, `BIGINT`, `DECIMAL(18,4)` or `VARCHAR`,
//!   chosen only when every value agrees
//! - **Load**: the table is dropped and recreated, then all rows are appended
//!   in a single transaction
//!
//! ## Example
//!
//! ```no_run
//! use rusty_sheet_loader::config::LoaderConfig;
//! use rusty_sheet_loader::ingest::Ingestor;
//!
//! let config = LoaderConfig::load("config/reports.toml")?;
//! let ingestor = Ingestor::from_config(&config)?;
//! let bytes = std::fs::read("sales.xlsx")?;
//! let report = ingestor.ingest("SALES", &bytes)?;
//! println!("Inserted {} rows into {}", report.rows_written, report.table_name);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod config;
pub mod database;
pub mod error;
mod helpers;
pub mod ingest;
pub mod spreadsheet;

pub use crate::error::ErrorCategory;
pub use crate::error::IngestError;
pub use crate::ingest::IngestReport;
pub use crate::ingest::Ingestor;
