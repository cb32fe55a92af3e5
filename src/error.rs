use crate::database::column::SemanticType;
use crate::spreadsheet::DecodeError;
use std::fmt;
use thiserror::Error;

/// Errors an upload can fail with.
/// Every stage fails fast; the first error aborts the whole upload.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Cannot decode workbook: {0}")]
    Decode(#[from] DecodeError),

    #[error("Workbook needs a header row and at least one data row, found {rows} row(s)")]
    InsufficientData { rows: usize },

    #[error("Cannot store '{value}' as {expected} in column '{column}' at row {row}")]
    TypeCoercion {
        /// 1-based sheet row, the header being row 1
        row: usize,
        column: String,
        value: String,
        expected: SemanticType,
    },

    #[error("Store rejected the data{}: {source}", .row.map(|row| format!(" at row {row}")).unwrap_or_default())]
    Load {
        /// 1-based sheet row, when the store rejected a single row
        row: Option<usize>,
        source: duckdb::Error,
    },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("{0}")]
    Database(#[from] duckdb::Error),

    #[error("Invalid report kind '{0}'")]
    InvalidReportKind(String),

    #[error("Header mismatch: missing [{}], unexpected [{}]", .missing.join(", "), .extra.join(", "))]
    HeaderMismatch {
        missing: Vec<String>,
        extra: Vec<String>,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Coarse failure classes callers map to their own status codes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    Decode,
    InsufficientData,
    TypeCoercion,
    StorageUnavailable,
    InvalidRequest,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Decode => "decode",
            ErrorCategory::InsufficientData => "insufficient_data",
            ErrorCategory::TypeCoercion => "type_coercion",
            ErrorCategory::StorageUnavailable => "storage_unavailable",
            ErrorCategory::InvalidRequest => "invalid_request",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IngestError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            IngestError::Decode(_) => ErrorCategory::Decode,
            IngestError::InsufficientData { .. } => ErrorCategory::InsufficientData,
            IngestError::TypeCoercion { .. } | IngestError::Load { .. } => ErrorCategory::TypeCoercion,
            IngestError::StorageUnavailable(_) | IngestError::Database(_) => {
                ErrorCategory::StorageUnavailable
            }
            IngestError::InvalidReportKind(_)
            | IngestError::HeaderMismatch { .. }
            | IngestError::Config(_) => ErrorCategory::InvalidRequest,
        }
    }
}
