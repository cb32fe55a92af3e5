use crate::spreadsheet::RawCell;
use std::fmt;

/// Largest magnitude (exclusive) a fixed-point(18,4) column can hold.
pub(crate) const DECIMAL_LIMIT: f64 = 1e14;

/// Storage type inferred for a column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SemanticType {
    /// Calendar date
    Date,
    /// 64-bit signed integer
    Integer,
    /// Fixed-point number, 18 digits with 4 after the point
    Decimal,
    /// Variable-length string
    Text,
}

/// A named, typed column of the target table.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// Normalized header name
    pub name: String,
    pub kind: SemanticType,
}

impl SemanticType {
    /// Returns the DuckDB type name used in DDL.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Date => "DATE",
            SemanticType::Integer => "BIGINT",
            SemanticType::Decimal => "DECIMAL(18,4)",
            SemanticType::Text => "VARCHAR",
        }
    }

    /// Returns the narrowest type a single value supports, `None` for null.
    pub(crate) fn from(cell: &RawCell) -> Option<Self> {
        match cell {
            RawCell::Null => None,
            RawCell::Date(_) => Some(SemanticType::Date),
            RawCell::Number(value) if is_integer(*value) => Some(SemanticType::Integer),
            RawCell::Number(_) => Some(SemanticType::Decimal),
            RawCell::Text(_) | RawCell::Boolean(_) => Some(SemanticType::Text),
        }
    }

    /// Picks the one type every candidate agrees on.
    ///
    /// Nulls carry no evidence. No candidates at all, or any disagreement
    /// beyond integer-vs-decimal, gives `Text`; a single stray value is
    /// enough to demote the column.
    pub fn detect(types: impl IntoIterator<Item = Option<SemanticType>>) -> SemanticType {
        let types: Vec<SemanticType> = types.into_iter().flatten().collect();
        if types.is_empty() {
            SemanticType::Text
        } else if types.iter().all(|kind| kind.is_date()) {
            SemanticType::Date
        } else if types.iter().all(|kind| kind.is_int()) {
            SemanticType::Integer
        } else if types.iter().all(|kind| kind.is_numeric()) {
            SemanticType::Decimal
        } else {
            SemanticType::Text
        }
    }

    #[inline]
    pub(crate) fn is_date(&self) -> bool {
        matches!(self, SemanticType::Date)
    }

    #[inline]
    pub(crate) fn is_int(&self) -> bool {
        matches!(self, SemanticType::Integer)
    }

    /// Returns true for integer and decimal types.
    #[inline]
    pub(crate) fn is_numeric(&self) -> bool {
        matches!(self, SemanticType::Integer | SemanticType::Decimal)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integral and representable as `i64`.
pub(crate) fn is_integer(value: f64) -> bool {
    // i64::MAX as f64 rounds up to 2^63, hence the strict bound
    value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64
}

/// Infers one column per header from every value in its position.
///
/// Rows must already be aligned to the header width; positions past the end
/// of a row count as null.
pub fn infer_columns(headers: &[String], rows: &[Vec<RawCell>]) -> Vec<Column> {
    headers
        .iter()
        .enumerate()
        .map(|(index, name)| Column {
            name: name.to_owned(),
            kind: SemanticType::detect(
                rows.iter()
                    .map(|row| row.get(index).and_then(SemanticType::from)),
            ),
        })
        .collect()
}
