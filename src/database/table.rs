use crate::database::column::is_integer;
use crate::database::column::Column;
use crate::database::column::SemanticType;
use crate::database::column::DECIMAL_LIMIT;
use crate::error::IngestError;
use crate::spreadsheet::RawCell;
use duckdb::types::Value;

/// The target table: its name and inferred columns in header order.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<Column>,
}

/// Double-quotes an identifier, doubling embedded quotes.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl TableSchema {
    pub fn new(name: &str, columns: Vec<Column>) -> Self {
        Self {
            name: name.to_owned(),
            columns,
        }
    }

    /// Drop-if-exists followed by create, every column nullable.
    pub fn ddl(&self) -> String {
        let table = quote_identifier(&self.name);
        let columns = self
            .columns
            .iter()
            .map(|column| format!("{} {}", quote_identifier(&column.name), column.kind.as_str()))
            .collect::<Vec<String>>()
            .join(", ");
        format!("DROP TABLE IF EXISTS {table};\nCREATE TABLE {table} ({columns});")
    }

    /// Coerces one cell to the value stored in column `index`.
    ///
    /// `row` is the 1-based sheet row reported when coercion fails.
    pub fn to_value(&self, index: usize, cell: &RawCell, row: usize) -> Result<Value, IngestError> {
        let Some(column) = self.columns.get(index) else {
            return Ok(Value::Null);
        };
        let mismatch = || IngestError::TypeCoercion {
            row,
            column: column.name.to_owned(),
            value: cell.to_text(),
            expected: column.kind,
        };
        let value = match (column.kind, cell) {
            (_, RawCell::Null) => Value::Null,
            (SemanticType::Text, _) => Value::Text(cell.to_text()),
            (SemanticType::Integer, RawCell::Number(value)) if is_integer(*value) => {
                Value::BigInt(*value as i64)
            }
            (SemanticType::Decimal, RawCell::Number(value))
                if value.is_finite() && value.abs() < DECIMAL_LIMIT =>
            {
                Value::Double(*value)
            }
            (SemanticType::Date, RawCell::Date(value)) => {
                Value::Text(value.date().format("%Y-%m-%d").to_string())
            }
            _ => return Err(mismatch()),
        };
        Ok(value)
    }

    /// Coerces a whole row, padding missing trailing cells with nulls.
    pub fn to_values(&self, cells: &[RawCell], row: usize) -> Result<Vec<Value>, IngestError> {
        (0..self.columns.len())
            .map(|index| match cells.get(index) {
                Some(cell) => self.to_value(index, cell, row),
                None => Ok(Value::Null),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn schema() -> TableSchema {
        TableSchema::new("SALES_DATA", vec![
            Column { name: "Invoice_Date".to_owned(), kind: SemanticType::Date },
            Column { name: "Qty".to_owned(), kind: SemanticType::Integer },
            Column { name: "Amount".to_owned(), kind: SemanticType::Decimal },
            Column { name: "Say \"hi\"".to_owned(), kind: SemanticType::Text },
        ])
    }

    #[test]
    fn ddl_drops_then_creates() {
        assert_eq!(
            schema().ddl(),
            "DROP TABLE IF EXISTS \"SALES_DATA\";\n\
             CREATE TABLE \"SALES_DATA\" (\"Invoice_Date\" DATE, \"Qty\" BIGINT, \
             \"Amount\" DECIMAL(18,4), \"Say \"\"hi\"\"\" VARCHAR);"
        );
    }

    #[test]
    fn coerces_matching_values() {
        let schema = schema();
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let values = schema
            .to_values(&[RawCell::Date(date), RawCell::Number(4.0), RawCell::Number(2.5)], 2)
            .unwrap();
        assert_eq!(values, vec![
            Value::Text("2023-01-01".to_owned()),
            Value::BigInt(4),
            Value::Double(2.5),
            Value::Null,
        ]);
    }

    #[test]
    fn text_columns_stringify() {
        let schema = schema();
        assert_eq!(schema.to_value(3, &RawCell::Number(7.0), 2).unwrap(), Value::Text("7".to_owned()));
        assert_eq!(schema.to_value(3, &RawCell::Boolean(false), 2).unwrap(), Value::Text("false".to_owned()));
        assert_eq!(schema.to_value(3, &RawCell::Null, 2).unwrap(), Value::Null);
    }

    #[test]
    fn dates_in_text_columns_share_one_format() {
        let schema = schema();
        let day = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let anchored = RawCell::Date(day.and_hms_opt(12, 0, 0).unwrap());
        let resolved = RawCell::Date(day.and_hms_opt(0, 0, 0).unwrap());
        let timed = RawCell::Date(day.and_hms_opt(8, 15, 0).unwrap());
        assert_eq!(schema.to_value(3, &anchored, 2).unwrap(), Value::Text("2023-01-01".to_owned()));
        assert_eq!(schema.to_value(3, &resolved, 3).unwrap(), Value::Text("2023-01-01".to_owned()));
        assert_eq!(schema.to_value(3, &timed, 4).unwrap(), Value::Text("2023-01-01 08:15:00".to_owned()));
    }

    #[test]
    fn rejects_values_outside_the_column_type() {
        let schema = schema();
        let error = schema.to_value(1, &RawCell::Number(1.5), 5).unwrap_err();
        assert!(matches!(
            error,
            IngestError::TypeCoercion { row: 5, ref column, expected: SemanticType::Integer, .. } if column == "Qty"
        ));
        assert!(schema.to_value(2, &RawCell::Number(1e14), 2).is_err());
        assert!(schema.to_value(2, &RawCell::Number(f64::INFINITY), 2).is_err());
        assert!(schema.to_value(0, &RawCell::Number(44927.0), 2).is_err());
        assert!(schema.to_value(1, &RawCell::Text("4".to_owned()), 2).is_err());
    }
}
