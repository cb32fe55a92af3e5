use crate::spreadsheet::cell::ANCHOR_TIME;
use crate::spreadsheet::DateSystem;
use crate::spreadsheet::RawCell;
use chrono::NaiveDateTime;
use tracing::debug;

/// Returns true when a header names a date column: it ends with `suffix`,
/// ignoring case.
pub fn is_date_column(header: &str, suffix: &str) -> bool {
    !suffix.is_empty() && header.to_lowercase().ends_with(&suffix.to_lowercase())
}

/// Converts a serial to its calendar date at noon, `None` when the serial
/// is not a representable date.
pub fn anchor_serial(serial: f64, system: DateSystem) -> Option<NaiveDateTime> {
    system
        .serial_to_date(serial)
        .map(|date| date.and_time(ANCHOR_TIME))
}

/// Replaces plain numeric serials in date columns with anchored dates.
///
/// Only cells still holding a number are touched; text, dates the decoder
/// already resolved and every cell outside a date column pass through.
/// Serials that are not valid dates stay numbers. Returns the number of
/// cells converted.
pub fn coerce_date_columns(
    headers: &[String],
    rows: &mut [Vec<RawCell>],
    system: DateSystem,
    suffix: &str,
) -> usize {
    let columns: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, header)| is_date_column(header, suffix))
        .map(|(index, _)| index)
        .collect();
    let mut converted = 0usize;
    for row in rows.iter_mut() {
        for &index in &columns {
            let Some(cell) = row.get_mut(index) else {
                continue;
            };
            if let RawCell::Number(serial) = *cell {
                match anchor_serial(serial, system) {
                    Some(anchored) => {
                        *cell = RawCell::Date(anchored);
                        converted += 1;
                    }
                    None => debug!(column = %headers[index], serial, "not a date serial, kept as number"),
                }
            }
        }
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::column::Column;
    use crate::database::column::SemanticType;
    use crate::database::table::TableSchema;
    use chrono::FixedOffset;
    use chrono::NaiveDate;
    use chrono::NaiveTime;
    use chrono::TimeZone;
    use chrono::Utc;
    use duckdb::types::Value;

    fn new_year() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    }

    #[test]
    fn date_column_names() {
        assert!(is_date_column("Invoice_Date", "Date"));
        assert!(is_date_column("PO_DATE", "Date"));
        assert!(is_date_column("Date", "Date"));
        assert!(!is_date_column("Date_of_Birth", "Date"));
        assert!(!is_date_column("Amount", "Date"));
        assert!(!is_date_column("Amount", ""));
    }

    #[test]
    fn serial_is_anchored_at_noon() {
        let anchored = anchor_serial(44927.0, DateSystem::Excel1900).unwrap();
        assert_eq!(anchored, new_year().and_hms_opt(12, 0, 0).unwrap());
        assert_eq!(anchor_serial(44927.9, DateSystem::Excel1900), Some(anchored));
        assert_eq!(anchor_serial(43465.0, DateSystem::Excel1904), Some(anchored));
        assert_eq!(anchor_serial(60.0, DateSystem::Excel1900), None);
    }

    #[test]
    fn noon_anchor_keeps_the_day_where_midnight_shifts() {
        let noon = Utc.from_utc_datetime(&anchor_serial(44927.0, DateSystem::Excel1900).unwrap());
        let midnight = Utc.from_utc_datetime(&new_year().and_time(NaiveTime::MIN));
        for hours in -12..=11 {
            let offset = FixedOffset::east_opt(hours * 3600).unwrap();
            assert_eq!(noon.with_timezone(&offset).date_naive(), new_year(), "offset {hours}h");
        }
        let behind = FixedOffset::west_opt(3600).unwrap();
        assert_ne!(midnight.with_timezone(&behind).date_naive(), new_year());
    }

    #[test]
    fn anchored_dates_store_their_calendar_day() {
        let schema = TableSchema::new("SALES_DATA", vec![Column {
            name: "Invoice_Date".to_owned(),
            kind: SemanticType::Date,
        }]);
        let mut rows = vec![vec![RawCell::Number(44927.0)], vec![RawCell::Number(44927.75)]];
        coerce_date_columns(&["Invoice_Date".to_owned()], &mut rows, DateSystem::Excel1900, "Date");
        for (index, row) in rows.iter().enumerate() {
            assert_eq!(
                schema.to_values(row, index + 2).unwrap(),
                vec![Value::Text("2023-01-01".to_owned())]
            );
        }
    }

    #[test]
    fn only_numbers_in_date_columns_change() {
        let headers = vec!["Invoice_Date".to_owned(), "Amount".to_owned(), "Due_Date".to_owned()];
        let resolved = new_year().and_hms_opt(0, 0, 0).unwrap();
        let mut rows = vec![
            vec![RawCell::Number(44927.0), RawCell::Number(44927.0), RawCell::Date(resolved)],
            vec![RawCell::Text("pending".to_owned()), RawCell::Null, RawCell::Number(-5.0)],
            vec![RawCell::Null],
        ];
        let converted = coerce_date_columns(&headers, &mut rows, DateSystem::Excel1900, "Date");

        assert_eq!(converted, 1);
        assert_eq!(rows[0], vec![
            RawCell::Date(new_year().and_hms_opt(12, 0, 0).unwrap()),
            RawCell::Number(44927.0),
            RawCell::Date(resolved),
        ]);
        assert_eq!(rows[1], vec![
            RawCell::Text("pending".to_owned()),
            RawCell::Null,
            RawCell::Number(-5.0),
        ]);
        assert_eq!(rows[2], vec![RawCell::Null]);
    }
}
