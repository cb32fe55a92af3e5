use crate::database::table::TableSchema;
use crate::error::IngestError;
use crate::spreadsheet::RawCell;
use duckdb::appender_params_from_iter;
use duckdb::Connection;
use tracing::debug;

/// Appends every row to the (already created) table in one transaction.
///
/// Row `i` of `rows` is reported as sheet row `i + 2` on coercion failure.
/// Values the store itself refuses are reported as [`IngestError::Load`].
/// Any error rolls the transaction back, so either all rows land or none.
pub fn load_rows(
    connection: &mut Connection,
    schema: &TableSchema,
    rows: &[Vec<RawCell>],
) -> Result<usize, IngestError> {
    let transaction = connection.transaction()?;
    {
        let mut appender = transaction.appender(&schema.name)?;
        for (index, row) in rows.iter().enumerate() {
            let values = schema.to_values(row, index + 2)?;
            appender
                .append_row(appender_params_from_iter(values))
                .map_err(|source| IngestError::Load { row: Some(index + 2), source })?;
        }
        appender
            .flush()
            .map_err(|source| IngestError::Load { row: None, source })?;
    }
    transaction.commit()?;
    debug!(table = %schema.name, rows = rows.len(), "bulk load committed");
    Ok(rows.len())
}
