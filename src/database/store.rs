use crate::database::table::quote_identifier;
use crate::error::IngestError;
use duckdb::Connection;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use tracing::debug;
use tracing::warn;

/// Handle to the DuckDB database the uploads land in.
///
/// Connections are handed out per upload and released on drop; the handle
/// also serializes work on the same table across threads.
pub struct Store {
    root: Mutex<Connection>,
    /// Database file, `None` for an in-memory store
    path: Option<PathBuf>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// A table read back from the store, values rendered as text.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSnapshot {
    pub columns: Vec<String>,
    /// Store type names (`BIGINT`, `DECIMAL(18,4)`, ...), one per column
    pub types: Vec<String>,
    /// Rows in insertion order
    pub rows: Vec<Vec<Option<String>>>,
}

impl Store {
    /// Opens (or creates) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let path = path.as_ref().to_path_buf();
        let connection = Connection::open(&path)
            .map_err(|error| IngestError::StorageUnavailable(format!("{}: {error}", path.display())))?;
        Ok(Self::with_connection(connection, Some(path)))
    }

    pub fn in_memory() -> Result<Self, IngestError> {
        let connection = Connection::open_in_memory()
            .map_err(|error| IngestError::StorageUnavailable(error.to_string()))?;
        Ok(Self::with_connection(connection, None))
    }

    fn with_connection(connection: Connection, path: Option<PathBuf>) -> Self {
        Self {
            root: Mutex::new(connection),
            path,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Hands out a connection to the database.
    ///
    /// When the root connection cannot be cloned, a file-backed store reopens
    /// the file once and retries; anything else is `StorageUnavailable`.
    pub fn acquire(&self) -> Result<Connection, IngestError> {
        let mut root = self.root.lock().unwrap_or_else(PoisonError::into_inner);
        let error = match root.try_clone() {
            Ok(connection) => return Ok(connection),
            Err(error) => error,
        };
        let Some(path) = &self.path else {
            return Err(IngestError::StorageUnavailable(error.to_string()));
        };
        warn!(path = %path.display(), %error, "store connection lost, reconnecting");
        *root = Connection::open(path)
            .map_err(|error| IngestError::StorageUnavailable(error.to_string()))?;
        root.try_clone()
            .map_err(|error| IngestError::StorageUnavailable(error.to_string()))
    }

    /// Runs `f` while holding the exclusive lock for `table`.
    ///
    /// Table names are compared case-insensitively, like store identifiers.
    /// Work on different tables proceeds in parallel.
    /// The lock is dropped from the registry once no caller holds or waits on it.
    pub fn with_table_lock<T>(&self, table: &str, f: impl FnOnce() -> T) -> T {
        let key = table.to_ascii_uppercase();
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(key.to_owned()).or_default().clone()
        };
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            debug!(table, "table lock acquired");
            f()
        };
        // Clones are taken and released under the registry lock only, so a
        // single owner left means nobody holds or waits on it
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        drop(lock);
        if locks.get(&key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&key);
        }
        result
    }

    pub fn row_count(&self, table: &str) -> Result<usize, IngestError> {
        let connection = self.acquire()?;
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        let count: i64 = connection.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Reads a whole table back, every value cast to text.
    pub fn read_table(&self, table: &str) -> Result<TableSnapshot, IngestError> {
        let connection = self.acquire()?;
        let mut statement = connection.prepare(
            "SELECT column_name, data_type FROM information_schema.columns \
             WHERE table_name = ? ORDER BY ordinal_position",
        )?;
        let (columns, types): (Vec<String>, Vec<String>) = statement
            .query_map([table], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .unzip();

        // An unknown table has no columns; selecting `*` from it raises the
        // store's own catalog error
        let projection = if columns.is_empty() {
            "*".to_owned()
        } else {
            columns
                .iter()
                .map(|column| format!("CAST({} AS VARCHAR)", quote_identifier(column)))
                .collect::<Vec<String>>()
                .join(", ")
        };
        let sql = format!("SELECT {projection} FROM {} ORDER BY rowid", quote_identifier(table));
        let mut statement = connection.prepare(&sql)?;
        let width = columns.len();
        let rows = statement
            .query_map([], |row| {
                (0..width)
                    .map(|index| row.get::<_, Option<String>>(index))
                    .collect::<Result<Vec<Option<String>>, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TableSnapshot {
            columns,
            types,
            rows,
        })
    }
}

impl TableSnapshot {
    /// Renders the table as tab-separated text: a header line, then one line
    /// per row with nulls left empty.
    pub fn to_tsv(&self) -> String {
        let clean = |value: &str| value.replace(['\t', '\n', '\r'], " ");
        let mut text = self
            .columns
            .iter()
            .map(|column| clean(column.as_str()))
            .collect::<Vec<String>>()
            .join("\t");
        text.push('\n');
        for row in &self.rows {
            let line = row
                .iter()
                .map(|value| value.as_deref().map(clean).unwrap_or_default())
                .collect::<Vec<String>>()
                .join("\t");
            text.push_str(&line);
            text.push('\n');
        }
        text
    }
}
