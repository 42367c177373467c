//! SQLite storage backend.
//!
//! Only this module talks to the database. Writes replace the results table
//! inside a single transaction, so a failed write leaves the previous table
//! in place.

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags};
use tracing::{debug, info};

use crate::error::{QueryError, SimResult};
use crate::outcome::Outcome;
use crate::report::{Cell, ReportTable};
use crate::simulation::SimulationResult;
use crate::storage::query::quote_identifier;
use crate::storage::traits::{ResultStore, StorageError};
use crate::storage::QueryParams;
use crate::user::UserId;

const IN_MEMORY: &str = ":memory:";

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::BackendError(err.to_string())
    }
}

fn cell_from(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null => Cell::Null,
        ValueRef::Integer(v) => Cell::Integer(v),
        ValueRef::Real(v) => Cell::Real(v),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Cell::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Results store backed by a SQLite database.
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) a database file. `":memory:"` opens an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConnectionError` if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if path == Path::new(IN_MEMORY) {
            return Self::in_memory();
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(|e| StorageError::ConnectionError(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "opened results database");
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a private in-memory database (used in tests).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConnectionError` if SQLite cannot allocate it.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::ConnectionError(e.to_string()))?;
        Ok(Self { conn, path: None })
    }

    /// Database file, or `None` for an in-memory store.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// `table` must already be quoted.
    fn write_table(&mut self, table: &str, rows: &[SimulationResult]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table};
             CREATE TABLE {table} (
                 timestamp TEXT NOT NULL,
                 user_id   TEXT NOT NULL,
                 type      TEXT NOT NULL,
                 name      TEXT NOT NULL,
                 outcome   TEXT NOT NULL
             );"
        ))?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {table} (timestamp, user_id, type, name, outcome) VALUES (?1, ?2, ?3, ?4, ?5)"
            ))?;
            for row in rows {
                stmt.execute(params![
                    row.timestamp(),
                    row.user_id().to_string(),
                    row.user_type(),
                    row.name(),
                    row.outcome().as_str(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }
}

impl ResultStore for SqliteStore {
    fn replace_results(&mut self, table: &str, rows: &[SimulationResult]) -> SimResult<usize> {
        let quoted = quote_identifier(table)?;
        let written = self.write_table(&quoted, rows)?;
        info!(table, rows = written, "results table replaced");
        Ok(written)
    }

    fn query(&self, params: &QueryParams, result_columns: &[&str]) -> SimResult<ReportTable> {
        let sql = params.render()?;
        debug!(%sql, "running aggregation");

        let mut stmt = self.conn.prepare(&sql).map_err(StorageError::from)?;
        let actual: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
        if actual.iter().map(String::as_str).ne(result_columns.iter().copied()) {
            return Err(QueryError::ShapeMismatch {
                expected: result_columns.iter().map(|c| (*c).to_string()).collect(),
                actual,
            }
            .into());
        }

        let width = actual.len();
        let mut report = ReportTable::new(actual);
        let mut rows = stmt.query([]).map_err(StorageError::from)?;
        while let Some(row) = rows.next().map_err(StorageError::from)? {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                cells.push(cell_from(row.get_ref(idx).map_err(StorageError::from)?));
            }
            report.rows.push(cells);
        }
        Ok(report)
    }

    fn row_count(&self, table: &str) -> SimResult<usize> {
        let quoted = quote_identifier(table)?;
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {quoted}"), [], |row| row.get(0))
            .map_err(StorageError::from)?;
        usize::try_from(count)
            .map_err(|e| StorageError::SerializationError(format!("row count {count}: {e}")).into())
    }

    fn load_results(&self, table: &str) -> SimResult<Vec<SimulationResult>> {
        let quoted = quote_identifier(table)?;
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT timestamp, user_id, type, name, outcome FROM {quoted} ORDER BY rowid"
            ))
            .map_err(StorageError::from)?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(StorageError::from)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::from)?;

        let mut results = Vec::with_capacity(raw.len());
        for (timestamp, user_id, user_type, name, outcome) in raw {
            let user_id = UserId::parse(&user_id)
                .map_err(|e| StorageError::SerializationError(format!("user_id '{user_id}': {e}")))?;
            let outcome: Outcome = outcome.parse()?;
            results.push(SimulationResult::from_parts(timestamp, user_id, user_type, name, outcome));
        }
        Ok(results)
    }
}
