//! Abstract storage contract.

use thiserror::Error;

use crate::error::SimResult;
use crate::report::ReportTable;
use crate::simulation::SimulationResult;
use crate::storage::QueryParams;

/// Columns of a persisted results table, in order.
pub const RESULT_COLUMNS: [&str; 5] = ["timestamp", "user_id", "type", "name", "outcome"];

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),

    /// Stored data could not be decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Connection failed.
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Storage for flattened simulation results.
///
/// Writes replace the whole table; there is no incremental append across
/// runs. Failures are returned as-is and never retried.
pub trait ResultStore {
    /// Replace `table` with exactly `rows`. Returns the number of rows written.
    fn replace_results(&mut self, table: &str, rows: &[SimulationResult]) -> SimResult<usize>;

    /// Run a read-only aggregation and check its projection against
    /// `result_columns` before reading any row.
    fn query(&self, params: &QueryParams, result_columns: &[&str]) -> SimResult<ReportTable>;

    /// Number of rows currently in `table`.
    fn row_count(&self, table: &str) -> SimResult<usize>;

    /// Read every row of `table` back in insertion order.
    fn load_results(&self, table: &str) -> SimResult<Vec<SimulationResult>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test: ensure the trait is object-safe
    fn _assert_result_store_object_safe(_: &dyn ResultStore) {}

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::BackendError("database is locked".to_string());
        assert!(err.to_string().contains("database is locked"));

        let err = StorageError::ConnectionError("unable to open".to_string());
        assert!(err.to_string().contains("Connection error"));
    }
}
