//! Reporting and aggregation.
//!
//! Two aggregation shapes are produced from a persisted results table:
//!
//! - per month and variant: `date, type, successes, fails`
//! - per individual: `user_id, name, type, successes, fails, misses`
//!
//! Each shape is a [`QueryParams`] template plus the column names the caller
//! expects back. Results land in a [`ReportTable`] that can be written as CSV
//! or JSON.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ExportError, SimResult};
use crate::storage::{QueryParams, ResultStore};

/// Default file name for the per-month/per-type export.
pub const TYPES_CSV: &str = "visualize_types.csv";

/// Default file name for the per-individual export.
pub const INDIVIDUALS_CSV: &str = "visualize_individuals.csv";

/// Columns of the per-month/per-type aggregation.
pub const TYPES_COLUMNS: [&str; 4] = ["date", "type", "successes", "fails"];

/// Columns of the per-individual aggregation.
pub const INDIVIDUALS_COLUMNS: [&str; 6] = ["user_id", "name", "type", "successes", "fails", "misses"];

/// One value in a report row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Integer(v) => (*v).into(),
            Self::Real(v) => serde_json::Number::from_f64(*v)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Text(v) => serde_json::Value::String(v.clone()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// A tabular query result with caller-named columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a named column.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in the named column.
    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Write as CSV with a header row.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if the file cannot be created or written.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(ToString::to_string))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Records as JSON objects keyed by column name.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, ExportError> {
        let records: Vec<serde_json::Map<String, serde_json::Value>> = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(Cell::to_json))
                    .collect()
            })
            .collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }
}

/// Successes and fails per calendar month and variant, oldest month first.
#[must_use]
pub fn types_by_month(table: &str) -> QueryParams {
    QueryParams::new(table)
        .dimension("strftime('%Y-%m', timestamp) AS date")
        .dimension("type")
        .dimension("COUNT(CASE WHEN outcome = 'SUCCESS' THEN 1 END) AS successes")
        .dimension("COUNT(CASE WHEN outcome = 'FAIL' THEN 1 END) AS fails")
        .group_by("date")
        .group_by("type")
        .order_by("date ASC")
        .order_by("type ASC")
}

/// Successes, fails and misses per user, ordered by display name.
#[must_use]
pub fn individuals(table: &str) -> QueryParams {
    QueryParams::new(table)
        .dimension("user_id")
        .dimension("name")
        .dimension("type")
        .dimension("COUNT(CASE WHEN outcome = 'SUCCESS' THEN 1 END) AS successes")
        .dimension("COUNT(CASE WHEN outcome = 'FAIL' THEN 1 END) AS fails")
        .dimension("COUNT(CASE WHEN outcome = 'MISS' THEN 1 END) AS misses")
        .group_by("user_id")
        .group_by("name")
        .group_by("type")
        .order_by("name ASC")
        .order_by("user_id ASC")
}

/// Run the per-month/per-type aggregation.
///
/// # Errors
///
/// Propagates storage and query-shape errors.
pub fn aggregate_types_by_month(store: &dyn ResultStore, table: &str) -> SimResult<ReportTable> {
    let report = store.query(&types_by_month(table), &TYPES_COLUMNS)?;
    debug!(rows = report.len(), "aggregated results by month and type");
    Ok(report)
}

/// Run the per-individual aggregation.
///
/// # Errors
///
/// Propagates storage and query-shape errors.
pub fn aggregate_individuals(store: &dyn ResultStore, table: &str) -> SimResult<ReportTable> {
    let report = store.query(&individuals(table), &INDIVIDUALS_COLUMNS)?;
    debug!(rows = report.len(), "aggregated results by individual");
    Ok(report)
}

/// Paths of the written report files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedReports {
    pub types: std::path::PathBuf,
    pub individuals: std::path::PathBuf,
}

/// Run both aggregations and write them as CSV into `output_dir`.
///
/// # Errors
///
/// Propagates storage, query-shape and export errors.
pub fn export_reports(
    store: &dyn ResultStore,
    table: &str,
    output_dir: &Path,
) -> SimResult<ExportedReports> {
    let by_type = aggregate_types_by_month(store, table)?;
    let by_user = aggregate_individuals(store, table)?;

    fs::create_dir_all(output_dir).map_err(ExportError::from)?;
    let exported = ExportedReports {
        types: output_dir.join(TYPES_CSV),
        individuals: output_dir.join(INDIVIDUALS_CSV),
    };
    by_type.write_csv(&exported.types)?;
    by_user.write_csv(&exported.individuals)?;

    info!(
        types = %exported.types.display(),
        individuals = %exported.individuals.display(),
        "reports ready for visualization"
    );
    Ok(exported)
}
