//! Error types for phishsim.
//!
//! All errors are strongly typed using thiserror and grouped by the layer
//! that raises them. Nothing is retried: every failure propagates to the
//! caller that drives the run.

use thiserror::Error;

use crate::storage::StorageError;

/// Validation errors raised before any work is done.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Field '{field}' must be greater than zero")]
    ZeroCount {
        field: &'static str,
    },

    #[error("Variant mix is invalid: {reason}")]
    InvalidVariantMix {
        reason: String,
    },

    #[error("Unknown user variant '{label}'")]
    UnknownVariant {
        label: String,
    },

    #[error("'{name}' is not a valid SQL identifier")]
    InvalidIdentifier {
        name: String,
    },

    #[error("Query template is incomplete: {reason}")]
    IncompleteQuery {
        reason: String,
    },

    #[error("Query clause '{clause}' may not contain statement separators or comments")]
    InvalidClause {
        clause: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

/// Violations of the outcome contract.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("'{label}' is not a valid simulation outcome")]
    InvalidOutcome {
        label: String,
    },

    #[error("Scripted variant needs at least one outcome")]
    EmptyScript,
}

/// Aggregation query errors.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Query projects columns {actual:?} but caller expected {expected:?}")]
    ShapeMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

/// Errors while writing reports to disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level error type for phishsim.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Contract violation: {0}")]
    Contract(#[from] ContractError),

    #[error("Persistence failure: {0}")]
    Storage(#[from] StorageError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

impl SimError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if a variant or an input broke the outcome contract.
    #[must_use]
    pub const fn is_contract(&self) -> bool {
        matches!(self, Self::Contract(_))
    }

    /// Returns true if this is a persistence failure.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if a query did not project the declared columns.
    #[must_use]
    pub const fn is_query_shape_mismatch(&self) -> bool {
        matches!(self, Self::Query(QueryError::ShapeMismatch { .. }))
    }

    /// Returns true if writing a report failed.
    #[must_use]
    pub const fn is_export(&self) -> bool {
        matches!(self, Self::Export(_))
    }
}

/// Result type alias for phishsim operations.
pub type SimResult<T> = Result<T, SimError>;
