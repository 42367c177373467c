//! Result persistence and aggregation queries.
//!
//! [`ResultStore`] is the contract the training run and the reports rely on;
//! [`SqliteStore`] is the relational backend.

mod query;
mod sqlite;
mod traits;

pub use query::{quote_identifier, validate_identifier, QueryParams};
pub use sqlite::SqliteStore;
pub use traits::{ResultStore, StorageError, RESULT_COLUMNS};
