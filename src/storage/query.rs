//! Templated aggregation queries.
//!
//! A [`QueryParams`] describes `{dimensions, table, group by, order by}` and
//! renders to a single `SELECT` statement. The table name must be a plain
//! identifier; clauses may not smuggle in extra statements.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]{0,62}$";

static IDENTIFIER: OnceLock<Option<Regex>> = OnceLock::new();

/// Check that `name` can be used verbatim as a table name.
///
/// # Errors
///
/// Returns `ValidationError::InvalidIdentifier` otherwise.
pub fn validate_identifier(name: &str) -> Result<(), ValidationError> {
    let valid = IDENTIFIER
        .get_or_init(|| Regex::new(IDENTIFIER_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(name));
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}

/// Validate `name` and quote it for use as a table name.
///
/// # Errors
///
/// Returns `ValidationError::InvalidIdentifier` if `name` is not a plain identifier.
pub fn quote_identifier(name: &str) -> Result<String, ValidationError> {
    validate_identifier(name)?;
    Ok(format!("\"{name}\""))
}

fn validate_clause(clause: &str) -> Result<(), ValidationError> {
    if clause.trim().is_empty() {
        return Err(ValidationError::IncompleteQuery {
            reason: "empty clause".to_string(),
        });
    }
    if clause.contains(';') || clause.contains("--") || clause.contains("/*") {
        return Err(ValidationError::InvalidClause {
            clause: clause.to_string(),
        });
    }
    Ok(())
}

/// Parameters of an aggregation query.
///
/// # Examples
///
/// ```
/// use phishsim::QueryParams;
///
/// let sql = QueryParams::new("results")
///     .dimension("type")
///     .dimension("COUNT(*) AS total")
///     .group_by("type")
///     .order_by("type ASC")
///     .render()
///     .unwrap();
/// assert_eq!(
///     sql,
///     r#"SELECT type, COUNT(*) AS total FROM "results" GROUP BY type ORDER BY type ASC"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryParams {
    pub dimensions: Vec<String>,
    pub table: String,
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default)]
    pub order_by: Vec<String>,
}

impl QueryParams {
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Add a projected expression (optionally `expr AS alias`).
    #[must_use]
    pub fn dimension(mut self, expr: impl Into<String>) -> Self {
        self.dimensions.push(expr.into());
        self
    }

    #[must_use]
    pub fn group_by(mut self, expr: impl Into<String>) -> Self {
        self.group_by.push(expr.into());
        self
    }

    #[must_use]
    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by.push(expr.into());
        self
    }

    /// Render the `SELECT` statement.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid table name, no dimensions, or
    /// a clause that is empty or contains `;`, `--` or `/*`.
    pub fn render(&self) -> Result<String, ValidationError> {
        let table = quote_identifier(&self.table)?;
        if self.dimensions.is_empty() {
            return Err(ValidationError::IncompleteQuery {
                reason: "at least one dimension is required".to_string(),
            });
        }
        for clause in self.dimensions.iter().chain(&self.group_by).chain(&self.order_by) {
            validate_clause(clause)?;
        }

        let mut sql = format!("SELECT {} FROM {table}", self.dimensions.join(", "));
        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }
        Ok(sql)
    }
}
