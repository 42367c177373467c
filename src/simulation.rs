//! Simulation results.
//!
//! A [`SimulationResult`] is the immutable record of one completed phishing
//! simulation for one user. Results are created by
//! [`User::complete_simulation`](crate::User::complete_simulation) and never
//! change afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::outcome::Outcome;
use crate::user::UserId;

/// Second-precision timestamp layout used for persisted results.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a point in time the way results are stored.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// One completed simulation event.
///
/// Fields are private; the record is read through accessors only.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use phishsim::{Outcome, SimulationResult, UserId};
///
/// let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
/// let result = SimulationResult::new(at, UserId::nil(), "QuickLearner", "Ann", Outcome::Success);
/// assert_eq!(result.timestamp(), "2024-03-01 09:30:00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimulationResult {
    timestamp: String,
    user_id: UserId,
    #[serde(rename = "type")]
    user_type: String,
    name: String,
    outcome: Outcome,
}

impl SimulationResult {
    /// Creates a result; `at` is truncated to whole seconds.
    #[must_use]
    pub fn new(
        at: DateTime<Utc>,
        user_id: UserId,
        user_type: impl Into<String>,
        name: impl Into<String>,
        outcome: Outcome,
    ) -> Self {
        Self::from_parts(format_timestamp(at), user_id, user_type, name, outcome)
    }

    /// Creates a result from an already formatted timestamp (e.g. a persisted row).
    #[must_use]
    pub fn from_parts(
        timestamp: impl Into<String>,
        user_id: UserId,
        user_type: impl Into<String>,
        name: impl Into<String>,
        outcome: Outcome,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            user_id,
            user_type: user_type.into(),
            name: name.into(),
            outcome,
        }
    }

    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Variant label of the user that produced this result.
    #[must_use]
    pub fn user_type(&self) -> &str {
        &self.user_type
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }
}
