//! Training orchestration.
//!
//! An [`Organization`] owns a population of users and drives them through a
//! schedule of simulation rounds. Every user completes exactly one simulation
//! per round, one user at a time.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::distributions::{Distribution, WeightedIndex};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{schedule_end, TrainingConfig};
use crate::error::{SimError, SimResult, ValidationError};
use crate::outcome::Outcome;
use crate::rng::SimRng;
use crate::simulation::SimulationResult;
use crate::user::User;

const SECONDS_PER_DAY: i64 = 86_400;

/// Outcome counts for one variant label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub users: usize,
    pub successes: usize,
    pub misses: usize,
    pub fails: usize,
}

impl OutcomeCounts {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.successes += 1,
            Outcome::Miss => self.misses += 1,
            Outcome::Fail => self.fails += 1,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.successes + self.misses + self.fails
    }
}

/// Per-variant totals of a training run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrainingSummary {
    pub rounds_completed: usize,
    pub by_type: BTreeMap<String, OutcomeCounts>,
}

/// A population of users and the schedule they train on.
pub struct Organization {
    users: Vec<User>,
    n_simulations: usize,
    start: DateTime<Utc>,
    training_interval_days: u32,
    rounds_completed: usize,
}

impl Organization {
    /// Builds `config.n_users` users, sampling variants from the weighted mix.
    ///
    /// Users get their own generator streams derived from `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the config is invalid.
    pub fn new(config: &TrainingConfig) -> SimResult<Self> {
        let config = config.clone().validate()?;
        let mut master = SimRng::new(config.seed);

        let weights: Vec<f64> = config.variants.iter().map(|v| v.weight).collect();
        let mix = WeightedIndex::new(&weights).map_err(|e| ValidationError::InvalidVariantMix {
            reason: e.to_string(),
        })?;

        let streams = master.partition(config.n_users);
        let users = streams
            .into_iter()
            .map(|rng| {
                let kind = config.variants[mix.sample(&mut master)].kind;
                User::of_kind(kind, rng)
            })
            .collect();

        let organization = Self::with_users(
            users,
            config.n_simulations,
            config.start,
            config.training_interval_days,
        )?;
        info!(%organization, "organization created");
        Ok(organization)
    }

    /// Wraps an existing population.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ZeroCount` if `n_simulations` or
    /// `training_interval_days` is zero, or `ValidationError::InvalidConfig`
    /// if the programme ends outside the supported date range.
    pub fn with_users(
        users: Vec<User>,
        n_simulations: usize,
        start: DateTime<Utc>,
        training_interval_days: u32,
    ) -> SimResult<Self> {
        if n_simulations == 0 {
            return Err(ValidationError::ZeroCount {
                field: "n_simulations",
            }
            .into());
        }
        if training_interval_days == 0 {
            return Err(ValidationError::ZeroCount {
                field: "training_interval_days",
            }
            .into());
        }
        schedule_end(start, training_interval_days)?;
        Ok(Self {
            users,
            n_simulations,
            start,
            training_interval_days,
            rounds_completed: 0,
        })
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Rounds completed by every user so far.
    #[must_use]
    pub const fn rounds_completed(&self) -> usize {
        self.rounds_completed
    }

    /// Timestamps of every round, evenly spread over the training interval.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` if a round falls outside the
    /// supported date range.
    pub fn training_schedule(&self) -> SimResult<Vec<DateTime<Utc>>> {
        let interval = i128::from(self.training_interval_days) * i128::from(SECONDS_PER_DAY);
        let rounds = i128::try_from(self.n_simulations).unwrap_or(i128::MAX);
        (0..self.n_simulations)
            .map(|k| {
                i128::try_from(k)
                    .ok()
                    .and_then(|k| i64::try_from(k * interval / rounds).ok())
                    .and_then(|offset| self.start.checked_add_signed(Duration::seconds(offset)))
                    .ok_or_else(|| {
                        SimError::from(ValidationError::InvalidConfig {
                            reason: format!("training round {k} falls outside the supported date range"),
                        })
                    })
            })
            .collect()
    }

    /// Runs the whole schedule.
    ///
    /// # Errors
    ///
    /// Stops at the first contract violation and returns it.
    pub fn do_training(&mut self) -> SimResult<()> {
        for (round, at) in self.training_schedule()?.into_iter().enumerate() {
            self.run_round(at)?;
            debug!(round, at = %at, "training round completed");
        }
        info!(
            users = self.users.len(),
            rounds = self.rounds_completed,
            "organization has been trained"
        );
        Ok(())
    }

    /// Every user completes one simulation at `at`.
    ///
    /// # Errors
    ///
    /// Returns the first contract violation raised by a user's variant.
    pub fn run_round(&mut self, at: DateTime<Utc>) -> SimResult<()> {
        for user in &mut self.users {
            user.complete_simulation(at)?;
        }
        self.rounds_completed += 1;
        Ok(())
    }

    /// Every user's history flattened into rows, user by user.
    #[must_use]
    pub fn result(&self) -> Vec<SimulationResult> {
        self.users
            .iter()
            .flat_map(|u| u.history().iter().cloned())
            .collect()
    }

    /// Outcome totals per variant label.
    #[must_use]
    pub fn summary(&self) -> TrainingSummary {
        let mut by_type: BTreeMap<String, OutcomeCounts> = BTreeMap::new();
        for user in &self.users {
            let counts = by_type.entry(user.user_type().to_string()).or_default();
            counts.users += 1;
            for result in user.history() {
                counts.record(result.outcome());
            }
        }
        TrainingSummary {
            rounds_completed: self.rounds_completed,
            by_type,
        }
    }

    /// BLAKE3 digest over all result rows, as hex.
    ///
    /// Two runs with the same configuration produce the same fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for row in self.users.iter().flat_map(User::history) {
            let user_id = row.user_id().to_string();
            for field in [
                row.timestamp(),
                user_id.as_str(),
                row.user_type(),
                row.name(),
                row.outcome().as_str(),
            ] {
                hasher.update(field.as_bytes());
                hasher.update(&[0x1f]);
            }
            hasher.update(&[0x1e]);
        }
        hasher.finalize().to_hex().to_string()
    }
}

impl fmt::Display for Organization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Organization(users={}, simulations={}, training_interval_days={}, start={})",
            self.users.len(),
            self.n_simulations,
            self.training_interval_days,
            self.start.format(crate::simulation::TIMESTAMP_FORMAT)
        )
    }
}

impl fmt::Debug for Organization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Organization")
            .field("users", &self.users.len())
            .field("n_simulations", &self.n_simulations)
            .field("start", &self.start)
            .field("training_interval_days", &self.training_interval_days)
            .field("rounds_completed", &self.rounds_completed)
            .finish()
    }
}
