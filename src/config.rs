//! Training run configuration.
//!
//! Values come from defaults, optionally overridden by a TOML file and then by
//! command-line flags. [`TrainingConfig::validate`] must pass before a run
//! starts.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::storage::validate_identifier;
use crate::variant::VariantKind;

/// Share of the population assigned to one variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariantWeight {
    pub kind: VariantKind,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl VariantWeight {
    #[must_use]
    pub const fn new(kind: VariantKind, weight: f64) -> Self {
        Self { kind, weight }
    }
}

/// Last instant of a programme of `training_interval_days` starting at `start`.
///
/// # Errors
///
/// Returns `ValidationError::InvalidConfig` if the end is not a representable date.
pub fn schedule_end(
    start: DateTime<Utc>,
    training_interval_days: u32,
) -> Result<DateTime<Utc>, ValidationError> {
    start
        .checked_add_signed(Duration::days(i64::from(training_interval_days)))
        .ok_or_else(|| ValidationError::InvalidConfig {
            reason: format!(
                "{training_interval_days} training days from {start} end outside the supported date range"
            ),
        })
}

/// Configuration for one training run.
///
/// # Examples
///
/// ```
/// use phishsim::TrainingConfig;
///
/// let config = TrainingConfig::from_toml_str("n_users = 10\nseed = 7").unwrap();
/// assert_eq!(config.n_users, 10);
/// assert_eq!(config.n_simulations, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    /// Number of simulated users.
    pub n_users: usize,
    /// Simulations each user completes.
    pub n_simulations: usize,
    /// Span of the training programme in days.
    pub training_interval_days: u32,
    /// Timestamp of the first simulation round.
    pub start: DateTime<Utc>,
    /// Master seed for the whole run.
    pub seed: u64,
    /// Table the results are written to.
    pub table: String,
    /// SQLite database path (`:memory:` allowed).
    pub database: PathBuf,
    /// Directory for report exports.
    pub output_dir: PathBuf,
    /// Population mix.
    pub variants: Vec<VariantWeight>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_users: 100,
            n_simulations: 20,
            training_interval_days: 365,
            start: Utc
                .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
                .single()
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            seed: 42,
            table: "training_results".to_string(),
            database: PathBuf::from("phishsim.db"),
            output_dir: PathBuf::from("."),
            variants: VariantKind::LEARNERS
                .into_iter()
                .map(|kind| VariantWeight::new(kind, 1.0))
                .collect(),
        }
    }
}

impl TrainingConfig {
    /// Check every constraint; returns the config unchanged on success.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.n_users == 0 {
            return Err(ValidationError::ZeroCount { field: "n_users" });
        }
        if self.n_simulations == 0 {
            return Err(ValidationError::ZeroCount {
                field: "n_simulations",
            });
        }
        if self.training_interval_days == 0 {
            return Err(ValidationError::ZeroCount {
                field: "training_interval_days",
            });
        }
        schedule_end(self.start, self.training_interval_days)?;
        validate_identifier(&self.table)?;

        if self.variants.is_empty() {
            return Err(ValidationError::InvalidVariantMix {
                reason: "no variants configured".to_string(),
            });
        }
        for entry in &self.variants {
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(ValidationError::InvalidVariantMix {
                    reason: format!("weight for {} must be a finite non-negative number", entry.kind),
                });
            }
        }
        if self.variants.iter().all(|v| v.weight == 0.0) {
            return Err(ValidationError::InvalidVariantMix {
                reason: "all weights are zero".to_string(),
            });
        }

        Ok(self)
    }

    /// Parse and validate a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` on malformed TOML, or any
    /// validation failure.
    pub fn from_toml_str(raw: &str) -> Result<Self, ValidationError> {
        let config: Self = toml::from_str(raw).map_err(|e| ValidationError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()
    }

    /// Load and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` if the file cannot be read or
    /// parsed, or any validation failure.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ValidationError::InvalidConfig {
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&raw)
    }
}
