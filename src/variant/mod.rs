//! User variants: pluggable outcome policies.
//!
//! A [`Variant`] decides the outcome of a user's next simulation from that
//! user's own history. Everything else about a user (identity, history,
//! counts) is shared and lives in [`User`](crate::User).
//!
//! Built-in policies:
//!
//! | Variant | Miss probability | Success chance, n = non-missed count |
//! |---|---|---|
//! | `Dummy` | uniform over all outcomes | - |
//! | `QuickLearner` | 0.10 | (n+1)/(n+10) |
//! | `SlowLearner` | 0.10 | (n+3)/(n+30) |
//! | `BusyQuickLearner` | 0.50 | (n+1)/(n+10) |
//! | `BusySlowLearner` | 0.50 | (n+3)/(n+30) |

mod dummy;
mod learner;
mod scripted;

pub use dummy::DummyVariant;
pub use learner::{classify, Learner, LearningCurve, BASE_MISS_PROBABILITY, BUSY_MISS_PROBABILITY};
pub use scripted::ScriptedVariant;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::outcome::Outcome;
use crate::rng::SimRng;
use crate::simulation::SimulationResult;

/// An outcome policy.
///
/// Implementations must always return a member of the outcome vocabulary
/// and must not panic for any history.
pub trait Variant: fmt::Debug + Send {
    /// Label recorded as the `type` of every result.
    fn label(&self) -> &str;

    /// Decide the next outcome given the user's history so far.
    fn produce_outcome(&self, history: &[SimulationResult], rng: &mut SimRng) -> Outcome;
}

/// The built-in variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    Dummy,
    QuickLearner,
    SlowLearner,
    BusyQuickLearner,
    BusySlowLearner,
}

impl VariantKind {
    pub const ALL: [Self; 5] = [
        Self::Dummy,
        Self::QuickLearner,
        Self::SlowLearner,
        Self::BusyQuickLearner,
        Self::BusySlowLearner,
    ];

    /// The four learning variants used for a default population.
    pub const LEARNERS: [Self; 4] = [
        Self::QuickLearner,
        Self::SlowLearner,
        Self::BusyQuickLearner,
        Self::BusySlowLearner,
    ];

    /// Label recorded on results.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dummy => "Dummy",
            Self::QuickLearner => "QuickLearner",
            Self::SlowLearner => "SlowLearner",
            Self::BusyQuickLearner => "BusyQuickLearner",
            Self::BusySlowLearner => "BusySlowLearner",
        }
    }

    const fn config_name(self) -> &'static str {
        match self {
            Self::Dummy => "dummy",
            Self::QuickLearner => "quick_learner",
            Self::SlowLearner => "slow_learner",
            Self::BusyQuickLearner => "busy_quick_learner",
            Self::BusySlowLearner => "busy_slow_learner",
        }
    }

    /// Instantiate the policy.
    #[must_use]
    pub fn build(self) -> Box<dyn Variant> {
        match self {
            Self::Dummy => Box::new(DummyVariant),
            Self::QuickLearner => Box::new(Learner::quick()),
            Self::SlowLearner => Box::new(Learner::slow()),
            Self::BusyQuickLearner => Box::new(Learner::busy_quick()),
            Self::BusySlowLearner => Box::new(Learner::busy_slow()),
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VariantKind {
    type Err = ValidationError;

    /// Accepts both the result label (`QuickLearner`) and the config name (`quick_learner`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.label() == s || k.config_name() == s)
            .ok_or_else(|| ValidationError::UnknownVariant {
                label: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_and_config_names_parse() {
        for kind in VariantKind::ALL {
            assert_eq!(kind.label().parse::<VariantKind>().unwrap(), kind);
            assert_eq!(kind.config_name().parse::<VariantKind>().unwrap(), kind);
        }
        assert!("FastLearner".parse::<VariantKind>().is_err());
    }

    #[test]
    fn built_policy_reports_kind_label() {
        for kind in VariantKind::ALL {
            assert_eq!(kind.build().label(), kind.label());
        }
    }

    #[test]
    fn serde_uses_config_names() {
        let json = serde_json::to_string(&VariantKind::BusySlowLearner).unwrap();
        assert_eq!(json, "\"busy_slow_learner\"");
    }

    #[derive(Debug)]
    struct AlwaysReport;

    impl Variant for AlwaysReport {
        fn label(&self) -> &str {
            "AlwaysReport"
        }

        fn produce_outcome(&self, _history: &[SimulationResult], _rng: &mut SimRng) -> Outcome {
            Outcome::Success
        }
    }

    #[test]
    fn custom_variants_plug_into_users() {
        let mut user = crate::User::with_rng(Box::new(AlwaysReport), SimRng::new(1));
        for _ in 0..3 {
            user.complete_simulation(chrono::Utc::now()).unwrap();
        }
        assert_eq!(user.user_type(), "AlwaysReport");
        assert!(user.history().iter().all(|r| r.outcome() == Outcome::Success));
        assert_eq!(user.non_missed_completed_count(), 3);
    }
}
