//! Learning variants.
//!
//! A learner first decides whether it notices the simulated phish at all
//! (miss probability). If it engages, its chance of spotting the phish grows
//! with every earlier non-missed simulation.

use crate::outcome::Outcome;
use crate::rng::SimRng;
use crate::simulation::SimulationResult;
use crate::user::non_missed_count;
use crate::variant::Variant;

/// Miss probability of an attentive user.
pub const BASE_MISS_PROBABILITY: f64 = 0.1;

/// Miss probability of a busy user.
pub const BUSY_MISS_PROBABILITY: f64 = 0.5;

/// Success chance `(n + offset) / (n + scale)` over experience `n`.
///
/// With `offset < scale` the chance starts at `offset / scale`, increases
/// monotonically and stays strictly below 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningCurve {
    pub offset: f64,
    pub scale: f64,
}

impl LearningCurve {
    /// Starts at 0.1.
    pub const QUICK: Self = Self {
        offset: 1.0,
        scale: 10.0,
    };

    /// Also starts at 0.1 but needs three times the experience of `QUICK`.
    pub const SLOW: Self = Self {
        offset: 3.0,
        scale: 30.0,
    };

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_chance(&self, experience: usize) -> f64 {
        let n = experience as f64;
        (n + self.offset) / (n + self.scale)
    }
}

/// Two-stage draw: `miss_draw` below `miss_probability` is a miss, otherwise
/// `success_draw` below `success_chance` is a success, else a fail.
#[must_use]
pub fn classify(miss_draw: f64, success_draw: f64, miss_probability: f64, success_chance: f64) -> Outcome {
    if miss_draw < miss_probability {
        Outcome::Miss
    } else if success_draw < success_chance {
        Outcome::Success
    } else {
        Outcome::Fail
    }
}

/// A user that learns from every simulation it does not miss.
#[derive(Debug, Clone, PartialEq)]
pub struct Learner {
    label: &'static str,
    miss_probability: f64,
    curve: LearningCurve,
}

impl Learner {
    #[must_use]
    pub const fn new(label: &'static str, miss_probability: f64, curve: LearningCurve) -> Self {
        Self {
            label,
            miss_probability,
            curve,
        }
    }

    #[must_use]
    pub const fn quick() -> Self {
        Self::new("QuickLearner", BASE_MISS_PROBABILITY, LearningCurve::QUICK)
    }

    #[must_use]
    pub const fn slow() -> Self {
        Self::new("SlowLearner", BASE_MISS_PROBABILITY, LearningCurve::SLOW)
    }

    #[must_use]
    pub const fn busy_quick() -> Self {
        Self::new("BusyQuickLearner", BUSY_MISS_PROBABILITY, LearningCurve::QUICK)
    }

    #[must_use]
    pub const fn busy_slow() -> Self {
        Self::new("BusySlowLearner", BUSY_MISS_PROBABILITY, LearningCurve::SLOW)
    }

    #[must_use]
    pub const fn miss_probability(&self) -> f64 {
        self.miss_probability
    }

    #[must_use]
    pub const fn curve(&self) -> LearningCurve {
        self.curve
    }
}

impl Variant for Learner {
    fn label(&self) -> &str {
        self.label
    }

    fn produce_outcome(&self, history: &[SimulationResult], rng: &mut SimRng) -> Outcome {
        let miss_draw = rng.gen_f64();
        if miss_draw < self.miss_probability {
            return Outcome::Miss;
        }
        // Experience is taken before this event is recorded.
        let chance = self.curve.success_chance(non_missed_count(history));
        classify(miss_draw, rng.gen_f64(), self.miss_probability, chance)
    }
}
