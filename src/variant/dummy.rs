//! Placeholder variant with no learning signal.

use crate::outcome::Outcome;
use crate::rng::SimRng;
use crate::simulation::SimulationResult;
use crate::variant::Variant;

/// Picks every outcome with equal probability, ignoring history.
///
/// Meant as a template for new policies rather than a realistic user.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyVariant;

impl Variant for DummyVariant {
    fn label(&self) -> &str {
        "Dummy"
    }

    fn produce_outcome(&self, _history: &[SimulationResult], rng: &mut SimRng) -> Outcome {
        match rng.gen_index(3) {
            0 => Outcome::Success,
            1 => Outcome::Miss,
            _ => Outcome::Fail,
        }
    }
}
