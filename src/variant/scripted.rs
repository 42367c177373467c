//! Deterministic replay variant.

use crate::error::ContractError;
use crate::outcome::Outcome;
use crate::rng::SimRng;
use crate::simulation::SimulationResult;
use crate::variant::Variant;

/// Cycles through a fixed sequence of outcomes.
///
/// The position in the cycle is the length of the user's history, so the
/// variant itself holds no mutable state.
///
/// # Examples
///
/// ```
/// use phishsim::{Outcome, ScriptedVariant};
///
/// let script = ScriptedVariant::from_labels("Replay", ["SUCCESS", "FAIL"]).unwrap();
/// assert_eq!(script.outcomes(), &[Outcome::Success, Outcome::Fail]);
/// assert!(ScriptedVariant::from_labels("Replay", ["CLICKED"]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedVariant {
    label: String,
    outcomes: Vec<Outcome>,
}

impl ScriptedVariant {
    /// # Errors
    ///
    /// Returns `ContractError::EmptyScript` if `outcomes` is empty.
    pub fn new(label: impl Into<String>, outcomes: Vec<Outcome>) -> Result<Self, ContractError> {
        if outcomes.is_empty() {
            return Err(ContractError::EmptyScript);
        }
        Ok(Self {
            label: label.into(),
            outcomes,
        })
    }

    /// Builds a script from raw outcome labels.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::InvalidOutcome` for the first label outside the
    /// vocabulary, or `ContractError::EmptyScript`.
    pub fn from_labels<I, S>(label: impl Into<String>, labels: I) -> Result<Self, ContractError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let outcomes = labels
            .into_iter()
            .map(|l| l.as_ref().parse())
            .collect::<Result<Vec<Outcome>, _>>()?;
        Self::new(label, outcomes)
    }

    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }
}

impl Variant for ScriptedVariant {
    fn label(&self) -> &str {
        &self.label
    }

    fn produce_outcome(&self, history: &[SimulationResult], _rng: &mut SimRng) -> Outcome {
        self.outcomes[history.len() % self.outcomes.len()]
    }
}
