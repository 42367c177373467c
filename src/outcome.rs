//! The outcome vocabulary.
//!
//! Every simulated phishing event ends in exactly one [`Outcome`]. The set is
//! closed; consumers match on the named variants and never index into
//! [`Outcome::ALL`] to pick a value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContractError;

/// Classification of one simulated phishing-test event.
///
/// # Examples
///
/// ```
/// use phishsim::Outcome;
///
/// let outcome: Outcome = "MISS".parse().unwrap();
/// assert_eq!(outcome, Outcome::Miss);
/// assert!(!outcome.is_engaged());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// The user correctly identified the phishing attempt.
    Success,
    /// The user never noticed or opened the attempt.
    Miss,
    /// The user fell for the attempt.
    Fail,
}

impl Outcome {
    /// Every member of the vocabulary.
    pub const ALL: [Self; 3] = [Self::Success, Self::Miss, Self::Fail];

    /// Canonical label, as persisted and reported.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Miss => "MISS",
            Self::Fail => "FAIL",
        }
    }

    /// Returns true when the user actually engaged with the event.
    ///
    /// Engaged events count towards a user's experience.
    #[must_use]
    pub const fn is_engaged(self) -> bool {
        !matches!(self, Self::Miss)
    }

    /// Validity predicate over raw labels.
    #[must_use]
    pub fn is_valid_label(label: &str) -> bool {
        Self::ALL.iter().any(|o| o.as_str() == label)
    }

    /// Checks that a produced value is a member of the vocabulary.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::InvalidOutcome` if the value is not in [`Outcome::ALL`].
    pub fn ensure_member(self) -> Result<Self, ContractError> {
        if Self::ALL.contains(&self) {
            Ok(self)
        } else {
            Err(ContractError::InvalidOutcome {
                label: self.as_str().to_string(),
            })
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| ContractError::InvalidOutcome {
                label: s.to_string(),
            })
    }
}

impl TryFrom<&str> for Outcome {
    type Error = ContractError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
