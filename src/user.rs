//! Simulated users.
//!
//! A [`User`] owns an identity, a display name, a variant policy and an
//! append-only history of [`SimulationResult`]s. The bookkeeping lives here
//! once; variants only decide the next outcome.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::ContractError;
use crate::outcome::Outcome;
use crate::rng::SimRng;
use crate::simulation::SimulationResult;
use crate::variant::{Variant, VariantKind};

/// Globally unique, stable user identifier.
///
/// Displayed and persisted as 32 lowercase hex characters.
///
/// # Examples
///
/// ```
/// use phishsim::UserId;
///
/// let id = UserId::new();
/// assert_eq!(id.to_string().len(), 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a v4-layout user ID from the given generator.
    #[must_use]
    pub fn from_rng(rng: &mut SimRng) -> Self {
        Self(uuid::Builder::from_random_bytes(rng.gen_bytes16()).into_uuid())
    }

    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Creates a nil user ID (for testing or sentinel values).
    #[must_use]
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Parses either the hex or the hyphenated form.
    ///
    /// # Errors
    ///
    /// Returns the uuid parse error if `s` is not a UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl Serialize for UserId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

const FIRST_NAMES: &[&str] = &[
    "Aada", "Aino", "Alex", "Amelia", "Ann", "Anton", "Aria", "Ben", "Carla", "Cyrus", "Daniel",
    "Diana", "Eero", "Elena", "Elias", "Emma", "Felix", "Fiona", "Gabriel", "Grace", "Hanna",
    "Hugo", "Ida", "Isaac", "Jade", "Jonas", "Julia", "Kai", "Karin", "Leo", "Lina", "Lucas",
    "Maria", "Mikael", "Mila", "Nadia", "Noah", "Olivia", "Oskar", "Paula", "Peter", "Quinn",
    "Rasmus", "Rosa", "Samuel", "Sara", "Tomas", "Tuuli", "Ursula", "Valter", "Vera", "Viktor",
    "Wilma", "Xavier", "Yasmin", "Yusuf", "Zoe",
];

fn generate_name(rng: &mut SimRng) -> String {
    FIRST_NAMES[rng.gen_index(FIRST_NAMES.len())].to_string()
}

/// Number of history entries whose outcome was not a miss.
#[must_use]
pub fn non_missed_count(history: &[SimulationResult]) -> usize {
    history.iter().filter(|r| r.outcome().is_engaged()).count()
}

/// A simulated individual taking part in phishing-awareness training.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use phishsim::{SimRng, User, VariantKind};
///
/// let mut user = User::of_kind(VariantKind::QuickLearner, SimRng::new(1));
/// user.complete_simulation(Utc::now()).unwrap();
/// assert_eq!(user.simulations_completed_count(), 1);
/// assert!(user.non_missed_completed_count() <= 1);
/// ```
pub struct User {
    id: UserId,
    user_type: String,
    name: String,
    variant: Box<dyn Variant>,
    history: Vec<SimulationResult>,
    rng: SimRng,
}

impl User {
    /// Creates a user driven by `variant`, seeded from OS entropy.
    #[must_use]
    pub fn new(variant: Box<dyn Variant>) -> Self {
        Self::with_rng(variant, SimRng::from_entropy())
    }

    /// Creates a user whose identity, name and outcomes all come from `rng`.
    #[must_use]
    pub fn with_rng(variant: Box<dyn Variant>, mut rng: SimRng) -> Self {
        let id = UserId::from_rng(&mut rng);
        let name = generate_name(&mut rng);
        Self {
            id,
            user_type: variant.label().to_string(),
            name,
            variant,
            history: Vec::new(),
            rng,
        }
    }

    /// Creates a user of one of the built-in variants.
    #[must_use]
    pub fn of_kind(kind: VariantKind, rng: SimRng) -> Self {
        Self::with_rng(kind.build(), rng)
    }

    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Variant label, fixed at construction.
    #[must_use]
    pub fn user_type(&self) -> &str {
        &self.user_type
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Completed simulations, oldest first.
    #[must_use]
    pub fn history(&self) -> &[SimulationResult] {
        &self.history
    }

    /// Runs one simulation at `at` and appends its result to the history.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::InvalidOutcome` if the variant produced a value
    /// outside the vocabulary; the history is left untouched in that case.
    pub fn complete_simulation(
        &mut self,
        at: DateTime<Utc>,
    ) -> Result<&SimulationResult, ContractError> {
        let outcome: Outcome = self
            .variant
            .produce_outcome(&self.history, &mut self.rng)
            .ensure_member()?;

        self.history.push(SimulationResult::new(
            at,
            self.id,
            self.user_type.clone(),
            self.name.clone(),
            outcome,
        ));
        Ok(&self.history[self.history.len() - 1])
    }

    /// Number of completed simulations that were not missed.
    #[must_use]
    pub fn non_missed_completed_count(&self) -> usize {
        non_missed_count(&self.history)
    }

    #[must_use]
    pub fn simulations_completed_count(&self) -> usize {
        self.history.len()
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("user_type", &self.user_type)
            .field("name", &self.name)
            .field("variant", &self.variant)
            .field("history_len", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User(id={}, name={}, type={}, simulations_completed={})",
            self.id,
            self.name,
            self.user_type,
            self.simulations_completed_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::ScriptedVariant;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::days(n)
    }

    fn scripted(outcomes: &[Outcome]) -> User {
        let variant = ScriptedVariant::new("Scripted", outcomes.to_vec()).unwrap();
        User::with_rng(Box::new(variant), SimRng::new(5))
    }

    #[test]
    fn history_grows_by_one_per_call() {
        for kind in VariantKind::ALL {
            let mut user = User::of_kind(kind, SimRng::new(11));
            for n in 0..25 {
                user.complete_simulation(day(n)).unwrap();
                assert_eq!(user.simulations_completed_count(), usize::try_from(n + 1).unwrap());
            }
        }
    }

    #[test]
    fn results_carry_user_identity() {
        let mut user = User::of_kind(VariantKind::SlowLearner, SimRng::new(3));
        let result = user.complete_simulation(day(0)).unwrap().clone();
        assert_eq!(result.user_id(), user.id());
        assert_eq!(result.name(), user.name());
        assert_eq!(result.user_type(), "SlowLearner");
        assert_eq!(result.timestamp(), "2024-03-01 09:00:00");
    }

    #[test]
    fn history_is_chronological_and_never_rewritten() {
        let mut user = User::of_kind(VariantKind::BusyQuickLearner, SimRng::new(8));
        let mut seen = Vec::new();
        for n in 0..10 {
            user.complete_simulation(day(n)).unwrap();
            seen.push(user.history().last().unwrap().clone());
            assert_eq!(user.history(), seen.as_slice());
        }
    }

    #[test]
    fn non_missed_count_excludes_misses() {
        let mut user = scripted(&[Outcome::Miss, Outcome::Success, Outcome::Fail, Outcome::Miss]);
        for n in 0..4 {
            user.complete_simulation(day(n)).unwrap();
        }
        assert_eq!(user.simulations_completed_count(), 4);
        assert_eq!(user.non_missed_completed_count(), 2);
    }

    #[test]
    fn non_missed_count_tracks_each_append() {
        let mut user = scripted(&[Outcome::Success, Outcome::Miss]);
        assert_eq!(user.non_missed_completed_count(), 0);
        user.complete_simulation(day(0)).unwrap();
        assert_eq!(user.non_missed_completed_count(), 1);
        user.complete_simulation(day(1)).unwrap();
        assert_eq!(user.non_missed_completed_count(), 1);
        user.complete_simulation(day(2)).unwrap();
        assert_eq!(user.non_missed_completed_count(), 2);
    }

    #[test]
    fn non_missed_never_exceeds_completed() {
        for kind in VariantKind::ALL {
            let mut user = User::of_kind(kind, SimRng::new(21));
            for n in 0..50 {
                user.complete_simulation(day(n)).unwrap();
                assert!(user.non_missed_completed_count() <= user.simulations_completed_count());
            }
        }
    }

    #[test]
    fn same_rng_same_identity() {
        let a = User::of_kind(VariantKind::QuickLearner, SimRng::new(99));
        let b = User::of_kind(VariantKind::QuickLearner, SimRng::new(99));
        assert_eq!(a.id(), b.id());
        assert_eq!(a.name(), b.name());
        assert!(!a.name().is_empty());
    }

    #[test]
    fn user_id_roundtrips_through_hex() {
        let id = UserId::from_rng(&mut SimRng::new(4));
        let hex = id.to_string();
        assert_eq!(hex.len(), 32);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(UserId::parse(&hex).unwrap(), id);
        assert_eq!(id.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn display_mentions_progress() {
        let mut user = User::of_kind(VariantKind::Dummy, SimRng::new(2));
        user.complete_simulation(day(0)).unwrap();
        let shown = user.to_string();
        assert!(shown.contains("type=Dummy"));
        assert!(shown.contains("simulations_completed=1"));
    }
}
