//! # phishsim - Phishing-awareness training simulator
//!
//! phishsim simulates a population of users going through repeated
//! phishing-awareness training, persists every simulated event and reshapes
//! the persisted results into reporting tables.
//!
//! ## Core Concepts
//!
//! - **Outcome**: SUCCESS, MISS or FAIL for one simulated phishing email
//! - **SimulationResult**: Immutable record of one completed event for one user
//! - **User**: Identity + append-only history, driven by a pluggable variant
//! - **Variant**: The policy deciding a user's next outcome from its own history
//! - **Organization**: A population trained over a schedule of rounds
//!
//! ## Usage
//!
//! ```rust
//! use phishsim::{Organization, ResultStore, SqliteStore, TrainingConfig};
//! use phishsim::report::aggregate_individuals;
//!
//! let config = TrainingConfig { n_users: 5, n_simulations: 4, ..TrainingConfig::default() };
//! let mut org = Organization::new(&config)?;
//! org.do_training()?;
//!
//! let mut store = SqliteStore::in_memory()?;
//! store.replace_results(&config.table, &org.result())?;
//! let report = aggregate_individuals(&store, &config.table)?;
//! assert!(report.len() <= 5);
//! # Ok::<(), phishsim::SimError>(())
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core model
pub mod error;
pub mod outcome;
pub mod rng;
pub mod simulation;
pub mod user;
pub mod variant;

// Orchestration, persistence and reporting
pub mod config;
pub mod organization;
pub mod report;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use config::{TrainingConfig, VariantWeight};
pub use error::{ContractError, ExportError, QueryError, SimError, SimResult, ValidationError};
pub use organization::{Organization, OutcomeCounts, TrainingSummary};
pub use outcome::Outcome;
pub use report::{Cell, ReportTable};
pub use rng::SimRng;
pub use simulation::{SimulationResult, TIMESTAMP_FORMAT};
pub use storage::{QueryParams, ResultStore, SqliteStore, StorageError};
pub use user::{User, UserId};
pub use variant::{
	DummyVariant, Learner, LearningCurve, ScriptedVariant, Variant, VariantKind,
};
