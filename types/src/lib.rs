//! Core domain types for rotask.
//!
//! This crate contains pure domain values with no IO and no randomness:
//! trial configurations, outcomes, the stimulus catalog, response scoring,
//! and resolved experiment parameters. Everything here can be used from any
//! layer of the application.

mod catalog;
mod ids;
mod intake;
mod judge;
pub mod settings;
mod trial;

pub use catalog::{CatalogError, StimulusCatalog, StimulusId};
pub use ids::{ParticipantId, ParticipantIdError};
pub use intake::{Handedness, Intake, Sex};
pub use judge::{KeyBindingError, KeyBindings, ResponseJudge, ResponseKey};
pub use settings::{ExperimentPlan, PlanError, TrainingPlan};
pub use trial::{Angle, AngleError, Category, Correctness, TrialOutcome, TrialSpec, combinations};
