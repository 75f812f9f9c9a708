//! Resolved experiment parameters shared across crates.
//!
//! These types represent fully-validated configuration. Raw TOML structs
//! (with `Option` fields) stay private in `rotask-config`; the loader resolves
//! them into these types at the parse boundary.
//!
//! Existence of a value is the proof of its validity.

use std::num::NonZeroUsize;

use thiserror::Error;

use crate::trial::{Angle, Category};

pub const REFERENCE_ANGLES: [u32; 5] = [0, 45, 90, 135, 180];
pub const REFERENCE_REPETITIONS: usize = 10;
pub const REFERENCE_PAUSE_EVERY: usize = 41;
pub const REFERENCE_TRAINING_SET: usize = 20;
pub const REFERENCE_TRAINING_MIN_CORRECT: usize = 16;

const DEFAULT_REPETITIONS: NonZeroUsize =
    NonZeroUsize::new(REFERENCE_REPETITIONS).expect("reference repetitions are non-zero");
const DEFAULT_PAUSE_EVERY: NonZeroUsize =
    NonZeroUsize::new(REFERENCE_PAUSE_EVERY).expect("reference pause interval is non-zero");

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("at least one angle is required")]
    NoAngles,
    #[error("angle {0} is listed more than once")]
    DuplicateAngle(Angle),
    #[error("repetitions must be at least 1")]
    ZeroRepetitions,
    #[error("pause interval must be at least 1 trial")]
    ZeroPauseInterval,
    #[error("training set must contain at least one trial")]
    EmptyTrainingSet,
    #[error("training set of {set_size} exceeds the {universe} distinct combinations")]
    TrainingSetTooLarge { set_size: usize, universe: usize },
    #[error("training threshold {min_correct} exceeds the set size {set_size}")]
    ThresholdAboveSetSize { min_correct: usize, set_size: usize },
}

/// Main-experiment workload parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentPlan {
    angles: Vec<Angle>,
    repetitions: NonZeroUsize,
    pause_every: NonZeroUsize,
}

impl ExperimentPlan {
    pub fn new(
        angles: Vec<Angle>,
        repetitions: usize,
        pause_every: usize,
    ) -> Result<Self, PlanError> {
        if angles.is_empty() {
            return Err(PlanError::NoAngles);
        }
        for (i, angle) in angles.iter().enumerate() {
            if angles[..i].contains(angle) {
                return Err(PlanError::DuplicateAngle(*angle));
            }
        }
        let repetitions = NonZeroUsize::new(repetitions).ok_or(PlanError::ZeroRepetitions)?;
        let pause_every = NonZeroUsize::new(pause_every).ok_or(PlanError::ZeroPauseInterval)?;
        Ok(Self {
            angles,
            repetitions,
            pause_every,
        })
    }

    #[must_use]
    pub fn angles(&self) -> &[Angle] {
        &self.angles
    }

    #[must_use]
    pub fn repetitions(&self) -> usize {
        self.repetitions.get()
    }

    #[must_use]
    pub fn pause_every(&self) -> usize {
        self.pause_every.get()
    }

    /// Distinct `(mirror, angle, category)` combinations.
    #[must_use]
    pub fn universe_size(&self) -> usize {
        2 * self.angles.len() * Category::ALL.len()
    }

    /// Length of the initial queue before any retries.
    #[must_use]
    pub fn initial_workload(&self) -> usize {
        self.universe_size() * self.repetitions()
    }
}

impl Default for ExperimentPlan {
    fn default() -> Self {
        Self {
            angles: REFERENCE_ANGLES.into_iter().map(Angle::wrapping).collect(),
            repetitions: DEFAULT_REPETITIONS,
            pause_every: DEFAULT_PAUSE_EVERY,
        }
    }
}

/// Training gate parameters.
///
/// Invariant: `min_correct <= set_size <= universe` for the experiment plan
/// the training plan was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingPlan {
    set_size: usize,
    min_correct: usize,
}

impl TrainingPlan {
    pub fn new(
        set_size: usize,
        min_correct: usize,
        experiment: &ExperimentPlan,
    ) -> Result<Self, PlanError> {
        if set_size == 0 {
            return Err(PlanError::EmptyTrainingSet);
        }
        let universe = experiment.universe_size();
        if set_size > universe {
            return Err(PlanError::TrainingSetTooLarge { set_size, universe });
        }
        if min_correct > set_size {
            return Err(PlanError::ThresholdAboveSetSize {
                min_correct,
                set_size,
            });
        }
        Ok(Self {
            set_size,
            min_correct,
        })
    }

    #[must_use]
    pub fn set_size(&self) -> usize {
        self.set_size
    }

    #[must_use]
    pub fn min_correct(&self) -> usize {
        self.min_correct
    }
}

impl Default for TrainingPlan {
    fn default() -> Self {
        Self {
            set_size: REFERENCE_TRAINING_SET,
            min_correct: REFERENCE_TRAINING_MIN_CORRECT,
        }
    }
}
