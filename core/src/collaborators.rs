//! Contracts for the collaborators a session drives.
//!
//! The core never draws, polls or writes files itself. A terminal front end
//! implements [`Renderer`] and [`InputSource`]; tests implement them with
//! scripted fakes.

use std::io;
use std::path::PathBuf;
use std::time::Instant;

use rotask_types::{Angle, ParticipantId, ResponseKey, StimulusId, TrialOutcome};

use crate::errors::PersistenceError;

/// Everything a renderer needs to draw one trial.
///
/// The left image is the stimulus rotated by `baseline`. The right image is
/// the stimulus flipped horizontally when `mirror` is set, and only then
/// rotated by `baseline + angle`. Flip-then-rotate is not the same picture as
/// rotate-then-flip, and renderers must keep this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub stimulus: StimulusId,
    pub mirror: bool,
    pub angle: Angle,
    pub baseline: Angle,
}

impl Presentation {
    #[must_use]
    pub fn left_rotation(&self) -> Angle {
        self.baseline
    }

    #[must_use]
    pub fn right_rotation(&self) -> Angle {
        self.baseline.offset_by(self.angle)
    }
}

/// Informational screens. Each one is acknowledged with any key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Start,
    Consent,
    Welcome,
    TaskInstructions {
        mirrored: ResponseKey,
        not_mirrored: ResponseKey,
    },
    TrainingIntro {
        min_correct: usize,
        set_size: usize,
    },
    TrainingFeedback {
        passed: bool,
        score: usize,
        required: usize,
    },
    ExperimentStart,
    Pause,
    Completed,
    IntakeSex,
    IntakeHandedness,
    Thanks,
}

pub trait Renderer {
    /// Clear the display, draw both transformed stimuli and the divider, and
    /// make the frame visible. Returns once the frame is on screen.
    fn present(&mut self, presentation: &Presentation) -> io::Result<()>;

    fn show(&mut self, screen: &Screen) -> io::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: ResponseKey,
    /// When the key went down.
    pub at: Instant,
}

impl KeyPress {
    #[must_use]
    pub fn now(key: ResponseKey) -> Self {
        Self {
            key,
            at: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyPress),
    Cancel,
}

/// The session's only suspension point.
pub trait InputSource {
    /// Block until a key goes down or the participant quits. No timeout.
    fn wait_for_keydown_or_cancel(&mut self) -> io::Result<InputEvent>;
}

pub trait PersistenceSink {
    /// Write every outcome, in order, keyed by participant. Returns where the
    /// records went.
    fn save(
        &mut self,
        records: &[TrialOutcome],
        participant: &ParticipantId,
    ) -> Result<PathBuf, PersistenceError>;

    /// Write the outcomes of a session the participant quit. Sinks that do
    /// not distinguish partial data store it like a complete one.
    fn save_partial(
        &mut self,
        records: &[TrialOutcome],
        participant: &ParticipantId,
    ) -> Result<PathBuf, PersistenceError> {
        self.save(records, participant)
    }
}
