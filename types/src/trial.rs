//! Trial configuration and outcome values.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::StimulusId;
use crate::judge::{ResponseJudge, ResponseKey};

// ============================================================================
// Category
// ============================================================================

/// Stimulus partition. Every stimulus belongs to exactly one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Tool,
    NonTool,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Tool, Category::NonTool];

    /// Name used in data files and stimulus directories.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Tool => "tools",
            Category::NonTool => "non_tools",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Angle
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("angle must be in [0, 360) degrees (got {0})")]
pub struct AngleError(pub u32);

/// Rotation in whole degrees, always in `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Angle(u16);

impl Angle {
    pub const ZERO: Angle = Angle(0);

    pub fn new(degrees: u32) -> Result<Self, AngleError> {
        if degrees < 360 {
            Ok(Self(degrees as u16))
        } else {
            Err(AngleError(degrees))
        }
    }

    /// Wraps any degree count into `[0, 360)`.
    #[must_use]
    pub const fn wrapping(degrees: u32) -> Self {
        Self((degrees % 360) as u16)
    }

    #[must_use]
    pub const fn degrees(self) -> u16 {
        self.0
    }

    /// Sum of two rotations, wrapped.
    #[must_use]
    pub const fn offset_by(self, other: Angle) -> Self {
        Self::wrapping(self.0 as u32 + other.0 as u32)
    }
}

impl TryFrom<u32> for Angle {
    type Error = AngleError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Angle> for u32 {
    fn from(value: Angle) -> Self {
        u32::from(value.0)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// TrialSpec
// ============================================================================

/// One presentation configuration.
///
/// A spec is a plain value: the same spec may occur many times in a workload,
/// and a retry is a fresh queue entry holding an equal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrialSpec {
    pub mirror: bool,
    pub angle: Angle,
    pub category: Category,
}

impl TrialSpec {
    #[must_use]
    pub const fn new(mirror: bool, angle: Angle, category: Category) -> Self {
        Self {
            mirror,
            angle,
            category,
        }
    }
}

impl fmt::Display for TrialSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}deg/{}",
            if self.mirror { "mirrored" } else { "same" },
            self.angle,
            self.category
        )
    }
}

/// Cartesian product `{false, true} x angles x categories`.
///
/// Order is mirror-major, then angle, then category, matching the order the
/// inputs are given in.
#[must_use]
pub fn combinations(angles: &[Angle], categories: &[Category]) -> Vec<TrialSpec> {
    let mut out = Vec::with_capacity(2 * angles.len() * categories.len());
    for mirror in [false, true] {
        for &angle in angles {
            for &category in categories {
                out.push(TrialSpec::new(mirror, angle, category));
            }
        }
    }
    out
}

// ============================================================================
// Outcome
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correctness {
    Correct,
    Incorrect,
}

impl Correctness {
    #[must_use]
    pub const fn is_correct(self) -> bool {
        matches!(self, Correctness::Correct)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Correctness::Correct => "correct",
            Correctness::Incorrect => "incorrect",
        }
    }
}

impl fmt::Display for Correctness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The record of one presentation.
///
/// Correctness is derived once at construction from the judge and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    spec: TrialSpec,
    stimulus: StimulusId,
    key: ResponseKey,
    reaction_time: Duration,
    correctness: Correctness,
}

impl TrialOutcome {
    #[must_use]
    pub fn judged(
        spec: TrialSpec,
        stimulus: StimulusId,
        key: ResponseKey,
        reaction_time: Duration,
        judge: &ResponseJudge,
    ) -> Self {
        let correctness = judge.judge(Some(&key), spec.mirror);
        Self {
            spec,
            stimulus,
            key,
            reaction_time,
            correctness,
        }
    }

    #[must_use]
    pub fn spec(&self) -> TrialSpec {
        self.spec
    }

    #[must_use]
    pub fn stimulus(&self) -> &StimulusId {
        &self.stimulus
    }

    #[must_use]
    pub fn key(&self) -> &ResponseKey {
        &self.key
    }

    #[must_use]
    pub fn reaction_time(&self) -> Duration {
        self.reaction_time
    }

    #[must_use]
    pub fn correctness(&self) -> Correctness {
        self.correctness
    }
}
