//! Demographic answers collected after the main experiment.

use serde::{Deserialize, Serialize};

use crate::judge::ResponseKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// `f` or `m`; anything else is not an answer.
    #[must_use]
    pub fn from_key(key: &ResponseKey) -> Option<Self> {
        match key.as_char()? {
            'f' => Some(Sex::Female),
            'm' => Some(Sex::Male),
            _ => None,
        }
    }

    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Sex::Female => 'f',
            Sex::Male => 'm',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// `l` or `r`; anything else is not an answer.
    #[must_use]
    pub fn from_key(key: &ResponseKey) -> Option<Self> {
        match key.as_char()? {
            'l' => Some(Handedness::Left),
            'r' => Some(Handedness::Right),
            _ => None,
        }
    }

    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Handedness::Left => 'l',
            Handedness::Right => 'r',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intake {
    pub sex: Sex,
    pub handedness: Handedness,
}
