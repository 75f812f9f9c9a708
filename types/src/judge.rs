//! Response keys and correctness scoring.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::trial::Correctness;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyBindingError {
    #[error("response key must not be empty")]
    Empty,
    #[error("mirrored and not-mirrored responses share the key {0}")]
    SameKey(ResponseKey),
}

/// Lowercase key name as the participant pressed it (`f`, `space`, `return`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResponseKey(String);

impl ResponseKey {
    pub fn new(name: impl AsRef<str>) -> Result<Self, KeyBindingError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(KeyBindingError::Empty);
        }
        Ok(Self(name.to_lowercase()))
    }

    /// Key name for a typed character. Space has a spelled-out name.
    #[must_use]
    pub fn from_char(c: char) -> Self {
        if c == ' ' {
            return Self("space".to_string());
        }
        Self(c.to_lowercase().collect())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The single character this key produces, if it is a character key.
    #[must_use]
    pub fn as_char(&self) -> Option<char> {
        let mut chars = self.0.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

impl TryFrom<String> for ResponseKey {
    type Error = KeyBindingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ResponseKey> for String {
    fn from(value: ResponseKey) -> Self {
        value.0
    }
}

impl fmt::Display for ResponseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which key answers "mirrored" and which answers "not mirrored".
///
/// Invariant: the two keys differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    mirrored: ResponseKey,
    not_mirrored: ResponseKey,
}

impl KeyBindings {
    pub fn new(mirrored: ResponseKey, not_mirrored: ResponseKey) -> Result<Self, KeyBindingError> {
        if mirrored == not_mirrored {
            return Err(KeyBindingError::SameKey(mirrored));
        }
        Ok(Self {
            mirrored,
            not_mirrored,
        })
    }

    #[must_use]
    pub fn mirrored(&self) -> &ResponseKey {
        &self.mirrored
    }

    #[must_use]
    pub fn not_mirrored(&self) -> &ResponseKey {
        &self.not_mirrored
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            mirrored: ResponseKey("f".to_string()),
            not_mirrored: ResponseKey("j".to_string()),
        }
    }
}

/// Scores a key press against the mirror flag of the trial.
///
/// Total over all inputs: any key other than the canonical one for the flag,
/// including no key at all, is incorrect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseJudge {
    bindings: KeyBindings,
}

impl ResponseJudge {
    #[must_use]
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    #[must_use]
    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    #[must_use]
    pub fn expected_key(&self, mirror: bool) -> &ResponseKey {
        if mirror {
            &self.bindings.mirrored
        } else {
            &self.bindings.not_mirrored
        }
    }

    #[must_use]
    pub fn judge(&self, key: Option<&ResponseKey>, mirror: bool) -> Correctness {
        match key {
            Some(key) if key == self.expected_key(mirror) => Correctness::Correct,
            _ => Correctness::Incorrect,
        }
    }
}
