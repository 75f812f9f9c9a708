use std::fmt;

use thiserror::Error;

const MAX_PARTICIPANT_ID_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParticipantIdError {
    #[error("participant id must not be empty")]
    Empty,
    #[error("participant id must be at most {MAX_PARTICIPANT_ID_LEN} characters")]
    TooLong,
    #[error("participant id may only contain letters, digits, '-' and '_' (found {0:?})")]
    InvalidChar(char),
}

/// Participant identifier. Used as a filename key, so the alphabet is
/// restricted to characters that are safe in a path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn parse(raw: &str) -> Result<Self, ParticipantIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParticipantIdError::Empty);
        }
        if trimmed.chars().count() > MAX_PARTICIPANT_ID_LEN {
            return Err(ParticipantIdError::TooLong);
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(ParticipantIdError::InvalidChar(bad));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
