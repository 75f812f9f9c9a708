//! Error taxonomy for a session.
//!
//! - [`ConfigurationError`]: setup defects. Fatal, never retried.
//! - [`SessionError`]: anything that stops a session that is not the
//!   participant's choice (configuration, display, input).
//! - [`Interrupt`]: what every phase returns on early exit. Cancellation is a
//!   variant here, not an error, so `?` unwinds it through every phase
//!   without a catch-all handler.
//! - [`PersistenceError`]: the end-of-session save failed. The result log is
//!   still owned by the caller and can be saved again.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use rotask_types::{CatalogError, Category};

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no stimuli registered for category {0}")]
    InvalidCategory(Category),
    #[error("stimulus catalog does not cover category {0}")]
    MissingCategory(Category),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("display failed: {0}")]
    Display(#[source] io::Error),
    #[error("input failed: {0}")]
    Input(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum Interrupt {
    #[error("participant cancelled the session")]
    Cancelled,
    #[error(transparent)]
    Failed(#[from] SessionError),
}

impl From<ConfigurationError> for Interrupt {
    fn from(err: ConfigurationError) -> Self {
        Interrupt::Failed(SessionError::Configuration(err))
    }
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode session summary: {0}")]
    Encode(#[from] serde_json::Error),
}
