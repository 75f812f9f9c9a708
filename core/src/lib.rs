//! Trial sequencing and adaptive scheduling for rotask.
//!
//! This crate owns every decision the experiment makes: which configuration
//! is presented next, how a response is scored, when a failed trial is
//! requeued, when the participant gets a pause, and when training or the
//! main experiment is complete. Drawing, key polling and the filesystem sit
//! behind the traits in [`collaborators`].
//!
//! ```text
//! Session::run
//!   Instructions -> TrainingGate::run_until_pass -> AdaptiveScheduler::run
//!                          |                               |
//!                          +---------- run_trial ----------+
//!                                         |
//!                          Renderer::present / InputSource::wait
//! ```

pub mod collaborators;
mod context;
mod errors;
mod log;
pub mod persistence;
mod queue;
mod runner;
mod scheduler;
mod session;
mod training;

pub use collaborators::{
    InputEvent, InputSource, KeyPress, PersistenceSink, Presentation, Renderer, Screen,
};
pub use context::SessionContext;
pub use errors::{ConfigurationError, Interrupt, PersistenceError, SessionError};
pub use log::ResultLog;
pub use persistence::{CsvSink, SessionSummary};
pub use queue::TrialQueue;
pub use runner::run_trial;
pub use scheduler::{AdaptiveScheduler, SchedulerReport};
pub use session::{CompletedSession, Session, SessionEnd, SessionPhase};
pub use training::{TrainingGate, TrainingReport};
