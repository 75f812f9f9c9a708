//! CSV result files and the JSON session summary.
//!
//! Every file is replaced whole through [`rotask_utils::atomic_write`], so a
//! crash mid-save leaves either the previous file or the new one, never a
//! truncated mix.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use rotask_types::{Intake, ParticipantId, TrialOutcome};
use rotask_utils::{atomic_write, recover_bak_file};

use crate::collaborators::PersistenceSink;
use crate::errors::PersistenceError;
use crate::session::CompletedSession;

pub const CSV_HEADER: &str = "mirror,angle,category,key,reaction_time,correctness,stimulus_id";

/// Writes `data<participant>.csv` files into one directory.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn csv_path(&self, participant: &ParticipantId) -> PathBuf {
        self.dir.join(format!("data{participant}.csv"))
    }

    #[must_use]
    pub fn partial_path(&self, participant: &ParticipantId) -> PathBuf {
        self.dir.join(format!("data{participant}.partial.csv"))
    }

    #[must_use]
    pub fn summary_path(&self, participant: &ParticipantId) -> PathBuf {
        self.dir.join(format!("data{participant}.json"))
    }

    pub fn save_summary(&self, summary: &SessionSummary) -> Result<PathBuf, PersistenceError> {
        let mut json = serde_json::to_string_pretty(summary)?;
        json.push('\n');
        let path = self.summary_path(&summary.participant);
        self.write(&path, json.as_bytes())?;
        info!(path = %path.display(), "Session summary saved");
        Ok(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
        let io_err = |source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        recover_bak_file(path);
        atomic_write(path, bytes).map_err(io_err)
    }

    fn write_records(
        &self,
        path: PathBuf,
        records: &[TrialOutcome],
    ) -> Result<PathBuf, PersistenceError> {
        self.write(&path, encode_csv(records).as_bytes())?;
        info!(path = %path.display(), rows = records.len(), "Results written");
        Ok(path)
    }
}

impl PersistenceSink for CsvSink {
    fn save(
        &mut self,
        records: &[TrialOutcome],
        participant: &ParticipantId,
    ) -> Result<PathBuf, PersistenceError> {
        self.write_records(self.csv_path(participant), records)
    }

    fn save_partial(
        &mut self,
        records: &[TrialOutcome],
        participant: &ParticipantId,
    ) -> Result<PathBuf, PersistenceError> {
        self.write_records(self.partial_path(participant), records)
    }
}

/// Header plus one row per outcome, in order.
#[must_use]
pub fn encode_csv(records: &[TrialOutcome]) -> String {
    let mut out = String::with_capacity(64 * (records.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');
    for outcome in records {
        let spec = outcome.spec();
        let _ = writeln!(
            out,
            "{},{},{},{},{:.6},{},{}",
            u8::from(spec.mirror),
            spec.angle.degrees(),
            spec.category.as_str(),
            escape_field(outcome.key().as_str()),
            outcome.reaction_time().as_secs_f64(),
            outcome.correctness().as_str(),
            escape_field(outcome.stimulus().as_str()),
        );
    }
    out
}

fn escape_field(field: &str) -> std::borrow::Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\"")).into()
    } else {
        field.into()
    }
}

/// Everything about a finished session that is not a trial row.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub participant: ParticipantId,
    pub intake: Intake,
    pub training_attempts: usize,
    pub training_final_score: usize,
    pub training_trials: usize,
    pub initial_trials: usize,
    pub presented_trials: usize,
    pub requeued_trials: usize,
    pub correct_trials: usize,
    pub pauses: usize,
    pub results_file: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SessionSummary {
    #[must_use]
    pub fn from_session(session: &CompletedSession) -> Self {
        Self {
            participant: session.participant.clone(),
            intake: session.intake,
            training_attempts: session.training.attempts,
            training_final_score: session.training.final_score,
            training_trials: session.training.trials_run,
            initial_trials: session.experiment.initial,
            presented_trials: session.experiment.presented,
            requeued_trials: session.experiment.requeued,
            correct_trials: session.log.correct_count(),
            pauses: session.experiment.pauses,
            results_file: session.saved.as_ref().ok().cloned(),
            started_at: session.started_at,
            finished_at: session.finished_at,
        }
    }
}
