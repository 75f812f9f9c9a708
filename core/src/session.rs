//! Top-level state machine: instructions, training, main experiment, intake.

use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use rotask_types::{
    Category, ExperimentPlan, Handedness, Intake, ParticipantId, ResponseKey, Sex, TrainingPlan,
};

use crate::collaborators::{PersistenceSink, Screen};
use crate::context::SessionContext;
use crate::errors::{ConfigurationError, Interrupt, PersistenceError, SessionError};
use crate::log::ResultLog;
use crate::scheduler::{AdaptiveScheduler, SchedulerReport};
use crate::training::{TrainingGate, TrainingReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Instructions,
    Training,
    MainExperiment,
    Completion,
    Terminated,
}

impl SessionPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Instructions => "instructions",
            SessionPhase::Training => "training",
            SessionPhase::MainExperiment => "main_experiment",
            SessionPhase::Completion => "completion",
            SessionPhase::Terminated => "terminated",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A session that ran to the end of intake.
#[derive(Debug)]
pub struct CompletedSession {
    pub participant: ParticipantId,
    pub training: TrainingReport,
    pub experiment: SchedulerReport,
    pub log: ResultLog,
    /// Result of the single end-of-session save. On failure `log` still holds
    /// every outcome so the caller can save again.
    pub saved: Result<PathBuf, PersistenceError>,
    pub intake: Intake,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug)]
pub enum SessionEnd {
    Completed(Box<CompletedSession>),
    /// The participant quit. `log` holds every outcome recorded before the
    /// cancel; the trial in flight when it arrived is not included.
    Cancelled {
        phase: SessionPhase,
        log: ResultLog,
    },
}

struct Finished {
    training: TrainingReport,
    experiment: SchedulerReport,
    saved: Result<PathBuf, PersistenceError>,
    intake: Intake,
}

pub struct Session<'a> {
    ctx: SessionContext<'a>,
    gate: TrainingGate,
    training_plan: TrainingPlan,
    scheduler: AdaptiveScheduler,
    participant: ParticipantId,
    phase: SessionPhase,
    log: ResultLog,
}

impl<'a> Session<'a> {
    /// Fails when the catalog has no stimuli for a category the plans use.
    pub fn new(
        ctx: SessionContext<'a>,
        experiment: ExperimentPlan,
        training: TrainingPlan,
        participant: ParticipantId,
    ) -> Result<Self, ConfigurationError> {
        let catalog = ctx.catalog();
        if let Some(missing) = Category::ALL
            .into_iter()
            .find(|&c| catalog.stimuli(c).is_none_or(|ids| ids.is_empty()))
        {
            return Err(ConfigurationError::MissingCategory(missing));
        }

        Ok(Self {
            gate: TrainingGate::new(training, experiment.angles()),
            training_plan: training,
            scheduler: AdaptiveScheduler::new(experiment),
            ctx,
            participant,
            phase: SessionPhase::Instructions,
            log: ResultLog::default(),
        })
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Drive the session to its end.
    ///
    /// Cancellation is a normal ending and comes back as
    /// [`SessionEnd::Cancelled`]. Only setup, display and input failures are
    /// errors.
    pub fn run(mut self, sink: &mut dyn PersistenceSink) -> Result<SessionEnd, SessionError> {
        let started_at = Utc::now();
        info!(participant = %self.participant, "Session started");

        match self.drive(sink) {
            Ok(finished) => {
                self.enter(SessionPhase::Terminated);
                Ok(SessionEnd::Completed(Box::new(CompletedSession {
                    participant: self.participant,
                    training: finished.training,
                    experiment: finished.experiment,
                    log: self.log,
                    saved: finished.saved,
                    intake: finished.intake,
                    started_at,
                    finished_at: Utc::now(),
                })))
            }
            Err(Interrupt::Cancelled) => {
                let phase = self.phase;
                info!(%phase, logged = self.log.len(), "Participant cancelled");
                self.enter(SessionPhase::Terminated);
                Ok(SessionEnd::Cancelled {
                    phase,
                    log: self.log,
                })
            }
            Err(Interrupt::Failed(err)) => {
                error!(phase = %self.phase, "Session failed: {err}");
                Err(err)
            }
        }
    }

    fn drive(&mut self, sink: &mut dyn PersistenceSink) -> Result<Finished, Interrupt> {
        self.instructions()?;

        self.enter(SessionPhase::Training);
        let training = self.gate.run_until_pass(&mut self.ctx)?;

        self.enter(SessionPhase::MainExperiment);
        self.ctx.acknowledge(&Screen::ExperimentStart)?;
        let experiment = self.scheduler.run(&mut self.ctx, &mut self.log)?;

        let saved = sink.save(self.log.outcomes(), &self.participant);
        match &saved {
            Ok(path) => info!(path = %path.display(), rows = self.log.len(), "Results saved"),
            Err(err) => error!(rows = self.log.len(), "Saving results failed: {err}"),
        }

        self.enter(SessionPhase::Completion);
        self.ctx.acknowledge(&Screen::Completed)?;
        let intake = self.collect_intake()?;
        self.ctx.acknowledge(&Screen::Thanks)?;

        Ok(Finished {
            training,
            experiment,
            saved,
            intake,
        })
    }

    fn instructions(&mut self) -> Result<(), Interrupt> {
        let bindings = self.ctx.judge().bindings();
        let screens = [
            Screen::Start,
            Screen::Consent,
            Screen::Welcome,
            Screen::TaskInstructions {
                mirrored: bindings.mirrored().clone(),
                not_mirrored: bindings.not_mirrored().clone(),
            },
            Screen::TrainingIntro {
                min_correct: self.training_plan.min_correct(),
                set_size: self.training_plan.set_size(),
            },
        ];
        for screen in &screens {
            self.ctx.acknowledge(screen)?;
        }
        Ok(())
    }

    fn collect_intake(&mut self) -> Result<Intake, Interrupt> {
        let sex = self.prompt(&Screen::IntakeSex, Sex::from_key)?;
        let handedness = self.prompt(&Screen::IntakeHandedness, Handedness::from_key)?;
        let intake = Intake { sex, handedness };
        info!(sex = %sex.code(), handedness = %handedness.code(), "Intake recorded");
        Ok(intake)
    }

    /// Show `screen` until a key `parse` accepts arrives.
    fn prompt<T>(
        &mut self,
        screen: &Screen,
        parse: impl Fn(&ResponseKey) -> Option<T>,
    ) -> Result<T, Interrupt> {
        loop {
            self.ctx.show(screen)?;
            let shown_at = Instant::now();
            let press = self.ctx.wait_key_since(shown_at)?;
            if let Some(answer) = parse(&press.key) {
                return Ok(answer);
            }
            debug!(key = %press.key, "Rejected intake answer");
        }
    }

    fn enter(&mut self, phase: SessionPhase) {
        info!(from = %self.phase, to = %phase, "Session phase");
        self.phase = phase;
    }
}
