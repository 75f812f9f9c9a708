//! Practice block the participant must pass before the main experiment.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

use rotask_types::{Angle, Category, TrainingPlan, TrialSpec, combinations};

use crate::collaborators::Screen;
use crate::context::SessionContext;
use crate::errors::Interrupt;
use crate::queue::TrialQueue;
use crate::runner::run_trial;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingReport {
    /// Attempts including the passing one.
    pub attempts: usize,
    /// Correct answers in the passing attempt.
    pub final_score: usize,
    /// Trials presented across all attempts.
    pub trials_run: usize,
}

/// Repeats freshly drawn practice sets until one scores at least
/// `min_correct`. There is no attempt limit.
#[derive(Debug, Clone)]
pub struct TrainingGate {
    plan: TrainingPlan,
    universe: Vec<TrialSpec>,
}

impl TrainingGate {
    #[must_use]
    pub fn new(plan: TrainingPlan, angles: &[Angle]) -> Self {
        Self {
            plan,
            universe: combinations(angles, &Category::ALL),
        }
    }

    #[must_use]
    pub fn universe(&self) -> &[TrialSpec] {
        &self.universe
    }

    /// Draw `set_size` distinct combinations, uniformly and in random order.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<TrialSpec> {
        let mut draw = self.universe.clone();
        draw.shuffle(rng);
        draw.truncate(self.plan.set_size());
        draw
    }

    pub fn run_until_pass(
        &self,
        ctx: &mut SessionContext<'_>,
    ) -> Result<TrainingReport, Interrupt> {
        let required = self.plan.min_correct();
        let mut attempts = 0;
        let mut trials_run = 0;

        loop {
            attempts += 1;
            let mut queue = TrialQueue::new(self.sample(ctx.rng()));
            let mut score = 0;

            while let Some((_, spec)) = queue.next_entry() {
                let outcome = run_trial(ctx, spec)?;
                trials_run += 1;
                if outcome.correctness().is_correct() {
                    score += 1;
                }
            }

            let passed = score >= required;
            info!(attempt = attempts, score, required, passed, "Training attempt finished");
            ctx.acknowledge(&Screen::TrainingFeedback {
                passed,
                score,
                required,
            })?;

            if passed {
                return Ok(TrainingReport {
                    attempts,
                    final_score: score,
                    trials_run,
                });
            }
        }
    }
}
