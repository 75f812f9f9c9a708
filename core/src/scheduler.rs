//! Main experiment: shuffled workload, retry-until-correct, periodic pauses.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use rotask_types::{Category, ExperimentPlan, combinations};

use crate::collaborators::Screen;
use crate::context::SessionContext;
use crate::errors::Interrupt;
use crate::log::ResultLog;
use crate::queue::TrialQueue;
use crate::runner::run_trial;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerReport {
    /// Queue length before any retries.
    pub initial: usize,
    /// Trials presented, retries included.
    pub presented: usize,
    /// Specs appended after an incorrect answer.
    pub requeued: usize,
    /// Pause screens shown.
    pub pauses: usize,
}

/// Drains a workload, requeueing every incorrectly answered spec at the back.
///
/// The session ends only when every queued entry, retries included, has been
/// answered. A participant who never answers a spec correctly keeps seeing it;
/// there is no retry cap.
#[derive(Debug, Clone)]
pub struct AdaptiveScheduler {
    plan: ExperimentPlan,
}

impl AdaptiveScheduler {
    #[must_use]
    pub fn new(plan: ExperimentPlan) -> Self {
        Self { plan }
    }

    /// Every `(mirror, angle)` pair `repetitions` times per category, shuffled.
    pub fn build_workload<R: Rng + ?Sized>(&self, rng: &mut R) -> TrialQueue {
        let mut specs = Vec::with_capacity(self.plan.initial_workload());
        for category in Category::ALL {
            let grid = combinations(self.plan.angles(), &[category]);
            for _ in 0..self.plan.repetitions() {
                specs.extend_from_slice(&grid);
            }
        }
        specs.shuffle(rng);
        TrialQueue::new(specs)
    }

    pub fn run(
        &self,
        ctx: &mut SessionContext<'_>,
        log: &mut ResultLog,
    ) -> Result<SchedulerReport, Interrupt> {
        let queue = self.build_workload(ctx.rng());
        self.run_queue(ctx, queue, log)
    }

    /// Drain `queue`, appending one outcome per presentation to `log`.
    pub fn run_queue(
        &self,
        ctx: &mut SessionContext<'_>,
        mut queue: TrialQueue,
        log: &mut ResultLog,
    ) -> Result<SchedulerReport, Interrupt> {
        let pause_every = self.plan.pause_every();
        let mut report = SchedulerReport {
            initial: queue.len(),
            ..SchedulerReport::default()
        };
        info!(trials = report.initial, pause_every, "Main experiment started");

        while let Some((index, spec)) = queue.next_entry() {
            if index > 0 && index % pause_every == 0 {
                report.pauses += 1;
                info!(trial = index, "Pause");
                ctx.acknowledge(&Screen::Pause)?;
            }

            let outcome = run_trial(ctx, spec)?;
            let correct = outcome.correctness().is_correct();
            log.push(outcome);
            report.presented += 1;

            if !correct {
                queue.requeue(spec);
                report.requeued += 1;
                debug!(trial = index, spec = %spec, queue_len = queue.len(), "Requeued");
            }
        }

        info!(
            presented = report.presented,
            requeued = report.requeued,
            pauses = report.pauses,
            "Main experiment drained"
        );
        Ok(report)
    }
}
