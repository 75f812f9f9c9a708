//! One trial: pick a stimulus, present it, time the response, score it.

use std::time::Instant;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use rotask_types::{Angle, TrialOutcome, TrialSpec};

use crate::collaborators::Presentation;
use crate::context::SessionContext;
use crate::errors::{ConfigurationError, Interrupt};

/// Run `spec` once and return its outcome.
///
/// Holds no state between calls. The reaction-time clock starts after the
/// renderer reports the frame visible; key presses stamped before that
/// moment were typed ahead and are discarded.
pub fn run_trial(
    ctx: &mut SessionContext<'_>,
    spec: TrialSpec,
) -> Result<TrialOutcome, Interrupt> {
    let catalog = ctx.catalog();
    let stimulus = catalog
        .stimuli(spec.category)
        .and_then(|ids| ids.choose(ctx.rng()))
        .ok_or(ConfigurationError::InvalidCategory(spec.category))?
        .clone();
    let baseline = Angle::wrapping(ctx.rng().random_range(0..360));

    let presentation = Presentation {
        stimulus,
        mirror: spec.mirror,
        angle: spec.angle,
        baseline,
    };
    ctx.present(&presentation)?;
    let shown_at = Instant::now();

    let press = ctx.wait_key_since(shown_at)?;

    let reaction_time = press.at.duration_since(shown_at);
    let outcome = TrialOutcome::judged(
        spec,
        presentation.stimulus,
        press.key,
        reaction_time,
        ctx.judge(),
    );
    debug!(
        spec = %spec,
        stimulus = %outcome.stimulus(),
        baseline = %baseline,
        key = %outcome.key(),
        rt_ms = reaction_time.as_millis(),
        correctness = %outcome.correctness(),
        "Trial complete"
    );
    Ok(outcome)
}
