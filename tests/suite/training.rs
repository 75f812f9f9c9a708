//! Training gate scenarios.

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;

use rotask_core::{Interrupt, Screen, TrainingGate};
use rotask_types::{ExperimentPlan, TrainingPlan};

use crate::common::{Responder, Rig};

fn reference_gate() -> TrainingGate {
    TrainingGate::new(TrainingPlan::default(), ExperimentPlan::default().angles())
}

fn feedback(passed: bool, score: usize) -> Screen {
    Screen::TrainingFeedback {
        passed,
        score,
        required: 16,
    }
}

#[test]
fn all_correct_passes_first_attempt_with_full_tally() {
    let mut rig = Rig::new(Responder::AlwaysCorrect);
    let recording = rig.recording.clone();

    let report = reference_gate().run_until_pass(&mut rig.context(1)).unwrap();

    assert_eq!(report.attempts, 1);
    assert_eq!(report.final_score, 20);
    assert_eq!(report.trials_run, 20);
    let rec = recording.borrow();
    assert_eq!(rec.presentations().len(), 20);
    assert_eq!(rec.screens(), vec![&feedback(true, 20)]);
}

#[test]
fn fifteen_of_twenty_retries_with_fresh_sample() {
    let first_attempt = (0..20).map(|i| i < 15);
    let mut rig = Rig::new(Responder::script(first_attempt));
    let recording = rig.recording.clone();

    let report = reference_gate().run_until_pass(&mut rig.context(2)).unwrap();

    assert_eq!(report.attempts, 2);
    assert_eq!(report.trials_run, 40);
    assert_eq!(report.final_score, 20);
    let rec = recording.borrow();
    assert_eq!(rec.presentations().len(), 40);
    assert_eq!(
        rec.screens(),
        vec![&feedback(false, 15), &feedback(true, 20)]
    );
}

#[test]
fn exactly_threshold_passes() {
    let answers = (0..20).map(|i| i < 16);
    let mut rig = Rig::new(Responder::script(answers));

    let report = reference_gate().run_until_pass(&mut rig.context(3)).unwrap();

    assert_eq!(report.attempts, 1);
    assert_eq!(report.final_score, 16);
}

#[test]
fn each_attempt_presents_every_combination_once() {
    let mut rig = Rig::new(Responder::script((0..20).map(|_| false)));
    let recording = rig.recording.clone();

    reference_gate().run_until_pass(&mut rig.context(4)).unwrap();

    let rec = recording.borrow();
    let presentations = rec.presentations();
    for attempt in presentations.chunks(20) {
        let distinct: HashSet<_> = attempt.iter().map(|p| (p.mirror, p.angle)).collect();
        // Ten (mirror, angle) pairs, each once per category.
        assert_eq!(distinct.len(), 10);
    }
}

#[test]
fn never_passing_participant_keeps_training_until_cancel() {
    let mut rig = Rig::new(Responder::AlwaysWrong);
    rig.recording.borrow_mut().cancel_after_trials = Some(200);
    let recording = rig.recording.clone();

    let result = reference_gate().run_until_pass(&mut rig.context(5));

    assert!(matches!(result, Err(Interrupt::Cancelled)));
    let rec = recording.borrow();
    assert_eq!(rec.count_screen(&feedback(false, 0)), 10);
}

#[test]
fn seeded_samples_are_reproducible() {
    let gate = reference_gate();
    let a = gate.sample(&mut StdRng::seed_from_u64(2024));
    let b = gate.sample(&mut StdRng::seed_from_u64(2024));
    assert_eq!(a, b);

    let as_set: HashSet<_> = a.iter().copied().collect();
    assert_eq!(as_set.len(), 20);
}
