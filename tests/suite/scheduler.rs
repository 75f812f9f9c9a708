//! Main experiment scheduling: retries, pauses, liveness.

use std::collections::HashMap;

use rotask_core::{AdaptiveScheduler, Interrupt, ResultLog, Screen, TrialQueue};
use rotask_types::{Angle, Category, ExperimentPlan, TrialSpec};

use crate::common::{Responder, Rig, Shown};

fn spec(mirror: bool, angle: u32, category: Category) -> TrialSpec {
    TrialSpec::new(mirror, Angle::new(angle).unwrap(), category)
}

#[test]
fn incorrect_answer_requeues_until_correct() {
    let target = spec(true, 90, Category::Tool);
    let scheduler = AdaptiveScheduler::new(ExperimentPlan::default());
    let mut rig = Rig::new(Responder::script([false, true]));
    let recording = rig.recording.clone();
    let mut log = ResultLog::default();

    let report = scheduler
        .run_queue(&mut rig.context(1), TrialQueue::new(vec![target]), &mut log)
        .unwrap();

    assert_eq!(report.initial, 1);
    assert_eq!(report.presented, 2);
    assert_eq!(report.requeued, 1);
    assert_eq!(log.len(), 2);
    assert!(!log.outcomes()[0].correctness().is_correct());
    assert!(log.outcomes()[1].correctness().is_correct());
    assert!(log.iter().all(|o| o.spec() == target));
    assert_eq!(recording.borrow().presentations().len(), 2);
}

#[test]
fn retry_goes_behind_pending_trials() {
    let first = spec(false, 0, Category::Tool);
    let second = spec(true, 45, Category::NonTool);
    let scheduler = AdaptiveScheduler::new(ExperimentPlan::default());
    let mut rig = Rig::new(Responder::script([false, true, true]));
    let mut log = ResultLog::default();

    scheduler
        .run_queue(
            &mut rig.context(2),
            TrialQueue::new(vec![first, second]),
            &mut log,
        )
        .unwrap();

    let order: Vec<_> = log.iter().map(|o| o.spec()).collect();
    assert_eq!(order, vec![first, second, first]);
}

#[test]
fn reference_run_pauses_every_41_trials() {
    let scheduler = AdaptiveScheduler::new(ExperimentPlan::default());
    let mut rig = Rig::new(Responder::AlwaysCorrect);
    let recording = rig.recording.clone();
    let mut log = ResultLog::default();

    let report = scheduler.run(&mut rig.context(3), &mut log).unwrap();

    assert_eq!(report.initial, 200);
    assert_eq!(report.presented, 200);
    assert_eq!(report.requeued, 0);
    assert_eq!(report.pauses, 4);
    assert_eq!(log.len(), 200);
    assert_eq!(log.correct_count(), 200);

    let rec = recording.borrow();
    let mut presented = 0;
    let mut pause_points = Vec::new();
    for shown in &rec.shown {
        match shown {
            Shown::Trial(_) => presented += 1,
            Shown::Screen(Screen::Pause) => pause_points.push(presented),
            Shown::Screen(other) => panic!("unexpected screen {other:?}"),
        }
    }
    assert_eq!(pause_points, vec![41, 82, 123, 164]);
}

#[test]
fn pause_count_includes_retries() {
    let plan = ExperimentPlan::new(vec![Angle::ZERO], 1, 2).unwrap();
    let scheduler = AdaptiveScheduler::new(plan);
    // Four initial trials, the first two answered wrong, so six presentations.
    let mut rig = Rig::new(Responder::script([false, false]));
    let mut log = ResultLog::default();

    let report = scheduler.run(&mut rig.context(4), &mut log).unwrap();

    assert_eq!(report.initial, 4);
    assert_eq!(report.presented, 6);
    assert_eq!(report.requeued, 2);
    // Pauses before queue positions 2 and 4.
    assert_eq!(report.pauses, 2);
}

#[test]
fn every_spec_ends_with_a_correct_answer() {
    let scheduler = AdaptiveScheduler::new(ExperimentPlan::default());
    let answers = (0..200).map(|i| i % 3 != 0);
    let mut rig = Rig::new(Responder::script(answers));
    let mut log = ResultLog::default();

    let report = scheduler.run(&mut rig.context(5), &mut log).unwrap();

    assert_eq!(report.presented, log.len());
    assert_eq!(report.presented, report.initial + report.requeued);
    assert_eq!(log.correct_count(), 200);

    let mut correct_per_spec: HashMap<TrialSpec, usize> = HashMap::new();
    for outcome in log.iter().filter(|o| o.correctness().is_correct()) {
        *correct_per_spec.entry(outcome.spec()).or_default() += 1;
    }
    assert_eq!(correct_per_spec.len(), 20);
    assert!(correct_per_spec.values().all(|&n| n == 10));
}

#[test]
fn always_wrong_participant_keeps_the_queue_alive_until_cancel() {
    let scheduler = AdaptiveScheduler::new(ExperimentPlan::default());
    let mut rig = Rig::new(Responder::AlwaysWrong);
    rig.recording.borrow_mut().cancel_after_trials = Some(1000);
    let mut log = ResultLog::default();

    let result = scheduler.run(&mut rig.context(6), &mut log);

    assert!(matches!(result, Err(Interrupt::Cancelled)));
    assert_eq!(log.len(), 1000);
    assert_eq!(log.correct_count(), 0);
}

#[test]
fn same_seed_replays_same_presentations() {
    let run = |seed| {
        let scheduler = AdaptiveScheduler::new(ExperimentPlan::default());
        let mut rig = Rig::new(Responder::AlwaysCorrect);
        let recording = rig.recording.clone();
        let mut log = ResultLog::default();
        scheduler.run(&mut rig.context(seed), &mut log).unwrap();
        let shown: Vec<_> = recording
            .borrow()
            .presentations()
            .into_iter()
            .cloned()
            .collect();
        shown
    };

    assert_eq!(run(11), run(11));
    assert_ne!(run(11), run(12));
}
