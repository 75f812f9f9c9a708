//! Result files written from real session logs.

use std::fs;

use rotask_core::persistence::CSV_HEADER;
use rotask_core::{CsvSink, PersistenceSink, Session, SessionEnd, SessionSummary};
use rotask_types::{Angle, ExperimentPlan, TrainingPlan};

use crate::common::{RecordingSink, Responder, Rig, participant};

fn run_small(responder: Responder, seed: u64) -> SessionEnd {
    let angles = vec![Angle::ZERO, Angle::new(135).unwrap()];
    let experiment = ExperimentPlan::new(angles, 2, 5).unwrap();
    let training = TrainingPlan::new(2, 2, &experiment).unwrap();
    let mut rig = Rig::new(responder);
    let session = Session::new(rig.context(seed), experiment, training, participant()).unwrap();
    session.run(&mut RecordingSink::default()).unwrap()
}

#[test]
fn csv_rows_follow_the_log() {
    let answers = [true, true, false, true, true, false];
    let SessionEnd::Completed(done) = run_small(Responder::script(answers), 10) else {
        panic!("session should complete");
    };

    let dir = tempfile::tempdir().unwrap();
    let mut sink = CsvSink::new(dir.path().join("results"));
    let path = sink.save(done.log.outcomes(), &done.participant).unwrap();
    assert_eq!(path, dir.path().join("results").join("datatest-01.csv"));

    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(CSV_HEADER));

    let rows: Vec<Vec<&str>> = lines.map(|l| l.split(',').collect()).collect();
    assert_eq!(rows.len(), done.log.len());
    assert_eq!(rows.len(), 18);
    for (row, outcome) in rows.iter().zip(done.log.iter()) {
        let spec = outcome.spec();
        assert_eq!(row.len(), 7);
        assert_eq!(row[0], if spec.mirror { "1" } else { "0" });
        assert_eq!(row[1], spec.angle.degrees().to_string());
        assert_eq!(row[2], spec.category.as_str());
        assert_eq!(row[3], outcome.key().as_str());
        let seconds: f64 = row[4].parse().unwrap();
        assert!((seconds - outcome.reaction_time().as_secs_f64()).abs() < 1e-5);
        assert_eq!(row[5], outcome.correctness().as_str());
        assert_eq!(row[6], outcome.stimulus().as_str());
    }
    let incorrect = rows.iter().filter(|r| r[5] == "incorrect").count();
    assert_eq!(incorrect, 2);
}

#[test]
fn partial_log_from_cancelled_session_is_kept_apart() {
    let mut rig = Rig::new(Responder::AlwaysCorrect);
    rig.recording.borrow_mut().cancel_after_trials = Some(5);
    let experiment = ExperimentPlan::default();
    let training = TrainingPlan::new(2, 2, &experiment).unwrap();
    let session = Session::new(rig.context(11), experiment, training, participant()).unwrap();
    let SessionEnd::Cancelled { log, .. } = session.run(&mut RecordingSink::default()).unwrap()
    else {
        panic!("session should be cancelled");
    };
    assert_eq!(log.len(), 3);

    let dir = tempfile::tempdir().unwrap();
    let mut sink = CsvSink::new(dir.path());
    let path = sink.save_partial(log.outcomes(), &participant()).unwrap();
    assert_eq!(path, dir.path().join("datatest-01.partial.csv"));
    assert_eq!(fs::read_to_string(path).unwrap().lines().count(), 4);
    assert!(!sink.csv_path(&participant()).exists());
}

#[test]
fn summary_json_describes_the_session() {
    let SessionEnd::Completed(done) = run_small(Responder::script([true, true, false]), 12)
    else {
        panic!("session should complete");
    };

    let dir = tempfile::tempdir().unwrap();
    let sink = CsvSink::new(dir.path());
    let path = sink
        .save_summary(&SessionSummary::from_session(&done))
        .unwrap();
    assert_eq!(path, dir.path().join("datatest-01.json"));

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(value["participant"], "test-01");
    assert_eq!(value["training_attempts"], 1);
    assert_eq!(value["training_final_score"], 2);
    assert_eq!(value["initial_trials"], 16);
    assert_eq!(value["presented_trials"], 17);
    assert_eq!(value["requeued_trials"], 1);
    assert_eq!(value["correct_trials"], 16);
    assert_eq!(value["pauses"], 3);
    assert_eq!(value["intake"]["sex"], "female");
    assert_eq!(value["results_file"], "memory/datatest-01.csv");
}
