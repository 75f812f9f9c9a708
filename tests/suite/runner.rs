//! Single trial execution.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;

use rotask_core::{
    ConfigurationError, InputEvent, Interrupt, SessionContext, SessionError, run_trial,
};
use rotask_types::{
    Angle, Category, Correctness, ResponseJudge, StimulusCatalog, StimulusId, TrialSpec,
};

use crate::common::{MockRenderer, Responder, Rig, ScriptedInput, catalog, key_at, recording};

fn spec(mirror: bool, angle: u32, category: Category) -> TrialSpec {
    TrialSpec::new(mirror, Angle::new(angle).unwrap(), category)
}

#[test]
fn stimulus_comes_from_the_spec_category() {
    let mut rig = Rig::new(Responder::AlwaysCorrect);
    let recording = rig.recording.clone();
    let catalog = catalog();

    let mut ctx = rig.context(7);
    for category in Category::ALL {
        for _ in 0..20 {
            let outcome = run_trial(&mut ctx, spec(false, 45, category)).unwrap();
            assert_eq!(catalog.category_of(outcome.stimulus()), Some(category));
        }
    }
    drop(ctx);

    let rec = recording.borrow();
    assert_eq!(rec.presentations().len(), 40);
}

#[test]
fn right_image_is_offset_from_the_baseline() {
    let mut rig = Rig::new(Responder::AlwaysCorrect);
    let recording = rig.recording.clone();

    let mut ctx = rig.context(8);
    for angle in [0, 45, 90, 135, 180] {
        run_trial(&mut ctx, spec(true, angle, Category::Tool)).unwrap();
    }
    drop(ctx);

    let rec = recording.borrow();
    for presentation in rec.presentations() {
        assert_eq!(presentation.left_rotation(), presentation.baseline);
        assert_eq!(
            presentation.right_rotation(),
            presentation.baseline.offset_by(presentation.angle)
        );
        assert!(presentation.mirror);
    }
}

#[test]
fn outcome_records_key_and_correctness() {
    let mut rig = Rig::new(Responder::script([true, false]));
    let mut ctx = rig.context(9);

    let right = run_trial(&mut ctx, spec(true, 90, Category::NonTool)).unwrap();
    assert_eq!(right.key().as_str(), "f");
    assert_eq!(right.correctness(), Correctness::Correct);
    assert_eq!(right.spec(), spec(true, 90, Category::NonTool));

    let wrong = run_trial(&mut ctx, spec(true, 90, Category::NonTool)).unwrap();
    assert_eq!(wrong.key().as_str(), "j");
    assert_eq!(wrong.correctness(), Correctness::Incorrect);
}

#[test]
fn category_without_stimuli_is_a_configuration_error() {
    let tools_only =
        StimulusCatalog::new([(Category::Tool, vec![StimulusId::from("hammer")])]).unwrap();
    let judge = ResponseJudge::default();
    let mut renderer = MockRenderer {
        recording: recording(Responder::AlwaysCorrect),
    };
    let mut input = ScriptedInput::new(Vec::new());
    let mut ctx = SessionContext::new(
        StdRng::seed_from_u64(0),
        &tools_only,
        &judge,
        &mut renderer,
        &mut input,
    );

    let err = run_trial(&mut ctx, spec(false, 0, Category::NonTool)).unwrap_err();
    assert!(matches!(
        err,
        Interrupt::Failed(SessionError::Configuration(
            ConfigurationError::InvalidCategory(Category::NonTool)
        ))
    ));
    assert!(renderer.recording.borrow().shown.is_empty());
}

#[test]
fn keys_pressed_before_the_frame_are_discarded() {
    let catalog = catalog();
    let judge = ResponseJudge::default();
    let mut renderer = MockRenderer {
        recording: recording(Responder::AlwaysCorrect),
    };
    let stale = Instant::now()
        .checked_sub(Duration::from_secs(5))
        .unwrap_or_else(Instant::now);
    let mut input = ScriptedInput::new([
        key_at("j", stale),
        key_at("f", Instant::now() + Duration::from_millis(250)),
    ]);
    let mut ctx = SessionContext::new(
        StdRng::seed_from_u64(1),
        &catalog,
        &judge,
        &mut renderer,
        &mut input,
    );

    let outcome = run_trial(&mut ctx, spec(true, 45, Category::Tool)).unwrap();

    assert_eq!(outcome.key().as_str(), "f");
    assert_eq!(outcome.correctness(), Correctness::Correct);
    assert!(outcome.reaction_time() > Duration::from_millis(200));
}

#[test]
fn cancel_mid_trial_produces_no_outcome() {
    let catalog = catalog();
    let judge = ResponseJudge::default();
    let shared = recording(Responder::AlwaysCorrect);
    let mut renderer = MockRenderer {
        recording: shared.clone(),
    };
    let mut input = ScriptedInput::new([InputEvent::Cancel]);
    let mut ctx = SessionContext::new(
        StdRng::seed_from_u64(2),
        &catalog,
        &judge,
        &mut renderer,
        &mut input,
    );

    let result = run_trial(&mut ctx, spec(false, 135, Category::NonTool));

    assert!(matches!(result, Err(Interrupt::Cancelled)));
    assert_eq!(shared.borrow().presentations().len(), 1);
}
