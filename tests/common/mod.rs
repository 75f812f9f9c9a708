//! Shared test utilities and fixtures
//!
//! Scripted collaborators for driving sessions without a terminal. The
//! renderer and the input source share one recording so the input can answer
//! whatever was last put on screen.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;

use rotask_core::{
    InputEvent, InputSource, KeyPress, PersistenceError, PersistenceSink, Presentation, Renderer,
    Screen, SessionContext,
};
use rotask_types::{
    Category, ParticipantId, ResponseJudge, ResponseKey, StimulusCatalog, StimulusId, TrialOutcome,
};

/// How the simulated participant answers trials.
#[derive(Debug, Clone)]
pub enum Responder {
    AlwaysCorrect,
    AlwaysWrong,
    /// One entry per trial (`true` = correct); all correct once exhausted.
    Script(VecDeque<bool>),
}

impl Responder {
    pub fn script(answers: impl IntoIterator<Item = bool>) -> Self {
        Responder::Script(answers.into_iter().collect())
    }

    fn next(&mut self) -> bool {
        match self {
            Responder::AlwaysCorrect => true,
            Responder::AlwaysWrong => false,
            Responder::Script(queue) => queue.pop_front().unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    Trial(Presentation),
    Screen(Screen),
}

#[derive(Debug)]
pub struct Recording {
    pub shown: Vec<Shown>,
    pub responder: Responder,
    /// Cancel instead of answering once this many trials were presented.
    pub cancel_after_trials: Option<usize>,
    /// Cancel on the first time this screen is shown.
    pub cancel_on_screen: Option<Screen>,
    /// Keys pressed on intake screens, in order; `f` then `r` once exhausted.
    pub intake_keys: VecDeque<char>,
    pub presented: usize,
}

impl Recording {
    pub fn presentations(&self) -> Vec<&Presentation> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::Trial(p) => Some(p),
                Shown::Screen(_) => None,
            })
            .collect()
    }

    pub fn screens(&self) -> Vec<&Screen> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::Screen(screen) => Some(screen),
                Shown::Trial(_) => None,
            })
            .collect()
    }

    pub fn count_screen(&self, wanted: &Screen) -> usize {
        self.screens().into_iter().filter(|s| *s == wanted).count()
    }
}

pub type SharedRecording = Rc<RefCell<Recording>>;

pub fn recording(responder: Responder) -> SharedRecording {
    Rc::new(RefCell::new(Recording {
        shown: Vec::new(),
        responder,
        cancel_after_trials: None,
        cancel_on_screen: None,
        intake_keys: VecDeque::new(),
        presented: 0,
    }))
}

pub struct MockRenderer {
    pub recording: SharedRecording,
}

impl Renderer for MockRenderer {
    fn present(&mut self, presentation: &Presentation) -> io::Result<()> {
        let mut rec = self.recording.borrow_mut();
        rec.presented += 1;
        rec.shown.push(Shown::Trial(presentation.clone()));
        Ok(())
    }

    fn show(&mut self, screen: &Screen) -> io::Result<()> {
        self.recording
            .borrow_mut()
            .shown
            .push(Shown::Screen(screen.clone()));
        Ok(())
    }
}

/// Answers whatever the renderer last showed.
pub struct MockInput {
    pub recording: SharedRecording,
    pub judge: ResponseJudge,
}

impl MockInput {
    fn wrong_key(&self, mirror: bool) -> ResponseKey {
        self.judge.expected_key(!mirror).clone()
    }
}

impl InputSource for MockInput {
    fn wait_for_keydown_or_cancel(&mut self) -> io::Result<InputEvent> {
        let mut rec = self.recording.borrow_mut();
        let last = rec.shown.last().cloned();
        let key = match last {
            Some(Shown::Trial(presentation)) => {
                if rec
                    .cancel_after_trials
                    .is_some_and(|limit| rec.presented > limit)
                {
                    return Ok(InputEvent::Cancel);
                }
                if rec.responder.next() {
                    self.judge.expected_key(presentation.mirror).clone()
                } else {
                    self.wrong_key(presentation.mirror)
                }
            }
            Some(Shown::Screen(screen)) => {
                if rec.cancel_on_screen.as_ref() == Some(&screen) {
                    return Ok(InputEvent::Cancel);
                }
                match screen {
                    Screen::IntakeSex => {
                        ResponseKey::from_char(rec.intake_keys.pop_front().unwrap_or('f'))
                    }
                    Screen::IntakeHandedness => {
                        ResponseKey::from_char(rec.intake_keys.pop_front().unwrap_or('r'))
                    }
                    _ => ResponseKey::from_char(' '),
                }
            }
            None => ResponseKey::from_char(' '),
        };
        Ok(InputEvent::Key(KeyPress::now(key)))
    }
}

/// Replays a fixed event list, then cancels.
pub struct ScriptedInput {
    pub events: VecDeque<InputEvent>,
}

impl ScriptedInput {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn wait_for_keydown_or_cancel(&mut self) -> io::Result<InputEvent> {
        Ok(self.events.pop_front().unwrap_or(InputEvent::Cancel))
    }
}

pub fn key_at(key: &str, at: Instant) -> InputEvent {
    InputEvent::Key(KeyPress {
        key: ResponseKey::new(key).unwrap(),
        at,
    })
}

/// Keeps every save in memory; optionally fails every save.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub saved: Vec<(Vec<TrialOutcome>, ParticipantId)>,
    pub partial: Vec<(Vec<TrialOutcome>, ParticipantId)>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl PersistenceSink for RecordingSink {
    fn save(
        &mut self,
        records: &[TrialOutcome],
        participant: &ParticipantId,
    ) -> Result<PathBuf, PersistenceError> {
        if self.fail {
            return Err(PersistenceError::Io {
                path: PathBuf::from("/unwritable/data.csv"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.saved.push((records.to_vec(), participant.clone()));
        Ok(PathBuf::from(format!("memory/data{participant}.csv")))
    }

    fn save_partial(
        &mut self,
        records: &[TrialOutcome],
        participant: &ParticipantId,
    ) -> Result<PathBuf, PersistenceError> {
        self.partial.push((records.to_vec(), participant.clone()));
        Ok(PathBuf::from(format!("memory/data{participant}.partial.csv")))
    }
}

pub fn catalog() -> StimulusCatalog {
    StimulusCatalog::new([
        (
            Category::Tool,
            vec![StimulusId::from("hammer"), StimulusId::from("wrench")],
        ),
        (
            Category::NonTool,
            vec![StimulusId::from("shark"), StimulusId::from("cactus")],
        ),
    ])
    .unwrap()
}

pub fn participant() -> ParticipantId {
    ParticipantId::parse("test-01").unwrap()
}

/// Renderer and input wired to one recording.
pub struct Rig {
    pub recording: SharedRecording,
    pub renderer: MockRenderer,
    pub input: MockInput,
    pub catalog: StimulusCatalog,
    pub judge: ResponseJudge,
}

impl Rig {
    pub fn new(responder: Responder) -> Self {
        let recording = recording(responder);
        let judge = ResponseJudge::default();
        Self {
            renderer: MockRenderer {
                recording: recording.clone(),
            },
            input: MockInput {
                recording: recording.clone(),
                judge: judge.clone(),
            },
            recording,
            catalog: catalog(),
            judge,
        }
    }

    pub fn context(&mut self, seed: u64) -> SessionContext<'_> {
        SessionContext::new(
            StdRng::seed_from_u64(seed),
            &self.catalog,
            &self.judge,
            &mut self.renderer,
            &mut self.input,
        )
    }
}
