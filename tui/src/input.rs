//! Terminal key input for the session.
//!
//! A blocking reader task polls crossterm and forwards every event, stamped
//! with the moment it was read, over a bounded channel. The session thread
//! blocks on the other end, which makes `wait_for_keydown_or_cancel` the one
//! place a session ever waits.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tracing::debug;

use rotask_core::{InputEvent, InputSource, KeyPress};
use rotask_types::ResponseKey;

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM

enum InputMsg {
    Event(Event, Instant),
    Error(String),
}

pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    /// Start the reader task. Must be called inside a tokio runtime.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(&stop2, &tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Close the receiver first so a reader blocked on a full channel wakes.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop; do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

impl InputSource for InputPump {
    fn wait_for_keydown_or_cancel(&mut self) -> io::Result<InputEvent> {
        loop {
            match self.rx.blocking_recv() {
                Some(InputMsg::Event(ev, at)) => {
                    if let Some(event) = translate(&ev, at) {
                        return Ok(event);
                    }
                }
                Some(InputMsg::Error(message)) => return Err(io::Error::other(message)),
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::BrokenPipe,
                        "terminal input stopped",
                    ));
                }
            }
        }
    }
}

fn input_loop(stop: &AtomicBool, tx: &mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    let at = Instant::now();
                    if tx.blocking_send(InputMsg::Event(ev, at)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
    debug!("Input loop stopped");
}

/// Map a terminal event to a session input, or `None` to keep waiting.
///
/// Only key-down counts; releases, repeats, resizes and mouse events are
/// skipped. `Esc` and `Ctrl+C` cancel.
#[must_use]
pub fn translate(event: &Event, at: Instant) -> Option<InputEvent> {
    let Event::Key(key) = event else {
        return None;
    };
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if is_cancel(key) {
        return Some(InputEvent::Cancel);
    }
    let name = key_name(key.code)?;
    let key = ResponseKey::new(name).ok()?;
    Some(InputEvent::Key(KeyPress { key, at }))
}

fn is_cancel(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => true,
        KeyCode::Char('c' | 'C') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn key_name(code: KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Char(c) => return Some(ResponseKey::from_char(c).as_str().to_owned()),
        KeyCode::Enter => "return",
        KeyCode::Tab => "tab",
        KeyCode::Backspace => "backspace",
        KeyCode::Left => "left",
        KeyCode::Right => "right",
        KeyCode::Up => "up",
        KeyCode::Down => "down",
        KeyCode::F(n) => return Some(format!("f{n}")),
        _ => return None,
    };
    Some(name.to_owned())
}
