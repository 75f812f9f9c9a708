//! rotask - mental rotation experiment in the terminal.
//!
//! # Architecture
//!
//! ```text
//! main() -> config + participant prompt -> TerminalSession::new()
//!                                               |
//!                      spawn_blocking(Session::run) <-- InputPump (reader task)
//!                                               |
//!                          SessionEnd::Completed | Cancelled -> save, report
//! ```
//!
//! The session runs on a blocking thread and waits on the input channel
//! between frames. Nothing else touches the terminal while it runs.

use anyhow::{Context, Result, bail};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    fs::{self, OpenOptions},
    io::{self, BufRead, Write, stdout},
    path::PathBuf,
    sync::Mutex,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use rotask_config::{RotaskConfig, rotask_home};
use rotask_core::{
    CsvSink, PersistenceSink, ResultLog, Session, SessionContext, SessionEnd, SessionPhase,
    SessionSummary,
};
use rotask_tui::{InputPump, StimulusLibrary, TerminalRenderer, palette};
use rotask_types::{ParticipantId, ResponseJudge};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // If we can't open a log file, prefer "no logs" over corrupting the TUI
    // by writing to stdout/stderr.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.rotask/logs/rotask.log
    if let Some(home) = rotask_home() {
        candidates.push(home.join("logs").join("rotask.log"));
    }

    // Fallback: ./.rotask/logs/rotask.log (useful in constrained environments)
    candidates.push(local_dir().join("logs").join("rotask.log"));

    candidates
}

fn local_dir() -> PathBuf {
    PathBuf::from(".rotask")
}

/// Where results go when the configured data directory cannot be written.
fn fallback_data_dir() -> PathBuf {
    local_dir().join("data")
}

/// Ask for the participant number on the cooked terminal, re-prompting on
/// invalid input.
fn prompt_participant(
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<ParticipantId> {
    loop {
        write!(output, "Participant number: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("no participant number entered");
        }
        match ParticipantId::parse(&line) {
            Ok(id) => return Ok(id),
            Err(err) => writeln!(output, "{err}")?,
        }
    }
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Enables raw mode, enters the alternate screen and hides the cursor. On
/// drop everything is restored, so the shell stays usable after panics or
/// early returns.
struct TerminalSession;

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            let _ = execute!(out, LeaveAlternateScreen, Show);
            return Err(err.into());
        }
        Ok(Self)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen, Show);
    }
}

fn load_library(config: &RotaskConfig) -> Result<StimulusLibrary> {
    match &config.stimuli_dir {
        Some(dir) => StimulusLibrary::load_dir(dir)
            .with_context(|| format!("failed to load stimuli from {}", dir.display())),
        None => Ok(StimulusLibrary::builtin()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = RotaskConfig::load().context("invalid configuration")?;
    let library = load_library(&config)?;
    let catalog = library.catalog().context("invalid stimulus set")?;
    let judge = ResponseJudge::new(config.keys.clone());

    let participant = prompt_participant(&mut io::stdin().lock(), &mut io::stdout())?;
    tracing::info!(%participant, seed = ?config.seed, "Starting session");

    let data_dir = config.data_dir.clone();
    let end = {
        let session_guard = TerminalSession::new()?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        let mut renderer = TerminalRenderer::new(terminal, library, palette(config.high_contrast));
        let mut input = InputPump::new();

        let experiment = config.experiment.clone();
        let training = config.training;
        let seed = config.seed;
        let participant = participant.clone();
        let mut sink = CsvSink::new(&data_dir);

        let (end, mut input) = tokio::task::spawn_blocking(move || {
            let ctx = SessionContext::with_seed(seed, &catalog, &judge, &mut renderer, &mut input);
            let end = Session::new(ctx, experiment, training, participant)
                .map_err(anyhow::Error::from)
                .and_then(|session| session.run(&mut sink).map_err(anyhow::Error::from));
            (end, input)
        })
        .await
        .context("session thread panicked")?;

        input.shutdown().await;
        drop(session_guard);
        end?
    };

    match end {
        SessionEnd::Completed(done) => {
            let saved_in = match &done.saved {
                Ok(path) => {
                    println!("Saved data in:\n{}", path.display());
                    Some(data_dir)
                }
                Err(err) => {
                    eprintln!("Failed to save results: {err}");
                    retry_save(&done.log, &participant)
                }
            };
            if let Some(dir) = saved_in {
                let summary = SessionSummary::from_session(&done);
                if let Err(err) = CsvSink::new(dir).save_summary(&summary) {
                    eprintln!("Failed to save session summary: {err}");
                }
            }
        }
        SessionEnd::Cancelled { phase, log } => {
            eprintln!("Session cancelled during {phase} after {} trials.", log.len());
            if should_save_partial(config.save_partial_on_cancel, phase, &log) {
                match CsvSink::new(&data_dir).save_partial(log.outcomes(), &participant) {
                    Ok(path) => println!("Saved partial data in:\n{}", path.display()),
                    Err(err) => eprintln!("Failed to save partial results: {err}"),
                }
            }
        }
    }

    Ok(())
}

/// Rows from a cancelled session go to `.partial.csv`. A cancel during
/// intake comes after the full data file was written, so nothing is added.
fn should_save_partial(enabled: bool, phase: SessionPhase, log: &ResultLog) -> bool {
    enabled && phase != SessionPhase::Completion && !log.is_empty()
}

/// One more attempt into the local fallback directory. Returns the directory
/// the results landed in.
fn retry_save(log: &ResultLog, participant: &ParticipantId) -> Option<PathBuf> {
    let dir = fallback_data_dir();
    match CsvSink::new(&dir).save(log.outcomes(), participant) {
        Ok(path) => {
            println!("Saved data in fallback location:\n{}", path.display());
            Some(dir)
        }
        Err(err) => {
            tracing::error!("Fallback save failed: {err}");
            eprintln!("Fallback save failed: {err}");
            None
        }
    }
}
