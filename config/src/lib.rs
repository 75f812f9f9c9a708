//! Configuration loading for rotask.
//!
//! The TOML file is optional. Raw structs mirror the file layout with
//! `Option` fields; [`RotaskConfig::from_toml`] resolves them into the
//! validated types from `rotask-types`, so nothing downstream re-checks
//! bounds.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use rotask_types::{
    Angle, AngleError, ExperimentPlan, KeyBindingError, KeyBindings, PlanError, ResponseKey,
    TrainingPlan, settings,
};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "ROTASK_CONFIG";

const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid angle in [experiment]: {0}")]
    Angle(#[from] AngleError),
    #[error("invalid experiment plan: {0}")]
    Plan(#[from] PlanError),
    #[error("invalid [keys]: {0}")]
    Keys(#[from] KeyBindingError),
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    experiment: Option<RawExperiment>,
    training: Option<RawTraining>,
    keys: Option<RawKeys>,
    stimuli: Option<RawStimuli>,
    output: Option<RawOutput>,
    session: Option<RawSession>,
    display: Option<RawDisplay>,
}

#[derive(Debug, Default, Deserialize)]
struct RawExperiment {
    angles: Option<Vec<u32>>,
    repetitions: Option<usize>,
    pause_every: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTraining {
    set_size: Option<usize>,
    min_correct: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct RawKeys {
    mirrored: Option<String>,
    not_mirrored: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawStimuli {
    dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOutput {
    data_dir: Option<String>,
    save_partial_on_cancel: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSession {
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDisplay {
    high_contrast: Option<bool>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct RotaskConfig {
    pub experiment: ExperimentPlan,
    pub training: TrainingPlan,
    pub keys: KeyBindings,
    /// Directory of text bitmaps; `None` uses the built-in stimulus set.
    pub stimuli_dir: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub save_partial_on_cancel: bool,
    pub seed: Option<u64>,
    /// Plain black/white palette instead of the default colours.
    pub high_contrast: bool,
}

impl Default for RotaskConfig {
    fn default() -> Self {
        Self {
            experiment: ExperimentPlan::default(),
            training: TrainingPlan::default(),
            keys: KeyBindings::default(),
            stimuli_dir: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            save_partial_on_cancel: false,
            seed: None,
            high_contrast: false,
        }
    }
}

impl RotaskConfig {
    /// Load from [`config_path`]. A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        Self::resolve(raw)
    }

    fn resolve(raw: RawConfig) -> Result<Self, ConfigError> {
        let experiment = raw.experiment.unwrap_or_default();
        let angles = experiment
            .angles
            .unwrap_or_else(|| settings::REFERENCE_ANGLES.to_vec())
            .into_iter()
            .map(Angle::new)
            .collect::<Result<Vec<_>, _>>()?;
        let experiment = ExperimentPlan::new(
            angles,
            experiment
                .repetitions
                .unwrap_or(settings::REFERENCE_REPETITIONS),
            experiment
                .pause_every
                .unwrap_or(settings::REFERENCE_PAUSE_EVERY),
        )?;

        let training = raw.training.unwrap_or_default();
        let training = TrainingPlan::new(
            training
                .set_size
                .unwrap_or(settings::REFERENCE_TRAINING_SET),
            training
                .min_correct
                .unwrap_or(settings::REFERENCE_TRAINING_MIN_CORRECT),
            &experiment,
        )?;

        let keys = match raw.keys {
            None => KeyBindings::default(),
            Some(keys) => {
                let defaults = KeyBindings::default();
                let mirrored = match keys.mirrored {
                    Some(k) => ResponseKey::new(k)?,
                    None => defaults.mirrored().clone(),
                };
                let not_mirrored = match keys.not_mirrored {
                    Some(k) => ResponseKey::new(k)?,
                    None => defaults.not_mirrored().clone(),
                };
                KeyBindings::new(mirrored, not_mirrored)?
            }
        };

        let stimuli_dir = raw
            .stimuli
            .and_then(|s| s.dir)
            .map(|dir| PathBuf::from(expand_env_vars(&dir)));

        let output = raw.output.unwrap_or_default();
        let data_dir = output.data_dir.map_or_else(
            || PathBuf::from(DEFAULT_DATA_DIR),
            |dir| PathBuf::from(expand_env_vars(&dir)),
        );

        Ok(Self {
            experiment,
            training,
            keys,
            stimuli_dir,
            data_dir,
            save_partial_on_cancel: output.save_partial_on_cancel.unwrap_or(false),
            seed: raw.session.and_then(|s| s.seed),
            high_contrast: raw
                .display
                .and_then(|d| d.high_contrast)
                .unwrap_or(false),
        })
    }
}

/// Replace `${VAR}` references with the variable's value (empty if unset).
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if !var.is_empty() {
                    out.push_str(&env::var(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// `$ROTASK_CONFIG` if set, else `~/.rotask/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    rotask_home().map(|dir| dir.join("config.toml"))
}

/// `~/.rotask`, the home for config and logs.
#[must_use]
pub fn rotask_home() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".rotask"))
}
