//! Server configuration from the environment.

use hexreign_core::GameConfig;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TICK_INTERVAL_SECS: u64 = 120;
const DEFAULT_AP_REFRESH_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidInterval { var: &'static str, value: String },

    #[error("could not read game config {path}: {reason}")]
    GameConfig { path: PathBuf, reason: String },
}

/// Settings for the scheduler host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// How often the tick job runs
    pub tick_interval: Duration,
    /// How often action points are refilled
    pub ap_refresh_interval: Duration,
    /// Where the game is persisted between runs, if anywhere
    pub snapshot_path: Option<PathBuf>,
    /// Rules for new games
    pub game: GameConfig,
}

impl ServerConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tick_interval = interval(&lookup, "TICK_INTERVAL_SECS", DEFAULT_TICK_INTERVAL_SECS)?;
        let ap_refresh_interval = interval(
            &lookup,
            "AP_REFRESH_INTERVAL_SECS",
            DEFAULT_AP_REFRESH_INTERVAL_SECS,
        )?;
        let snapshot_path = lookup("SNAPSHOT_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let game = match lookup("GAME_CONFIG_PATH").filter(|p| !p.trim().is_empty()) {
            Some(path) => load_game_config(PathBuf::from(path))?,
            None => GameConfig::default(),
        };

        Ok(Self {
            tick_interval,
            ap_refresh_interval,
            snapshot_path,
            game,
        })
    }
}

fn interval<F>(lookup: &F, var: &'static str, default_secs: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(var) else {
        return Ok(Duration::from_secs(default_secs));
    };
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidInterval { var, value }),
    }
}

fn load_game_config(path: PathBuf) -> Result<GameConfig, ConfigError> {
    let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::GameConfig {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    let config: GameConfig = serde_json::from_str(&text).map_err(|e| ConfigError::GameConfig {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    config.validate().map_err(|e| ConfigError::GameConfig {
        path,
        reason: e.to_string(),
    })?;
    Ok(config)
}
