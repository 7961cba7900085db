use anyhow::Result;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub general: General,
    pub spacetime: Spacetime,
    pub explorer: Explorer,
    pub game: Game,
}

#[derive(Debug, Clone, Deserialize)]
pub struct General {
    pub log_level: String,
}

/// Remote database channel settings. The module name identifies the
/// deployment; reconnect delay grows linearly with the attempt number.
#[derive(Debug, Clone, Deserialize)]
pub struct Spacetime {
    pub host: String,
    pub db_name: String,
    pub connect_timeout_secs: u64,
    pub reconnect_delay_ms: u64,
    pub max_reconnect_attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Explorer {
    pub api_url: String,
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Game {
    pub chat_history_limit: usize,
    pub leaderboard_window_days: u32,
    pub leaderboard_size: usize,
    pub round_tick_interval_ms: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        let content = std::fs::read_to_string("config/default.toml")?;
        Self::from_toml_str(&content)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_toml_str(s)
    }
}
