use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "https://api.hh.ru";
pub const DEFAULT_USER_AGENT: &str = "vacancy-stats/0.1 (salary and skill statistics)";
pub const DEFAULT_CACHE_DIR: &str = "cache";
pub const DEFAULT_REGION: &str = "113";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings. Built once at startup and handed to the components that need them.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    pub user_agent: String,
    pub cache_dir: PathBuf,
    pub request_timeout: Duration,
    /// Minimum spacing between two detail requests of one worker.
    pub detail_delay: Duration,
    pub detail_workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            request_timeout: Duration::from_secs(30),
            detail_delay: Duration::from_millis(250),
            detail_workers: 1,
        }
    }
}

impl Config {
    /// Reads the process environment, loading a `.env` file first if present.
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let timeout_secs: u64 = get_parsed(&lookup, "HH_REQUEST_TIMEOUT_SECS", 30)?;
        let delay_ms: u64 = get_parsed(&lookup, "HH_DETAIL_DELAY_MS", 250)?;
        let workers: usize = get_parsed(&lookup, "HH_DETAIL_WORKERS", defaults.detail_workers)?;
        if workers == 0 {
            return Err(ConfigError::Invalid {
                key: "HH_DETAIL_WORKERS",
                value: "0".to_string(),
            });
        }

        Ok(Config {
            api_base_url: get_or_default(&lookup, "HH_API_BASE_URL", DEFAULT_API_BASE_URL),
            user_agent: get_or_default(&lookup, "HH_USER_AGENT", DEFAULT_USER_AGENT),
            cache_dir: PathBuf::from(get_or_default(&lookup, "VACANCY_CACHE_DIR", DEFAULT_CACHE_DIR)),
            request_timeout: Duration::from_secs(timeout_secs),
            detail_delay: Duration::from_millis(delay_ms),
            detail_workers: workers,
        })
    }
}

fn get_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn get_parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
