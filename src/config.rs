use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default location of the config file, relative to the working directory.
pub const CONFIG_FILE: &str = "VotePage.toml";

/// Prefix of environment variables that override the config file.
pub const ENV_PREFIX: &str = "VOTE_PAGE_";

/// How the status resolver decides when to re-evaluate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    /// Re-evaluate on a fixed tick.
    Tick,
    /// Sleep until the next start/end instant, then re-evaluate.
    Boundary,
}

/// Application configuration, derived from `VotePage.toml` and
/// `VOTE_PAGE_*` environment variables, on top of built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    // non-secrets
    api_url: String,
    tick_ms: u64,
    schedule: Schedule,
    request_timeout_secs: u64,
    // secrets
    session_cookie: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000/api".to_string(),
            tick_ms: 1000,
            schedule: Schedule::Tick,
            request_timeout_secs: 10,
            session_cookie: None,
        }
    }
}

impl Config {
    /// Load the config from the defaults, the given TOML file (if it exists)
    /// and the environment, in increasing order of precedence.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::figment(path).extract()?;
        Ok(config)
    }

    /// The layered configuration sources, exposed so callers can merge in
    /// their own overrides before extracting.
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Base URL of the voting backend's REST API, without a trailing slash.
    pub fn api_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Interval between status re-evaluations in `tick` mode.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// How the status resolver schedules re-evaluation.
    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Upper bound on any single request to the backend.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Session cookie identifying the current user to the backend, if any.
    pub fn session_cookie(&self) -> Option<&str> {
        self.session_cookie.as_deref()
    }

    /// Replace the backend URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Replace the schedule mode.
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }
}
