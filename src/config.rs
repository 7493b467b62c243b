//! Environment-driven configuration.

use std::str::FromStr;
use std::time::Duration;

use crate::backend::BackendConfig;
use crate::error::ConfigError;
use crate::poller::PollerConfig;
use crate::route_planner::RoutePlannerConfig;

pub const BASE_URL_ENV: &str = "TRAVEL_PLANNER_BASE_URL";
pub const TIMEOUT_SECS_ENV: &str = "TRAVEL_PLANNER_TIMEOUT_SECS";
pub const POLL_INTERVAL_MS_ENV: &str = "TRAVEL_PLANNER_POLL_INTERVAL_MS";
pub const POLL_MAX_ATTEMPTS_ENV: &str = "TRAVEL_PLANNER_POLL_MAX_ATTEMPTS";

/// Source of configuration values, so tests can avoid mutating the
/// process environment.
pub trait ConfigEnv {
    fn string(&self, name: &str) -> Option<String>;
}

/// Reads from the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ConfigEnv for ProcessEnv {
    fn string(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub poller: PollerConfig,
    pub planner: RoutePlannerConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(&ProcessEnv)
    }

    /// Starts from the defaults and applies every variable that is set.
    /// Empty values count as unset.
    pub fn from_env_with(env: &impl ConfigEnv) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(base_url) = lookup(env, BASE_URL_ENV) {
            config.backend.base_url = base_url;
        }
        if let Some(secs) = parse(env, TIMEOUT_SECS_ENV)? {
            config.backend.timeout_secs = secs;
        }
        if let Some(ms) = parse::<u64>(env, POLL_INTERVAL_MS_ENV)? {
            config.poller.interval = Duration::from_millis(ms);
        }
        if let Some(max) = parse(env, POLL_MAX_ATTEMPTS_ENV)? {
            config.poller.max_attempts = max;
        }

        tracing::debug!(
            base_url = %config.backend.base_url,
            timeout_secs = config.backend.timeout_secs,
            poll_interval_ms = config.poller.interval.as_millis() as u64,
            poll_max_attempts = config.poller.max_attempts,
            "configuration loaded"
        );
        Ok(config)
    }
}

fn lookup(env: &impl ConfigEnv, key: &str) -> Option<String> {
    env.string(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse<T: FromStr>(env: &impl ConfigEnv, key: &'static str) -> Result<Option<T>, ConfigError> {
    lookup(env, key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key, value })
        })
        .transpose()
}
