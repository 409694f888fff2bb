//! Process configuration, read once at startup.

use std::str::FromStr;

use thiserror::Error;

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const ACTIVITY_LOG_ENV: &str = "QUOTAHIT_ACTIVITY_LOG";

const DEFAULT_DATABASE_URL: &str = "sqlite://quotahit.db";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {ACTIVITY_LOG_ENV} value '{0}' (valid: best-effort, strict)")]
    InvalidActivityLogPolicy(String),
}

/// What to do when writing an activity log entry fails after the primary
/// mutation already succeeded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActivityLogPolicy {
    /// Log the failure and keep the action's result. Matches the historical
    /// behavior of the pipeline.
    #[default]
    BestEffort,
    /// Surface the failure as the action's error.
    Strict,
}

impl FromStr for ActivityLogPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best-effort" | "best_effort" => Ok(ActivityLogPolicy::BestEffort),
            "strict" => Ok(ActivityLogPolicy::Strict),
            other => Err(ConfigError::InvalidActivityLogPolicy(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub activity_log: ActivityLogPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            get(DATABASE_URL_ENV).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let activity_log = match get(ACTIVITY_LOG_ENV) {
            Some(raw) => raw.parse()?,
            None => ActivityLogPolicy::default(),
        };
        Ok(AppConfig { database_url, activity_log })
    }
}
