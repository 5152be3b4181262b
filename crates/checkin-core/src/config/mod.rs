//! Scanner configuration.
//!
//! Endpoints and the API key are provisioned per deployment through
//! environment variables. Sync periods default to a 30 second push and a
//! 60 second pull.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::util::{is_http_url, non_blank};

pub const DEFAULT_PUSH_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_PULL_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_WATERMARK_SKEW: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Runtime configuration for a scanner session.
#[derive(Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Base URL of the roster endpoint; the event id is appended as a path segment
    pub roster_endpoint: String,
    /// URL receiving batched check-in uploads
    pub checkin_endpoint: String,
    /// Static key sent in the `api-key` header
    pub api_key: String,
    pub push_interval: Duration,
    pub pull_interval: Duration,
    /// Safety margin subtracted from "now" when advancing the pull watermark
    pub watermark_skew: Duration,
    /// Request timeout; `None` keeps the transport default
    pub http_timeout: Option<Duration>,
}

impl fmt::Debug for ScannerConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ScannerConfig")
            .field("roster_endpoint", &self.roster_endpoint)
            .field("checkin_endpoint", &self.checkin_endpoint)
            .field("api_key", &"[REDACTED]")
            .field("push_interval", &self.push_interval)
            .field("pull_interval", &self.pull_interval)
            .field("watermark_skew", &self.watermark_skew)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl ScannerConfig {
    /// Config with default intervals for the given endpoints.
    pub fn new(
        roster_endpoint: impl Into<String>,
        checkin_endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            roster_endpoint: normalize_endpoint(roster_endpoint.into(), "CHECKIN_ROSTER_URL")?,
            checkin_endpoint: normalize_endpoint(checkin_endpoint.into(), "CHECKIN_UPLOAD_URL")?,
            api_key: non_blank(Some(api_key.into()))
                .ok_or(ConfigError::MissingVar("CHECKIN_API_KEY"))?,
            push_interval: DEFAULT_PUSH_INTERVAL,
            pull_interval: DEFAULT_PULL_INTERVAL,
            watermark_skew: DEFAULT_WATERMARK_SKEW,
            http_timeout: None,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let roster_endpoint = required_trimmed(&lookup, "CHECKIN_ROSTER_URL")?;
        let checkin_endpoint = required_trimmed(&lookup, "CHECKIN_UPLOAD_URL")?;
        let api_key = required_trimmed(&lookup, "CHECKIN_API_KEY")?;

        let mut config = Self::new(roster_endpoint, checkin_endpoint, api_key)?;
        config.push_interval =
            parse_secs(&lookup, "CHECKIN_PUSH_INTERVAL_SECS")?.unwrap_or(DEFAULT_PUSH_INTERVAL);
        config.pull_interval =
            parse_secs(&lookup, "CHECKIN_PULL_INTERVAL_SECS")?.unwrap_or(DEFAULT_PULL_INTERVAL);
        config.watermark_skew =
            parse_secs(&lookup, "CHECKIN_WATERMARK_SKEW_SECS")?.unwrap_or(DEFAULT_WATERMARK_SKEW);
        config.http_timeout = parse_secs(&lookup, "CHECKIN_HTTP_TIMEOUT_SECS")?;

        if config.push_interval.is_zero() || config.pull_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "sync intervals must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }
}

fn required_trimmed(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    non_blank(lookup(name)).ok_or(ConfigError::MissingVar(name))
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = non_blank(lookup(name)) else {
        return Ok(None);
    };
    raw.parse::<u64>()
        .map(|secs| Some(Duration::from_secs(secs)))
        .map_err(|_| ConfigError::Invalid(format!("{name} must be a whole number of seconds")))
}

fn normalize_endpoint(raw: String, name: &'static str) -> Result<String, ConfigError> {
    let endpoint = non_blank(Some(raw)).ok_or(ConfigError::MissingVar(name))?;
    if is_http_url(&endpoint) {
        Ok(endpoint.trim_end_matches('/').to_string())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must start with http:// or https://"
        )))
    }
}
