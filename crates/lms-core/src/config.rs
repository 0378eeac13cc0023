use crate::error::{LmsError, Result};
use std::time::Duration;

pub const BASE_URL_VARS: &[&str] = &["API_BASE_URL", "CANVAS_API_URL"];
pub const API_KEY_VARS: &[&str] = &["API_KEY", "CANVAS_API_KEY"];
pub const TIMEOUT_VAR: &str = "API_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Connection settings for the remote API, read once at startup.
#[derive(Clone)]
pub struct Config {
    /// Instance root without the `/api/v1` suffix, e.g. `https://lms.example.edu`.
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup. The first non-empty
    /// value among each variable's aliases wins.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let first = |names: &[&str]| {
            names
                .iter()
                .copied()
                .filter_map(&lookup)
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };

        let base_url = first(BASE_URL_VARS);
        let api_key = first(API_KEY_VARS);
        let (Some(base_url), Some(api_key)) = (base_url, api_key) else {
            return Err(LmsError::Configuration(format!(
                "{} and {} must be set in the environment",
                BASE_URL_VARS[0], API_KEY_VARS[0]
            )));
        };

        let timeout_secs = match lookup(TIMEOUT_VAR) {
            Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<u64>().map_err(|_| {
                LmsError::Configuration(format!(
                    "{TIMEOUT_VAR} must be a whole number of seconds, got '{raw}'"
                ))
            })?,
            _ => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(LmsError::Configuration(format!(
                "{TIMEOUT_VAR} must be at least 1 second"
            )));
        }

        Ok(Config {
            base_url: normalize_base_url(&base_url),
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Absolute URL for an API path such as `sections/12`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim_end_matches('/');
    trimmed
        .strip_suffix("/api/v1")
        .unwrap_or(trimmed)
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
