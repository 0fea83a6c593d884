//! Analyzer configuration from environment variables.
//!
//! Settings only shape retry guidance and logging. Classification output
//! never depends on them.

use crate::error::{AnalyzerError, AnalyzerResult};
use std::sync::OnceLock;
use std::time::Duration;

pub const MAX_RETRIES_VAR: &str = "LINE_ERRORS_MAX_RETRIES";
pub const RATE_LIMIT_FALLBACK_VAR: &str = "LINE_ERRORS_RATE_LIMIT_FALLBACK_SECS";
pub const SERVER_ERROR_FALLBACK_VAR: &str = "LINE_ERRORS_SERVER_ERROR_FALLBACK_SECS";
pub const LOG_CLASSIFICATIONS_VAR: &str = "LINE_ERRORS_LOG_CLASSIFICATIONS";

/// Analyzer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerSettings {
    /// Maximum retry attempts suggested for retryable errors.
    pub max_retries: usize,
    /// Wait suggested for rate limits without a `Retry-After` header.
    pub rate_limit_fallback: Duration,
    /// Base wait suggested for server errors.
    pub server_error_fallback: Duration,
    /// Emit an `info` event per classification.
    pub log_classifications: bool,
}

impl AnalyzerSettings {
    /// Process-wide settings, read from the environment once.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `LINE_ERRORS_MAX_RETRIES` | `3` |
    /// | `LINE_ERRORS_RATE_LIMIT_FALLBACK_SECS` | `60` |
    /// | `LINE_ERRORS_SERVER_ERROR_FALLBACK_SECS` | `10` |
    /// | `LINE_ERRORS_LOG_CLASSIFICATIONS` | `false` |
    ///
    /// Invalid values are logged and replaced by their defaults.
    pub fn global() -> &'static Self {
        static SETTINGS: OnceLock<AnalyzerSettings> = OnceLock::new();

        SETTINGS.get_or_init(|| {
            Self::from_lookup(|key| std::env::var(key).ok()).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Falling back to default analyzer settings");
                Self::default()
            })
        })
    }

    /// Build settings from any key lookup.
    ///
    /// Missing keys take defaults; present but unparseable keys are errors.
    pub fn from_lookup<F>(lookup: F) -> AnalyzerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_retries = match lookup(MAX_RETRIES_VAR) {
            Some(raw) => parse_number(MAX_RETRIES_VAR, &raw)?,
            None => defaults.max_retries,
        };
        let rate_limit_fallback = match lookup(RATE_LIMIT_FALLBACK_VAR) {
            Some(raw) => Duration::from_secs(parse_number(RATE_LIMIT_FALLBACK_VAR, &raw)?),
            None => defaults.rate_limit_fallback,
        };
        let server_error_fallback = match lookup(SERVER_ERROR_FALLBACK_VAR) {
            Some(raw) => Duration::from_secs(parse_number(SERVER_ERROR_FALLBACK_VAR, &raw)?),
            None => defaults.server_error_fallback,
        };
        let log_classifications = match lookup(LOG_CLASSIFICATIONS_VAR) {
            Some(raw) => parse_flag(LOG_CLASSIFICATIONS_VAR, &raw)?,
            None => defaults.log_classifications,
        };

        Ok(Self {
            max_retries,
            rate_limit_fallback,
            server_error_fallback,
            log_classifications,
        })
    }

    /// Set the retry limit.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Enable or disable `info!` logging of each classification.
    pub fn with_log_classifications(mut self, enabled: bool) -> Self {
        self.log_classifications = enabled;
        self
    }
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            rate_limit_fallback: Duration::from_secs(60),
            server_error_fallback: Duration::from_secs(10),
            log_classifications: false,
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> AnalyzerResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AnalyzerError::configuration(key, format!("expected a number, got '{raw}'")))
}

fn parse_flag(key: &str, raw: &str) -> AnalyzerResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(AnalyzerError::configuration(
            key,
            format!("expected a boolean, got '{raw}'"),
        )),
    }
}
