//! Retry guidance for classified errors.
//!
//! This module only computes how long a caller should wait. It never sleeps
//! and never re-issues a request.

use crate::category::ErrorCategory;
use crate::result::ClassificationResult;
use crate::settings::AnalyzerSettings;
use std::time::Duration;

/// Backoff policy applied to retryable classification results.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts.
    pub max_attempts: usize,
    /// Base wait for rate limits without a `Retry-After` header.
    pub rate_limit_delay: Duration,
    /// Base wait for server errors.
    pub server_error_delay: Duration,
    /// Cap applied after backoff.
    pub max_delay: Duration,
    /// Multiplier between consecutive attempts.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&AnalyzerSettings::default())
    }
}

impl RetryPolicy {
    /// Policy built from default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy using the retry limits and fallbacks of `settings`.
    pub fn from_settings(settings: &AnalyzerSettings) -> Self {
        Self {
            max_attempts: settings.max_retries,
            rate_limit_delay: settings.rate_limit_fallback,
            server_error_delay: settings.server_error_fallback,
            max_delay: Duration::from_secs(300),
            backoff_multiplier: 2.0,
        }
    }

    /// Set the number of retries allowed.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the cap applied after backoff.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Set the multiplier between consecutive attempts.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Whether attempt number `attempt` (1-based) is still allowed.
    pub fn should_retry(&self, result: &ClassificationResult, attempt: usize) -> bool {
        result.is_retryable && attempt >= 1 && attempt <= self.max_attempts
    }

    /// Wait before retry attempt `attempt` (1-based), or `None` when the
    /// error should not be retried.
    ///
    /// A numeric `Retry-After` wins over computed backoff.
    pub fn suggested_delay(
        &self,
        result: &ClassificationResult,
        attempt: usize,
    ) -> Option<Duration> {
        if !self.should_retry(result, attempt) {
            return None;
        }
        if let Some(seconds) = result.retry_after {
            return Some(Duration::from_secs(seconds));
        }

        let base = self.base_delay(result.category)?;
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let seconds = base.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Some(self.capped(seconds))
    }

    /// `seconds` as a duration no longer than `max_delay`.
    ///
    /// Overflowing or NaN values saturate to the cap, negative ones to zero.
    fn capped(&self, seconds: f64) -> Duration {
        if seconds.is_nan() {
            return self.max_delay;
        }
        Duration::try_from_secs_f64(seconds.max(0.0))
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    fn base_delay(&self, category: ErrorCategory) -> Option<Duration> {
        match category {
            ErrorCategory::RateLimit => Some(self.rate_limit_delay),
            ErrorCategory::ServerError => Some(self.server_error_delay),
            other => other.base_retry_delay(),
        }
    }
}
