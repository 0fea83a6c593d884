//! # LINE Errors
//!
//! Error classification for the LINE Messaging API.
//!
//! This crate turns whatever a failed API call left behind (an SDK exception,
//! an HTTP response, a JSON mapping or a line of log text) into a normalized
//! [`ClassificationResult`]: a category, a severity, retryability, and
//! guidance for the caller.
//!
//! ## Features
//!
//! - **Tagged inputs**: every supported shape is a variant of [`ErrorInput`]
//! - **Log parsing**: status, reason, header dumps and JSON bodies from SDK log text
//! - **Tiered rules**: error code, then HTTP status, then message keywords
//! - **API context**: tags such as `user.user_profile` refine generic outcomes
//! - **Retry guidance**: `Retry-After` aware delays via [`RetryPolicy`]
//! - **Serialization**: full serde support for results
//!
//! ## Quick Start
//!
//! ```rust
//! use line_errors::{classify_log, ErrorCategory, Severity};
//!
//! let log = "(404)\nReason: Not Found\nHTTP response body: {\"message\":\"Not found\"}";
//!
//! // Without context a 404 is a plain missing resource.
//! let generic = classify_log(log, None);
//! assert_eq!(generic.category, ErrorCategory::ResourceNotFound);
//!
//! // From the profile endpoint it means the user blocked the account.
//! let result = classify_log(log, Some("user.user_profile"));
//! assert_eq!(result.category, ErrorCategory::UserBlocked);
//! assert_eq!(result.severity, Severity::Medium);
//! assert!(!result.is_retryable);
//! ```
//!
//! ## Analyzer with stats
//!
//! ```rust
//! use line_errors::{ErrorAnalyzer, ErrorInput, InMemoryStats, ErrorCategory};
//! use std::sync::Arc;
//!
//! let stats = Arc::new(InMemoryStats::new());
//! let analyzer = ErrorAnalyzer::new().with_stats(stats.clone());
//!
//! let input = ErrorInput::try_from(serde_json::json!({
//!     "status_code": 429,
//!     "message": "Too many requests",
//!     "headers": {"Retry-After": "30"}
//! }))?;
//! let result = analyzer.classify(&input, None);
//!
//! assert_eq!(result.retry_after, Some(30));
//! assert_eq!(stats.count(ErrorCategory::RateLimit), 1);
//! # Ok::<(), line_errors::AnalyzerError>(())
//! ```

pub mod analyzer;
pub mod category;
pub mod classifier;
pub mod context;
pub mod error;
pub mod headers;
pub mod input;
pub mod log_parser;
pub mod record;
pub mod result;
pub mod retry;
pub mod rules;
pub mod settings;
pub mod stats;

pub use analyzer::ErrorAnalyzer;
pub use category::{ErrorCategory, Severity, NON_RETRYABLE_STATUS_CODES};
pub use classifier::{Classifier, Outcome, Tier};
pub use context::{ApiContext, ApiNamespace};
pub use error::{AnalyzerError, AnalyzerResult};
pub use input::{
    ApiErrorBody, ApiException, ErrorInput, HttpResponse, LineBotApiError, SignatureError,
};
pub use record::{NormalizedErrorRecord, DEFAULT_STATUS_CODE};
pub use result::ClassificationResult;
pub use retry::RetryPolicy;
pub use settings::AnalyzerSettings;
pub use stats::{CategoryStats, InMemoryStats, NoopStats, StatsSink};

use std::sync::OnceLock;

/// Shared analyzer with global settings and no stats.
fn default_analyzer() -> &'static ErrorAnalyzer {
    static ANALYZER: OnceLock<ErrorAnalyzer> = OnceLock::new();
    ANALYZER.get_or_init(ErrorAnalyzer::new)
}

/// Classify any supported input with the default analyzer.
pub fn classify(input: &ErrorInput, api_context: Option<&str>) -> ClassificationResult {
    default_analyzer().classify(input, api_context)
}

/// Classify log text with the default analyzer.
pub fn classify_log(text: &str, api_context: Option<&str>) -> ClassificationResult {
    default_analyzer().classify_log(text, api_context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_crate_level_functions_should_match_analyzer() {
        // Given: the same log through both entry points
        let log = "(401)\nReason: Unauthorized";

        // When
        let via_fn = classify_log(log, None);
        let via_analyzer =
            ErrorAnalyzer::with_settings(AnalyzerSettings::default()).classify_log(log, None);

        // Then: results are identical
        assert_eq!(via_fn, via_analyzer);
        assert_eq!(via_fn.category, ErrorCategory::AuthError);
        assert_eq!(via_fn.severity, Severity::Critical);
    }

    #[test]
    fn test_classification_should_be_deterministic() {
        let input =
            ErrorInput::try_from(json!({"status_code": 400, "message": "reply token expired"}))
                .unwrap();
        let first = classify(&input, Some("message.message_reply"));
        let second = classify(&input, Some("message.message_reply"));
        assert_eq!(first, second);
        assert_eq!(first.category, ErrorCategory::ReplyTokenExpired);
    }

    #[test]
    fn test_empty_log_should_be_unknown_with_default_status() {
        let result = classify_log("", None);
        assert_eq!(result.category, ErrorCategory::UnknownError);
        assert_eq!(result.status_code, DEFAULT_STATUS_CODE);
        assert_eq!(result.message, "");
        assert!(!result.is_retryable);
    }
}
