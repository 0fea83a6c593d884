//! Classification result and its assembly from record and outcome.

use crate::category::{ErrorCategory, Severity};
use crate::classifier::Outcome;
use crate::error::AnalyzerResult;
use crate::headers::RETRY_AFTER_HEADER;
use crate::input::ErrorInput;
use crate::record::NormalizedErrorRecord;
use crate::rules;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Characters of the message shown by `Display`.
const DISPLAY_MESSAGE_CHARS: usize = 50;

/// Everything known about one analyzed error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult {
    /// Extracted status, or 500 when none was found.
    pub status_code: u16,
    pub error_code: Option<String>,
    pub message: String,
    pub category: ErrorCategory,
    pub severity: Severity,
    pub is_retryable: bool,
    pub description: String,
    pub recommended_action: String,
    pub documentation_url: Option<String>,
    pub solutions: Vec<String>,
    /// Seconds to wait, from a numeric `Retry-After` header.
    pub retry_after: Option<u64>,
    pub request_id: Option<String>,
    pub accepted_request_id: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body_json: Option<Value>,
    pub details: Vec<Value>,
    /// Canonical tag of the API context that was applied.
    pub api_context: Option<String>,
    pub raw: ErrorInput,
}

impl ClassificationResult {
    /// Combine an extracted record and a classifier outcome.
    pub fn assemble(record: NormalizedErrorRecord, outcome: Outcome, raw: ErrorInput) -> Self {
        let status_code = record.effective_status();
        let retry_after = record
            .header(RETRY_AFTER_HEADER)
            .and_then(|value| value.trim().parse::<u64>().ok());

        let (description, recommended_action, documentation_url, solutions) =
            match outcome.endpoint {
                Some(entry) => (
                    entry.description.to_string(),
                    entry.action.to_string(),
                    Some(entry.doc_url.to_string()),
                    entry.solutions.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
                ),
                None => {
                    let guidance = rules::guidance(outcome.category);
                    (
                        render(guidance.description, status_code, record.error_code.as_deref()),
                        guidance.action.to_string(),
                        guidance.doc_url.map(str::to_string),
                        Vec::new(),
                    )
                }
            };

        Self {
            status_code,
            category: outcome.category,
            severity: outcome.category.severity(),
            is_retryable: outcome.category.is_retryable_with_status(record.status_code),
            description,
            recommended_action,
            documentation_url,
            solutions,
            retry_after,
            api_context: outcome.context.map(|ctx| ctx.tag()),
            error_code: record.error_code,
            message: record.message,
            request_id: record.request_id,
            accepted_request_id: record.accepted_request_id,
            headers: record.headers,
            body_json: record.body_json,
            details: record.details,
            raw,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> AnalyzerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn render(template: &str, status: u16, error_code: Option<&str>) -> String {
    template
        .replace("{status}", &status.to_string())
        .replace("{error_code}", error_code.unwrap_or("none"))
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message: String = self.message.chars().take(DISPLAY_MESSAGE_CHARS).collect();
        let ellipsis = if self.message.chars().count() > DISPLAY_MESSAGE_CHARS {
            "..."
        } else {
            ""
        };
        write!(
            f,
            "ClassificationResult(status={}, category={}, severity={}, retryable={}, message='{}{}')",
            self.status_code, self.category, self.severity, self.is_retryable, message, ellipsis
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;

    fn assemble(record: NormalizedErrorRecord, tag: Option<&str>) -> ClassificationResult {
        let outcome = Classifier::new().classify(&record, tag);
        ClassificationResult::assemble(record, outcome, ErrorInput::log(""))
    }

    #[test]
    fn test_retry_after_header_should_be_parsed_when_numeric() {
        // Given: a rate-limited record with a numeric hint
        let mut record = NormalizedErrorRecord {
            status_code: Some(429),
            ..NormalizedErrorRecord::default()
        };
        record.headers.insert("retry-after".to_string(), " 60 ".to_string());

        // When
        let result = assemble(record.clone(), None);

        // Then
        assert_eq!(result.retry_after, Some(60));
        assert!(result.is_retryable);

        record.headers.insert(
            "retry-after".to_string(),
            "Wed, 21 Oct 2015 07:28:00 GMT".to_string(),
        );
        assert_eq!(assemble(record, None).retry_after, None);
    }

    #[test]
    fn test_missing_status_should_report_default_but_stay_unknown() {
        let result = assemble(NormalizedErrorRecord::default(), None);
        assert_eq!(result.status_code, 500);
        assert_eq!(result.category, ErrorCategory::UnknownError);
        assert!(!result.is_retryable);
        assert!(result.description.contains("HTTP 500"));
        assert!(result.description.contains("code none"));
    }

    #[test]
    fn test_status_safety_override_should_apply() {
        // Given: a server-side code reported with a 404 status
        let record = NormalizedErrorRecord {
            status_code: Some(404),
            error_code: Some("50001".to_string()),
            ..NormalizedErrorRecord::default()
        };

        // When
        let result = assemble(record, None);

        // Then: retryable category, but the status forbids retrying
        assert_eq!(result.category, ErrorCategory::ServerError);
        assert!(!result.is_retryable);
    }

    #[test]
    fn test_endpoint_entry_should_supply_solutions() {
        let record = NormalizedErrorRecord {
            status_code: Some(429),
            message: "Too many requests".to_string(),
            ..NormalizedErrorRecord::default()
        };
        let result = assemble(record, Some("message_push"));

        assert_eq!(result.api_context.as_deref(), Some("message.message_push"));
        assert_eq!(result.solutions.len(), 3);
        assert!(result.documentation_url.is_some());
    }

    #[test]
    fn test_display_should_truncate_long_messages() {
        let record = NormalizedErrorRecord {
            status_code: Some(500),
            message: "x".repeat(80),
            ..NormalizedErrorRecord::default()
        };
        let text = assemble(record, None).to_string();
        assert!(text.starts_with("ClassificationResult(status=500, category=SERVER_ERROR"));
        assert!(text.ends_with(&format!("{}...')", "x".repeat(50))));
    }

    #[test]
    fn test_json_should_round_trip() {
        let record = NormalizedErrorRecord {
            status_code: Some(401),
            message: "Authentication failed".to_string(),
            ..NormalizedErrorRecord::default()
        };
        let result = assemble(record, None);

        let json = result.to_json().unwrap();
        let back: ClassificationResult = serde_json::from_str(&json).unwrap();

        assert_eq!(back, result);
        assert!(json.contains("\"category\": \"AUTH_ERROR\""));
        assert!(json.contains("\"severity\": \"CRITICAL\""));
    }
}
