//! Error categorization and severity model.
//!
//! This module defines the closed set of categories an analyzed error can
//! land in, together with the fixed category→severity and
//! category→retryability tables the classifier relies on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Status codes that are never retryable, whatever category they land in.
pub const NON_RETRYABLE_STATUS_CODES: [u16; 5] = [400, 401, 403, 404, 422];

/// Normalized error category for LINE Messaging API failures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    // Authentication and tokens
    AuthError,
    InvalidToken,
    InvalidSignature,

    // Rate limits and quotas
    RateLimit,
    QuotaExceeded,

    // Request format
    ValidationError,
    InvalidRequestBody,
    InvalidJson,
    PayloadTooLarge,
    UnsupportedMediaType,

    // Users and resources
    UserNotFound,
    ResourceNotFound,
    UserBlocked,

    // Messaging
    MessageSendFailed,
    InvalidReplyToken,
    ReplyTokenExpired,
    ReplyTokenUsed,

    // Access
    PermissionError,
    PlanLimitation,

    // Platform and transport
    ServerError,
    NetworkError,
    TimeoutError,

    // Feature specific
    RichMenuError,
    RichMenuSizeError,
    AudienceError,
    WebhookError,

    Conflict,
    Gone,
    UnknownError,
}

/// Ordinal urgency of an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorCategory {
    /// Every category, in declaration order.
    pub const ALL: [ErrorCategory; 29] = [
        ErrorCategory::AuthError,
        ErrorCategory::InvalidToken,
        ErrorCategory::InvalidSignature,
        ErrorCategory::RateLimit,
        ErrorCategory::QuotaExceeded,
        ErrorCategory::ValidationError,
        ErrorCategory::InvalidRequestBody,
        ErrorCategory::InvalidJson,
        ErrorCategory::PayloadTooLarge,
        ErrorCategory::UnsupportedMediaType,
        ErrorCategory::UserNotFound,
        ErrorCategory::ResourceNotFound,
        ErrorCategory::UserBlocked,
        ErrorCategory::MessageSendFailed,
        ErrorCategory::InvalidReplyToken,
        ErrorCategory::ReplyTokenExpired,
        ErrorCategory::ReplyTokenUsed,
        ErrorCategory::PermissionError,
        ErrorCategory::PlanLimitation,
        ErrorCategory::ServerError,
        ErrorCategory::NetworkError,
        ErrorCategory::TimeoutError,
        ErrorCategory::RichMenuError,
        ErrorCategory::RichMenuSizeError,
        ErrorCategory::AudienceError,
        ErrorCategory::WebhookError,
        ErrorCategory::Conflict,
        ErrorCategory::Gone,
        ErrorCategory::UnknownError,
    ];

    /// Fixed severity for this category.
    pub fn severity(&self) -> Severity {
        use ErrorCategory::*;
        match self {
            AuthError | InvalidToken | InvalidSignature => Severity::Critical,
            ServerError | PermissionError | PlanLimitation | QuotaExceeded | MessageSendFailed
            | WebhookError => Severity::High,
            RateLimit | NetworkError | TimeoutError | UserBlocked | RichMenuError
            | AudienceError | Conflict | Gone | UnknownError => Severity::Medium,
            ValidationError | InvalidRequestBody | InvalidJson | PayloadTooLarge
            | UnsupportedMediaType | UserNotFound | ResourceNotFound | InvalidReplyToken
            | ReplyTokenExpired | ReplyTokenUsed | RichMenuSizeError => Severity::Low,
        }
    }

    /// Whether errors of this category are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCategory::RateLimit
                | ErrorCategory::NetworkError
                | ErrorCategory::TimeoutError
                | ErrorCategory::ServerError
        )
    }

    /// Retryability after applying the status-code safety override.
    pub fn is_retryable_with_status(&self, status: Option<u16>) -> bool {
        match status {
            Some(code) if NON_RETRYABLE_STATUS_CODES.contains(&code) => false,
            _ => self.is_retryable(),
        }
    }

    /// Base delay before a first retry, for retryable categories.
    ///
    /// Rate limits and server errors take their fallbacks from settings, so
    /// this only covers the transport categories.
    pub fn base_retry_delay(&self) -> Option<Duration> {
        match self {
            ErrorCategory::NetworkError | ErrorCategory::TimeoutError => {
                Some(Duration::from_secs(1))
            }
            _ => None,
        }
    }

    /// Wire name of this category, e.g. `AUTH_ERROR`.
    pub fn category_name(&self) -> &'static str {
        use ErrorCategory::*;
        match self {
            AuthError => "AUTH_ERROR",
            InvalidToken => "INVALID_TOKEN",
            InvalidSignature => "INVALID_SIGNATURE",
            RateLimit => "RATE_LIMIT",
            QuotaExceeded => "QUOTA_EXCEEDED",
            ValidationError => "VALIDATION_ERROR",
            InvalidRequestBody => "INVALID_REQUEST_BODY",
            InvalidJson => "INVALID_JSON",
            PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            UserNotFound => "USER_NOT_FOUND",
            ResourceNotFound => "RESOURCE_NOT_FOUND",
            UserBlocked => "USER_BLOCKED",
            MessageSendFailed => "MESSAGE_SEND_FAILED",
            InvalidReplyToken => "INVALID_REPLY_TOKEN",
            ReplyTokenExpired => "REPLY_TOKEN_EXPIRED",
            ReplyTokenUsed => "REPLY_TOKEN_USED",
            PermissionError => "PERMISSION_ERROR",
            PlanLimitation => "PLAN_LIMITATION",
            ServerError => "SERVER_ERROR",
            NetworkError => "NETWORK_ERROR",
            TimeoutError => "TIMEOUT_ERROR",
            RichMenuError => "RICH_MENU_ERROR",
            RichMenuSizeError => "RICH_MENU_SIZE_ERROR",
            AudienceError => "AUDIENCE_ERROR",
            WebhookError => "WEBHOOK_ERROR",
            Conflict => "CONFLICT",
            Gone => "GONE",
            UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Specificity rank used when comparing context-aware and generic outcomes.
    ///
    /// Generic status buckets rank lowest; endpoint or keyword refinements
    /// rank above them.
    pub fn specificity(&self) -> u8 {
        use ErrorCategory::*;
        match self {
            UnknownError => 0,
            ValidationError | ServerError | ResourceNotFound | PermissionError => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category_name())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_table_should_rank_auth_above_validation() {
        // Given: categories from opposite ends of the table
        // When/Then: severities follow the fixed mapping
        assert_eq!(ErrorCategory::AuthError.severity(), Severity::Critical);
        assert_eq!(ErrorCategory::ServerError.severity(), Severity::High);
        assert_eq!(ErrorCategory::RateLimit.severity(), Severity::Medium);
        assert_eq!(ErrorCategory::ValidationError.severity(), Severity::Low);
        assert_eq!(ErrorCategory::UnknownError.severity(), Severity::Medium);
        assert!(Severity::Critical > Severity::Low);
    }

    #[test]
    fn test_retryable_categories_should_be_transport_and_server_only() {
        let retryable: Vec<_> = ErrorCategory::ALL
            .iter()
            .filter(|c| c.is_retryable())
            .copied()
            .collect();

        assert_eq!(
            retryable,
            vec![
                ErrorCategory::RateLimit,
                ErrorCategory::ServerError,
                ErrorCategory::NetworkError,
                ErrorCategory::TimeoutError,
            ]
        );
    }

    #[test]
    fn test_status_override_should_force_non_retryable() {
        // Given: a retryable category reported with a client status
        let category = ErrorCategory::ServerError;

        // Then: the safety set wins over the category
        assert!(!category.is_retryable_with_status(Some(404)));
        assert!(!category.is_retryable_with_status(Some(422)));
        assert!(category.is_retryable_with_status(Some(503)));
        assert!(category.is_retryable_with_status(None));
    }

    #[test]
    fn test_category_should_serialize_as_wire_name() {
        for category in ErrorCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.category_name()));
        }
    }
}
