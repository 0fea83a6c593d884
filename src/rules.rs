//! Classification rules table.
//!
//! Pure data: ordered tables consulted by the classifier. Nothing here
//! decides tier precedence; see `classifier.rs` for that.

use crate::category::ErrorCategory;
use crate::context::ApiNamespace;

/// Inclusive range of platform error codes mapped to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCodeRule {
    pub start: u32,
    pub end: u32,
    pub category: ErrorCategory,
}

impl ErrorCodeRule {
    const fn new(start: u32, end: u32, category: ErrorCategory) -> Self {
        Self {
            start,
            end,
            category,
        }
    }

    pub fn contains(&self, code: u32) -> bool {
        (self.start..=self.end).contains(&code)
    }

    /// Range width; narrower ranges are more specific.
    pub fn width(&self) -> u32 {
        self.end - self.start
    }

    /// HTTP status implied by a code in this range, e.g. 40401 -> 404.
    pub fn implied_status(code: u32) -> u16 {
        u16::try_from(code / 100).unwrap_or(0)
    }
}

/// Error-code ranges. Nested ranges refine their parents.
pub const ERROR_CODE_RULES: &[ErrorCodeRule] = &[
    ErrorCodeRule::new(40001, 40009, ErrorCategory::AuthError),
    ErrorCodeRule::new(40003, 40003, ErrorCategory::InvalidSignature),
    ErrorCodeRule::new(40010, 40099, ErrorCategory::ValidationError),
    ErrorCodeRule::new(40100, 40199, ErrorCategory::InvalidReplyToken),
    ErrorCodeRule::new(40101, 40101, ErrorCategory::ReplyTokenExpired),
    ErrorCodeRule::new(40102, 40102, ErrorCategory::ReplyTokenUsed),
    ErrorCodeRule::new(40400, 40499, ErrorCategory::ResourceNotFound),
    ErrorCodeRule::new(42901, 42999, ErrorCategory::RateLimit),
    ErrorCodeRule::new(42910, 42919, ErrorCategory::QuotaExceeded),
    ErrorCodeRule::new(50000, 50099, ErrorCategory::ServerError),
];

/// Most specific error-code rule for a numeric code string.
pub fn error_code_rule(code: &str) -> Option<(u32, &'static ErrorCodeRule)> {
    let code = code.trim().parse::<u32>().ok()?;
    ERROR_CODE_RULES
        .iter()
        .filter(|rule| rule.contains(code))
        .min_by_key(|rule| rule.width())
        .map(|rule| (code, rule))
}

/// Inclusive HTTP status range mapped to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRule {
    pub start: u16,
    pub end: u16,
    pub category: ErrorCategory,
}

const fn status(start: u16, end: u16, category: ErrorCategory) -> StatusRule {
    StatusRule {
        start,
        end,
        category,
    }
}

/// Generic status table, first match wins.
pub const STATUS_RULES: &[StatusRule] = &[
    status(401, 401, ErrorCategory::AuthError),
    status(403, 403, ErrorCategory::PermissionError),
    status(404, 404, ErrorCategory::ResourceNotFound),
    status(409, 409, ErrorCategory::Conflict),
    status(410, 410, ErrorCategory::Gone),
    status(413, 413, ErrorCategory::PayloadTooLarge),
    status(415, 415, ErrorCategory::UnsupportedMediaType),
    status(429, 429, ErrorCategory::RateLimit),
    status(400, 499, ErrorCategory::ValidationError),
    status(504, 504, ErrorCategory::TimeoutError),
    status(500, 599, ErrorCategory::ServerError),
];

/// Generic category for an HTTP status, first matching range wins.
pub fn status_category(code: u16) -> Option<ErrorCategory> {
    STATUS_RULES
        .iter()
        .find(|rule| (rule.start..=rule.end).contains(&code))
        .map(|rule| rule.category)
}

/// Keyword-gated refinement of a status under an API namespace.
///
/// Matches when the lower-cased message contains every `all_of` needle and,
/// if `any_of` is non-empty, at least one of its needles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextGate {
    pub namespace: ApiNamespace,
    pub status: u16,
    pub all_of: &'static [&'static str],
    pub any_of: &'static [&'static str],
    pub category: ErrorCategory,
}

impl ContextGate {
    pub fn matches(&self, namespace: ApiNamespace, status: u16, message_lower: &str) -> bool {
        self.namespace == namespace
            && self.status == status
            && self.all_of.iter().all(|needle| message_lower.contains(needle))
            && (self.any_of.is_empty()
                || self.any_of.iter().any(|needle| message_lower.contains(needle)))
    }
}

const fn gate(
    namespace: ApiNamespace,
    status: u16,
    all_of: &'static [&'static str],
    any_of: &'static [&'static str],
    category: ErrorCategory,
) -> ContextGate {
    ContextGate {
        namespace,
        status,
        all_of,
        any_of,
        category,
    }
}

/// Context gates, first match wins.
pub const CONTEXT_GATES: &[ContextGate] = &[
    gate(ApiNamespace::User, 404, &[], &["user not found"], ErrorCategory::UserNotFound),
    gate(
        ApiNamespace::User,
        404,
        &[],
        &["not found", "blocked", "profile"],
        ErrorCategory::UserBlocked,
    ),
    gate(ApiNamespace::User, 403, &[], &[], ErrorCategory::UserBlocked),
    gate(
        ApiNamespace::Message,
        400,
        &["reply token"],
        &["expired"],
        ErrorCategory::ReplyTokenExpired,
    ),
    gate(
        ApiNamespace::Message,
        400,
        &["reply token"],
        &["used"],
        ErrorCategory::ReplyTokenUsed,
    ),
    gate(
        ApiNamespace::Message,
        400,
        &["reply token"],
        &[],
        ErrorCategory::InvalidReplyToken,
    ),
    gate(ApiNamespace::Message, 404, &[], &["user not found"], ErrorCategory::UserNotFound),
    gate(
        ApiNamespace::Message,
        404,
        &[],
        &["not found", "blocked"],
        ErrorCategory::UserBlocked,
    ),
    gate(
        ApiNamespace::RichMenu,
        400,
        &[],
        &["size", "image"],
        ErrorCategory::RichMenuSizeError,
    ),
    gate(ApiNamespace::RichMenu, 400, &[], &["rich menu"], ErrorCategory::RichMenuError),
    gate(ApiNamespace::Webhook, 404, &[], &["not found"], ErrorCategory::WebhookError),
];

/// Category of the first gate matching the namespace, status and message.
pub fn context_gate(
    namespace: ApiNamespace,
    status: u16,
    message_lower: &str,
) -> Option<ErrorCategory> {
    CONTEXT_GATES
        .iter()
        .find(|gate| gate.matches(namespace, status, message_lower))
        .map(|gate| gate.category)
}

/// Endpoint-specific outcome with its own guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointEntry {
    /// Canonical `namespace.endpoint` tag.
    pub tag: &'static str,
    pub status: u16,
    pub category: ErrorCategory,
    pub description: &'static str,
    pub action: &'static str,
    pub doc_url: &'static str,
    pub solutions: &'static [&'static str],
}

pub const ENDPOINT_ENTRIES: &[EndpointEntry] = &[
    EndpointEntry {
        tag: "message.message_reply",
        status: 404,
        category: ErrorCategory::ResourceNotFound,
        description: "No event that can be replied to was found.",
        action: "Use a reply token taken from a webhook event received by this channel.",
        doc_url: "https://developers.line.biz/en/reference/messaging-api/#send-reply-message",
        solutions: &[
            "Check the webhook event the reply token came from",
            "Check that the token belongs to this channel",
        ],
    },
    EndpointEntry {
        tag: "message.message_push",
        status: 403,
        category: ErrorCategory::UserBlocked,
        description: "The user has blocked the account or is not a friend.",
        action: "Check the friendship status with the user.",
        doc_url: "https://developers.line.biz/en/reference/messaging-api/#send-push-message",
        solutions: &["Check whether the user blocked the account", "Check the friend status"],
    },
    EndpointEntry {
        tag: "message.message_push",
        status: 429,
        category: ErrorCategory::RateLimit,
        description: "The push message rate limit was exceeded.",
        action: "Space out push requests or review the plan's monthly message limit.",
        doc_url: "https://developers.line.biz/en/reference/messaging-api/#rate-limits",
        solutions: &[
            "Adjust the sending interval",
            "Check the monthly message limit",
            "Upgrade the plan",
        ],
    },
    EndpointEntry {
        tag: "message.message_narrowcast",
        status: 403,
        category: ErrorCategory::PlanLimitation,
        description: "The account does not meet the requirements for narrowcast messages.",
        action: "Check the target audience size, account type and plan.",
        doc_url: "https://developers.line.biz/en/reference/messaging-api/#send-narrowcast-message",
        solutions: &[
            "Check the number of friends",
            "Upgrade the plan",
            "Review the audience settings",
        ],
    },
    EndpointEntry {
        tag: "audience.audience_create",
        status: 400,
        category: ErrorCategory::AudienceError,
        description: "Creating the audience group failed.",
        action: "Check the audience name (max 120 characters), description and user id list.",
        doc_url: "https://developers.line.biz/en/reference/messaging-api/#create-upload-audience-group",
        solutions: &[
            "Keep the audience name within 120 characters",
            "Check the user id format",
            "Remove duplicate user ids",
        ],
    },
    EndpointEntry {
        tag: "audience.audience_get",
        status: 404,
        category: ErrorCategory::ResourceNotFound,
        description: "The audience group was not found.",
        action: "Specify an existing audience group id.",
        doc_url: "https://developers.line.biz/en/reference/messaging-api/#get-audience-groups",
        solutions: &["Check the audience group id", "Check access permissions"],
    },
    EndpointEntry {
        tag: "insights.insights_demographic",
        status: 403,
        category: ErrorCategory::PlanLimitation,
        description: "Demographic insights are not available for this account.",
        action: "A verified or premium account with enough followers is required.",
        doc_url: "https://developers.line.biz/en/reference/messaging-api/#get-demographic",
        solutions: &["Check the account verification", "Check the follower count"],
    },
    EndpointEntry {
        tag: "rich_menu.rich_menu_image",
        status: 413,
        category: ErrorCategory::RichMenuSizeError,
        description: "The rich menu image is too large.",
        action: "Compress the image to 1 MB or less.",
        doc_url: "https://developers.line.biz/en/reference/messaging-api/#upload-rich-menu-image",
        solutions: &["Compress the image", "Resize to a supported size"],
    },
    EndpointEntry {
        tag: "webhook.webhook_settings",
        status: 400,
        category: ErrorCategory::WebhookError,
        description: "The webhook URL is invalid.",
        action: "Use an HTTPS URL on a valid domain with a valid certificate.",
        doc_url: "https://developers.line.biz/en/reference/messaging-api/#set-webhook-endpoint-url",
        solutions: &[
            "Use the https scheme",
            "Check the domain name",
            "Check the SSL certificate",
        ],
    },
    EndpointEntry {
        tag: "webhook.webhook_settings",
        status: 404,
        category: ErrorCategory::WebhookError,
        description: "No webhook endpoint is configured.",
        action: "Check that a webhook URL is set for the channel.",
        doc_url: "https://developers.line.biz/en/reference/messaging-api/#get-webhook-endpoint-information",
        solutions: &["Set a webhook URL", "Check the channel exists"],
    },
];

/// Entry for an exact `namespace.endpoint` tag and status.
pub fn endpoint_entry(tag: &str, status: u16) -> Option<&'static EndpointEntry> {
    ENDPOINT_ENTRIES
        .iter()
        .find(|entry| entry.tag == tag && entry.status == status)
}

/// Ordered message keyword fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessagePattern {
    pub any_of: &'static [&'static str],
    pub category: ErrorCategory,
}

const fn pattern(any_of: &'static [&'static str], category: ErrorCategory) -> MessagePattern {
    MessagePattern { any_of, category }
}

pub const MESSAGE_PATTERNS: &[MessagePattern] = &[
    pattern(
        &["invalid reply token", "reply token is invalid"],
        ErrorCategory::InvalidReplyToken,
    ),
    pattern(&["invalid signature"], ErrorCategory::InvalidSignature),
    pattern(&["invalid token", "invalid access token"], ErrorCategory::InvalidToken),
    pattern(&["monthly limit", "quota exceeded"], ErrorCategory::QuotaExceeded),
    pattern(&["request body"], ErrorCategory::InvalidRequestBody),
    pattern(
        &[
            "subscription required",
            "plan limitation",
            "feature not available",
            "not supported",
        ],
        ErrorCategory::PlanLimitation,
    ),
    pattern(
        &["not authorized", "unauthorized", "invalid channel access token"],
        ErrorCategory::AuthError,
    ),
    pattern(&["too many requests", "rate limit exceeded"], ErrorCategory::RateLimit),
    pattern(&["invalid user id", "user not found"], ErrorCategory::UserNotFound),
    pattern(
        &["invalid message", "message format", "invalid json"],
        ErrorCategory::InvalidJson,
    ),
    pattern(&["invalid webhook", "webhook url"], ErrorCategory::WebhookError),
    pattern(&["auth", "token"], ErrorCategory::AuthError),
    pattern(&["rate", "limit"], ErrorCategory::RateLimit),
    pattern(
        &["timeout", "timed out", "network", "connection"],
        ErrorCategory::NetworkError,
    ),
];

pub fn message_category(message_lower: &str) -> Option<ErrorCategory> {
    if message_lower.trim().is_empty() {
        return None;
    }
    MESSAGE_PATTERNS
        .iter()
        .find(|p| p.any_of.iter().any(|needle| message_lower.contains(needle)))
        .map(|p| p.category)
}

/// Caller-facing guidance for a category.
///
/// `description` may embed `{status}` and `{error_code}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guidance {
    pub description: &'static str,
    pub action: &'static str,
    pub doc_url: Option<&'static str>,
}

const fn guide(
    description: &'static str,
    action: &'static str,
    doc_url: Option<&'static str>,
) -> Guidance {
    Guidance {
        description,
        action,
        doc_url,
    }
}

const DOCS_ROOT: &str = "https://developers.line.biz/en/reference/messaging-api/";
const TOKEN_DOCS: &str = "https://developers.line.biz/en/docs/basics/channel-access-token/";
const REPLY_DOCS: &str = "https://developers.line.biz/en/reference/messaging-api/#send-reply-message";
const RICH_MENU_DOCS: &str = "https://developers.line.biz/en/docs/messaging-api/using-rich-menus/";
const SUPPORT_DOCS: &str = "https://developers.line.biz/en/support/";

pub fn guidance(category: ErrorCategory) -> Guidance {
    use ErrorCategory::*;
    match category {
        AuthError => guide(
            "Authentication failed (HTTP {status}). The channel access token is invalid or expired.",
            "Issue a valid channel access token and configure it again.",
            Some(TOKEN_DOCS),
        ),
        InvalidToken => guide(
            "The supplied token is invalid.",
            "Use the correct token or issue a new one.",
            Some(TOKEN_DOCS),
        ),
        InvalidSignature => guide(
            "The webhook signature could not be verified.",
            "Check that the channel secret used to verify signatures is correct.",
            Some("https://developers.line.biz/en/reference/messaging-api/#signature-validation"),
        ),
        RateLimit => guide(
            "The API rate limit was exceeded.",
            "Wait for the rate limit to recover before retrying.",
            Some("https://developers.line.biz/en/reference/messaging-api/#rate-limits"),
        ),
        QuotaExceeded => guide(
            "The monthly message quota was exceeded.",
            "Check the quota usage or upgrade the plan.",
            Some("https://developers.line.biz/en/reference/messaging-api/#get-quota"),
        ),
        ValidationError => guide(
            "The request was rejected as invalid (HTTP {status}).",
            "Check the request parameters against the API reference.",
            Some(DOCS_ROOT),
        ),
        InvalidRequestBody => guide(
            "The request body contains errors.",
            "Check the details array for the offending properties.",
            Some(DOCS_ROOT),
        ),
        InvalidJson => guide(
            "The message object or JSON payload is malformed.",
            "Validate the payload against the message object reference.",
            Some("https://developers.line.biz/en/reference/messaging-api/#message-objects"),
        ),
        PayloadTooLarge => guide(
            "The request exceeds the maximum size.",
            "Reduce the request size to 2 MB or less.",
            Some("https://developers.line.biz/en/reference/messaging-api/#common-specifications"),
        ),
        UnsupportedMediaType => guide(
            "The content type is not supported.",
            "Send the payload with a supported Content-Type.",
            Some(DOCS_ROOT),
        ),
        UserNotFound => guide(
            "The user does not exist or the user id is invalid.",
            "Check the user id.",
            Some("https://developers.line.biz/en/reference/messaging-api/#get-profile"),
        ),
        ResourceNotFound => guide(
            "The requested resource was not found.",
            "Specify a valid resource id.",
            Some(DOCS_ROOT),
        ),
        UserBlocked => guide(
            "The user has blocked the account or is not a friend, so the profile is not accessible.",
            "Profiles of users who blocked the account cannot be fetched. Skip this user.",
            Some("https://developers.line.biz/en/reference/messaging-api/#get-profile"),
        ),
        MessageSendFailed => guide(
            "Sending the message failed.",
            "Check the recipient and the message contents.",
            Some("https://developers.line.biz/en/docs/messaging-api/sending-messages/"),
        ),
        InvalidReplyToken => guide(
            "The reply token is invalid.",
            "Use the reply token from the received event. Reply tokens are single-use.",
            Some(REPLY_DOCS),
        ),
        ReplyTokenExpired => guide(
            "The reply token has expired.",
            "Reply promptly after receiving the event, or fall back to a push message.",
            Some(REPLY_DOCS),
        ),
        ReplyTokenUsed => guide(
            "The reply token has already been used.",
            "Send at most one reply per token; batch messages into a single reply.",
            Some(REPLY_DOCS),
        ),
        PermissionError => guide(
            "Access to the resource is not permitted.",
            "Obtain the required permission before retrying.",
            Some("https://developers.line.biz/en/docs/line-developers-console/"),
        ),
        PlanLimitation => guide(
            "The feature is not available on the current plan.",
            "Upgrade the plan or use an alternative.",
            Some("https://www.lycbiz.com/jp/service/line-official-account/plan/"),
        ),
        ServerError => guide(
            "The platform returned an internal error (HTTP {status}).",
            "Retry after a short wait.",
            Some(SUPPORT_DOCS),
        ),
        NetworkError => guide(
            "A network failure prevented the request from completing.",
            "Check connectivity and retry.",
            None,
        ),
        TimeoutError => guide(
            "The request timed out (HTTP {status}).",
            "Retry with backoff.",
            Some(SUPPORT_DOCS),
        ),
        RichMenuError => guide(
            "Processing the rich menu failed.",
            "Check the rich menu definition.",
            Some(RICH_MENU_DOCS),
        ),
        RichMenuSizeError => guide(
            "The rich menu size or image format is invalid.",
            "Check the image dimensions and format.",
            Some(RICH_MENU_DOCS),
        ),
        AudienceError => guide(
            "Processing the audience failed.",
            "Check the audience settings.",
            Some("https://developers.line.biz/en/reference/messaging-api/#manage-audience-group"),
        ),
        WebhookError => guide(
            "Processing the webhook settings failed.",
            "Check the webhook endpoint and its HTTPS configuration.",
            Some("https://developers.line.biz/en/reference/messaging-api/#webhooks"),
        ),
        Conflict => guide(
            "The request conflicts with an existing resource (HTTP {status}).",
            "Check for duplicate requests, e.g. a reused retry key.",
            Some(DOCS_ROOT),
        ),
        Gone => guide(
            "The resource is no longer available.",
            "Stop referring to the removed resource.",
            Some(DOCS_ROOT),
        ),
        UnknownError => guide(
            "An unrecognized error occurred (HTTP {status}, code {error_code}).",
            "Check the error details and contact support if needed.",
            Some(SUPPORT_DOCS),
        ),
    }
}
