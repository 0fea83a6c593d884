//! API-context tags.
//!
//! Callers may pass a tag such as `user.user_profile` naming the endpoint
//! that produced an error. The namespace before the dot decides which
//! context-sensitive rules apply; the endpoint after it selects
//! endpoint-specific guidance.

use crate::error::{AnalyzerError, AnalyzerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level API namespace of a context tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ApiNamespace {
    Message,
    Audience,
    Insights,
    User,
    RichMenu,
    Webhook,
    Content,
    Channel,
}

impl ApiNamespace {
    /// Tag prefix for this namespace.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiNamespace::Message => "message",
            ApiNamespace::Audience => "audience",
            ApiNamespace::Insights => "insights",
            ApiNamespace::User => "user",
            ApiNamespace::RichMenu => "rich_menu",
            ApiNamespace::Webhook => "webhook",
            ApiNamespace::Content => "content",
            ApiNamespace::Channel => "channel",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "message" => Some(ApiNamespace::Message),
            "audience" => Some(ApiNamespace::Audience),
            "insights" => Some(ApiNamespace::Insights),
            "user" => Some(ApiNamespace::User),
            "rich_menu" => Some(ApiNamespace::RichMenu),
            "webhook" => Some(ApiNamespace::Webhook),
            "content" => Some(ApiNamespace::Content),
            "channel" => Some(ApiNamespace::Channel),
            _ => None,
        }
    }
}

/// Known endpoints, used to resolve flat tags like `message_push`.
const KNOWN_ENDPOINTS: &[(&str, ApiNamespace)] = &[
    ("message_reply", ApiNamespace::Message),
    ("message_push", ApiNamespace::Message),
    ("message_multicast", ApiNamespace::Message),
    ("message_narrowcast", ApiNamespace::Message),
    ("message_broadcast", ApiNamespace::Message),
    ("message_delivery_progress", ApiNamespace::Message),
    ("message_quota", ApiNamespace::Message),
    ("message_validation", ApiNamespace::Message),
    ("message_loading", ApiNamespace::Message),
    ("audience_create", ApiNamespace::Audience),
    ("audience_update", ApiNamespace::Audience),
    ("audience_get", ApiNamespace::Audience),
    ("audience_delete", ApiNamespace::Audience),
    ("insights_message_delivery", ApiNamespace::Insights),
    ("insights_followers", ApiNamespace::Insights),
    ("insights_demographic", ApiNamespace::Insights),
    ("insights_narrowcast", ApiNamespace::Insights),
    ("user_profile", ApiNamespace::User),
    ("user_followers", ApiNamespace::User),
    ("membership", ApiNamespace::User),
    ("group_summary", ApiNamespace::User),
    ("room_member", ApiNamespace::User),
    ("rich_menu_create", ApiNamespace::RichMenu),
    ("rich_menu_image", ApiNamespace::RichMenu),
    ("rich_menu_link", ApiNamespace::RichMenu),
    ("rich_menu_delete", ApiNamespace::RichMenu),
    ("rich_menu_alias", ApiNamespace::RichMenu),
    ("webhook_settings", ApiNamespace::Webhook),
    ("content_retrieval", ApiNamespace::Content),
    ("channel_access_tokens", ApiNamespace::Channel),
];

/// A parsed API-context tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ApiContext {
    pub namespace: ApiNamespace,
    /// Endpoint name without the namespace prefix, if one was given.
    pub endpoint: Option<String>,
}

impl ApiContext {
    pub fn new(namespace: ApiNamespace, endpoint: Option<&str>) -> Self {
        Self {
            namespace,
            endpoint: endpoint.map(str::to_string),
        }
    }

    /// Canonical `namespace.endpoint` form, or just the namespace.
    pub fn tag(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}.{}", self.namespace.as_str(), endpoint),
            None => self.namespace.as_str().to_string(),
        }
    }

    /// Parse an optional tag, treating anything unparseable as "no context".
    pub fn parse_lenient(tag: Option<&str>) -> Option<Self> {
        let tag = tag?;
        match tag.parse::<ApiContext>() {
            Ok(context) => Some(context),
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring API context tag");
                None
            }
        }
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl FromStr for ApiContext {
    type Err = AnalyzerError;

    fn from_str(raw: &str) -> AnalyzerResult<Self> {
        let tag = raw.trim().to_ascii_lowercase();
        if tag.is_empty() {
            return Err(AnalyzerError::invalid_context(raw, "empty tag"));
        }

        if let Some((parent, child)) = tag.split_once('.') {
            let namespace = ApiNamespace::parse(parent).ok_or_else(|| {
                AnalyzerError::invalid_context(raw, format!("unknown namespace '{parent}'"))
            })?;
            if !is_identifier(child) {
                return Err(AnalyzerError::invalid_context(raw, "malformed endpoint"));
            }
            return Ok(Self::new(namespace, Some(child)));
        }

        if let Some(namespace) = ApiNamespace::parse(&tag) {
            return Ok(Self::new(namespace, None));
        }

        KNOWN_ENDPOINTS
            .iter()
            .find(|(endpoint, _)| *endpoint == tag)
            .map(|(endpoint, namespace)| Self::new(*namespace, Some(*endpoint)))
            .ok_or_else(|| AnalyzerError::invalid_context(raw, "unknown endpoint"))
    }
}

impl fmt::Display for ApiContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_tag_should_parse_namespace_and_endpoint() {
        // Given: a hierarchical tag
        let context: ApiContext = "user.user_profile".parse().unwrap();

        // Then: both parts are kept
        assert_eq!(context.namespace, ApiNamespace::User);
        assert_eq!(context.endpoint.as_deref(), Some("user_profile"));
        assert_eq!(context.tag(), "user.user_profile");
    }

    #[test]
    fn test_flat_tag_should_resolve_known_endpoint() {
        let context: ApiContext = "message_push".parse().unwrap();
        assert_eq!(context.namespace, ApiNamespace::Message);
        assert_eq!(context.tag(), "message.message_push");

        let bare: ApiContext = "Rich_Menu".parse().unwrap();
        assert_eq!(bare.namespace, ApiNamespace::RichMenu);
        assert_eq!(bare.endpoint, None);
    }

    #[test]
    fn test_malformed_tags_should_be_rejected() {
        for tag in ["", "   ", "billing.invoice", "user.", "user.profile lookup", "nope"] {
            let result = tag.parse::<ApiContext>();
            assert!(
                matches!(result, Err(AnalyzerError::InvalidContext { .. })),
                "tag {tag:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_lenient_parse_should_degrade_to_none() {
        assert_eq!(ApiContext::parse_lenient(None), None);
        assert_eq!(ApiContext::parse_lenient(Some("billing.invoice")), None);
        assert!(ApiContext::parse_lenient(Some("webhook.webhook_settings")).is_some());
    }
}
