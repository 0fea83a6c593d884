//! Tiered classifier.
//!
//! Tiers are tried in order and the first one that yields a category wins:
//!
//! 1. platform error code (optionally refined by context gates)
//! 2. HTTP status (endpoint entries, context gates, then the generic table)
//! 3. message keywords
//! 4. `UNKNOWN_ERROR`

use crate::category::ErrorCategory;
use crate::context::ApiContext;
use crate::record::NormalizedErrorRecord;
use crate::rules::{self, EndpointEntry, ErrorCodeRule};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tier that produced a classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    ErrorCode,
    StatusCode,
    MessagePattern,
    Default,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::ErrorCode => "error_code",
            Tier::StatusCode => "status_code",
            Tier::MessagePattern => "message_pattern",
            Tier::Default => "default",
        };
        f.write_str(name)
    }
}

/// What the classifier decided, before result assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub category: ErrorCategory,
    pub tier: Tier,
    /// Context that was applied, if the tag parsed.
    pub context: Option<ApiContext>,
    /// Endpoint entry that matched, carrying its own guidance.
    pub endpoint: Option<&'static EndpointEntry>,
}

impl Outcome {
    fn new(category: ErrorCategory, tier: Tier, context: Option<ApiContext>) -> Self {
        Self {
            category,
            tier,
            context,
            endpoint: None,
        }
    }
}

/// Stateless classifier over the static rule tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier;

impl Classifier {
    /// The classifier is stateless; every instance uses the static rule tables.
    pub fn new() -> Self {
        Self
    }

    /// Classify a record under an optional API-context tag.
    ///
    /// An unknown or malformed tag is ignored.
    pub fn classify(&self, record: &NormalizedErrorRecord, api_context: Option<&str>) -> Outcome {
        let context = ApiContext::parse_lenient(api_context);
        let message = record.message.to_lowercase();

        if let Some(outcome) = self.by_error_code(record, context.as_ref(), &message) {
            return Outcome { context, ..outcome };
        }
        if let Some(outcome) = self.by_status(record, context.as_ref(), &message) {
            return Outcome { context, ..outcome };
        }
        if let Some(category) = rules::message_category(&message) {
            return Outcome::new(category, Tier::MessagePattern, context);
        }
        Outcome::new(ErrorCategory::UnknownError, Tier::Default, context)
    }

    fn by_error_code(
        &self,
        record: &NormalizedErrorRecord,
        context: Option<&ApiContext>,
        message: &str,
    ) -> Option<Outcome> {
        let (code, rule) = rules::error_code_rule(record.error_code.as_deref()?)?;
        let status = record
            .status_code
            .unwrap_or_else(|| ErrorCodeRule::implied_status(code));
        let category = context
            .and_then(|ctx| rules::context_gate(ctx.namespace, status, message))
            .unwrap_or(rule.category);
        Some(Outcome::new(category, Tier::ErrorCode, None))
    }

    fn by_status(
        &self,
        record: &NormalizedErrorRecord,
        context: Option<&ApiContext>,
        message: &str,
    ) -> Option<Outcome> {
        let status = record.status_code?;

        if let Some(ctx) = context {
            if ctx.endpoint.is_some() {
                if let Some(entry) = rules::endpoint_entry(&ctx.tag(), status) {
                    return Some(Outcome {
                        endpoint: Some(entry),
                        ..Outcome::new(entry.category, Tier::StatusCode, None)
                    });
                }
            }
            if let Some(category) = rules::context_gate(ctx.namespace, status, message) {
                return Some(Outcome::new(category, Tier::StatusCode, None));
            }
        }

        rules::status_category(status)
            .map(|category| Outcome::new(category, Tier::StatusCode, None))
    }
}
