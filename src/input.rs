//! Supported error input shapes.
//!
//! The analyzer does not introspect arbitrary values. Every accepted shape
//! is one variant of [`ErrorInput`], and the field extractor dispatches on
//! it explicitly.

use crate::error::{AnalyzerError, AnalyzerResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error code reported for signature-validation failures, which carry no payload.
pub const SIGNATURE_ERROR_CODE: &str = "40003";

/// Status reported for signature-validation failures.
pub const SIGNATURE_ERROR_STATUS: u16 = 401;

/// A raw error as handed to the analyzer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorInput {
    /// Structured mapping with `status_code`, `message`, `headers`, ...
    Mapping { fields: Map<String, Value> },
    /// `ApiException` from the current SDK major version.
    SdkV3(ApiException),
    /// `LineBotApiError` from the previous SDK major version.
    SdkV2(LineBotApiError),
    /// Signature-validation exception from either SDK version.
    InvalidSignature(SignatureError),
    /// HTTP response object exposing a status and a text body.
    HttpResponse(HttpResponse),
    /// Free-form log text.
    Log { text: String },
}

/// Newer SDK exception shape: status, reason, headers and a raw body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiException {
    pub status: Option<u16>,
    pub reason: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// The exception's display text.
    pub display: String,
}

/// Nested error object of the older SDK shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApiErrorBody {
    pub message: Option<String>,
    pub details: Vec<Value>,
}

/// Older SDK exception shape: status, request ids and a nested error object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LineBotApiError {
    pub status_code: Option<u16>,
    pub headers: Vec<(String, String)>,
    pub request_id: Option<String>,
    pub accepted_request_id: Option<String>,
    pub error: Option<ApiErrorBody>,
    /// The exception's display text.
    pub display: String,
}

/// Signature-validation exception.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignatureError {
    pub message: String,
}

/// HTTP-response-like object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpResponse {
    pub status_code: Option<u16>,
    pub headers: Vec<(String, String)>,
    pub text: String,
}

impl ErrorInput {
    /// Wrap a JSON object as a mapping input.
    pub fn mapping(fields: Map<String, Value>) -> Self {
        Self::Mapping { fields }
    }

    /// Wrap log text.
    pub fn log<S: Into<String>>(text: S) -> Self {
        Self::Log { text: text.into() }
    }

    /// Short name of the input shape, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ErrorInput::Mapping { .. } => "mapping",
            ErrorInput::SdkV3(_) => "sdk_v3",
            ErrorInput::SdkV2(_) => "sdk_v2",
            ErrorInput::InvalidSignature(_) => "invalid_signature",
            ErrorInput::HttpResponse(_) => "http_response",
            ErrorInput::Log { .. } => "log",
        }
    }
}

impl TryFrom<Value> for ErrorInput {
    type Error = AnalyzerError;

    fn try_from(value: Value) -> AnalyzerResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self::mapping(fields)),
            Value::String(text) => Ok(Self::log(text)),
            Value::Null => Err(AnalyzerError::unsupported_input("null")),
            Value::Bool(_) => Err(AnalyzerError::unsupported_input("boolean")),
            Value::Number(_) => Err(AnalyzerError::unsupported_input("number")),
            Value::Array(_) => Err(AnalyzerError::unsupported_input("array")),
        }
    }
}

impl From<&str> for ErrorInput {
    fn from(text: &str) -> Self {
        Self::log(text)
    }
}

impl From<String> for ErrorInput {
    fn from(text: String) -> Self {
        Self::log(text)
    }
}

impl From<Map<String, Value>> for ErrorInput {
    fn from(fields: Map<String, Value>) -> Self {
        Self::mapping(fields)
    }
}

impl From<ApiException> for ErrorInput {
    fn from(err: ApiException) -> Self {
        Self::SdkV3(err)
    }
}

impl From<LineBotApiError> for ErrorInput {
    fn from(err: LineBotApiError) -> Self {
        Self::SdkV2(err)
    }
}

impl From<SignatureError> for ErrorInput {
    fn from(err: SignatureError) -> Self {
        Self::InvalidSignature(err)
    }
}

impl From<HttpResponse> for ErrorInput {
    fn from(response: HttpResponse) -> Self {
        Self::HttpResponse(response)
    }
}
