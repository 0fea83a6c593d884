//! Normalized error record and the field extractor.
//!
//! Every [`ErrorInput`] variant is reduced to the same flat
//! [`NormalizedErrorRecord`]. Extraction never fails: a field that cannot be
//! read degrades to its absent or default value.

use crate::headers::{
    headers_from_json, normalize_headers, ACCEPTED_REQUEST_ID_HEADER, REQUEST_ID_HEADER,
};
use crate::input::{
    ApiException, ErrorInput, HttpResponse, LineBotApiError, SignatureError,
    SIGNATURE_ERROR_CODE, SIGNATURE_ERROR_STATUS,
};
use crate::log_parser;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Status assumed when nothing in the input specifies one.
pub const DEFAULT_STATUS_CODE: u16 = 500;

/// Flat intermediate form of any supported error input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NormalizedErrorRecord {
    /// HTTP status; `None` when absent or ambiguous (`0`).
    pub status_code: Option<u16>,
    /// Platform-specific fine-grained code.
    pub error_code: Option<String>,
    pub message: String,
    /// Header names are lower-cased.
    pub headers: BTreeMap<String, String>,
    pub request_id: Option<String>,
    pub accepted_request_id: Option<String>,
    pub body_json: Option<Value>,
    pub details: Vec<Value>,
}

impl NormalizedErrorRecord {
    /// Extract a record from any supported input shape.
    pub fn extract(input: &ErrorInput) -> Self {
        let record = match input {
            ErrorInput::Mapping { fields } => Self::from_mapping(fields),
            ErrorInput::SdkV3(err) => Self::from_api_exception(err),
            ErrorInput::SdkV2(err) => Self::from_line_bot_api_error(err),
            ErrorInput::InvalidSignature(err) => Self::from_signature_error(err),
            ErrorInput::HttpResponse(response) => Self::from_http_response(response),
            ErrorInput::Log { text } => log_parser::parse(text),
        };
        tracing::debug!(
            kind = input.kind(),
            status = ?record.status_code,
            error_code = ?record.error_code,
            "Extracted error record"
        );
        record
    }

    /// Status reported to callers: the extracted code, or 500 when unknown.
    pub fn effective_status(&self) -> u16 {
        self.status_code.unwrap_or(DEFAULT_STATUS_CODE)
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Fill request ids from headers where no explicit value was found.
    pub(crate) fn fill_request_ids_from_headers(&mut self) {
        if self.request_id.is_none() {
            self.request_id = self.header(REQUEST_ID_HEADER).map(str::to_string);
        }
        if self.accepted_request_id.is_none() {
            self.accepted_request_id = self
                .header(ACCEPTED_REQUEST_ID_HEADER)
                .map(str::to_string);
        }
    }

    /// Fill message, error code, status and details from a parsed body.
    pub(crate) fn absorb_body(&mut self, body: Value) {
        if self.message.is_empty() {
            if let Some(message) = body_message(&body) {
                self.message = message;
            }
        }
        if self.error_code.is_none() {
            self.error_code = body_error_code(&body);
        }
        if self.status_code.is_none() {
            self.status_code = body_status(&body);
        }
        if self.details.is_empty() {
            self.details = body_details(&body);
        }
        self.body_json = Some(body);
    }

    fn from_mapping(fields: &Map<String, Value>) -> Self {
        let mut record = Self {
            status_code: fields
                .get("status_code")
                .or_else(|| fields.get("status"))
                .and_then(parse_status),
            error_code: fields.get("error_code").and_then(code_to_string),
            message: fields
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            headers: fields
                .get("headers")
                .and_then(Value::as_object)
                .map(headers_from_json)
                .unwrap_or_default(),
            request_id: fields
                .get("request_id")
                .and_then(Value::as_str)
                .map(str::to_string),
            accepted_request_id: fields
                .get("accepted_request_id")
                .and_then(Value::as_str)
                .map(str::to_string),
            details: fields
                .get("details")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            ..Self::default()
        };

        match fields.get("body") {
            Some(Value::String(text)) => {
                if let Ok(body) = serde_json::from_str::<Value>(text) {
                    record.absorb_body(body);
                }
            }
            Some(body @ (Value::Object(_) | Value::Array(_))) => record.absorb_body(body.clone()),
            _ => {}
        }

        record.fill_request_ids_from_headers();
        record
    }

    fn from_api_exception(err: &ApiException) -> Self {
        let mut record = Self {
            status_code: err.status.filter(|s| *s != 0),
            headers: normalize_headers(err.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
            ..Self::default()
        };

        if let Some(text) = err.body.as_deref() {
            match serde_json::from_str::<Value>(text) {
                Ok(body) => record.absorb_body(body),
                Err(_) if !text.trim().is_empty() => record.message = text.trim().to_string(),
                Err(_) => {}
            }
        }
        if record.message.is_empty() {
            record.message = err
                .reason
                .clone()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| err.display.clone());
        }

        record.fill_request_ids_from_headers();
        record
    }

    fn from_line_bot_api_error(err: &LineBotApiError) -> Self {
        let error = err.error.as_ref();
        let details = error.map(|e| e.details.clone()).unwrap_or_default();
        let mut record = Self {
            status_code: err.status_code.filter(|s| *s != 0),
            error_code: details.iter().find_map(|d| d.get("code").and_then(code_to_string)),
            message: error
                .and_then(|e| e.message.clone())
                .unwrap_or_else(|| err.display.clone()),
            headers: normalize_headers(err.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
            request_id: err.request_id.clone(),
            accepted_request_id: err.accepted_request_id.clone(),
            details,
            ..Self::default()
        };
        record.fill_request_ids_from_headers();
        record
    }

    fn from_signature_error(err: &SignatureError) -> Self {
        Self {
            status_code: Some(SIGNATURE_ERROR_STATUS),
            error_code: Some(SIGNATURE_ERROR_CODE.to_string()),
            message: err.message.clone(),
            ..Self::default()
        }
    }

    fn from_http_response(response: &HttpResponse) -> Self {
        let mut record = Self {
            status_code: response.status_code.filter(|s| *s != 0),
            headers: normalize_headers(
                response
                    .headers
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            ),
            ..Self::default()
        };

        match serde_json::from_str::<Value>(&response.text) {
            Ok(body) => {
                record.absorb_body(body);
                if record.message.is_empty() {
                    record.message = response.text.clone();
                }
            }
            Err(_) => record.message = response.text.clone(),
        }

        record.fill_request_ids_from_headers();
        record
    }
}

/// Parse a status from a number or a string of digits. `0` counts as absent.
pub(crate) fn parse_status(value: &Value) -> Option<u16> {
    let code = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    (100..=999).contains(&code).then_some(code as u16)
}

/// Render an error code given as a string or an integer.
pub(crate) fn code_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Message of a JSON body: `message`, then `error` as string or object.
pub(crate) fn body_message(body: &Value) -> Option<String> {
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    match body.get("error")? {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Error code of a JSON body: top level, nested `error`, then `details`.
pub(crate) fn body_error_code(body: &Value) -> Option<String> {
    ["code", "error_code"]
        .iter()
        .find_map(|key| body.get(*key).and_then(code_to_string))
        .or_else(|| {
            body.get("error")
                .and_then(|e| e.get("code"))
                .and_then(code_to_string)
        })
        .or_else(|| {
            body.get("details")?
                .as_array()?
                .iter()
                .find_map(|d| d.get("code").and_then(code_to_string))
        })
}

/// HTTP status embedded in a JSON body.
pub(crate) fn body_status(body: &Value) -> Option<u16> {
    ["status", "status_code", "statusCode"]
        .iter()
        .find_map(|key| body.get(*key).and_then(parse_status))
        .filter(|code| (100..=599).contains(code))
}

fn body_details(body: &Value) -> Vec<Value> {
    body.get("details")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ApiErrorBody;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn mapping(value: Value) -> ErrorInput {
        ErrorInput::try_from(value).unwrap()
    }

    #[test]
    fn test_mapping_should_read_fields_and_defaults() {
        // Given: a mapping with headers in mixed case
        let input = mapping(json!({
            "status_code": "429",
            "message": "Too many requests",
            "headers": {"Retry-After": "60", "X-Line-Request-Id": "req-1"}
        }));

        // When: extracting
        let record = NormalizedErrorRecord::extract(&input);

        // Then: status parsed from digits, request id pulled from headers
        assert_eq!(record.status_code, Some(429));
        assert_eq!(record.message, "Too many requests");
        assert_eq!(record.header("retry-after"), Some("60"));
        assert_eq!(record.request_id.as_deref(), Some("req-1"));
        assert_eq!(record.error_code, None);
    }

    #[test]
    fn test_mapping_zero_status_should_be_absent() {
        let record = NormalizedErrorRecord::extract(&mapping(json!({"status_code": 0})));
        assert_eq!(record.status_code, None);
        assert_eq!(record.effective_status(), DEFAULT_STATUS_CODE);
        assert_eq!(record.message, "");
    }

    #[test]
    fn test_sdk_v3_should_prefer_body_message() {
        let err = ApiException {
            status: Some(400),
            reason: Some("Bad Request".to_string()),
            headers: vec![("x-line-request-id".to_string(), "v3-req".to_string())],
            body: Some(
                r#"{"message":"The request body has 1 error(s)","details":[{"message":"May not be empty","property":"messages[0].text"}]}"#
                    .to_string(),
            ),
            display: "(400)\nReason: Bad Request".to_string(),
        };

        let record = NormalizedErrorRecord::extract(&err.into());

        assert_eq!(record.status_code, Some(400));
        assert_eq!(record.message, "The request body has 1 error(s)");
        assert_eq!(record.request_id.as_deref(), Some("v3-req"));
        assert_eq!(record.details.len(), 1);
        assert!(record.body_json.is_some());
    }

    #[test]
    fn test_sdk_v3_without_body_should_fall_back_to_reason_then_display() {
        let with_reason = ApiException {
            status: Some(404),
            reason: Some("Not Found".to_string()),
            display: "ApiException(404)".to_string(),
            ..ApiException::default()
        };
        assert_eq!(NormalizedErrorRecord::extract(&with_reason.into()).message, "Not Found");

        let bare = ApiException {
            status: Some(500),
            display: "ApiException(500)".to_string(),
            ..ApiException::default()
        };
        assert_eq!(NormalizedErrorRecord::extract(&bare.into()).message, "ApiException(500)");
    }

    #[test]
    fn test_sdk_v2_should_read_error_object() {
        let err = LineBotApiError {
            status_code: Some(400),
            request_id: Some("v2-req".to_string()),
            accepted_request_id: Some("acc-1".to_string()),
            error: Some(ApiErrorBody {
                message: Some("Invalid reply token".to_string()),
                details: vec![json!({"code": "40100", "message": "expired"})],
            }),
            display: "LineBotApiError".to_string(),
            ..LineBotApiError::default()
        };

        let record = NormalizedErrorRecord::extract(&err.into());

        assert_eq!(record.message, "Invalid reply token");
        assert_eq!(record.error_code.as_deref(), Some("40100"));
        assert_eq!(record.request_id.as_deref(), Some("v2-req"));
        assert_eq!(record.accepted_request_id.as_deref(), Some("acc-1"));
    }

    #[test]
    fn test_sdk_v2_without_error_object_should_use_display() {
        let err = LineBotApiError {
            status_code: Some(500),
            display: "LineBotApiError: status_code=500".to_string(),
            ..LineBotApiError::default()
        };
        let record = NormalizedErrorRecord::extract(&err.into());
        assert_eq!(record.message, "LineBotApiError: status_code=500");
    }

    #[test]
    fn test_signature_error_should_get_fixed_codes() {
        let err = SignatureError {
            message: "Invalid signature. signature=abc".to_string(),
        };
        let record = NormalizedErrorRecord::extract(&err.into());

        assert_eq!(record.status_code, Some(SIGNATURE_ERROR_STATUS));
        assert_eq!(record.error_code.as_deref(), Some(SIGNATURE_ERROR_CODE));
    }

    #[test]
    fn test_http_response_should_keep_raw_text_when_not_json() {
        let response = HttpResponse {
            status_code: Some(502),
            headers: vec![],
            text: "<html>Bad Gateway</html>".to_string(),
        };
        let record = NormalizedErrorRecord::extract(&response.into());

        assert_eq!(record.message, "<html>Bad Gateway</html>");
        assert_eq!(record.body_json, None);
    }

    #[test]
    fn test_http_response_should_read_nested_error_code() {
        let response = HttpResponse {
            status_code: Some(429),
            headers: vec![("Retry-After".to_string(), "30".to_string())],
            text: r#"{"error": {"code": 42901, "message": "Too many requests"}}"#.to_string(),
        };
        let record = NormalizedErrorRecord::extract(&response.into());

        assert_eq!(record.error_code.as_deref(), Some("42901"));
        assert_eq!(record.message, "Too many requests");
        assert_eq!(record.header("Retry-After"), Some("30"));
    }

    #[test]
    fn test_parse_status_should_accept_numbers_floats_and_digits() {
        assert_eq!(parse_status(&json!(404)), Some(404));
        assert_eq!(parse_status(&json!(429.0)), Some(429));
        assert_eq!(parse_status(&json!(" 503 ")), Some(503));
        assert_eq!(parse_status(&json!("abc")), None);
        assert_eq!(parse_status(&json!(0)), None);
        assert_eq!(parse_status(&json!(-1)), None);
    }
}
