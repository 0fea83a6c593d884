//! Parser for free-form error log text.
//!
//! Each extraction rule runs on its own over the whole text, and a rule that
//! does not match leaves its field unset. Logs look roughly like:
//!
//! ```text
//! (404)
//! Reason: Not Found
//! HTTP response headers: HTTPHeaderDict({'x-line-request-id': 'abc123'})
//! HTTP response body: {"message":"Not found"}
//! ```
//!
//! Status precedence: parenthesized code, then a `STATUS`/`HTTP` token,
//! then a status inside the JSON body.

use crate::headers::{extract_braced, parse_header_block};
use crate::record::NormalizedErrorRecord;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::OnceLock;

struct Patterns {
    paren_status: Regex,
    status_token: Regex,
    reason: Regex,
    headers_marker: Regex,
    body_marker: Regex,
    request_id: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        paren_status: Regex::new(r"\((\d{3})\)([^\r\n]*)").expect("Invalid status regex"),
        status_token: Regex::new(
            r"(?i)\b(?:status(?:[ _]code)?|http(?:/\d(?:\.\d)?)?)(?:[ \t]+error)?[ \t]*[:=]?[ \t]*(\d{3})\b([^\r\n]*)",
        )
        .expect("Invalid status token regex"),
        reason: Regex::new(r"(?i)\breason:[ \t]*([^\r\n]+)").expect("Invalid reason regex"),
        headers_marker: Regex::new(r"(?i)(?:http response headers|headers)[ \t]*:")
            .expect("Invalid headers regex"),
        body_marker: Regex::new(r"(?i)(?:http response body|response body|body)[ \t]*:")
            .expect("Invalid body regex"),
        request_id: Regex::new(
            r#"(?i)(?:x-line-request-id|request[_-]id)['"]?[ \t]*[:=][ \t]*['"]?([A-Za-z0-9._-]+)"#,
        )
        .expect("Invalid request id regex"),
    })
}

/// Parse log text into a normalized record. Never fails.
pub fn parse(text: &str) -> NormalizedErrorRecord {
    let p = patterns();
    let mut record = NormalizedErrorRecord::default();

    let paren = p.paren_status.captures(text);
    let token = p.status_token.captures(text);

    record.status_code = paren
        .as_ref()
        .and_then(|c| status_from(c.get(1)?.as_str()))
        .or_else(|| token.as_ref().and_then(|c| status_from(c.get(1)?.as_str())));

    let phrase = paren
        .as_ref()
        .and_then(|c| clean_phrase(c.get(2)?.as_str()))
        .or_else(|| token.as_ref().and_then(|c| clean_phrase(c.get(2)?.as_str())));

    // Span of the status signal, left out of the fallback message.
    let status_span = paren
        .as_ref()
        .or(token.as_ref())
        .and_then(|c| c.get(0))
        .map(|m| m.range());

    let reason = p
        .reason
        .captures(text)
        .and_then(|c| clean_phrase(c.get(1)?.as_str()));

    record.headers = header_block(text, &p.headers_marker);

    let mut body_text = None;
    let bodies: Vec<&str> = p
        .body_marker
        .find_iter(text)
        .map(|m| text[m.end()..].trim_start())
        .collect();
    match bodies.first() {
        Some(first) => match bodies.iter().find_map(|rest| parse_json_object(rest)) {
            Some(body) => record.absorb_body(body),
            None if !first.starts_with('{') => {
                body_text = first.lines().next().and_then(clean_phrase);
            }
            None => {}
        },
        None => {
            if let Some(body) = parse_json_object(text.trim_start()) {
                record.absorb_body(body);
            }
        }
    }

    if record.message.is_empty() {
        record.message = body_text
            .or(reason)
            .or(phrase)
            .unwrap_or_else(|| without_span(text, status_span));
    }

    record.fill_request_ids_from_headers();
    if record.request_id.is_none() {
        record.request_id = p
            .request_id
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
    }

    record
}

/// Header block after the first `headers:` marker that yields any pairs.
///
/// `HTTP response headers:` markers are tried before bare `headers:` ones.
fn header_block(text: &str, marker: &Regex) -> BTreeMap<String, String> {
    let mut markers: Vec<_> = marker.find_iter(text).collect();
    markers.sort_by_key(|m| !m.as_str().to_ascii_lowercase().starts_with("http response"));
    markers
        .iter()
        .map(|m| parse_header_block(&text[m.end()..]))
        .find(|headers| !headers.is_empty())
        .unwrap_or_default()
}

/// Trimmed text with the status signal cut out.
fn without_span(text: &str, span: Option<Range<usize>>) -> String {
    match span {
        Some(span) => format!("{} {}", &text[..span.start], &text[span.end..])
            .trim()
            .to_string(),
        None => text.trim().to_string(),
    }
}

fn status_from(digits: &str) -> Option<u16> {
    digits.parse::<u16>().ok().filter(|code| *code != 0)
}

/// Trim a trailing phrase, dropping separators such as `: ` or `- `.
fn clean_phrase(raw: &str) -> Option<String> {
    let phrase = raw
        .trim()
        .trim_start_matches(|c: char| c == ':' || c == '-' || c.is_whitespace())
        .trim();
    (!phrase.is_empty()).then(|| phrase.to_string())
}

/// Parse the balanced JSON object at the start of `text`, if any.
fn parse_json_object(text: &str) -> Option<Value> {
    if !text.starts_with('{') {
        return None;
    }
    let object = extract_braced(text, 0)?;
    serde_json::from_str::<Value>(object).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REAL_LOG: &str = "(404)\nReason: Not Found\nHTTP response headers: HTTPHeaderDict({'server': 'legy', 'x-line-request-id': 'abc123'})\nHTTP response body: {\"message\":\"Not found\"}";

    #[test]
    fn test_real_sdk_log_should_extract_every_field() {
        // Given: a log captured from the SDK's exception text
        // When: parsing
        let record = parse(REAL_LOG);

        // Then: all blocks are read
        assert_eq!(record.status_code, Some(404));
        assert_eq!(record.message, "Not found");
        assert_eq!(record.request_id.as_deref(), Some("abc123"));
        assert_eq!(record.header("server"), Some("legy"));
        assert_eq!(record.body_json, Some(serde_json::json!({"message": "Not found"})));
    }

    #[test]
    fn test_parenthesized_code_with_reason_should_split() {
        let record = parse("(400)   reply token expired  ");
        assert_eq!(record.status_code, Some(400));
        assert_eq!(record.message, "reply token expired");

        let record = parse("Request failed with status code (400): Bad Request");
        assert_eq!(record.status_code, Some(400));
        assert_eq!(record.message, "Bad Request");
    }

    #[test]
    fn test_status_tokens_should_be_recognized() {
        for (text, status, message) in [
            ("HTTP 503 Service Unavailable", 503, "Service Unavailable"),
            ("HTTP Error 401: Unauthorized", 401, "Unauthorized"),
            ("upstream said STATUS 429", 429, "upstream said"),
            ("HTTP/1.1 404 Not Found", 404, "Not Found"),
            ("status_code: 413", 413, ""),
        ] {
            let record = parse(text);
            assert_eq!(record.status_code, Some(status), "status of {text:?}");
            assert_eq!(record.message, message, "message of {text:?}");
        }
    }

    #[test]
    fn test_parenthesized_code_should_win_over_other_signals() {
        let record = parse(
            "HTTP 500 proxy error\n(401)\nHTTP response body: {\"status\": 503, \"message\": \"x\"}",
        );
        assert_eq!(record.status_code, Some(401));

        let record = parse("HTTP 502 upstream\nHTTP response body: {\"status\": 503}");
        assert_eq!(record.status_code, Some(502));

        let record = parse("HTTP response body: {\"status\": 503, \"message\": \"busy\"}");
        assert_eq!(record.status_code, Some(503));
        assert_eq!(record.message, "busy");
    }

    #[test]
    fn test_first_parenthesized_code_should_be_used() {
        let record = parse("Previous error (401) but current error is (404) Not Found");
        assert_eq!(record.status_code, Some(401));
    }

    #[test]
    fn test_body_should_supply_error_code_from_details() {
        let record = parse(
            "(400)\nHTTP response body: {\"message\":\"The request body has 1 error(s)\",\"details\":[{\"code\":\"40011\",\"property\":\"messages\"}]}",
        );
        assert_eq!(record.error_code.as_deref(), Some("40011"));
        assert_eq!(record.message, "The request body has 1 error(s)");
        assert_eq!(record.details.len(), 1);
    }

    #[test]
    fn test_body_word_in_reason_should_not_hide_the_real_body() {
        // Given: a reason line that itself contains "body:"
        let text = "(400)\nReason: Invalid request body: see details\nHTTP response body: {\"message\":\"The request body has 1 error(s)\",\"details\":[{\"code\":\"40100\"}]}";

        // When
        let record = parse(text);

        // Then: the JSON block is still found
        assert_eq!(record.error_code.as_deref(), Some("40100"));
        assert_eq!(record.message, "The request body has 1 error(s)");
        assert!(record.body_json.is_some());
    }

    #[test]
    fn test_non_json_body_should_use_first_marker_line() {
        let record = parse("(502)\nHTTP response body: upstream connect error");
        assert_eq!(record.message, "upstream connect error");
        assert_eq!(record.body_json, None);
    }

    #[test]
    fn test_headers_word_in_reason_should_not_hide_the_real_headers() {
        // Given: a reason line mentioning "headers:" before the real block
        let text = "(429)\nReason: missing headers: none\nHTTP response headers: HTTPHeaderDict({'retry-after': '30', 'x-line-request-id': 'abc'})";

        // When
        let record = parse(text);

        // Then
        assert_eq!(record.header("retry-after"), Some("30"));
        assert_eq!(record.header("x-line-request-id"), Some("abc"));
    }

    #[test]
    fn test_bare_headers_marker_should_still_be_read() {
        let record = parse("(429)\nheaders: {'Retry-After': '12'}");
        assert_eq!(record.header("retry-after"), Some("12"));
    }

    #[test]
    fn test_status_only_log_should_leave_message_empty() {
        let record = parse("(404)");
        assert_eq!(record.status_code, Some(404));
        assert_eq!(record.message, "");

        let record = parse("  (503)  \n");
        assert_eq!(record.message, "");
    }

    #[test]
    fn test_bare_json_log_should_be_read_as_body() {
        let record = parse(r#"{"message": "Invalid reply token", "details": []}"#);
        assert_eq!(record.message, "Invalid reply token");
        assert_eq!(record.status_code, None);
    }

    #[test]
    fn test_reason_line_should_be_used_without_body() {
        let record = parse("(500)\nReason: Internal Server Error");
        assert_eq!(record.message, "Internal Server Error");
    }

    #[test]
    fn test_request_id_should_fall_back_to_raw_text() {
        let record = parse("(429) too many requests request_id=7f2a-99");
        assert_eq!(record.request_id.as_deref(), Some("7f2a-99"));
    }

    #[test]
    fn test_malformed_input_should_degrade_to_message_only() {
        // Given: inputs with nothing recognizable or broken braces
        for text in ["", "   ", "{{{{", "Body: {\"message\": ", "Headers: {'a': ", "123", "(abc)"] {
            // When: parsing
            let record = parse(text);

            // Then: nothing panics and no status is invented
            assert_eq!(record.status_code, None, "status of {text:?}");
            assert_eq!(record.body_json, None, "body of {text:?}");
        }

        let record = parse("Invalid log format");
        assert_eq!(record.message, "Invalid log format");
        assert_eq!(record.effective_status(), 500);
    }
}
