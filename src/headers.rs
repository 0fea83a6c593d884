//! Best-effort parsing of header blocks found in log text.
//!
//! Logged headers come either as JSON or as a Python-dict literal, often
//! wrapped in a call such as `HTTPHeaderDict({...})`. The wrapper name is
//! not fixed. Parsing never fails: whatever cannot be read is skipped.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Header carrying the platform request id.
pub const REQUEST_ID_HEADER: &str = "x-line-request-id";

/// Header carrying the accepted request id of asynchronous sends.
pub const ACCEPTED_REQUEST_ID_HEADER: &str = "x-line-accepted-request-id";

/// Header carrying the rate-limit wait hint.
pub const RETRY_AFTER_HEADER: &str = "retry-after";

fn pair_regex() -> &'static Regex {
    static PAIR: OnceLock<Regex> = OnceLock::new();
    PAIR.get_or_init(|| {
        Regex::new(
            r#"(?:'([^']*)'|"([^"]*)")\s*:\s*(?:'([^']*)'|"([^"]*)"|([^,}\s][^,}]*))"#,
        )
        .expect("Invalid header pair regex")
    })
}

/// Return the quote-aware balanced `{...}` starting at byte offset `open`.
///
/// `None` when the braces never close.
pub(crate) fn extract_braced(text: &str, open: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[open..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Render a JSON value as a header string.
pub(crate) fn value_to_header(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Lower-case header names of an already structured header list.
pub fn normalize_headers<'a, I>(pairs: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// Lower-case header names of a JSON object.
pub fn headers_from_json(map: &Map<String, Value>) -> BTreeMap<String, String> {
    map.iter()
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value_to_header(value)))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// Parse the value of a logged header block.
///
/// `text` is everything after the `Headers:` marker.
pub fn parse_header_block(text: &str) -> BTreeMap<String, String> {
    let text = text.trim_start();

    if let Some(open) = wrapped_object_start(text) {
        match extract_braced(text, open) {
            Some(object) => {
                if let Ok(map) = serde_json::from_str::<Map<String, Value>>(object) {
                    return headers_from_json(&map);
                }
                return quoted_pairs(object);
            }
            None => {
                let rest = first_line(&text[open..]);
                return quoted_pairs(rest);
            }
        }
    }

    let line = first_line(text);
    let pairs = quoted_pairs(line);
    if !pairs.is_empty() {
        return pairs;
    }
    colon_pairs(line)
}

/// Byte offset of the object opening brace, allowing an optional `Name(` wrapper.
fn wrapped_object_start(text: &str) -> Option<usize> {
    let open = text.find('{')?;
    let prefix = text[..open].trim_end();
    let wrapper = prefix.strip_suffix('(').unwrap_or(prefix).trim();
    let is_wrapper_name = wrapper
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    is_wrapper_name.then_some(open)
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

fn quoted_pairs(text: &str) -> BTreeMap<String, String> {
    pair_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let key = caps.get(1).or_else(|| caps.get(2))?.as_str();
            let value = caps
                .get(3)
                .or_else(|| caps.get(4))
                .or_else(|| caps.get(5))
                .map(|m| m.as_str().trim())
                .unwrap_or("");
            let key = key.trim().to_ascii_lowercase();
            (!key.is_empty()).then(|| (key, value.to_string()))
        })
        .collect()
}

fn colon_pairs(line: &str) -> BTreeMap<String, String> {
    line.split(',')
        .filter_map(|part| {
            let (key, value) = part.split_once(':')?;
            let key = key.trim().trim_matches(|c: char| c == '\'' || c == '"');
            let value = value.trim().trim_matches(|c: char| c == '\'' || c == '"');
            if key.is_empty() || value.is_empty() || key.contains(char::is_whitespace) {
                return None;
            }
            Some((key.to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}
