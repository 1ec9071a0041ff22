use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref CODE_FENCE: Regex =
        Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*\n(.*?)\n?\s*```\s*$").expect("valid fence regex");
}

/// Removes one Markdown code fence wrapping the whole answer, if present.
fn strip_code_fence(text: &str) -> &str {
    match CODE_FENCE.captures(text).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => text,
    }
}

fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|v| v.as_str().map(|s| s.to_string()))
        .collect()
}

/// Extracts file paths from a model answer.
///
/// Accepts a JSON array of paths or an object with a `files` array. Empty
/// input and any other JSON shape give an empty list; only text that is not
/// JSON at all is an error.
pub fn try_parse_file_list(response_text: &str) -> Result<Vec<String>, serde_json::Error> {
    let text = strip_code_fence(response_text).trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let parsed: Value = serde_json::from_str(text)?;
    let files = match &parsed {
        Value::Array(items) => string_items(items),
        Value::Object(map) => match map.get("files") {
            Some(Value::Array(items)) => string_items(items),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    Ok(files)
}

pub fn parse_file_list(response_text: &str) -> Vec<String> {
    match try_parse_file_list(response_text) {
        Ok(files) => files,
        Err(e) => {
            log::error!("Failed to parse file list from model response: {}", e);
            Vec::new()
        }
    }
}
