//! Rendering helpers shared by every subcommand.

use chrono::{DateTime, Local};
use serde_json::Value;

/// Epoch seconds as local wall-clock time, `-` when absent.
pub fn format_timestamp(secs: Option<i64>) -> String {
    match secs.and_then(|s| DateTime::from_timestamp(s, 0)) {
        Some(ts) => ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

/// First `max` characters, with an ellipsis when something was cut.
pub fn truncate(text: &str, max: usize) -> String {
    let mut out: String = text.chars().take(max).collect();
    if text.chars().count() > max {
        out.push('…');
    }
    out
}

/// Pretty-printed JSON for `--json` mode.
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Best-effort text from a loosely shaped reply payload. The chat endpoint's
/// response body is not part of the stable contract, so look for the usual
/// field names and fall back to the raw JSON.
pub fn reply_text(payload: &Value) -> String {
    for key in ["reply", "content", "message", "answer"] {
        if let Some(text) = payload.get(key).and_then(Value::as_str) {
            if !text.is_empty() {
                return text.to_string();
            }
        }
    }
    match payload {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

/// A yes/no cell for optional flags.
pub fn flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // TEST 1: absent and invalid timestamps render as a dash
    #[test]
    fn test_timestamp_absent() {
        assert_eq!(format_timestamp(None), "-");
    }

    // TEST 2: truncation is character-based and marks the cut
    #[test]
    fn test_truncate_marks_cut() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 10), "abcdefghij");
        assert_eq!(truncate("abcdefghijk", 10), "abcdefghij…");
        // multibyte safe
        assert_eq!(truncate("héllo wörld", 5), "héllo…");
    }

    // TEST 3: reply extraction walks the usual field names
    #[test]
    fn test_reply_text_field_precedence() {
        assert_eq!(reply_text(&json!({"reply": "hi"})), "hi");
        assert_eq!(reply_text(&json!({"content": "c"})), "c");
        assert_eq!(reply_text(&json!({"message": "m"})), "m");
        assert_eq!(reply_text(&json!("bare")), "bare");
    }

    // TEST 4: unrecognized shapes fall back to pretty JSON
    #[test]
    fn test_reply_text_fallback_is_json() {
        let rendered = reply_text(&json!({"unexpected": true}));
        assert!(rendered.contains("unexpected"));
    }

    // TEST 5: flag cells
    #[test]
    fn test_flag_cells() {
        assert_eq!(flag(Some(true)), "yes");
        assert_eq!(flag(Some(false)), "no");
        assert_eq!(flag(None), "-");
    }
}
