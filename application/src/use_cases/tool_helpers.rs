//! Shared helpers for tool use cases.

use taskloop_domain::ToolCall;

/// Extract a short preview string from tool call arguments for log lines.
///
/// Looks for well-known keys (`path`, `pattern`, `query`, `args`) first,
/// then falls back to the first string value found.
pub(crate) fn tool_args_preview(call: &ToolCall) -> String {
    let keys = ["path", "pattern", "query", "args"];
    for key in &keys {
        match call.arguments.get(*key) {
            Some(serde_json::Value::String(s)) => return truncate_preview(s, 50),
            Some(serde_json::Value::Array(items)) => {
                let joined: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
                return truncate_preview(&joined.join(" "), 50);
            }
            _ => {}
        }
    }
    // Fallback: first string value
    let mut keys: Vec<&String> = call.arguments.keys().collect();
    keys.sort();
    for key in keys {
        if let Some(s) = call.arguments[key].as_str() {
            return truncate_preview(s, 50);
        }
    }
    String::new()
}

fn truncate_preview(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
