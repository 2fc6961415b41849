//! String utilities for the domain layer.

/// Truncate a string for display, appending an ellipsis (UTF-8 safe).
///
/// Uses byte length for `max_len` but always cuts on a character boundary.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Marker appended to captured output that had to be cut.
pub fn truncation_marker(dropped_chars: usize) -> String {
    format!("\n... (truncated {} chars)", dropped_chars)
}

/// Cap captured output at `max_chars` characters.
///
/// Output at or below the limit is returned unmodified. Longer output is cut
/// so that the kept text plus [`truncation_marker`] still fits in `max_chars`.
/// Returns the (possibly cut) text and whether anything was dropped.
pub fn truncate_output(s: &str, max_chars: usize) -> (String, bool) {
    let total = s.chars().count();
    if total <= max_chars {
        return (s.to_string(), false);
    }

    let mut kept = max_chars.saturating_sub(truncation_marker(total - max_chars).chars().count());
    loop {
        let marker = truncation_marker(total - kept);
        let marker_len = marker.chars().count();
        if marker_len > max_chars {
            // Limit too small for a marker: hard cut.
            return (s.chars().take(max_chars).collect(), true);
        }
        if kept + marker_len <= max_chars {
            let mut out: String = s.chars().take(kept).collect();
            out.push_str(&marker);
            return (out, true);
        }
        kept -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("日本語テスト", 30), "日本語テスト");
        // 3 bytes per char: target 12 -> 4 chars
        assert_eq!(truncate("日本語テスト文字列", 15), "日本語テ...");
    }

    #[test]
    fn test_truncate_output_at_limit_is_unmodified() {
        let text = "a".repeat(100);
        let (out, truncated) = truncate_output(&text, 100);
        assert_eq!(out, text);
        assert!(!truncated);
    }

    #[test]
    fn test_truncate_output_over_limit_fits_with_marker() {
        let text = "x".repeat(500);
        let (out, truncated) = truncate_output(&text, 100);
        assert!(truncated);
        assert!(out.chars().count() <= 100);
        assert!(out.contains("... (truncated"));
        let kept = out.chars().take_while(|c| *c == 'x').count();
        assert!(out.ends_with(&format!("(truncated {} chars)", 500 - kept)));
    }

    #[test]
    fn test_truncate_output_counts_characters() {
        let text = "é".repeat(80);
        let (out, truncated) = truncate_output(&text, 80);
        assert_eq!(out, text);
        assert!(!truncated);
    }

    #[test]
    fn test_truncate_output_tiny_limit_hard_cuts() {
        let (out, truncated) = truncate_output("abcdefghij", 4);
        assert_eq!(out, "abcd");
        assert!(truncated);
    }
}
