//! Input sanitization for free text stored on rows.

/// Upper bound for any sanitized free-text field.
pub const MAX_TEXT_LENGTH: usize = 5000;

/// Strip control characters (except newline and tab), trim, and cap length.
pub fn sanitize_text(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .take(MAX_TEXT_LENGTH)
        .collect()
}

/// Sanitize an optional field; blank input clears it.
pub fn sanitize_optional(input: Option<String>) -> Option<String> {
    input.map(|s| sanitize_text(&s)).filter(|s| !s.is_empty())
}

/// Validate a path id segment: no separators, no traversal, bounded length.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && !id.contains("..")
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_text_strips_controls() {
        assert_eq!(sanitize_text("  hi\u{0007} there\n "), "hi there");
        assert_eq!(sanitize_text("line one\nline two"), "line one\nline two");
    }

    #[test]
    fn test_sanitize_optional_clears_blank() {
        assert_eq!(sanitize_optional(Some("   ".into())), None);
        assert_eq!(sanitize_optional(Some(" x ".into())), Some("x".into()));
        assert_eq!(sanitize_optional(None), None);
    }

    #[test]
    fn test_id_validation() {
        assert!(is_valid_id("550e8400-e29b-41d4-a716-446655440000"));
        assert!(is_valid_id("job_uid123"));
        assert!(!is_valid_id("../etc"));
        assert!(!is_valid_id("a/b"));
        assert!(!is_valid_id(""));
    }
}
