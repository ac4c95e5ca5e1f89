//! Cleanup of raw model output into a topic title.

const QUOTE_CHARS: &[char] = &['"', '\'', '`'];
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Turn a raw completion into a usable title.
///
/// Trims whitespace and surrounding quotes/backticks, drops a leading
/// markdown heading marker and trailing punctuation. Returns `None` when
/// nothing is left or the result is longer than `max_chars` characters.
pub fn sanitize_title(raw: &str, max_chars: usize) -> Option<String> {
    let title = raw.trim().trim_matches(QUOTE_CHARS);

    let title = match title.strip_prefix('#') {
        Some(rest) => rest.trim_start_matches('#').trim_start(),
        None => title,
    };

    let title = title.trim_end_matches(TRAILING_PUNCTUATION).trim();

    if title.is_empty() || title.chars().count() > max_chars {
        return None;
    }

    Some(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_backticked_heading() {
        assert_eq!(
            sanitize_title("`# Pizza Planning!`", 200).as_deref(),
            Some("Pizza Planning")
        );
    }

    #[test]
    fn test_sanitize_clean_title_unchanged() {
        assert_eq!(
            sanitize_title("Q3 Release Checklist", 200).as_deref(),
            Some("Q3 Release Checklist")
        );
    }

    #[test]
    fn test_sanitize_quotes_and_whitespace() {
        assert_eq!(
            sanitize_title("  \"Office Move Logistics\"\n", 200).as_deref(),
            Some("Office Move Logistics")
        );
        assert_eq!(
            sanitize_title("'Team Offsite'", 200).as_deref(),
            Some("Team Offsite")
        );
    }

    #[test]
    fn test_sanitize_multiple_heading_markers() {
        assert_eq!(
            sanitize_title("### Budget Review", 200).as_deref(),
            Some("Budget Review")
        );
    }

    #[test]
    fn test_sanitize_trailing_punctuation() {
        assert_eq!(
            sanitize_title("Hiring Plans?!.", 200).as_deref(),
            Some("Hiring Plans")
        );
    }

    #[test]
    fn test_sanitize_keeps_inner_hash() {
        assert_eq!(
            sanitize_title("Issue #42 Triage", 200).as_deref(),
            Some("Issue #42 Triage")
        );
    }

    #[test]
    fn test_sanitize_empty_results_rejected() {
        assert_eq!(sanitize_title("", 200), None);
        assert_eq!(sanitize_title("   ", 200), None);
        assert_eq!(sanitize_title("\"\"", 200), None);
        assert_eq!(sanitize_title("# ...", 200), None);
    }

    #[test]
    fn test_sanitize_length_limit() {
        let exact = "a".repeat(200);
        assert_eq!(sanitize_title(&exact, 200), Some(exact.clone()));

        let too_long = "a".repeat(201);
        assert_eq!(sanitize_title(&too_long, 200), None);
    }
}
