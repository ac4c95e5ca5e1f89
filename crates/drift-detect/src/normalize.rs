//! Text normalization.
//!
//! Lowercases, replaces punctuation with spaces and splits into words so
//! two texts can be compared by vocabulary.

use std::collections::HashSet;

/// Normalize text into lowercase word tokens.
///
/// Characters that are neither word characters (letters, digits, `_`) nor
/// whitespace become a space, so "end-to-end" yields three tokens.
/// Word characters follow the Unicode Alphabetic and Numeric properties,
/// so combining vowel signs stay inside their word.
pub fn normalize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if is_word_char(c) || c.is_whitespace() { c } else { ' ' })
        .collect();

    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Distinct normalized tokens of `text`.
pub fn token_set(text: &str) -> HashSet<String> {
    normalize(text).into_iter().collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_punctuation() {
        assert_eq!(normalize("Hello, World!!"), vec!["hello", "world"]);
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize("").is_empty());
        assert!(normalize("   \n\t ").is_empty());
        assert!(normalize("?!...").is_empty());
    }

    #[test]
    fn test_normalize_keeps_word_boundaries() {
        assert_eq!(normalize("end-to-end"), vec!["end", "to", "end"]);
        assert_eq!(normalize("a.b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_normalize_keeps_underscore_and_digits() {
        assert_eq!(
            normalize("Deploy v2_beta at 10:30"),
            vec!["deploy", "v2_beta", "at", "10", "30"]
        );
    }

    #[test]
    fn test_normalize_unicode_letters() {
        assert_eq!(normalize("Café Déjà-vu"), vec!["café", "déjà", "vu"]);
    }

    #[test]
    fn test_normalize_keeps_combining_vowel_signs() {
        assert_eq!(normalize("नमस्ते दुनिया"), vec!["नमस", "ते", "दुनिया"]);
        assert_eq!(normalize("Привет, мир"), vec!["привет", "мир"]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = ["Hello, World!!", "  Lunch -- plans? ", "**bold** `code`", ""];
        for input in inputs {
            let once = normalize(input);
            let twice = normalize(&once.join(" "));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_token_set_dedups() {
        let set = token_set("the the THE cat");
        assert_eq!(set.len(), 2);
        assert!(set.contains("the"));
        assert!(set.contains("cat"));
    }
}
