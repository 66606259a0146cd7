//! Locale-formatted figure parsing
//!
//! Financial figures are displayed with thousand separators and a unit
//! suffix, e.g. `"1 234 tkr"` meaning 1 234 thousand kronor. The parser
//! strips separators and the suffix, requires an optionally signed integer
//! and scales by the unit multiplier. Anything else (a dash placeholder, an
//! empty cell, stray text) is absent — never zero.

use regex::Regex;
use std::sync::OnceLock;

fn integer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^-?\d+$").unwrap())
}

fn digits_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").unwrap())
}

/// Parses a locale-formatted figure, scaling by the unit multiplier
///
/// # Arguments
///
/// * `text` - The display value, e.g. `"1 234 tkr"` or `"-"`
/// * `unit_suffix` - Suffix to strip before parsing, if configured
/// * `multiplier` - Scale factor implied by the unit (e.g. 1000)
pub fn parse_scaled_figure(text: &str, unit_suffix: Option<&str>, multiplier: i64) -> Option<i64> {
    let mut cleaned = text.trim().to_string();
    if let Some(suffix) = unit_suffix {
        if let Some(stripped) = cleaned.strip_suffix(suffix) {
            cleaned = stripped.to_string();
        }
    }

    // Thousand separators: regular space, NBSP and narrow NBSP.
    let cleaned: String = cleaned
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .collect();

    if !integer_pattern().is_match(&cleaned) {
        return None;
    }

    cleaned.parse::<i64>().ok()?.checked_mul(multiplier)
}

/// Extracts the first unsigned integer found in the text, e.g. an age out
/// of `"45 år"`
pub fn parse_first_integer(text: &str) -> Option<u32> {
    digits_pattern().find(text)?.as_str().parse().ok()
}

/// Splits an industry classification line of the form `"code - description"`
///
/// Without the separator the whole line is treated as the description.
pub fn split_sni_line(text: &str) -> (Option<String>, Option<String>) {
    match text.split_once(" - ") {
        Some((code, description)) => (
            Some(code.trim().to_string()),
            Some(description.trim().to_string()),
        ),
        None => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                (None, None)
            } else {
                (None, Some(trimmed.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_figure_with_unit() {
        assert_eq!(
            parse_scaled_figure("1 234 tkr", Some("tkr"), 1000),
            Some(1_234_000)
        );
    }

    #[test]
    fn test_parse_dash_is_absent_not_zero() {
        assert_eq!(parse_scaled_figure("-", Some("tkr"), 1000), None);
    }

    #[test]
    fn test_parse_negative_figure() {
        assert_eq!(
            parse_scaled_figure("-567 tkr", Some("tkr"), 1000),
            Some(-567_000)
        );
    }

    #[test]
    fn test_parse_nbsp_separators() {
        assert_eq!(
            parse_scaled_figure("1\u{a0}234\u{202f}567", None, 1),
            Some(1_234_567)
        );
    }

    #[test]
    fn test_parse_rejects_stray_text() {
        assert_eq!(parse_scaled_figure("ca 1 234", Some("tkr"), 1000), None);
        assert_eq!(parse_scaled_figure("", None, 1), None);
    }

    #[test]
    fn test_parse_without_suffix_configured() {
        assert_eq!(parse_scaled_figure("987", None, 1), Some(987));
    }

    #[test]
    fn test_first_integer() {
        assert_eq!(parse_first_integer("45 år"), Some(45));
        assert_eq!(parse_first_integer("Ålder: 62"), Some(62));
        assert_eq!(parse_first_integer("okänd"), None);
    }

    #[test]
    fn test_split_sni_line() {
        let (code, description) = split_sni_line("62010 - Dataprogrammering");
        assert_eq!(code.as_deref(), Some("62010"));
        assert_eq!(description.as_deref(), Some("Dataprogrammering"));
    }

    #[test]
    fn test_split_sni_line_without_separator() {
        let (code, description) = split_sni_line("Dataprogrammering");
        assert_eq!(code, None);
        assert_eq!(description.as_deref(), Some("Dataprogrammering"));
    }
}
