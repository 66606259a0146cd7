//! Fault-tolerant field extraction
//!
//! Extractors are independent and order-agnostic: each reads one field from
//! the current page and yields an optional value. A missing selector or a
//! parse mismatch produces `None` and never aborts sibling extractors or the
//! page visit. Real client failures (timeouts, transport errors) are not
//! field concerns and propagate to the caller.

pub mod address;
pub mod company;
pub mod numeric;
pub mod person;

pub use address::parse_address;
pub use company::extract_company;
pub use numeric::{parse_first_integer, parse_scaled_figure, split_sni_line};
pub use person::extract_person;

use crate::client::{ClientError, PageClient};

/// Collapses all runs of whitespace into single spaces and trims the ends
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reads the cleaned text of an optionally configured selector
///
/// An unconfigured selector or an absent element both yield `None`; only
/// real client failures are returned as errors.
pub(crate) async fn opt_text(
    client: &mut dyn PageClient,
    selector: &Option<String>,
) -> Result<Option<String>, ClientError> {
    match selector {
        Some(sel) => Ok(client
            .find_text(sel)
            .await?
            .map(|t| clean_text(&t))
            .filter(|t| !t.is_empty())),
        None => Ok(None),
    }
}

/// Parses an affirmative/negative display value against a configured marker
///
/// Returns `None` when either the value or the marker is unconfigured, so a
/// missing table row stays absent rather than defaulting to `false`.
pub(crate) fn parse_affirmative(value: Option<&str>, marker: Option<&str>) -> Option<bool> {
    let marker = marker?;
    value.map(|v| v.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Example \n  AB \t"), "Example AB");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_parse_affirmative() {
        assert_eq!(parse_affirmative(Some("Ja"), Some("Ja")), Some(true));
        assert_eq!(parse_affirmative(Some("Nej"), Some("Ja")), Some(false));
        assert_eq!(parse_affirmative(None, Some("Ja")), None);
        assert_eq!(parse_affirmative(Some("Ja"), None), None);
    }
}
