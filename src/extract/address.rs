//! Free-text address parsing
//!
//! Addresses arrive as a single display line, e.g.
//! `"Stuvaregatan 11, 252 67 Helsingborg"`. The parser splits the line into
//! street, a five-digit postal code (`NNN NN` or `NNNNN`) and the remainder
//! as city. When no postal-code pattern is found the whole line is kept as
//! the street and the other components stay absent — partial data beats no
//! data here.

use crate::record::Address;
use regex::Regex;
use std::sync::OnceLock;

fn postal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d{3})\s?(\d{2})\s+(\S.*)$").unwrap())
}

fn apartment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)lgh\s?(\d{4})").unwrap())
}

/// Parses one free-text address line into best-effort components
pub fn parse_address(line: &str) -> Address {
    let mut address = Address::default();

    // Lift out an apartment designator before splitting, so "lgh 1203"
    // never ends up glued to the street or city.
    let mut remainder = line.trim().to_string();
    let apartment = apartment_pattern()
        .captures(&remainder)
        .map(|caps| (caps.get(0).unwrap().range(), caps[1].to_string()));
    if let Some((range, number)) = apartment {
        address.apartment = Some(format!("lgh {}", number));
        remainder.replace_range(range, "");
    }
    let remainder = remainder.trim();
    if remainder.is_empty() {
        return address;
    }

    match postal_pattern().captures(remainder) {
        Some(caps) => {
            let whole = caps.get(0).unwrap();
            address.postal_code = Some(format!("{}{}", &caps[1], &caps[2]));
            address.city = Some(caps[3].trim().to_string());

            let street = remainder[..whole.start()]
                .trim()
                .trim_end_matches(',')
                .trim();
            if !street.is_empty() {
                address.street = Some(street.to_string());
            }
        }
        None => {
            address.street = Some(remainder.to_string());
        }
    }

    address
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard_address() {
        let address = parse_address("Stuvaregatan 11, 252 67 Helsingborg");
        assert_eq!(address.street.as_deref(), Some("Stuvaregatan 11"));
        assert_eq!(address.postal_code.as_deref(), Some("25267"));
        assert_eq!(address.city.as_deref(), Some("Helsingborg"));
        assert_eq!(address.apartment, None);
    }

    #[test]
    fn test_parse_compact_postal_code() {
        let address = parse_address("Storgatan 1 11122 Stockholm");
        assert_eq!(address.street.as_deref(), Some("Storgatan 1"));
        assert_eq!(address.postal_code.as_deref(), Some("11122"));
        assert_eq!(address.city.as_deref(), Some("Stockholm"));
    }

    #[test]
    fn test_no_postal_pattern_keeps_whole_line_as_street() {
        let address = parse_address("Box 123, Göteborg");
        assert_eq!(address.street.as_deref(), Some("Box 123, Göteborg"));
        assert_eq!(address.postal_code, None);
        assert_eq!(address.city, None);
    }

    #[test]
    fn test_apartment_designator_is_lifted_out() {
        let address = parse_address("Storgatan 1 lgh 1203, 111 22 Stockholm");
        assert_eq!(address.apartment.as_deref(), Some("lgh 1203"));
        assert_eq!(address.street.as_deref(), Some("Storgatan 1"));
        assert_eq!(address.postal_code.as_deref(), Some("11122"));
        assert_eq!(address.city.as_deref(), Some("Stockholm"));
    }

    #[test]
    fn test_apartment_without_space() {
        let address = parse_address("Vägen 2 lgh1102, 252 67 Helsingborg");
        assert_eq!(address.apartment.as_deref(), Some("lgh 1102"));
        assert_eq!(address.street.as_deref(), Some("Vägen 2"));
    }

    #[test]
    fn test_multi_word_city() {
        let address = parse_address("Hamngatan 4, 302 41 Halmstad Öster");
        assert_eq!(address.street.as_deref(), Some("Hamngatan 4"));
        assert_eq!(address.postal_code.as_deref(), Some("30241"));
        assert_eq!(address.city.as_deref(), Some("Halmstad Öster"));
    }

    #[test]
    fn test_empty_input() {
        let address = parse_address("   ");
        assert!(address.is_empty());
    }
}
