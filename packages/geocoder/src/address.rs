//! Address cleaning and region classification for client records.
//!
//! Spreadsheet exports carry addresses in many shapes:
//! - Multi-line cells: `"12 Smith St\nParramatta NSW 2150"`
//! - Empty segments: `"12 Smith St, , Parramatta"`
//! - Trailing separators: `"12 Smith St, Parramatta,"`
//!
//! This module normalizes these into a single-line form suitable for
//! display, geocoding, and caching, and assigns each address a
//! [`RegionCode`].

use std::sync::LazyLock;

use propmap_record_models::NO_ADDRESS_SENTINEL;
use propmap_region_models::RegionCode;
use regex::Regex;

/// Line breaks (with surrounding whitespace) inside a cell.
static NEWLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\r?\n\s*").expect("valid regex"));

/// Two or more commas separated only by whitespace.
static REPEATED_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*,)+").expect("valid regex"));

/// A comma (and trailing whitespace) at the end of the string.
static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*$").expect("valid regex"));

/// Overseas locations recognized after the Australian abbreviations.
const OVERSEAS: &[(&str, RegionCode)] = &[
    ("singapore", RegionCode::Singapore),
    ("dubai", RegionCode::Dubai),
];

/// Cleans a raw address cell into a single line.
///
/// Returns an empty string for empty or whitespace-only input.
#[must_use]
pub fn clean_address(raw: &str) -> String {
    let addr = raw.trim();
    if addr.is_empty() {
        return String::new();
    }

    let addr = NEWLINE_RE.replace_all(addr, ", ");
    let addr = REPEATED_COMMA_RE.replace_all(&addr, ",");
    let addr = TRAILING_COMMA_RE.replace(&addr, "");

    addr.trim().to_string()
}

/// Classifies an address into a region.
///
/// Australian abbreviations are matched as case-insensitive substrings in
/// the fixed order of [`RegionCode::AUSTRALIAN`]; the first abbreviation
/// in that order that occurs anywhere in the address wins, regardless of
/// where it appears in the text. Overseas names are checked only when no
/// abbreviation matches.
#[must_use]
pub fn classify_region(address: &str) -> RegionCode {
    if address.trim().is_empty() {
        return RegionCode::Unknown;
    }

    let upper = address.to_uppercase();
    if let Some(region) = RegionCode::AUSTRALIAN
        .into_iter()
        .find(|r| upper.contains(r.as_ref()))
    {
        return region;
    }

    let lower = address.to_lowercase();
    OVERSEAS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map_or(RegionCode::Unknown, |(_, region)| *region)
}

/// Returns `true` when an address cell holds a usable address: non-empty
/// after trimming and not the "no address" sentinel.
#[must_use]
pub fn is_present_address(raw: &str) -> bool {
    let trimmed = raw.trim();
    !trimmed.is_empty() && trimmed != NO_ADDRESS_SENTINEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_newlines_and_empty_segments() {
        assert_eq!(clean_address(" Line1\nLine2, , "), "Line1, Line2");
    }

    #[test]
    fn cleans_crlf() {
        assert_eq!(
            clean_address("12 Smith St\r\nParramatta NSW 2150"),
            "12 Smith St, Parramatta NSW 2150"
        );
    }

    #[test]
    fn collapses_blank_lines() {
        assert_eq!(
            clean_address("12 Smith St\n\nParramatta"),
            "12 Smith St, Parramatta"
        );
    }

    #[test]
    fn strips_trailing_comma() {
        assert_eq!(clean_address("12 Smith St,"), "12 Smith St");
        assert_eq!(clean_address("12 Smith St,,,  "), "12 Smith St");
    }

    #[test]
    fn leaves_clean_address_untouched() {
        assert_eq!(
            clean_address("123 X St, Sydney NSW 2000"),
            "123 X St, Sydney NSW 2000"
        );
    }

    #[test]
    fn empty_input_cleans_to_empty() {
        assert_eq!(clean_address(""), "");
        assert_eq!(clean_address("  \n "), "");
    }

    #[test]
    fn classifies_state_abbreviation() {
        assert_eq!(classify_region("123 X St, Sydney NSW 2000"), RegionCode::Nsw);
        assert_eq!(
            classify_region("10 Queen St, Brisbane QLD 4000"),
            RegionCode::Qld
        );
        assert_eq!(classify_region("1 Hay St, Perth WA 6000"), RegionCode::Wa);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify_region("5 Bay Rd, melbourne vic"), RegionCode::Vic);
    }

    #[test]
    fn classifies_overseas() {
        assert_eq!(classify_region("Blah Singapore Rd"), RegionCode::Singapore);
        assert_eq!(classify_region("Palm Jumeirah, DUBAI"), RegionCode::Dubai);
    }

    #[test]
    fn unmatched_is_unknown() {
        assert_eq!(classify_region("no markers here"), RegionCode::Unknown);
        assert_eq!(classify_region(""), RegionCode::Unknown);
    }

    #[test]
    fn first_in_fixed_order_wins_over_first_in_text() {
        // QLD occurs first in the text but NSW is earlier in the fixed order.
        assert_eq!(
            classify_region("10 Queen St, Brisbane QLD 4000 (formerly NSW)"),
            RegionCode::Nsw
        );
        assert_eq!(
            classify_region("Moved from Hobart TAS to Darwin NT"),
            RegionCode::Tas
        );
    }

    #[test]
    fn abbreviations_beat_overseas_names() {
        assert_eq!(
            classify_region("Singapore office, Sydney NSW"),
            RegionCode::Nsw
        );
    }

    #[test]
    fn substring_match_is_not_word_bounded() {
        // "WALKER" contains "WA", which precedes TAS in the fixed order.
        assert_eq!(classify_region("Walker St, Hobart TAS"), RegionCode::Wa);
    }

    #[test]
    fn sentinel_is_not_present() {
        assert!(!is_present_address(NO_ADDRESS_SENTINEL));
        assert!(!is_present_address("  No address in contract "));
        assert!(!is_present_address(""));
        assert!(!is_present_address("   "));
        assert!(is_present_address("1 George St"));
    }
}
