//! CUSIP normalizer — converts raw identifier strings to a canonical 8-character key
//!
//! Source files store CUSIPs inconsistently: lowercase, with dashes or
//! spaces, as 6-character issuer codes, or as full 9-character codes with a
//! trailing check digit. The canonical form is the one used as a merge key
//! across datasets.
//!
//! # Rules
//!
//! 1. Absent or empty input has no canonical form
//! 2. Uppercase, then drop every character outside `A-Z0-9` (anywhere)
//! 3. Fewer than 6 characters: no canonical form
//! 4. 6 or 7 characters: right-pad with `'0'` to 8
//! 5. More than 8 characters: keep the first 8
//!
//! The check digit at position 9 is discarded, never verified.
//!
//! # Guarantees
//!
//! - **Pure**: no state, never fails, never panics
//! - **Idempotent**: `normalize(normalize(x)) == normalize(x)`
//! - **Canonical**: every produced code matches `[A-Z0-9]{8}`

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Length of a canonical identifier
pub const CANONICAL_LEN: usize = 8;

/// Shortest cleaned fragment that can still be padded to a canonical identifier
pub const MIN_FRAGMENT_LEN: usize = 6;

/// A canonical CUSIP: exactly 8 characters from `A-Z0-9`
///
/// Only constructible through [`normalize`], so the invariant always holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct Cusip(String);

impl Cusip {
    /// Normalize a present raw string; same as `normalize(Some(raw))`
    pub fn parse(raw: &str) -> Option<Self> {
        normalize(Some(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Cusip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Cusip {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Cusip {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cusip::parse(s).ok_or_else(|| {
            Error::NormalizationError(format!("'{}' has no canonical CUSIP form", s))
        })
    }
}

// ── Public API ─────────────────────────────────────────────

/// Normalize a raw identifier to its canonical form
///
/// Returns `None` for absent, empty, or too-short input. Malformed input
/// (all punctuation, whitespace only) degenerates to `None` through the
/// length check.
pub fn normalize(raw: Option<&str>) -> Option<Cusip> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }

    let mut cleaned = clean_fragment(raw);
    match cleaned.len() {
        n if n < MIN_FRAGMENT_LEN => return None,
        n if n < CANONICAL_LEN => {
            cleaned.extend(std::iter::repeat('0').take(CANONICAL_LEN - n));
        }
        // Cleaned text is ASCII, so byte truncation is char truncation
        _ => cleaned.truncate(CANONICAL_LEN),
    }

    debug_assert!(is_canonical(&cleaned));
    Some(Cusip(cleaned))
}

/// Uppercase, trim, and strip everything outside `A-Z0-9`
///
/// This is the cleaning half of [`normalize`] without the length rules.
pub fn clean_fragment(raw: &str) -> String {
    raw.to_uppercase()
        .trim()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect()
}

/// True if `s` already satisfies the canonical invariant
pub fn is_canonical(s: &str) -> bool {
    s.len() == CANONICAL_LEN
        && s
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> Option<String> {
        normalize(Some(s)).map(Cusip::into_string)
    }

    // ── Absent input ───────────────────────────────────

    #[test]
    fn test_absent_input() {
        assert_eq!(normalize(None), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(norm(""), None);
    }

    #[test]
    fn test_whitespace_only() {
        assert_eq!(norm("   \t "), None);
    }

    #[test]
    fn test_all_punctuation() {
        assert_eq!(norm("--..//##!!"), None);
    }

    // ── Length rules ───────────────────────────────────

    #[test]
    fn test_too_short() {
        assert_eq!(norm("12345"), None);
        assert_eq!(norm("a-b-c"), None);
    }

    #[test]
    fn test_six_chars_padded_twice() {
        assert_eq!(norm("037833"), Some("03783300".into()));
    }

    #[test]
    fn test_seven_chars_padded_once() {
        assert_eq!(norm("AB12340"), Some("AB123400".into()));
    }

    #[test]
    fn test_eight_chars_unchanged() {
        assert_eq!(norm("03783310"), Some("03783310".into()));
    }

    #[test]
    fn test_nine_chars_drops_check_digit() {
        assert_eq!(norm("037833100"), Some("03783310".into()));
    }

    #[test]
    fn test_check_digit_not_verified() {
        // 037833100 is the real code; a wrong check digit is accepted the same way
        assert_eq!(norm("037833109"), norm("037833100"));
    }

    #[test]
    fn test_longer_than_nine_truncated() {
        assert_eq!(norm("ABCDEFGHIJKLMNOP"), Some("ABCDEFGH".into()));
    }

    // ── Cleaning ───────────────────────────────────────

    #[test]
    fn test_lowercase_and_interior_punctuation() {
        assert_eq!(norm("  ab-12.34 0 "), Some("AB123400".into()));
    }

    #[test]
    fn test_non_ascii_letters_removed() {
        assert_eq!(norm("É037833100"), Some("03783310".into()));
    }

    #[test]
    fn test_clean_fragment_keeps_only_alphanumerics() {
        assert_eq!(clean_fragment(" 0378-33.10 0 "), "037833100");
    }

    // ── Properties ─────────────────────────────────────

    #[test]
    fn test_idempotent() {
        for raw in ["037833100", "ab1234 0", "123456", "x-y-z-1-2-3-4-5-6-7"] {
            let once = normalize(Some(raw)).unwrap();
            let twice = normalize(Some(once.as_str())).unwrap();
            assert_eq!(once, twice, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_output_always_canonical() {
        let inputs = [
            "123456", "1234567", "12345678", "123456789", "abcdefghijklmnop",
            " a.b.c.d.e.f ", "zz-99-99-99",
        ];
        for raw in inputs {
            let c = normalize(Some(raw)).unwrap();
            assert!(is_canonical(c.as_str()), "{:?} -> {:?}", raw, c);
        }
    }

    #[test]
    fn test_prefix_preserved_for_short_fragments() {
        for raw in ["ABC123", "ABC1234", "ABC12345"] {
            let c = normalize(Some(raw)).unwrap();
            assert!(c.as_str().starts_with(raw));
            assert!(c.as_str()[raw.len()..].chars().all(|ch| ch == '0'));
        }
    }

    #[test]
    fn test_case_whitespace_punctuation_insensitive() {
        let variants = ["AB12340", "ab12340", "  Ab1234-0\t", "a.b.1.2.3.4.0"];
        let expected = norm(variants[0]);
        for v in variants {
            assert_eq!(norm(v), expected, "variant {:?}", v);
        }
    }

    #[test]
    fn test_determinism_100_iterations() {
        let first = norm(" 0378-3310 0 ");
        for i in 0..100 {
            assert_eq!(norm(" 0378-3310 0 "), first, "Non-determinism at iteration {}", i);
        }
    }

    // ── Cusip type ─────────────────────────────────────

    #[test]
    fn test_from_str_rejects_short() {
        let err = "12-34".parse::<Cusip>().unwrap_err();
        assert!(matches!(err, Error::NormalizationError(_)));
    }

    #[test]
    fn test_from_str_accepts_raw() {
        let c: Cusip = "037833100".parse().unwrap();
        assert_eq!(c.to_string(), "03783310");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let c = Cusip::parse("037833100").unwrap();
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"03783310\"");
    }
}
