//! Amount-shaped token detection.
//!
//! A token is amount-shaped when it is nothing but an optional currency
//! sign followed by a number: either thousands-grouped digits (comma,
//! space or a bidi mark as the separator) or a plain digit run, with an
//! optional two-digit fraction. Amounts embedded in prose do not qualify.

use super::PatternMatcher;
use once_cell::sync::Lazy;
use regex::Regex;

/// Matcher for standalone currency/number tokens such as `₪1,234.56`.
#[derive(Debug, Clone)]
pub struct AmountMatcher;

impl AmountMatcher {
    pub fn new() -> Self {
        Self
    }

    fn regex() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(
                r"(?x)
                ^\s*
                (?:₪|\$)?\s*
                (?:\d{1,3}(?:[,\x{200f}\x{200e}\ ]\d{3})+|\d+)
                (?:[.,]\d{2})?
                \s*$",
            )
            .expect("Valid amount regex")
        });
        &PATTERN
    }
}

impl Default for AmountMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternMatcher for AmountMatcher {
    fn pattern(&self) -> &Regex {
        Self::regex()
    }

    /// Canonical `1234.56` form: currency sign and group separators dropped.
    fn normalize(&self, text: &str) -> Option<String> {
        if !self.is_match(text) {
            return None;
        }
        let digits: String = text
            .trim()
            .trim_start_matches(|c: char| c == '₪' || c == '$')
            .chars()
            .filter(|&c| c.is_ascii_digit() || matches!(c, '.' | ','))
            .collect();

        // A trailing `,dd` or `.dd` is the fraction; every other mark groups.
        let (whole, fraction) = match digits.char_indices().rev().nth(2) {
            Some((i, sep)) if matches!(sep, '.' | ',') => (&digits[..i], Some(&digits[i + 1..])),
            _ => (digits.as_str(), None),
        };
        let whole: String = whole.chars().filter(|c| c.is_ascii_digit()).collect();
        Some(match fraction {
            Some(f) => format!("{}.{}", whole, f),
            None => whole,
        })
    }
}

/// Matcher for tokens made only of currency signs and numeric punctuation.
///
/// These are the pieces a text extractor splits off an amount (`₪`, `:`,
/// a lone `.`); they are merged back into the amount's box but are never
/// an amount on their own.
#[derive(Debug, Clone, Default)]
pub struct CurrencyFragmentMatcher;

impl CurrencyFragmentMatcher {
    pub fn new() -> Self {
        Self
    }

    fn regex() -> &'static Regex {
        static PATTERN: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^[₪:$,.\-]+$").expect("Valid fragment regex"));
        &PATTERN
    }
}

impl PatternMatcher for CurrencyFragmentMatcher {
    fn pattern(&self) -> &Regex {
        Self::regex()
    }

    fn normalize(&self, text: &str) -> Option<String> {
        self.is_match(text).then(|| text.to_string())
    }
}
