//! Token classification for layout-based field extraction.
//!
//! The proximity matcher decides what a value looks like from the token
//! text alone; these matchers hold those rules.

pub mod amount;

pub use amount::{AmountMatcher, CurrencyFragmentMatcher};

use regex::Regex;

/// Trait for token pattern matchers.
pub trait PatternMatcher: Send + Sync {
    fn pattern(&self) -> &Regex;

    /// True if the whole token has this shape.
    fn is_match(&self, token: &str) -> bool {
        self.pattern().is_match(token)
    }

    fn normalize(&self, text: &str) -> Option<String>;
}
