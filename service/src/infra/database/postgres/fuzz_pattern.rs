//! [`FuzzPattern`] definition.

use derive_more::Display;
use itertools::Itertools as _;
use postgres_types::{FromSql, ToSql};

/// `SIMILAR TO` pattern matching a text containing any of the searched words.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct FuzzPattern(String);

impl FuzzPattern {
    /// Characters having a special meaning in a `SIMILAR TO` pattern.
    const SPECIAL: &'static [char] = &[
        '\\', '%', '_', '|', '*', '+', '?', '{', '}', '(', ')', '[', ']',
    ];

    /// Creates a new [`FuzzPattern`] out of the given whitespace-separated
    /// `words`.
    #[must_use]
    pub fn new(words: &str) -> Self {
        let alternatives = words
            .split_whitespace()
            .map(|word| {
                let escaped = word.chars().fold(
                    String::with_capacity(word.len()),
                    |mut out, c| {
                        if Self::SPECIAL.contains(&c) {
                            out.push('\\');
                        }
                        out.push(c);
                        out
                    },
                );
                format!("%{escaped}%")
            })
            .join("|");
        Self(format!("({alternatives})"))
    }
}

#[cfg(test)]
mod spec {
    use super::FuzzPattern;

    #[test]
    fn matches_any_word() {
        assert_eq!(
            FuzzPattern::new("  maria  souza ").to_string(),
            "(%maria%|%souza%)",
        );
    }

    #[test]
    fn escapes_special_chars() {
        assert_eq!(
            FuzzPattern::new("50% a_b (x)").to_string(),
            r"(%50\%%|%a\_b%|%\(x\)%)",
        );
    }
}
