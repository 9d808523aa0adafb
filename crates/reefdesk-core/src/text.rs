//! Text folding shared by search matching and name collation.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Case-fold text for substring search: NFKC + Unicode lowercase.
#[must_use]
pub fn fold_search(input: &str) -> String {
    input.nfkc().collect::<String>().to_lowercase()
}

/// Normalize a user-typed search term: trimmed, then folded like record text.
#[must_use]
pub fn normalize_term(input: &str) -> String {
    fold_search(input.trim())
}

/// Primary collation key for display names.
///
/// Accents are stripped and case is folded so "Éden" files next to "eden".
#[must_use]
pub fn collation_key(input: &str) -> String {
    squash(input.nfkd().filter(|c| !is_combining_mark(*c)).collect::<String>().to_lowercase())
}

/// Three-level sort key for display names, compared field by field.
///
/// - `primary`: base letters only, from [`collation_key`]
/// - `secondary`: accents kept, case folded; unaccented sorts first
/// - `tertiary`: case swapped, so lowercase sorts before uppercase
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollationKey {
    primary: String,
    secondary: String,
    tertiary: String,
}

impl CollationKey {
    #[must_use]
    pub fn new(input: &str) -> Self {
        let decomposed: String = input.nfkd().collect();
        Self {
            primary: collation_key(input),
            secondary: squash(decomposed.to_lowercase()),
            tertiary: squash(decomposed.chars().map(swap_case).collect()),
        }
    }
}

fn squash(text: String) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn swap_case(c: char) -> char {
    if c.is_lowercase() {
        c.to_uppercase().next().unwrap_or(c)
    } else if c.is_uppercase() {
        c.to_lowercase().next().unwrap_or(c)
    } else {
        c
    }
}
