//! Name normalization used for duplicate detection.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalize a display name for comparison.
///
/// Uppercases, strips diacritics, drops anything that is not an ASCII letter
/// or whitespace, then collapses runs of whitespace and trims.
///
/// ```
/// use steward::entity::normalize_name;
///
/// assert_eq!(normalize_name("  Dra. Maria   Conceição "), "DRA MARIA CONCEICAO");
/// ```
pub fn normalize_name(name: &str) -> String {
    let letters: String = name
        .to_uppercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_uppercase() || c.is_whitespace())
        .collect();

    letters.split_whitespace().collect::<Vec<_>>().join(" ")
}
