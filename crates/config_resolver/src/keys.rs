//! Name normalization shared by element lookups, test data and stored values.
//!
//! Test steps refer to configuration entries with human phrases
//! (`"First Name"`), while documents use identifier-style keys
//! (`first_name`). Both sides are reduced to the same canonical form before
//! they are compared.

#[cfg(test)]
#[path = "keys_tests.rs"]
mod tests;

/// Collapses every run of whitespace into a single `_` and trims the ends.
///
/// Case is preserved.
///
/// ```
/// use config_resolver::keys::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  Puppy   Data "), "Puppy_Data");
/// ```
pub fn collapse_whitespace(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Produces the canonical lookup key for a name: whitespace collapsed to `_`
/// and case folded to lowercase.
///
/// ```
/// use config_resolver::keys::normalize_key;
///
/// assert_eq!(normalize_key("First Name"), "first_name");
/// assert_eq!(normalize_key("first_name"), "first_name");
/// ```
pub fn normalize_key(name: &str) -> String {
    collapse_whitespace(name).to_lowercase()
}
