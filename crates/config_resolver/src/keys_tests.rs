//! Tests for name normalization.

use super::*;

#[test]
fn normalize_key_folds_case_and_whitespace() {
    assert_eq!(normalize_key("First Name"), "first_name");
    assert_eq!(normalize_key("FIRST\tNAME"), "first_name");
    assert_eq!(normalize_key("  first   name  "), "first_name");
}

#[test]
fn normalize_key_is_idempotent() {
    let once = normalize_key("Submit Order Button");
    assert_eq!(normalize_key(&once), once);
}

#[test]
fn collapse_whitespace_preserves_case() {
    assert_eq!(collapse_whitespace("Puppy Data"), "Puppy_Data");
}

#[test]
fn empty_input_stays_empty() {
    assert_eq!(normalize_key(""), "");
    assert_eq!(collapse_whitespace("   "), "");
}
