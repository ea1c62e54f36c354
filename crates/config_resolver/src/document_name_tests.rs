//! Tests for document name validation.

use super::*;

/// Verify typical page, API and database names are accepted.
#[test]
fn test_valid_document_names() {
    assert!(DocumentName::try_new("LoginPage").is_ok());
    assert!(DocumentName::try_new("swag_labs_page").is_ok());
    assert!(DocumentName::try_new("petstore-api").is_ok());
    assert!(DocumentName::try_new("orders.v2").is_ok());
    assert!(DocumentName::try_new("P").is_ok());

    let max_length = "a".repeat(100);
    assert!(DocumentName::try_new(max_length).is_ok());
}

/// Verify surrounding whitespace is trimmed.
#[test]
fn test_name_is_trimmed() {
    let name = DocumentName::try_new("  LoginPage ").unwrap();
    assert_eq!(name.as_str(), "LoginPage");
}

#[test]
fn test_invalid_empty_name() {
    let err = DocumentName::try_new("   ").unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidDocumentName { .. }));
}

#[test]
fn test_invalid_too_long() {
    let err = DocumentName::try_new("a".repeat(101)).unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidDocumentName { .. }));
}

/// Verify names cannot be used to walk out of a search root.
#[test]
fn test_invalid_path_characters() {
    assert!(DocumentName::try_new("../LoginPage").is_err());
    assert!(DocumentName::try_new("pages/LoginPage").is_err());
    assert!(DocumentName::try_new("pages\\LoginPage").is_err());
    assert!(DocumentName::try_new(".hidden").is_err());
    assert!(DocumentName::try_new("-flag").is_err());
}

#[test]
fn test_interior_whitespace_rejected_by_try_new() {
    assert!(DocumentName::try_new("Login Page").is_err());
}

#[test]
fn test_from_phrase_removes_whitespace() {
    let name = DocumentName::from_phrase("Login  Page").unwrap();
    assert_eq!(name.as_str(), "LoginPage");
}

#[test]
fn test_from_phrase_rejects_blank() {
    assert!(DocumentName::from_phrase(" \t ").is_err());
}

#[test]
fn test_deserialize_validates() {
    let ok: Vec<DocumentName> = serde_yaml::from_str("[LoginPage, Header]").unwrap();
    assert_eq!(ok[1].as_str(), "Header");

    let bad: Result<Vec<DocumentName>, _> = serde_yaml::from_str("['../etc']");
    assert!(bad.is_err());
}

#[test]
fn test_display_and_deref() {
    let name = DocumentName::try_new("Header").unwrap();
    assert_eq!(format!("{}", name), "Header");
    assert_eq!(name.len(), 6);
}
