//! Tests for configuration error types.

use super::*;

#[test]
fn not_found_carries_structured_context() {
    let error = ConfigurationError::NotFound {
        document: "LoginPage".to_string(),
        key: "url".to_string(),
        environment: "qa".to_string(),
    };

    match &error {
        ConfigurationError::NotFound {
            document,
            key,
            environment,
        } => {
            assert_eq!(document, "LoginPage");
            assert_eq!(key, "url");
            assert_eq!(environment, "qa");
        }
        _ => panic!("Expected NotFound"),
    }
    assert_eq!(error.kind(), ConfigurationErrorKind::NotFound);
    assert_eq!(error.document(), Some("LoginPage"));
}

#[test]
fn not_found_message_names_document_and_environment() {
    let error = ConfigurationError::NotFound {
        document: "LoginPage".to_string(),
        key: "url".to_string(),
        environment: "qa".to_string(),
    };

    let message = error.to_string();
    assert!(message.contains("LoginPage"));
    assert!(message.contains("'qa'"));
    assert!(message.contains("'url'"));
}

#[test]
fn invalid_document_is_malformed() {
    let error = ConfigurationError::InvalidDocument {
        document: "Desktop".to_string(),
        reason: "a document cannot declare both urls and executables".to_string(),
    };

    assert_eq!(error.kind(), ConfigurationErrorKind::Malformed);
    assert_eq!(error.document(), Some("Desktop"));
}

#[test]
fn access_denied_is_unavailable_and_has_no_document() {
    let error = ConfigurationError::AccessDenied {
        path: "/locked".to_string(),
    };

    assert_eq!(error.kind(), ConfigurationErrorKind::Unavailable);
    assert_eq!(error.document(), None);
}

#[test]
fn required_setting_message_names_override_variable() {
    let error = ConfigurationError::RequiredSettingMissing {
        key: "browser".to_string(),
        override_variable: "PAGEWRIGHT_BROWSER".to_string(),
    };

    assert!(error.to_string().contains("PAGEWRIGHT_BROWSER"));
    assert_eq!(error.kind(), ConfigurationErrorKind::NotFound);
}

#[test]
fn errors_compare_by_value() {
    let a = ConfigurationError::ParseError {
        document: "Page".to_string(),
        reason: "bad indent".to_string(),
    };
    let b = a.clone();

    assert_eq!(a, b);
}
