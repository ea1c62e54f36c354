//! Tests for harness error types.

use super::*;

#[test]
fn configuration_errors_convert_to_harness_errors() {
    let err: HarnessError = ConfigurationError::DocumentNotFound {
        document: "LoginPage".to_string(),
        searched: "conf".to_string(),
    }
    .into();

    assert!(matches!(
        err,
        HarnessError::Configuration(ConfigurationError::DocumentNotFound { .. })
    ));
    assert_eq!(
        err.to_string(),
        "Configuration document 'LoginPage' not found (searched: conf)"
    );
}

#[test]
fn not_found_message_includes_last_error() {
    let err = ElementError::NotFound {
        element: "submit".to_string(),
        timeout: Duration::from_secs(10),
        attempts: 42,
        last_error: Some("No node matches id=submit".to_string()),
    };

    assert_eq!(
        err.to_string(),
        "Element 'submit' was not found within 10s (42 attempts): No node matches id=submit"
    );
    assert!(err.is_timeout());
    assert_eq!(err.element(), "submit");
}

#[test]
fn not_found_message_without_last_error() {
    let err = ElementError::NotFound {
        element: "submit".to_string(),
        timeout: Duration::from_millis(500),
        attempts: 1,
        last_error: None,
    };

    assert_eq!(
        err.to_string(),
        "Element 'submit' was not found within 500ms (1 attempts)"
    );
}

#[test]
fn type_mismatch_names_both_kinds() {
    let err = ElementError::TypeMismatch {
        element: "first_name".to_string(),
        expected: ElementKind::Select,
        actual: ElementKind::Textbox,
    };

    assert_eq!(
        err.to_string(),
        "Element 'first_name' is a Textbox, not a Select"
    );
    assert!(!err.is_timeout());
}

#[test]
fn browser_failures_keep_their_source() {
    let err = ElementError::Browser {
        element: "submit".to_string(),
        source: BrowserError::SessionClosed,
    };

    let source = std::error::Error::source(&err).map(ToString::to_string);

    assert_eq!(source.as_deref(), Some("Browser session is closed"));
}

#[test]
fn load_timeout_reports_last_state() {
    let err = PageError::LoadTimeout {
        page: "LoginPage".to_string(),
        timeout: Duration::from_secs(10),
        last_state: Some("interactive".to_string()),
    };

    assert_eq!(
        err.to_string(),
        "Page LoginPage did not finish loading within 10s (last ready state: interactive)"
    );
}
