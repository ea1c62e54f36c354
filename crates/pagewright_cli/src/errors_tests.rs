use super::*;

#[test]
fn configuration_errors_keep_their_message() {
    let err: Error = ConfigurationError::DocumentNotFound {
        document: "LoginPage".to_string(),
        searched: "conf/pages".to_string(),
    }
    .into();

    assert_eq!(
        err.to_string(),
        "Configuration error: Configuration document 'LoginPage' not found (searched: conf/pages)"
    );
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn failed_checks_exit_with_one() {
    let err = Error::CheckFailed {
        failed: 2,
        checked: 7,
    };

    assert_eq!(err.to_string(), "2 of 7 documents failed validation");
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn element_errors_convert() {
    let err: Error = ElementError::NoSuchSelector {
        element: "submit".to_string(),
        selector: "label".to_string(),
    }
    .into();

    assert!(matches!(err, Error::Element(_)));
    assert_eq!(
        err.to_string(),
        "Element error: Element 'submit' uses unknown selector kind 'label'"
    );
}

#[test]
fn every_variant_maps_to_an_exit_code() {
    let errors: Vec<Error> = vec![
        ConfigurationError::DocumentNotFound {
            document: "LoginPage".to_string(),
            searched: "conf/pages".to_string(),
        }
        .into(),
        ElementError::NoSuchSelector {
            element: "submit".to_string(),
            selector: "label".to_string(),
        }
        .into(),
        serde_json::from_str::<serde_json::Value>("{").unwrap_err().into(),
        Error::CheckFailed {
            failed: 1,
            checked: 1,
        },
    ];

    for err in errors {
        // No wildcard: every variant must be constructible by a command.
        let expected = match &err {
            Error::Configuration(_) | Error::Element(_) | Error::Serialize(_) => 2,
            Error::CheckFailed { .. } => 1,
        };
        assert_eq!(err.exit_code(), expected, "{}", err);
    }
}
