//! Tests for element descriptors.

use super::*;
use config_resolver::ElementAttributes;

fn resolved(name: &str, pairs: &[(&str, &str)]) -> ResolvedElement {
    ResolvedElement {
        name: name.to_string(),
        attributes: ElementAttributes::from_pairs(pairs.iter().copied()),
        document: DocumentName::try_new("LoginPage").unwrap(),
    }
}

#[test]
fn textbox_with_selectors_in_order() {
    let element = resolved(
        "first_name",
        &[("elementType", "Textbox"), ("id", "fname"), ("XPATH", "//input[1]")],
    );

    let descriptor = ElementDescriptor::from_resolved(&element, &ElementTypeRegistry::new()).unwrap();

    assert_eq!(descriptor.name, "first_name");
    assert_eq!(descriptor.document.as_str(), "LoginPage");
    assert_eq!(descriptor.element_type.as_deref(), Some("Textbox"));
    assert_eq!(descriptor.kind, ElementKind::Textbox);
    assert_eq!(
        descriptor.selectors,
        vec![
            Selector::new(SelectorKind::Id, "fname"),
            Selector::new(SelectorKind::XPath, "//input[1]"),
        ]
    );
}

#[test]
fn untyped_element_is_generic() {
    let element = resolved("submit", &[("css", "button[type=submit]")]);

    let descriptor = ElementDescriptor::from_resolved(&element, &ElementTypeRegistry::new()).unwrap();

    assert_eq!(descriptor.kind, ElementKind::Generic);
    assert_eq!(descriptor.element_type, None);
}

#[test]
fn unknown_selector_kind_is_rejected() {
    let element = resolved("submit", &[("colour", "blue")]);

    let err = ElementDescriptor::from_resolved(&element, &ElementTypeRegistry::new()).unwrap_err();

    assert_eq!(
        err,
        ElementError::NoSuchSelector {
            element: "submit".to_string(),
            selector: "colour".to_string(),
        }
    );
}

#[test]
fn empty_selector_value_is_malformed() {
    let element = resolved("submit", &[("id", "  ")]);

    let err = ElementDescriptor::from_resolved(&element, &ElementTypeRegistry::new()).unwrap_err();

    assert!(matches!(err, ElementError::MalformedSelector { ref selector, .. } if selector == "id"));
}

#[test]
fn element_without_selectors_is_malformed() {
    let element = resolved("submit", &[("elementType", "Button")]);

    let err = ElementDescriptor::from_resolved(&element, &ElementTypeRegistry::new()).unwrap_err();

    assert!(matches!(err, ElementError::MalformedSelector { .. }));
}

#[test]
fn strict_types_reject_unknown_tags() {
    let element = resolved("menu", &[("elementType", "Carousel"), ("id", "menu")]);

    let err = ElementDescriptor::from_resolved(&element, &ElementTypeRegistry::strict()).unwrap_err();

    assert!(matches!(err, ElementError::UnknownElementType { .. }));
}
