//! Typed element descriptors built from resolved configuration.

use crate::browser::{Selector, SelectorKind};
use crate::element_types::{ElementKind, ElementTypeRegistry};
use crate::errors::ElementError;
use config_resolver::{DocumentName, ResolvedElement};
use serde::Serialize;

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;

/// Everything needed to find and classify one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementDescriptor {
    /// Normalized element name.
    pub name: String,
    /// Document that declared the element.
    pub document: DocumentName,
    /// `elementType` tag as written, if any.
    pub element_type: Option<String>,
    pub kind: ElementKind,
    /// Selectors in declaration order; tried in this order when locating.
    pub selectors: Vec<Selector>,
}

impl ElementDescriptor {
    /// Build a descriptor from a resolved element definition.
    ///
    /// # Errors
    ///
    /// - `ElementError::NoSuchSelector` for an attribute that is not a
    ///   selector kind
    /// - `ElementError::MalformedSelector` for an empty selector value or an
    ///   element with no selectors at all
    /// - `ElementError::UnknownElementType` from a strict type registry
    pub fn from_resolved(
        resolved: &ResolvedElement,
        types: &ElementTypeRegistry,
    ) -> Result<Self, ElementError> {
        let element_type = resolved.attributes.element_type().map(str::to_string);
        let kind = types.resolve(&resolved.name, element_type.as_deref())?;

        let selectors = resolved
            .attributes
            .selectors()
            .map(|(key, value)| parse_selector(&resolved.name, key, value))
            .collect::<Result<Vec<_>, _>>()?;

        if selectors.is_empty() {
            return Err(ElementError::MalformedSelector {
                element: resolved.name.clone(),
                selector: String::new(),
                reason: "element defines no selectors".to_string(),
            });
        }

        Ok(Self {
            name: resolved.name.clone(),
            document: resolved.document.clone(),
            element_type,
            kind,
            selectors,
        })
    }
}

fn parse_selector(element: &str, key: &str, value: &str) -> Result<Selector, ElementError> {
    let kind: SelectorKind = key.parse().map_err(|_| ElementError::NoSuchSelector {
        element: element.to_string(),
        selector: key.to_string(),
    })?;

    if value.trim().is_empty() {
        return Err(ElementError::MalformedSelector {
            element: element.to_string(),
            selector: key.to_string(),
            reason: "selector value is empty".to_string(),
        });
    }

    Ok(Selector::new(kind, value))
}
