//! Mapping from a document's `elementType` tag to a concrete element kind.

use crate::errors::ElementError;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

#[cfg(test)]
#[path = "element_types_tests.rs"]
mod tests;

/// Concrete kind of an element handle, deciding which capability views it
/// supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ElementKind {
    Generic,
    Textbox,
    Checkbox,
    Radiobutton,
    Select,
    Table,
}

impl ElementKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Generic => "Element",
            Self::Textbox => "Textbox",
            Self::Checkbox => "Checkbox",
            Self::Radiobutton => "Radiobutton",
            Self::Select => "Select",
            Self::Table => "Table",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const BUILT_IN_TAGS: &[(&str, ElementKind)] = &[
    ("element", ElementKind::Generic),
    ("generic", ElementKind::Generic),
    ("button", ElementKind::Generic),
    ("link", ElementKind::Generic),
    ("label", ElementKind::Generic),
    ("textbox", ElementKind::Textbox),
    ("textarea", ElementKind::Textbox),
    ("checkbox", ElementKind::Checkbox),
    ("radiobutton", ElementKind::Radiobutton),
    ("radio", ElementKind::Radiobutton),
    ("select", ElementKind::Select),
    ("selectelement", ElementKind::Select),
    ("dropdown", ElementKind::Select),
    ("table", ElementKind::Table),
];

/// Registry of `elementType` tags.
///
/// Tags are matched case-insensitively with whitespace removed. An element
/// without a tag is [`ElementKind::Generic`]. An element with a tag the
/// registry does not know is also treated as generic unless the registry
/// was created with [`ElementTypeRegistry::strict`].
#[derive(Debug, Clone)]
pub struct ElementTypeRegistry {
    kinds: HashMap<String, ElementKind>,
    strict: bool,
}

impl ElementTypeRegistry {
    /// Registry with the built-in tags and generic fallback.
    pub fn new() -> Self {
        let kinds = BUILT_IN_TAGS
            .iter()
            .map(|(tag, kind)| ((*tag).to_string(), *kind))
            .collect();
        Self {
            kinds,
            strict: false,
        }
    }

    /// Registry with the built-in tags that rejects unknown tags.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::new()
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Add or replace a tag.
    pub fn register(&mut self, tag: &str, kind: ElementKind) {
        self.kinds.insert(tag_key(tag), kind);
    }

    /// Kind for an element's `elementType` tag.
    ///
    /// # Errors
    ///
    /// `ElementError::UnknownElementType` for an unregistered tag in a
    /// strict registry.
    pub fn resolve(
        &self,
        element: &str,
        element_type: Option<&str>,
    ) -> Result<ElementKind, ElementError> {
        let tag = match element_type.map(tag_key) {
            Some(tag) if !tag.is_empty() => tag,
            _ => return Ok(ElementKind::Generic),
        };

        if let Some(kind) = self.kinds.get(&tag) {
            return Ok(*kind);
        }

        if self.strict {
            return Err(ElementError::UnknownElementType {
                element: element.to_string(),
                element_type: element_type.unwrap_or_default().to_string(),
            });
        }

        debug!(
            "Element type '{}' of {} is not registered, using a generic element",
            tag, element
        );
        Ok(ElementKind::Generic)
    }
}

impl Default for ElementTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn tag_key(tag: &str) -> String {
    tag.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}
