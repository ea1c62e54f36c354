//! Document name validation.
//!
//! Provides a branded type for the logical name of a configuration document
//! (a page, API or database object). The name doubles as the file stem that is
//! searched for on disk, so it is restricted to characters that are safe in a
//! file name and cannot escape the search roots.

use crate::{ConfigurationError, ConfigurationResult};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

#[cfg(test)]
#[path = "document_name_tests.rs"]
mod tests;

const MAX_DOCUMENT_NAME_LENGTH: usize = 100;

/// A validated configuration document name.
///
/// Document names must:
/// - Be 1-100 characters long
/// - Contain only ASCII letters, digits, hyphens, underscores and dots
/// - Not start with a dot or a hyphen
///
/// Case is preserved because the name is matched against file names.
///
/// # Examples
///
/// ```
/// use config_resolver::DocumentName;
///
/// let page = DocumentName::try_new("LoginPage").unwrap();
/// assert_eq!(page.as_str(), "LoginPage");
///
/// assert!(DocumentName::try_new("").is_err());
/// assert!(DocumentName::try_new("../secrets").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentName(String);

impl DocumentName {
    /// Create a new DocumentName from a string.
    ///
    /// Surrounding whitespace is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidDocumentName` if the name is empty,
    /// too long, contains characters outside the allowed set, or starts with a
    /// dot or hyphen.
    pub fn try_new(name: impl Into<String>) -> ConfigurationResult<Self> {
        let name = name.into();
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(ConfigurationError::InvalidDocumentName {
                name,
                reason: "Document name cannot be empty".to_string(),
            });
        }

        if trimmed.len() > MAX_DOCUMENT_NAME_LENGTH {
            return Err(ConfigurationError::InvalidDocumentName {
                reason: format!(
                    "Document name too long ({} characters, maximum {})",
                    trimmed.len(),
                    MAX_DOCUMENT_NAME_LENGTH
                ),
                name,
            });
        }

        if let Some(invalid) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(ConfigurationError::InvalidDocumentName {
                reason: format!("Document name contains invalid character '{}'", invalid),
                name,
            });
        }

        if trimmed.starts_with('.') || trimmed.starts_with('-') {
            return Err(ConfigurationError::InvalidDocumentName {
                reason: "Document name cannot start with '.' or '-'".to_string(),
                name,
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Create a DocumentName from a human phrase such as `"Login Page"`.
    ///
    /// All whitespace is removed before validation, so `"Login Page"` and
    /// `"LoginPage"` name the same document.
    ///
    /// ```
    /// use config_resolver::DocumentName;
    ///
    /// let name = DocumentName::from_phrase("Swag Labs  Page").unwrap();
    /// assert_eq!(name.as_str(), "SwagLabsPage");
    /// ```
    pub fn from_phrase(phrase: &str) -> ConfigurationResult<Self> {
        let compact: String = phrase.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(ConfigurationError::InvalidDocumentName {
                name: phrase.to_string(),
                reason: "Document name cannot be empty".to_string(),
            });
        }
        Self::try_new(compact)
    }

    /// Get the underlying string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the name and return the underlying string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for DocumentName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for DocumentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DocumentName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DocumentName {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl TryFrom<&str> for DocumentName {
    type Error = ConfigurationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<DocumentName> for String {
    fn from(name: DocumentName) -> Self {
        name.0
    }
}
