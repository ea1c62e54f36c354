//! Configuration system error types.
//!
//! Domain-specific errors for locating, parsing, validating and resolving
//! configuration documents. Every variant carries the structured context
//! (document, key, environment) needed to assert on the cause of a failure
//! rather than its message text.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Configuration system errors.
///
/// The variants fall into three groups:
/// - resolution failures: a key, account or test data object could not be
///   resolved for an environment anywhere in a document's include closure
/// - document failures: a named document is missing, unreadable, unparsable
///   or structurally invalid
/// - setting failures: a stored setting has a value that cannot be used
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("No value for '{key}' in the '{environment}' or default environment of {document} or any document it includes")]
    NotFound {
        document: String,
        key: String,
        environment: String,
    },

    #[error("Account '{account}' could not be found for the '{environment}' or default environment in {document}")]
    AccountNotFound {
        document: String,
        account: String,
        environment: String,
    },

    #[error("Configuration document '{document}' not found (searched: {searched})")]
    DocumentNotFound { document: String, searched: String },

    #[error("Access denied while searching for configuration documents: {path}")]
    AccessDenied { path: String },

    #[error("Failed to read configuration document '{document}': {reason}")]
    ReadFailed { document: String, reason: String },

    #[error("Failed to parse configuration document '{document}': {reason}")]
    ParseError { document: String, reason: String },

    #[error("Invalid configuration document '{document}': {reason}")]
    InvalidDocument { document: String, reason: String },

    #[error("Invalid document name '{name}': {reason}")]
    InvalidDocumentName { name: String, reason: String },

    #[error("Malformed URL '{url}' for the '{environment}' environment in {document}: {reason}")]
    MalformedUrl {
        document: String,
        environment: String,
        url: String,
        reason: String,
    },

    #[error("Invalid value '{value}' for setting '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Required setting '{key}' is not set. Set it in the settings document or with the {override_variable} environment variable")]
    RequiredSettingMissing {
        key: String,
        override_variable: String,
    },
}

/// The broad category of a [`ConfigurationError`].
///
/// Callers that only need to know whether something was missing, as opposed
/// to malformed, match on this instead of every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationErrorKind {
    /// A value, account, setting or document does not exist.
    NotFound,
    /// A document or value exists but violates the expected structure.
    Malformed,
    /// The configuration source could not be accessed.
    Unavailable,
}

impl ConfigurationError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ConfigurationErrorKind {
        match self {
            Self::NotFound { .. }
            | Self::AccountNotFound { .. }
            | Self::DocumentNotFound { .. }
            | Self::RequiredSettingMissing { .. } => ConfigurationErrorKind::NotFound,
            Self::ParseError { .. }
            | Self::InvalidDocument { .. }
            | Self::InvalidDocumentName { .. }
            | Self::MalformedUrl { .. }
            | Self::InvalidValue { .. } => ConfigurationErrorKind::Malformed,
            Self::AccessDenied { .. } | Self::ReadFailed { .. } => {
                ConfigurationErrorKind::Unavailable
            }
        }
    }

    /// Returns the name of the document the error refers to, if any.
    pub fn document(&self) -> Option<&str> {
        match self {
            Self::NotFound { document, .. }
            | Self::AccountNotFound { document, .. }
            | Self::DocumentNotFound { document, .. }
            | Self::ReadFailed { document, .. }
            | Self::ParseError { document, .. }
            | Self::InvalidDocument { document, .. }
            | Self::MalformedUrl { document, .. } => Some(document),
            Self::InvalidDocumentName { name, .. } => Some(name),
            Self::AccessDenied { .. }
            | Self::InvalidValue { .. }
            | Self::RequiredSettingMissing { .. } => None,
        }
    }
}

/// Result type alias for configuration operations.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;
