//! Harness error types.
//!
//! [`HarnessError`] is the single root returned by page-level operations.
//! It wraps the configuration errors from `config_resolver` together with
//! the element and page families defined here, so a test can match on the
//! cause at whatever depth it needs.

use crate::browser::BrowserError;
use crate::element_types::ElementKind;
use config_resolver::ConfigurationError;
use std::time::Duration;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HarnessError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Element(#[from] ElementError),

    #[error(transparent)]
    Page(#[from] PageError),
}

pub type HarnessResult<T> = Result<T, HarnessError>;

/// Failures resolving or interacting with a single element.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElementError {
    #[error("Element '{element}' is not defined in {document} or any document it includes")]
    NotFoundInConfiguration { element: String, document: String },

    #[error("Element '{element}' was not found within {timeout:?} ({attempts} attempts){}", describe_last_error(.last_error))]
    NotFound {
        element: String,
        timeout: Duration,
        attempts: u32,
        last_error: Option<String>,
    },

    #[error("Element '{element}' was not visible within {timeout:?} ({attempts} attempts)")]
    NotVisible {
        element: String,
        timeout: Duration,
        attempts: u32,
    },

    #[error("Element '{element}' could not be interacted with within {timeout:?} ({attempts} attempts): {reason}")]
    NotInteractable {
        element: String,
        timeout: Duration,
        attempts: u32,
        reason: String,
    },

    #[error("Element '{element}' uses unknown selector kind '{selector}'")]
    NoSuchSelector { element: String, selector: String },

    #[error("Element '{element}' has an invalid selector '{selector}': {reason}")]
    MalformedSelector {
        element: String,
        selector: String,
        reason: String,
    },

    #[error("Element '{element}' is a {actual}, not a {expected}")]
    TypeMismatch {
        element: String,
        expected: ElementKind,
        actual: ElementKind,
    },

    #[error("Element '{element}' has unknown element type '{element_type}'")]
    UnknownElementType {
        element: String,
        element_type: String,
    },

    #[error("Element '{element}' has no option '{option}'")]
    NoSuchOption { element: String, option: String },

    #[error("Table '{element}' has no column '{column}'")]
    NoSuchColumn { element: String, column: String },

    #[error("Table '{element}' has no row {row}")]
    NoSuchRow { element: String, row: usize },

    #[error("Browser failure on element '{element}': {source}")]
    Browser {
        element: String,
        #[source]
        source: BrowserError,
    },

    #[error("Operation on element '{element}' was cancelled")]
    Cancelled { element: String },
}

impl ElementError {
    /// Name of the element the error is about.
    pub fn element(&self) -> &str {
        match self {
            Self::NotFoundInConfiguration { element, .. }
            | Self::NotFound { element, .. }
            | Self::NotVisible { element, .. }
            | Self::NotInteractable { element, .. }
            | Self::NoSuchSelector { element, .. }
            | Self::MalformedSelector { element, .. }
            | Self::TypeMismatch { element, .. }
            | Self::UnknownElementType { element, .. }
            | Self::NoSuchOption { element, .. }
            | Self::NoSuchColumn { element, .. }
            | Self::NoSuchRow { element, .. }
            | Self::Browser { element, .. }
            | Self::Cancelled { element } => element,
        }
    }

    /// True for failures that only happen after waiting out a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::NotVisible { .. } | Self::NotInteractable { .. }
        )
    }
}

fn describe_last_error(last_error: &Option<String>) -> String {
    match last_error {
        Some(error) => format!(": {}", error),
        None => String::new(),
    }
}

/// Failures of page-level operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageError {
    #[error("No page has been opened")]
    NoPageOpened,

    #[error("Page {page} did not finish loading within {timeout:?} (last ready state: {})", .last_state.as_deref().unwrap_or("unknown"))]
    LoadTimeout {
        page: String,
        timeout: Duration,
        last_state: Option<String>,
    },

    #[error("Browser failure on page {page}: {source}")]
    Browser {
        page: String,
        #[source]
        source: BrowserError,
    },

    #[error("Loading page {page} was cancelled")]
    Cancelled { page: String },
}
