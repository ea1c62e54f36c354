//! The browser capability consumed by element handles and pages.
//!
//! Pagewright does not drive a browser itself. Anything that can find nodes,
//! read their state and interact with them implements [`Browser`]; element
//! handles and pages are written against this trait only.

use crate::synchronization::Transience;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[cfg(test)]
#[path = "browser_tests.rs"]
mod tests;

/// How a selector value identifies a node.
///
/// The names match the keys used under an element in a configuration
/// document (`id: fname`, `xpath: //input[@id='fname']`, ...). Keys are
/// matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    Class,
    Css,
    Id,
    Name,
    PartialText,
    Text,
    XPath,
    TagName,
}

impl SelectorKind {
    pub const ALL: [SelectorKind; 8] = [
        Self::Class,
        Self::Css,
        Self::Id,
        Self::Name,
        Self::PartialText,
        Self::Text,
        Self::XPath,
        Self::TagName,
    ];

    /// Key of this kind in a configuration document.
    pub fn name(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Css => "css",
            Self::Id => "id",
            Self::Name => "name",
            Self::PartialText => "partialtext",
            Self::Text => "text",
            Self::XPath => "xpath",
            Self::TagName => "tagname",
        }
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for a selector key that names no [`SelectorKind`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown selector kind '{0}'")]
pub struct UnknownSelectorKind(pub String);

impl FromStr for SelectorKind {
    type Err = UnknownSelectorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == key)
            .ok_or_else(|| UnknownSelectorKind(s.to_string()))
    }
}

/// A selector kind and its value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Selector {
    pub kind: SelectorKind,
    pub value: String,
}

impl Selector {
    pub fn new(kind: SelectorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind, self.value)
    }
}

/// Opaque reference to a node found by a [`Browser`].
///
/// A handle may go stale when the page changes; operations on a stale
/// handle fail with [`BrowserError::StaleNode`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub String);

impl NodeHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failures reported by a [`Browser`].
///
/// `NoSuchNode`, `StaleNode` and `NotInteractable` describe a page that may
/// still be changing and are retried while a wait is polling. The remaining
/// variants are returned to the caller immediately.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowserError {
    #[error("No node matches {selector}")]
    NoSuchNode { selector: String },

    #[error("Node {node} is no longer attached to the page")]
    StaleNode { node: String },

    #[error("Node cannot be interacted with: {reason}")]
    NotInteractable { reason: String },

    #[error("Invalid selector {selector}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Browser session is closed")]
    SessionClosed,

    #[error("Browser driver failure: {message}")]
    Driver { message: String },
}

impl Transience for BrowserError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NoSuchNode { .. } | Self::StaleNode { .. } | Self::NotInteractable { .. }
        )
    }
}

pub type BrowserResult<T> = Result<T, BrowserError>;

/// A live browser session.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Find the first node on the page matching `selector`.
    async fn find_node(&self, selector: &Selector) -> BrowserResult<NodeHandle>;

    /// Find all nodes under `parent` matching `selector`, in document order.
    /// No match is an empty list, not an error.
    async fn find_nodes_within(
        &self,
        parent: &NodeHandle,
        selector: &Selector,
    ) -> BrowserResult<Vec<NodeHandle>>;

    async fn click(&self, node: &NodeHandle) -> BrowserResult<()>;

    /// Visible text of a node.
    async fn text(&self, node: &NodeHandle) -> BrowserResult<String>;

    async fn attribute(&self, node: &NodeHandle, name: &str) -> BrowserResult<Option<String>>;

    async fn is_visible(&self, node: &NodeHandle) -> BrowserResult<bool>;

    async fn is_enabled(&self, node: &NodeHandle) -> BrowserResult<bool>;

    async fn is_selected(&self, node: &NodeHandle) -> BrowserResult<bool>;

    async fn clear(&self, node: &NodeHandle) -> BrowserResult<()>;

    async fn send_keys(&self, node: &NodeHandle, text: &str) -> BrowserResult<()>;

    async fn navigate(&self, url: &str) -> BrowserResult<()>;

    async fn current_url(&self) -> BrowserResult<String>;

    /// `document.readyState` of the current page.
    async fn ready_state(&self) -> BrowserResult<String>;

    /// Go back one entry in the session history.
    async fn back(&self) -> BrowserResult<()> {
        Err(unsupported("back"))
    }

    /// Go forward one entry in the session history.
    async fn forward(&self) -> BrowserResult<()> {
        Err(unsupported("forward"))
    }

    /// Reload the current page.
    async fn refresh(&self) -> BrowserResult<()> {
        Err(unsupported("refresh"))
    }
}

fn unsupported(operation: &str) -> BrowserError {
    BrowserError::Driver {
        message: format!("'{}' is not supported by this browser", operation),
    }
}
