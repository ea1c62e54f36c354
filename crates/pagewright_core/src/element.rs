//! Element handles.
//!
//! An [`Element`] is created once per page for each element a test asks
//! for, from its [`ElementDescriptor`]. It finds its node lazily, remembers
//! it, and finds it again when the node goes stale. Every operation runs
//! inside a bounded wait using the context's default timing.

use crate::browser::{Browser, BrowserError, BrowserResult, NodeHandle};
use crate::descriptor::ElementDescriptor;
use crate::element_types::ElementKind;
use crate::errors::ElementError;
use crate::synchronization::{Probe, Transience, WaitError, WaitOptions, Waiter};
use config_resolver::TestContext;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

#[cfg(test)]
#[path = "element_tests.rs"]
mod tests;

pub(crate) const HIDDEN: &str = "hidden";
pub(crate) const DISABLED: &str = "disabled";
const VISIBLE: &str = "visible";
const ENABLED: &str = "enabled";

/// Handle to one configured element on a page.
pub struct Element {
    descriptor: ElementDescriptor,
    browser: Arc<dyn Browser>,
    context: Arc<TestContext>,
    cancel: CancellationToken,
    node: Mutex<Option<NodeHandle>>,
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("descriptor", &self.descriptor)
            .field("node", &self.cached_node())
            .finish()
    }
}

impl Element {
    pub fn new(
        descriptor: ElementDescriptor,
        browser: Arc<dyn Browser>,
        context: Arc<TestContext>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            descriptor,
            browser,
            context,
            cancel,
            node: Mutex::new(None),
        }
    }

    /// Normalized element name.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &ElementDescriptor {
        &self.descriptor
    }

    pub fn kind(&self) -> ElementKind {
        self.descriptor.kind
    }

    /// Wait options for this element: the context's current timing and the
    /// page's cancellation token.
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::from_timeouts(&self.context.timeouts()).with_cancellation(self.cancel.clone())
    }

    pub(crate) fn browser(&self) -> &dyn Browser {
        self.browser.as_ref()
    }

    /// Find the element's node, waiting up to the default timeout.
    ///
    /// Each poll tries every selector in declaration order and takes the
    /// first match.
    pub async fn locate(&self) -> Result<NodeHandle, ElementError> {
        self.locate_with(self.wait_options()).await
    }

    /// Find the element's node with explicit wait options.
    #[instrument(skip(self, options), fields(element = %self.descriptor.name))]
    pub async fn locate_with(&self, options: WaitOptions) -> Result<NodeHandle, ElementError> {
        let element = self;
        Waiter::new(options)
            .until(&self.describe("to be present"), move || async move {
                element.find_attached().await.map(Probe::Ready)
            })
            .await
            .map_err(|e| self.wait_failure(e))
    }

    /// True if the node can be found right now, without waiting.
    pub async fn exists(&self) -> Result<bool, ElementError> {
        match self.locate_with(self.wait_options().with_timeout(Duration::ZERO)).await {
            Ok(_) => Ok(true),
            Err(ElementError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Click once the node is visible and enabled.
    #[instrument(skip(self), fields(element = %self.descriptor.name))]
    pub async fn click(&self) -> Result<(), ElementError> {
        let element = self;
        self.wait(&self.describe("to be clickable"), move || async move {
            element
                .with_node(|node| element.click_when_ready(node))
                .await
        })
        .await?;
        debug!("Clicked {}", self.name());
        Ok(())
    }

    /// Visible text of the node.
    pub async fn text(&self) -> Result<String, ElementError> {
        let element = self;
        self.wait(&self.describe("text"), move || async move {
            element
                .with_node(|node| async move {
                    element.browser().text(&node).await.map(Probe::Ready)
                })
                .await
        })
        .await
    }

    /// Value of an attribute, `None` if the node does not have it.
    pub async fn attribute(&self, name: &str) -> Result<Option<String>, ElementError> {
        let element = self;
        self.wait(&self.describe("attributes"), move || async move {
            element
                .with_node(|node| async move {
                    element
                        .browser()
                        .attribute(&node, name)
                        .await
                        .map(Probe::Ready)
                })
                .await
        })
        .await
    }

    pub async fn has_attribute(&self, name: &str) -> Result<bool, ElementError> {
        Ok(self.attribute(name).await?.is_some())
    }

    /// Type into the node.
    #[instrument(skip(self, text), fields(element = %self.descriptor.name))]
    pub async fn send_keys(&self, text: &str) -> Result<(), ElementError> {
        let element = self;
        self.wait(&self.describe("to accept input"), move || async move {
            element
                .with_node(|node| async move {
                    element
                        .browser()
                        .send_keys(&node, text)
                        .await
                        .map(Probe::Ready)
                })
                .await
        })
        .await
    }

    pub async fn clear(&self) -> Result<(), ElementError> {
        let element = self;
        self.wait(&self.describe("to be cleared"), move || async move {
            element
                .with_node(|node| async move { element.browser().clear(&node).await.map(Probe::Ready) })
                .await
        })
        .await
    }

    /// True once the node is found and visible; false if that does not
    /// happen within the default timeout.
    pub async fn is_displayed(&self) -> Result<bool, ElementError> {
        self.is_displayed_with(self.wait_options()).await
    }

    pub async fn is_displayed_with(&self, options: WaitOptions) -> Result<bool, ElementError> {
        let element = self;
        let outcome = Waiter::new(options)
            .until(&self.describe("to be displayed"), move || async move {
                element
                    .with_node(|node| element.visibility(node))
                    .await
            })
            .await;
        self.settle(outcome)
    }

    /// True once the node is hidden or gone; false if it is still visible
    /// after the default timeout.
    pub async fn is_invisible(&self) -> Result<bool, ElementError> {
        self.is_invisible_with(self.wait_options()).await
    }

    pub async fn is_invisible_with(&self, options: WaitOptions) -> Result<bool, ElementError> {
        let element = self;
        let outcome = Waiter::new(options)
            .until(&self.describe("to be invisible"), move || async move {
                let visible = element
                    .with_node(|node| async move { element.browser().is_visible(&node).await })
                    .await;
                match visible {
                    Ok(true) => Ok(Probe::observed(VISIBLE)),
                    Ok(false) => Ok(Probe::Ready(())),
                    Err(BrowserError::NoSuchNode { .. } | BrowserError::StaleNode { .. }) => {
                        Ok(Probe::Ready(()))
                    }
                    Err(e) => Err(e),
                }
            })
            .await;
        self.settle(outcome)
    }

    /// True once the node is enabled; false if it stays disabled or absent
    /// for the default timeout.
    pub async fn is_enabled(&self) -> Result<bool, ElementError> {
        self.wait_for_enabled_state(true).await
    }

    /// True once the node is disabled; false if it stays enabled or absent
    /// for the default timeout.
    pub async fn is_disabled(&self) -> Result<bool, ElementError> {
        self.wait_for_enabled_state(false).await
    }

    async fn wait_for_enabled_state(&self, wanted: bool) -> Result<bool, ElementError> {
        let element = self;
        let description = if wanted {
            self.describe("to be enabled")
        } else {
            self.describe("to be disabled")
        };
        let outcome = Waiter::new(self.wait_options())
            .until(&description, move || async move {
                element
                    .with_node(|node| element.enabled_state(node, wanted))
                    .await
            })
            .await;
        self.settle(outcome)
    }

    /// Whether the node is selected (checked) right now.
    pub async fn is_selected(&self) -> Result<bool, ElementError> {
        let element = self;
        self.wait(&self.describe("selection state"), move || async move {
            element
                .with_node(|node| async move {
                    element.browser().is_selected(&node).await.map(Probe::Ready)
                })
                .await
        })
        .await
    }

    /// Wait until the node's text contains `expected` (or, with
    /// `present == false`, no longer contains it). False on timeout.
    pub async fn wait_for_text(&self, expected: &str, present: bool) -> Result<bool, ElementError> {
        let element = self;
        let description = if present {
            self.describe(&format!("to contain '{}'", expected))
        } else {
            self.describe(&format!("to stop containing '{}'", expected))
        };
        let outcome = Waiter::new(self.wait_options())
            .until(&description, move || async move {
                element
                    .with_node(|node| element.text_state(node, expected, present))
                    .await
            })
            .await;
        self.settle(outcome)
    }

    async fn click_when_ready(&self, node: NodeHandle) -> BrowserResult<Probe<()>> {
        if !self.browser.is_visible(&node).await? {
            return Ok(Probe::observed(HIDDEN));
        }
        if !self.browser.is_enabled(&node).await? {
            return Ok(Probe::observed(DISABLED));
        }
        self.browser.click(&node).await?;
        Ok(Probe::Ready(()))
    }

    async fn visibility(&self, node: NodeHandle) -> BrowserResult<Probe<()>> {
        Ok(if self.browser.is_visible(&node).await? {
            Probe::Ready(())
        } else {
            Probe::observed(HIDDEN)
        })
    }

    async fn enabled_state(&self, node: NodeHandle, wanted: bool) -> BrowserResult<Probe<()>> {
        let enabled = self.browser.is_enabled(&node).await?;
        Ok(if enabled == wanted {
            Probe::Ready(())
        } else if enabled {
            Probe::observed(ENABLED)
        } else {
            Probe::observed(DISABLED)
        })
    }

    async fn text_state(
        &self,
        node: NodeHandle,
        expected: &str,
        present: bool,
    ) -> BrowserResult<Probe<()>> {
        let text = self.browser.text(&node).await?;
        Ok(if text.contains(expected) == present {
            Probe::Ready(())
        } else {
            Probe::Pending(Some(text))
        })
    }

    /// Run a probe against the node, finding it first if needed. A transient
    /// failure forgets the remembered node so the next poll finds it again.
    pub(crate) async fn with_node<T, F, Fut>(&self, action: F) -> BrowserResult<T>
    where
        F: FnOnce(NodeHandle) -> Fut,
        Fut: Future<Output = BrowserResult<T>>,
    {
        let node = self.find_once().await?;
        let result = action(node).await;
        if let Err(e) = &result {
            if e.is_transient() {
                trace!("Forgetting node of {}: {}", self.name(), e);
                self.forget_node();
            }
        }
        result
    }

    /// Like [`Self::find_once`], but a remembered node is checked against
    /// the page first. One that is stale or gone is forgotten and the
    /// selectors are searched again.
    async fn find_attached(&self) -> BrowserResult<NodeHandle> {
        if let Some(node) = self.cached_node() {
            match self.browser.is_visible(&node).await {
                Ok(_) => return Ok(node),
                Err(e) if e.is_transient() => {
                    trace!("Remembered node of {} is gone: {}", self.name(), e);
                    self.forget_node();
                }
                Err(e) => return Err(e),
            }
        }
        self.find_once().await
    }

    /// One pass over the selectors, preferring the remembered node.
    async fn find_once(&self) -> BrowserResult<NodeHandle> {
        if let Some(node) = self.cached_node() {
            return Ok(node);
        }

        let mut last_error = None;
        for selector in &self.descriptor.selectors {
            match self.browser.find_node(selector).await {
                Ok(node) => {
                    trace!("Found {} using {}", self.name(), selector);
                    *self.node.lock().unwrap_or_else(PoisonError::into_inner) = Some(node.clone());
                    return Ok(node);
                }
                Err(e) if e.is_transient() => {
                    trace!("{} not found using {}: {}", self.name(), selector, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| BrowserError::NoSuchNode {
            selector: self.name().to_string(),
        }))
    }

    fn cached_node(&self) -> Option<NodeHandle> {
        self.node
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn forget_node(&self) {
        *self.node.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Wait with the default options and map the failure to an element
    /// error.
    pub(crate) async fn wait<T, F, Fut>(&self, description: &str, probe: F) -> Result<T, ElementError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = BrowserResult<Probe<T>>>,
    {
        Waiter::new(self.wait_options())
            .until(description, probe)
            .await
            .map_err(|e| self.wait_failure(e))
    }

    /// Timeouts become `false`; everything else is an error.
    fn settle(&self, outcome: Result<(), WaitError<BrowserError>>) -> Result<bool, ElementError> {
        match outcome {
            Ok(()) => Ok(true),
            Err(WaitError::TimedOut { .. }) => Ok(false),
            Err(e) => Err(self.wait_failure(e)),
        }
    }

    pub(crate) fn describe(&self, what: &str) -> String {
        format!("{} {}", self.name(), what)
    }

    pub(crate) fn wait_failure(&self, error: WaitError<BrowserError>) -> ElementError {
        let element = self.name().to_string();
        match error {
            WaitError::TimedOut {
                timeout,
                attempts,
                last_observation,
                last_error,
                ..
            } => match (last_observation, last_error) {
                (Some(observation), _) if observation == HIDDEN => ElementError::NotVisible {
                    element,
                    timeout,
                    attempts,
                },
                (Some(observation), _) => ElementError::NotInteractable {
                    element,
                    timeout,
                    attempts,
                    reason: observation,
                },
                (None, Some(BrowserError::NotInteractable { reason })) => {
                    ElementError::NotInteractable {
                        element,
                        timeout,
                        attempts,
                        reason,
                    }
                }
                (None, last_error) => ElementError::NotFound {
                    element,
                    timeout,
                    attempts,
                    last_error: last_error.map(|e| e.to_string()),
                },
            },
            WaitError::Failed {
                error: BrowserError::InvalidSelector { selector, reason },
                ..
            } => ElementError::MalformedSelector {
                element,
                selector,
                reason,
            },
            WaitError::Failed { error, .. } => ElementError::Browser {
                element,
                source: error,
            },
            WaitError::Cancelled { .. } => ElementError::Cancelled { element },
        }
    }

    fn require(&self, expected: ElementKind) -> Result<(), ElementError> {
        if self.kind() == expected {
            Ok(())
        } else {
            Err(ElementError::TypeMismatch {
                element: self.name().to_string(),
                expected,
                actual: self.kind(),
            })
        }
    }

    pub fn as_textbox(&self) -> Result<crate::views::Textbox<'_>, ElementError> {
        self.require(ElementKind::Textbox)?;
        Ok(crate::views::Textbox::new(self))
    }

    pub fn as_checkbox(&self) -> Result<crate::views::Checkbox<'_>, ElementError> {
        self.require(ElementKind::Checkbox)?;
        Ok(crate::views::Checkbox::new(self))
    }

    pub fn as_radiobutton(&self) -> Result<crate::views::Radiobutton<'_>, ElementError> {
        self.require(ElementKind::Radiobutton)?;
        Ok(crate::views::Radiobutton::new(self))
    }

    pub fn as_selectable(&self) -> Result<crate::views::SelectList<'_>, ElementError> {
        self.require(ElementKind::Select)?;
        Ok(crate::views::SelectList::new(self))
    }

    pub fn as_table(&self) -> Result<crate::views::Table<'_>, ElementError> {
        self.require(ElementKind::Table)?;
        Ok(crate::views::Table::new(self))
    }
}
