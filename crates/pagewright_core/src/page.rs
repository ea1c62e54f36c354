//! Pages: a configuration document, its elements and its navigation.

use crate::browser::{Browser, BrowserError};
use crate::element::Element;
use crate::element_types::ElementTypeRegistry;
use crate::errors::{HarnessResult, PageError};
use crate::registry::ElementRegistry;
use crate::synchronization::{Probe, WaitError, WaitOptions, Waiter};
use config_resolver::{DocumentName, PageObjectType, ResolvedFields, TestContext};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

#[cfg(test)]
#[path = "page_tests.rs"]
mod tests;

const READY_STATE_COMPLETE: &str = "complete";

/// One page object and the handles of its elements.
///
/// Every element handle and wait created through the page shares the
/// page's cancellation token, so [`Page::close`] aborts them all.
pub struct Page {
    name: DocumentName,
    context: Arc<TestContext>,
    browser: Arc<dyn Browser>,
    registry: ElementRegistry,
    cancel: CancellationToken,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Page {
    pub fn new(
        name: DocumentName,
        context: Arc<TestContext>,
        browser: Arc<dyn Browser>,
        types: Arc<ElementTypeRegistry>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let registry = ElementRegistry::new(
            name.clone(),
            Arc::clone(&context),
            Arc::clone(&browser),
            types,
            cancel.clone(),
        );
        Self {
            name,
            context,
            browser,
            registry,
            cancel,
        }
    }

    pub fn name(&self) -> &DocumentName {
        &self.name
    }

    pub fn context(&self) -> &Arc<TestContext> {
        &self.context
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Cancel every wait running on this page.
    pub fn close(&self) {
        debug!("Closing page {}", self.name);
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Handle for a named element. See [`ElementRegistry::get`].
    pub async fn element(&self, name: &str) -> HarnessResult<Arc<Element>> {
        self.registry.get(name).await
    }

    pub async fn page_object_type(&self) -> HarnessResult<PageObjectType> {
        let document = self.context.resolver().document(&self.name).await?;
        Ok(document.page_object_type())
    }

    /// URL of the page in the active environment.
    pub async fn url(&self) -> HarnessResult<String> {
        Ok(self.context.url(&self.name).await?.value)
    }

    /// A whole account for the active environment.
    pub async fn account(&self, account: &str) -> HarnessResult<ResolvedFields> {
        Ok(self
            .context
            .resolver()
            .resolve_account(&self.context.environment(), account, &self.name)
            .await?)
    }

    pub async fn account_field(&self, account: &str, field: &str) -> HarnessResult<String> {
        Ok(self
            .context
            .account_field(&self.name, account, field)
            .await?
            .value)
    }

    pub async fn test_data(&self, object: &str, field: &str) -> HarnessResult<String> {
        Ok(self.context.test_data(&self.name, object, field).await?.value)
    }

    /// Navigate to the page and wait for it to load.
    ///
    /// `arguments` is appended to the page URL as is, for example
    /// `"?id=42"`. Pages that are not web pages are not navigated.
    #[instrument(skip(self), fields(page = %self.name))]
    pub async fn open(&self, arguments: Option<&str>) -> HarnessResult<()> {
        if self.page_object_type().await? == PageObjectType::Executable {
            info!("{} is not a web page, nothing to navigate to", self.name);
            return Ok(());
        }

        let url = format!("{}{}", self.url().await?, arguments.unwrap_or_default());
        info!("Opening {} at {}", self.name, url);
        self.browser
            .navigate(&url)
            .await
            .map_err(|e| self.browser_failure(e))?;
        self.wait_for_load().await
    }

    /// Wait until the document's ready state is `complete`.
    pub async fn wait_for_load(&self) -> HarnessResult<()> {
        let options = WaitOptions::from_timeouts(&self.context.timeouts())
            .with_cancellation(self.cancel.clone());
        let browser = self.browser.as_ref();
        let description = format!("{} to load", self.name);

        Waiter::new(options)
            .until(&description, move || async move {
                browser.ready_state().await.map(|state| {
                    if state == READY_STATE_COMPLETE {
                        Probe::Ready(())
                    } else {
                        Probe::Pending(Some(state))
                    }
                })
            })
            .await
            .map_err(|e| match e {
                WaitError::TimedOut {
                    timeout,
                    last_observation,
                    ..
                } => PageError::LoadTimeout {
                    page: self.name.to_string(),
                    timeout,
                    last_state: last_observation,
                },
                WaitError::Failed { error, .. } => self.browser_failure(error),
                WaitError::Cancelled { .. } => PageError::Cancelled {
                    page: self.name.to_string(),
                },
            })?;
        debug!("{} loaded", self.name);
        Ok(())
    }

    pub(crate) fn browser_failure(&self, error: BrowserError) -> PageError {
        PageError::Browser {
            page: self.name.to_string(),
            source: error,
        }
    }
}
