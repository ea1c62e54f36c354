//! Tracks the page a test is currently on.

use crate::browser::Browser;
use crate::element::Element;
use crate::element_types::ElementTypeRegistry;
use crate::errors::{HarnessResult, PageError};
use crate::page::Page;
use config_resolver::{DocumentName, TestContext};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, instrument};

/// The current page of one test run.
///
/// Switching to a different page closes the previous one: its element
/// handles are dropped with it and any wait still running on it is
/// cancelled. Switching to the page that is already current keeps it.
pub struct PageManager {
    context: Arc<TestContext>,
    browser: Arc<dyn Browser>,
    types: Arc<ElementTypeRegistry>,
    current: RwLock<Option<Arc<Page>>>,
}

impl std::fmt::Debug for PageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageManager")
            .field("current", &self.current_name())
            .finish()
    }
}

impl PageManager {
    pub fn new(context: Arc<TestContext>, browser: Arc<dyn Browser>) -> Self {
        Self::with_element_types(context, browser, ElementTypeRegistry::new())
    }

    pub fn with_element_types(
        context: Arc<TestContext>,
        browser: Arc<dyn Browser>,
        types: ElementTypeRegistry,
    ) -> Self {
        Self {
            context,
            browser,
            types: Arc::new(types),
            current: RwLock::new(None),
        }
    }

    pub fn context(&self) -> &Arc<TestContext> {
        &self.context
    }

    /// Make a page current without navigating.
    ///
    /// `name` may be a phrase such as `"Login Page"`; whitespace is removed
    /// to form the document name.
    pub fn set_page(&self, name: &str) -> HarnessResult<Arc<Page>> {
        let name = DocumentName::from_phrase(name)?;
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(page) = current.as_ref().filter(|page| *page.name() == name) {
            return Ok(Arc::clone(page));
        }

        let page = Arc::new(Page::new(
            name,
            Arc::clone(&self.context),
            Arc::clone(&self.browser),
            Arc::clone(&self.types),
        ));
        if let Some(previous) = current.replace(Arc::clone(&page)) {
            debug!("Leaving {} for {}", previous.name(), page.name());
            previous.close();
        }
        info!("Current page is {}", page.name());
        Ok(page)
    }

    /// The current page.
    ///
    /// # Errors
    ///
    /// `PageError::NoPageOpened` before any page has been set.
    pub fn current_page(&self) -> HarnessResult<Arc<Page>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| PageError::NoPageOpened.into())
    }

    /// Make a page current and navigate to it.
    #[instrument(skip(self))]
    pub async fn open(&self, name: &str, arguments: Option<&str>) -> HarnessResult<Arc<Page>> {
        let page = self.set_page(name)?;
        page.open(arguments).await?;
        Ok(page)
    }

    /// Element of the current page.
    pub async fn element(&self, name: &str) -> HarnessResult<Arc<Element>> {
        self.current_page()?.element(name).await
    }

    pub async fn current_url(&self) -> HarnessResult<String> {
        let page = self.current_page()?;
        self.browser
            .current_url()
            .await
            .map_err(|e| page.browser_failure(e).into())
    }

    /// Go back in the browser history and wait for the page to load.
    pub async fn navigate_back(&self) -> HarnessResult<()> {
        let page = self.current_page()?;
        self.browser
            .back()
            .await
            .map_err(|e| page.browser_failure(e))?;
        page.wait_for_load().await
    }

    /// Go forward in the browser history and wait for the page to load.
    pub async fn navigate_forward(&self) -> HarnessResult<()> {
        let page = self.current_page()?;
        self.browser
            .forward()
            .await
            .map_err(|e| page.browser_failure(e))?;
        page.wait_for_load().await
    }

    /// Reload the current page and wait for it to load.
    pub async fn refresh(&self) -> HarnessResult<()> {
        let page = self.current_page()?;
        self.browser
            .refresh()
            .await
            .map_err(|e| page.browser_failure(e))?;
        page.wait_for_load().await
    }

    /// Close the current page, cancelling its waits.
    pub fn close(&self) {
        if let Some(page) = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            page.close();
        }
    }

    fn current_name(&self) -> Option<DocumentName> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|page| page.name().clone())
    }
}
