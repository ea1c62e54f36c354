//! Per-page element handle cache.

use crate::browser::Browser;
use crate::descriptor::ElementDescriptor;
use crate::element::Element;
use crate::element_types::ElementTypeRegistry;
use crate::errors::{ElementError, HarnessResult};
use config_resolver::{normalize_key, DocumentName, TestContext};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

/// Element handles of one page.
///
/// Names are normalized before lookup, so `"First Name"`, `"first name"`
/// and `"first_name"` all return the same handle. A handle lives as long
/// as the registry, which lives as long as its page.
pub struct ElementRegistry {
    page: DocumentName,
    context: Arc<TestContext>,
    browser: Arc<dyn Browser>,
    types: Arc<ElementTypeRegistry>,
    cancel: CancellationToken,
    elements: RwLock<HashMap<String, Arc<Element>>>,
}

impl std::fmt::Debug for ElementRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementRegistry")
            .field("page", &self.page)
            .field("cached", &self.cached_count())
            .finish()
    }
}

impl ElementRegistry {
    pub fn new(
        page: DocumentName,
        context: Arc<TestContext>,
        browser: Arc<dyn Browser>,
        types: Arc<ElementTypeRegistry>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            page,
            context,
            browser,
            types,
            cancel,
            elements: RwLock::new(HashMap::new()),
        }
    }

    pub fn page(&self) -> &DocumentName {
        &self.page
    }

    /// Handle for a named element of this page.
    ///
    /// The first request resolves the element through the page's document
    /// and its included parts; later requests return the cached handle.
    ///
    /// # Errors
    ///
    /// - `ElementError::NotFoundInConfiguration` if no document in the
    ///   include closure defines the element
    /// - descriptor errors for unusable selectors or (in strict mode)
    ///   unknown element types
    /// - configuration errors loading the documents
    #[instrument(skip(self), fields(page = %self.page))]
    pub async fn get(&self, name: &str) -> HarnessResult<Arc<Element>> {
        let key = normalize_key(name);

        if let Some(element) = self.cached(&key) {
            return Ok(element);
        }

        let resolved = self
            .context
            .resolver()
            .resolve_element(&self.page, &key)
            .await?
            .ok_or_else(|| {
                warn!("Element '{}' is not defined for {}", key, self.page);
                ElementError::NotFoundInConfiguration {
                    element: key.clone(),
                    document: self.page.to_string(),
                }
            })?;
        let descriptor = ElementDescriptor::from_resolved(&resolved, &self.types)?;
        debug!(
            "Resolved {} as {} from {}",
            key, descriptor.kind, descriptor.document
        );

        let element = Arc::new(Element::new(
            descriptor,
            Arc::clone(&self.browser),
            Arc::clone(&self.context),
            self.cancel.clone(),
        ));

        // Two concurrent first requests keep whichever handle was stored first.
        let mut elements = self.elements.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(elements.entry(key).or_insert(element)))
    }

    /// Whether a handle for `name` has already been created.
    pub fn contains(&self, name: &str) -> bool {
        self.cached(&normalize_key(name)).is_some()
    }

    pub fn cached_count(&self) -> usize {
        self.elements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn cached(&self, key: &str) -> Option<Arc<Element>> {
        self.elements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}
