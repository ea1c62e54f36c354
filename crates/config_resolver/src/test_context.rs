//! Explicit per-suite configuration context.
//!
//! A [`TestContext`] owns everything configuration-related that one test
//! run shares: the settings store (and with it the active environment), the
//! document cache behind the resolver, and the default wait timing. It is
//! passed explicitly (usually as `Arc<TestContext>`) to pages and element
//! registries instead of living in global state.
//!
//! # Examples
//!
//! ```
//! use config_resolver::{
//!     ConfigStore, DocumentFormat, DocumentName, InMemoryDocumentSource, TestContext,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> config_resolver::ConfigurationResult<()> {
//! let source = InMemoryDocumentSource::new().with_document(
//!     "LoginPage",
//!     "urls:\n  default: http://{env}.myapp.com\n",
//!     DocumentFormat::Yaml,
//! );
//! let context = TestContext::new(ConfigStore::default(), Arc::new(source))?;
//! context.set_environment("qa");
//!
//! let url = context.url(&DocumentName::try_new("LoginPage")?).await?;
//! assert_eq!(url.value, "http://qa.myapp.com");
//! # Ok(())
//! # }
//! ```

use crate::config_store::ConfigStore;
use crate::document::SettingsDocument;
use crate::document_loader::DocumentLoader;
use crate::document_source::{DocumentSource, FileSystemDocumentSource};
use crate::resolver::{ConfigKey, ConfigResolver, ResolvedValue};
use crate::timeouts::Timeouts;
use crate::{ConfigurationError, ConfigurationResult, DocumentName};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

#[cfg(test)]
#[path = "test_context_tests.rs"]
mod tests;

/// Default location of the settings document, relative to the working
/// directory.
pub const DEFAULT_SETTINGS_PATH: &str = "conf/sentinel.yml";

/// Configuration shared by one test run.
#[derive(Debug)]
pub struct TestContext {
    store: ConfigStore,
    resolver: ConfigResolver,
    timeouts: RwLock<Timeouts>,
}

impl TestContext {
    /// Create a context over a store and a document source.
    ///
    /// # Errors
    ///
    /// `ConfigurationError::InvalidValue` if the store holds unusable timing
    /// settings.
    pub fn new(store: ConfigStore, source: Arc<dyn DocumentSource>) -> ConfigurationResult<Self> {
        let timeouts = Timeouts::from_store(&store)?;
        let resolver = ConfigResolver::new(Arc::new(DocumentLoader::new(source)));
        Ok(Self {
            store,
            resolver,
            timeouts: RwLock::new(timeouts),
        })
    }

    /// Create a context reading settings from `settings_path` and documents
    /// from the given roots, with `PAGEWRIGHT_*` overrides from the process
    /// environment.
    ///
    /// A missing settings document is not an error; every setting then comes
    /// from overrides or defaults.
    pub fn from_filesystem<P: Into<PathBuf>>(
        settings_path: &Path,
        roots: impl IntoIterator<Item = P>,
    ) -> ConfigurationResult<Self> {
        let settings = match SettingsDocument::from_path(settings_path) {
            Ok(settings) => {
                info!("Loaded settings from {}", settings_path.display());
                settings
            }
            Err(ConfigurationError::DocumentNotFound { .. }) => {
                warn!(
                    "Settings document {} not found, using overrides and defaults",
                    settings_path.display()
                );
                SettingsDocument::default()
            }
            Err(e) => return Err(e),
        };

        Self::new(
            ConfigStore::new(settings),
            Arc::new(FileSystemDocumentSource::new(roots)),
        )
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    pub fn environment(&self) -> String {
        self.store.environment()
    }

    pub fn set_environment(&self, environment: &str) {
        self.store.set_environment(environment);
    }

    /// Current default wait timing.
    pub fn timeouts(&self) -> Timeouts {
        *self.timeouts.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the default wait timing for subsequent waits.
    pub fn set_timeouts(&self, timeouts: Timeouts) {
        *self.timeouts.write().unwrap_or_else(PoisonError::into_inner) = timeouts;
    }

    /// Re-read timing from the store, for example after `update("timeout", ..)`.
    pub fn reload_timeouts(&self) -> ConfigurationResult<Timeouts> {
        let timeouts = Timeouts::from_store(&self.store)?;
        self.set_timeouts(timeouts);
        Ok(timeouts)
    }

    /// Resolve a key for the active environment.
    pub async fn resolve(
        &self,
        key: &ConfigKey,
        document: &DocumentName,
    ) -> ConfigurationResult<ResolvedValue> {
        self.resolver
            .resolve(&self.environment(), key, document)
            .await
    }

    /// URL of a page in the active environment.
    pub async fn url(&self, page: &DocumentName) -> ConfigurationResult<ResolvedValue> {
        self.resolve(&ConfigKey::Url, page).await
    }

    /// Executable of a desktop page object in the active environment.
    pub async fn executable(&self, page: &DocumentName) -> ConfigurationResult<ResolvedValue> {
        self.resolve(&ConfigKey::Executable, page).await
    }

    /// One field of an account in the active environment.
    pub async fn account_field(
        &self,
        page: &DocumentName,
        account: &str,
        field: &str,
    ) -> ConfigurationResult<ResolvedValue> {
        self.resolve(&ConfigKey::account(account, field), page).await
    }

    /// One field of a test data object in the active environment.
    pub async fn test_data(
        &self,
        page: &DocumentName,
        object: &str,
        field: &str,
    ) -> ConfigurationResult<ResolvedValue> {
        self.resolve(&ConfigKey::test_data(object, field), page).await
    }
}
