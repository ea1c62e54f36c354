//! Configuration cascade resolution for Pagewright.
//!
//! This crate turns a tree of per-page configuration documents and a global
//! settings document into values for the active environment:
//!
//! - [`ConfigDocument`] / [`parse_document`]: one page, API or database
//!   object, parsed from YAML or TOML
//! - [`DocumentSource`] / [`DocumentLoader`]: where documents come from and
//!   how they are cached
//! - [`ConfigResolver`]: environment → `default` fallback across a document
//!   and its included parts
//! - [`ConfigStore`] / [`Timeouts`]: layered settings and wait timing
//! - [`TestContext`]: everything above, shared explicitly by one test run

pub mod config_store;
pub mod document;
pub mod document_loader;
pub mod document_name;
pub mod document_source;
pub mod errors;
pub mod keys;
pub mod resolver;
pub mod test_context;
pub mod timeouts;

pub use config_store::{override_variable, ConfigStore, ENVIRONMENT_KEY, OVERRIDE_PREFIX};
pub use document::{
    parse_document, ConfigDocument, DocumentFormat, ElementAttributes, FieldMap, PageObjectType,
    SettingsDocument, DEFAULT_ENVIRONMENT, ELEMENT_TYPE_KEY,
};
pub use document_loader::{CacheStatistics, DocumentLoader};
pub use document_name::DocumentName;
pub use document_source::{DocumentSource, FileSystemDocumentSource, InMemoryDocumentSource};
pub use errors::{ConfigurationError, ConfigurationErrorKind, ConfigurationResult};
pub use keys::normalize_key;
pub use resolver::{
    substitute_environment, ConfigKey, ConfigResolver, ResolvedElement, ResolvedFields,
    ResolvedValue,
};
pub use test_context::{TestContext, DEFAULT_SETTINGS_PATH};
pub use timeouts::{TimeUnit, Timeouts};
