//! Environment cascade resolution across documents and their includes.
//!
//! Every lookup follows the same order:
//!
//! 1. the requested environment's section of the document
//! 2. the `default` section of the document
//! 3. each included part, depth-first in declared order, applying 1-2
//!
//! The first document that satisfies the lookup wins. A part reachable along
//! several include paths is searched once. Returning to a document that is
//! still on the active include path is a cycle and fails with
//! `ConfigurationError::InvalidDocument`.

use crate::document::{
    ConfigDocument, ElementAttributes, FieldMap, BASE_URL_KEY, DEFAULT_ENVIRONMENT,
    ENVIRONMENT_PLACEHOLDER,
};
use crate::document_loader::DocumentLoader;
use crate::keys::normalize_key;
use crate::{ConfigurationError, ConfigurationResult, DocumentName};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;

/// What to resolve from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigKey {
    /// The document's URL.
    Url,
    /// The document's executable path.
    Executable,
    /// One field of a named account.
    Account { account: String, field: String },
    /// One field of a named test data object.
    TestData { object: String, field: String },
}

impl ConfigKey {
    pub fn account(account: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Account {
            account: account.into(),
            field: field.into(),
        }
    }

    pub fn test_data(object: impl Into<String>, field: impl Into<String>) -> Self {
        Self::TestData {
            object: object.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url => write!(f, "url"),
            Self::Executable => write!(f, "executable"),
            Self::Account { account, field } => write!(f, "accounts.{}.{}", account, field),
            Self::TestData { object, field } => write!(f, "testdata.{}.{}", object, field),
        }
    }
}

/// A resolved scalar together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    /// The resolved value, with `{env}` substituted where applicable.
    pub value: String,
    /// The document that satisfied the lookup.
    pub document: DocumentName,
    /// The section that satisfied it: the requested environment, `default`,
    /// or `base` for base URLs.
    pub environment: String,
}

impl ResolvedValue {
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A whole account or test data object, selected wholesale from one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFields {
    pub fields: FieldMap,
    pub document: DocumentName,
    pub environment: String,
}

/// An element definition and the document that declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedElement {
    /// Normalized element name.
    pub name: String,
    pub attributes: ElementAttributes,
    pub document: DocumentName,
}

/// Resolves values through the environment cascade and document includes.
///
/// Documents are obtained through a shared [`DocumentLoader`], so each
/// document is parsed once no matter how many lookups or including documents
/// reference it.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    loader: Arc<DocumentLoader>,
}

impl ConfigResolver {
    pub fn new(loader: Arc<DocumentLoader>) -> Self {
        Self { loader }
    }

    /// The loader backing this resolver.
    pub fn loader(&self) -> &Arc<DocumentLoader> {
        &self.loader
    }

    /// Load one document without resolving anything.
    pub async fn document(&self, name: &DocumentName) -> ConfigurationResult<Arc<ConfigDocument>> {
        self.loader.load(name).await
    }

    /// Resolve any [`ConfigKey`] for an environment.
    ///
    /// # Errors
    ///
    /// * `ConfigurationError::NotFound` - no document in the include closure
    ///   satisfies the key
    /// * `ConfigurationError::AccountNotFound` - for accounts, no document
    ///   declares the account for the environment or default
    /// * `ConfigurationError::MalformedUrl` - for URLs, the resolved value does
    ///   not parse
    /// * document errors from loading the closure, including include cycles
    pub async fn resolve(
        &self,
        environment: &str,
        key: &ConfigKey,
        document: &DocumentName,
    ) -> ConfigurationResult<ResolvedValue> {
        match key {
            ConfigKey::Url => self.resolve_url(environment, document).await,
            ConfigKey::Executable => self.resolve_executable(environment, document).await,
            ConfigKey::Account { account, field } => {
                let account_fields = self.resolve_account(environment, account, document).await?;
                field_of(account_fields, key, field, environment)
            }
            ConfigKey::TestData { object, field } => {
                let object_fields = self.resolve_test_data(environment, object, document).await?;
                field_of(object_fields, key, field, environment)
            }
        }
    }

    /// Resolve the URL of a page.
    ///
    /// Per document: the environment's URL, else the `default` URL, else the
    /// `base` URL; `{env}` in the latter two is replaced with the
    /// environment. The result must be an absolute URL.
    #[instrument(skip(self), fields(document = %document))]
    pub async fn resolve_url(
        &self,
        environment: &str,
        document: &DocumentName,
    ) -> ConfigurationResult<ResolvedValue> {
        let found = self
            .search(document, |doc| {
                Ok(lookup_with_fallback(environment, |key| doc.url(key), true)
                    .map(|(value, section)| resolved(value, doc, section)))
            })
            .await?;

        let resolved = found.ok_or_else(|| not_found(document, &ConfigKey::Url, environment))?;

        url::Url::parse(&resolved.value).map_err(|e| {
            warn!("Resolved URL '{}' is malformed: {}", resolved.value, e);
            ConfigurationError::MalformedUrl {
                document: resolved.document.to_string(),
                environment: environment.to_string(),
                url: resolved.value.clone(),
                reason: e.to_string(),
            }
        })?;

        debug!(
            "Resolved URL '{}' from {} ({})",
            resolved.value, resolved.document, resolved.environment
        );
        Ok(resolved)
    }

    /// Resolve the executable path of a desktop page object.
    #[instrument(skip(self), fields(document = %document))]
    pub async fn resolve_executable(
        &self,
        environment: &str,
        document: &DocumentName,
    ) -> ConfigurationResult<ResolvedValue> {
        let found = self
            .search(document, |doc| {
                Ok(lookup_with_fallback(environment, |key| doc.executable(key), false)
                    .map(|(value, section)| resolved(value, doc, section)))
            })
            .await?;

        found.ok_or_else(|| not_found(document, &ConfigKey::Executable, environment))
    }

    /// Resolve a whole account.
    ///
    /// The account is taken wholesale from the environment's section, or
    /// from `default` if the environment does not declare it. Fields are never
    /// merged across sections.
    #[instrument(skip(self), fields(document = %document))]
    pub async fn resolve_account(
        &self,
        environment: &str,
        account: &str,
        document: &DocumentName,
    ) -> ConfigurationResult<ResolvedFields> {
        let found = self
            .search(document, |doc| {
                Ok(section_fallback(environment, |section| doc.account(section, account))
                    .map(|(fields, section)| fields_of(fields, doc, section)))
            })
            .await?;

        found.ok_or_else(|| ConfigurationError::AccountNotFound {
            document: document.to_string(),
            account: account.to_string(),
            environment: environment.to_string(),
        })
    }

    /// Resolve a whole test data object. `object` may be a phrase; whitespace
    /// is collapsed to `_`.
    #[instrument(skip(self), fields(document = %document))]
    pub async fn resolve_test_data(
        &self,
        environment: &str,
        object: &str,
        document: &DocumentName,
    ) -> ConfigurationResult<ResolvedFields> {
        let found = self
            .search(document, |doc| {
                Ok(section_fallback(environment, |section| doc.test_data(section, object))
                    .map(|(fields, section)| fields_of(fields, doc, section)))
            })
            .await?;

        found.ok_or_else(|| {
            not_found(
                document,
                &ConfigKey::TestData {
                    object: object.to_string(),
                    field: "*".to_string(),
                },
                environment,
            )
        })
    }

    /// Find an element definition by name in the document or its parts.
    ///
    /// Returns `Ok(None)` when the closure has element definitions but none
    /// with that name.
    ///
    /// # Errors
    ///
    /// * `ConfigurationError::InvalidDocument` - no document in the closure
    ///   has an `elements` section, or the includes form a cycle
    #[instrument(skip(self), fields(document = %document))]
    pub async fn resolve_element(
        &self,
        document: &DocumentName,
        element: &str,
    ) -> ConfigurationResult<Option<ResolvedElement>> {
        let key = normalize_key(element);
        let mut any_elements = false;

        let found = self
            .search(document, |doc| {
                any_elements |= doc.has_elements();
                Ok(doc.element(&key).map(|attributes| ResolvedElement {
                    name: key.clone(),
                    attributes: attributes.clone(),
                    document: doc.name().clone(),
                }))
            })
            .await?;

        if found.is_none() && !any_elements {
            return Err(ConfigurationError::InvalidDocument {
                document: document.to_string(),
                reason: "neither the document nor its includes have an elements section"
                    .to_string(),
            });
        }

        match &found {
            Some(element) => debug!("Resolved element '{}' from {}", key, element.document),
            None => debug!("Element '{}' is not defined", key),
        }
        Ok(found)
    }

    /// Load the whole include closure of a document.
    ///
    /// Returns the documents in search order. Fails on the first missing or
    /// invalid part and on include cycles.
    #[instrument(skip(self), fields(document = %document))]
    pub async fn include_closure(
        &self,
        document: &DocumentName,
    ) -> ConfigurationResult<Vec<DocumentName>> {
        let mut visited = Vec::new();
        self.search::<(), _>(document, |doc| {
            visited.push(doc.name().clone());
            Ok(None)
        })
        .await?;
        Ok(visited)
    }

    /// Depth-first search of a document and its includes.
    ///
    /// `visit` is called once per distinct document in search order until it
    /// yields a value.
    async fn search<T, F>(&self, root: &DocumentName, mut visit: F) -> ConfigurationResult<Option<T>>
    where
        F: FnMut(&ConfigDocument) -> ConfigurationResult<Option<T>>,
    {
        let root_document = self.loader.load(root).await?;
        if let Some(found) = visit(&root_document)? {
            return Ok(Some(found));
        }

        let mut searched: HashSet<DocumentName> = HashSet::from([root.clone()]);
        // Active include path with the index of the next part to visit.
        let mut path: Vec<(Arc<ConfigDocument>, usize)> = vec![(root_document, 0)];

        loop {
            let next_part = {
                let Some((document, next)) = path.last_mut() else {
                    break;
                };
                let part = document.includes().get(*next).cloned();
                if part.is_some() {
                    *next += 1;
                }
                part
            };

            let Some(part) = next_part else {
                path.pop();
                continue;
            };

            if path.iter().any(|(document, _)| *document.name() == part) {
                let cycle = path
                    .iter()
                    .map(|(document, _)| document.name().as_str())
                    .chain(std::iter::once(part.as_str()))
                    .collect::<Vec<_>>()
                    .join(" -> ");
                warn!("Include cycle detected: {}", cycle);
                return Err(ConfigurationError::InvalidDocument {
                    document: root.to_string(),
                    reason: format!("include cycle: {}", cycle),
                });
            }

            if !searched.insert(part.clone()) {
                trace!("Part '{}' already searched", part);
                continue;
            }

            trace!("Searching part '{}'", part);
            let part_document = self.loader.load(&part).await?;
            if let Some(found) = visit(&part_document)? {
                return Ok(Some(found));
            }
            path.push((part_document, 0));
        }

        Ok(None)
    }
}

/// Environment, then `default` (with `{env}` substituted), then optionally
/// `base` (with `{env}` substituted). Returns the value and its section.
fn lookup_with_fallback<'a>(
    environment: &str,
    lookup: impl Fn(&str) -> Option<&'a str>,
    allow_base: bool,
) -> Option<(String, String)> {
    if let Some(value) = lookup(environment) {
        return Some((value.to_string(), environment.to_string()));
    }
    if let Some(value) = lookup(DEFAULT_ENVIRONMENT) {
        return Some((
            substitute_environment(value, environment),
            DEFAULT_ENVIRONMENT.to_string(),
        ));
    }
    if allow_base {
        if let Some(value) = lookup(BASE_URL_KEY) {
            return Some((
                substitute_environment(value, environment),
                BASE_URL_KEY.to_string(),
            ));
        }
    }
    None
}

fn section_fallback<'a, T>(
    environment: &str,
    lookup: impl Fn(&str) -> Option<&'a T>,
) -> Option<(&'a T, String)> {
    lookup(environment)
        .map(|found| (found, environment.to_string()))
        .or_else(|| {
            lookup(DEFAULT_ENVIRONMENT).map(|found| (found, DEFAULT_ENVIRONMENT.to_string()))
        })
}

/// Replaces every `{env}` placeholder with the environment name.
///
/// ```
/// use config_resolver::substitute_environment;
///
/// assert_eq!(substitute_environment("http://{env}.myapp.com", "qa"), "http://qa.myapp.com");
/// ```
pub fn substitute_environment(value: &str, environment: &str) -> String {
    value.replace(ENVIRONMENT_PLACEHOLDER, environment)
}

fn resolved(value: String, doc: &ConfigDocument, section: String) -> ResolvedValue {
    ResolvedValue {
        value,
        document: doc.name().clone(),
        environment: section,
    }
}

fn fields_of(fields: &FieldMap, doc: &ConfigDocument, section: String) -> ResolvedFields {
    ResolvedFields {
        fields: fields.clone(),
        document: doc.name().clone(),
        environment: section,
    }
}

// A missing field inside a matched object never falls back to another section.
fn field_of(
    resolved: ResolvedFields,
    key: &ConfigKey,
    field: &str,
    environment: &str,
) -> ConfigurationResult<ResolvedValue> {
    match resolved.fields.get(field) {
        Some(value) => Ok(ResolvedValue {
            value: value.clone(),
            document: resolved.document,
            environment: resolved.environment,
        }),
        None => Err(ConfigurationError::NotFound {
            document: resolved.document.to_string(),
            key: key.to_string(),
            environment: environment.to_string(),
        }),
    }
}

fn not_found(document: &DocumentName, key: &ConfigKey, environment: &str) -> ConfigurationError {
    ConfigurationError::NotFound {
        document: document.to_string(),
        key: key.to_string(),
        environment: environment.to_string(),
    }
}
