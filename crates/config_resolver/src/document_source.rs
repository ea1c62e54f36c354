//! Sources of configuration documents.
//!
//! The [`DocumentSource`] trait abstracts where documents come from so the
//! loader and resolver can be exercised against in-memory documents. The
//! production implementation, [`FileSystemDocumentSource`], searches a list of
//! root directories recursively for `<name>.yml`, `<name>.yaml` or
//! `<name>.toml`. Filesystem work runs on tokio's blocking pool.

use crate::document::{parse_document, ConfigDocument, DocumentFormat};
use crate::{ConfigurationError, ConfigurationResult, DocumentName};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

#[cfg(test)]
#[path = "document_source_tests.rs"]
mod tests;

/// Interface for obtaining parsed configuration documents by name.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Load and parse the named document.
    ///
    /// # Errors
    ///
    /// * `ConfigurationError::DocumentNotFound` - no document with that name exists
    /// * `ConfigurationError::AccessDenied` - a search location could not be read
    /// * `ConfigurationError::ParseError` - the document is not valid YAML/TOML
    /// * `ConfigurationError::InvalidDocument` - the document violates structural rules
    async fn load_document(&self, name: &DocumentName) -> ConfigurationResult<ConfigDocument>;

    /// Check whether a document with the given name exists.
    ///
    /// Returns errors only for access failures, not for missing documents.
    async fn document_exists(&self, name: &DocumentName) -> ConfigurationResult<bool>;
}

/// Document source backed by directories on the local filesystem.
///
/// Roots are searched in order and the first root holding the document wins.
/// A file matches when its name is exactly `<document name>.<extension>` for
/// one of [`DocumentFormat::EXTENSIONS`]. Within a root the earliest
/// extension in that list wins, then the first file in walk order (file name
/// order, recursively). Roots that do not exist are skipped.
#[derive(Debug, Clone)]
pub struct FileSystemDocumentSource {
    roots: Vec<PathBuf>,
}

impl FileSystemDocumentSource {
    /// Create a source searching the given root directories.
    pub fn new<P: Into<PathBuf>>(roots: impl IntoIterator<Item = P>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// The configured search roots.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Find the file holding the named document.
    ///
    /// # Errors
    ///
    /// * `ConfigurationError::DocumentNotFound` - no root contains the document
    /// * `ConfigurationError::AccessDenied` - a directory could not be read
    pub fn locate(&self, name: &DocumentName) -> ConfigurationResult<PathBuf> {
        let candidates: Vec<String> = DocumentFormat::EXTENSIONS
            .iter()
            .map(|ext| format!("{}.{}", name, ext))
            .collect();

        for root in &self.roots {
            if !root.exists() {
                trace!("Skipping missing document root {}", root.display());
                continue;
            }

            let mut best: Option<(usize, PathBuf)> = None;
            for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
                let entry = entry.map_err(|e| walk_error(name.as_str(), e))?;
                if !entry.file_type().is_file() {
                    continue;
                }

                let file_name = entry.file_name().to_string_lossy();
                let Some(rank) = candidates.iter().position(|candidate| *candidate == file_name) else {
                    continue;
                };
                if best.as_ref().is_none_or(|(best_rank, _)| rank < *best_rank) {
                    best = Some((rank, entry.into_path()));
                }
                if rank == 0 {
                    break;
                }
            }

            if let Some((_, path)) = best {
                debug!("Located document '{}' at {}", name, path.display());
                return Ok(path);
            }
        }

        Err(ConfigurationError::DocumentNotFound {
            document: name.to_string(),
            searched: self.searched(),
        })
    }

    /// Names of every document found under the roots, sorted.
    ///
    /// Files whose stem is not a valid document name are skipped.
    pub fn list_documents(&self) -> ConfigurationResult<Vec<DocumentName>> {
        let mut names = BTreeSet::new();

        for root in &self.roots {
            if !root.exists() {
                continue;
            }

            for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
                let entry = entry.map_err(|e| walk_error(&root.display().to_string(), e))?;
                if !entry.file_type().is_file() || DocumentFormat::from_path(entry.path()).is_none() {
                    continue;
                }

                let stem = entry
                    .path()
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                match DocumentName::try_new(stem.as_str()) {
                    Ok(name) => {
                        names.insert(name);
                    }
                    Err(_) => trace!("Ignoring file {}", entry.path().display()),
                }
            }
        }

        Ok(names.into_iter().collect())
    }

    fn load_blocking(&self, name: &DocumentName) -> ConfigurationResult<ConfigDocument> {
        let path = self.locate(name)?;
        let text = read_document(name, &path)?;
        let format = DocumentFormat::from_path(&path).unwrap_or(DocumentFormat::Yaml);

        parse_document(name, &text, format).map_err(|e| {
            warn!("Document '{}' at {} is invalid: {}", name, path.display(), e);
            e
        })
    }

    fn exists_blocking(&self, name: &DocumentName) -> ConfigurationResult<bool> {
        match self.locate(name) {
            Ok(_) => Ok(true),
            Err(ConfigurationError::DocumentNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Run filesystem work off the async executor.
    async fn run_blocking<T, F>(&self, name: &DocumentName, work: F) -> ConfigurationResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Self, &DocumentName) -> ConfigurationResult<T> + Send + 'static,
    {
        let source = self.clone();
        let owned = name.clone();
        tokio::task::spawn_blocking(move || work(&source, &owned))
            .await
            .map_err(|e| ConfigurationError::ReadFailed {
                document: name.to_string(),
                reason: format!("filesystem task failed: {}", e),
            })?
    }

    fn searched(&self) -> String {
        if self.roots.is_empty() {
            return "no search roots configured".to_string();
        }
        self.roots
            .iter()
            .map(|root| root.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[async_trait]
impl DocumentSource for FileSystemDocumentSource {
    async fn load_document(&self, name: &DocumentName) -> ConfigurationResult<ConfigDocument> {
        self.run_blocking(name, Self::load_blocking).await
    }

    async fn document_exists(&self, name: &DocumentName) -> ConfigurationResult<bool> {
        self.run_blocking(name, Self::exists_blocking).await
    }
}

/// Document source holding document text in memory.
///
/// Useful for embedding documents in a binary and for tests.
///
/// ```
/// use config_resolver::{DocumentFormat, DocumentName, DocumentSource, InMemoryDocumentSource};
///
/// # async fn example() -> config_resolver::ConfigurationResult<()> {
/// let source = InMemoryDocumentSource::new()
///     .with_document("Header", "elements:\n  logo:\n    id: logo\n", DocumentFormat::Yaml);
///
/// let header = source.load_document(&DocumentName::try_new("Header")?).await?;
/// assert!(header.element("logo").is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentSource {
    documents: HashMap<String, (String, DocumentFormat)>,
}

impl InMemoryDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a document.
    pub fn with_document(
        mut self,
        name: impl Into<String>,
        text: impl Into<String>,
        format: DocumentFormat,
    ) -> Self {
        self.insert(name, text, format);
        self
    }

    /// Add (or replace) a document in place.
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>, format: DocumentFormat) {
        self.documents.insert(name.into(), (text.into(), format));
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentSource for InMemoryDocumentSource {
    async fn load_document(&self, name: &DocumentName) -> ConfigurationResult<ConfigDocument> {
        let (text, format) =
            self.documents
                .get(name.as_str())
                .ok_or_else(|| ConfigurationError::DocumentNotFound {
                    document: name.to_string(),
                    searched: "in-memory documents".to_string(),
                })?;
        parse_document(name, text, *format)
    }

    async fn document_exists(&self, name: &DocumentName) -> ConfigurationResult<bool> {
        Ok(self.documents.contains_key(name.as_str()))
    }
}

fn read_document(name: &DocumentName, path: &Path) -> ConfigurationResult<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => ConfigurationError::AccessDenied {
            path: path.display().to_string(),
        },
        _ => ConfigurationError::ReadFailed {
            document: name.to_string(),
            reason: e.to_string(),
        },
    })
}

fn walk_error(document: &str, error: walkdir::Error) -> ConfigurationError {
    let path = error
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    match error.io_error().map(std::io::Error::kind) {
        Some(ErrorKind::PermissionDenied) => ConfigurationError::AccessDenied { path },
        _ => ConfigurationError::ReadFailed {
            document: document.to_string(),
            reason: error.to_string(),
        },
    }
}
