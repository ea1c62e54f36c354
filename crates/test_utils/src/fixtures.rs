//! On-disk configuration trees for tests.

use anyhow::{Context, Result};
use config_resolver::TestContext;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

#[cfg(test)]
#[path = "fixtures_tests.rs"]
mod tests;

/// A temporary `conf/` tree with a settings document and page documents.
///
/// The directory is deleted when the tree is dropped.
#[derive(Debug)]
pub struct DocumentTree {
    root: TempDir,
}

impl DocumentTree {
    pub fn new() -> Result<Self> {
        let root = tempfile::tempdir().context("Failed to create temporary directory")?;
        fs::create_dir_all(root.path().join("conf").join("pages"))
            .context("Failed to create the pages directory")?;
        Ok(Self { root })
    }

    /// Write `conf/sentinel.yml`.
    pub fn with_settings(self, text: &str) -> Result<Self> {
        let path = self.settings_path();
        self.write(&path, text)?;
        Ok(self)
    }

    /// Write a document below `conf/pages`, e.g. `"login/LoginPage.yml"`.
    pub fn with_document(self, relative: &str, text: &str) -> Result<Self> {
        let path = self.pages_root().join(relative);
        self.write(&path, text)?;
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.path().join("conf").join("sentinel.yml")
    }

    pub fn pages_root(&self) -> PathBuf {
        self.root.path().join("conf").join("pages")
    }

    /// A context reading this tree.
    pub fn context(&self) -> Result<TestContext> {
        TestContext::from_filesystem(&self.settings_path(), [self.pages_root()])
            .context("Failed to create a test context over the document tree")
    }

    fn write(&self, path: &Path, text: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote fixture {}", path.display());
        Ok(())
    }
}
