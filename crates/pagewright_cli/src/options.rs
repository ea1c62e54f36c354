//! Options shared by every `pagewright` command.

use clap::{Args, ValueEnum};
use config_resolver::{
    ConfigurationResult, DocumentName, FileSystemDocumentSource, TestContext,
    DEFAULT_SETTINGS_PATH,
};
use std::path::PathBuf;
use tracing::{debug, info};

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;

/// Default document search root, relative to the working directory.
pub const DEFAULT_PAGES_ROOT: &str = "conf/pages";

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable, coloured output.
    #[default]
    Pretty,
    /// Pretty-printed JSON.
    Json,
}

/// Where configuration comes from and how results are printed.
#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Environment to resolve values for. Defaults to the `env` setting.
    #[arg(long, global = true)]
    pub env: Option<String>,

    /// Directory searched for page documents. May be repeated.
    #[arg(long = "root", global = true, default_value = DEFAULT_PAGES_ROOT)]
    pub roots: Vec<PathBuf>,

    /// Settings document.
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_PATH)]
    pub settings: PathBuf,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

impl GlobalOptions {
    /// A context over the configured settings and roots, switched to the
    /// requested environment.
    pub fn context(&self) -> ConfigurationResult<TestContext> {
        let context = TestContext::from_filesystem(&self.settings, self.roots.iter().cloned())?;
        if let Some(env) = &self.env {
            context.set_environment(env);
        }
        info!(
            "Resolving for the '{}' environment from {} root(s)",
            context.environment(),
            self.roots.len()
        );
        Ok(context)
    }

    /// Every document below the configured roots.
    pub fn list_documents(&self) -> ConfigurationResult<Vec<DocumentName>> {
        let names = FileSystemDocumentSource::new(self.roots.iter().cloned()).list_documents()?;
        debug!("Found {} documents", names.len());
        Ok(names)
    }
}
