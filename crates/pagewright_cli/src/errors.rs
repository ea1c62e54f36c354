use config_resolver::ConfigurationError;
use pagewright_core::ElementError;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors reported by the `pagewright` command.
#[derive(Error, Debug)]
pub enum Error {
    /// A document could not be found, loaded or resolved.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// An element definition could not be turned into a usable handle.
    #[error("Element error: {0}")]
    Element(#[from] ElementError),

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    /// `check` found documents that cannot be used.
    #[error("{failed} of {checked} documents failed validation")]
    CheckFailed { failed: usize, checked: usize },
}

impl Error {
    /// Process exit code for this error.
    ///
    /// Validation failures exit with 1, everything else with 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CheckFailed { .. } => 1,
            _ => 2,
        }
    }
}
