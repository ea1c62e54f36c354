//! Layered key/value store for harness settings.
//!
//! Values are looked up in three layers, first match wins:
//!
//! 1. runtime values set with [`ConfigStore::update`] (or cached by earlier reads)
//! 2. process overrides, `PAGEWRIGHT_<KEY>` environment variables
//! 3. the settings document, the active environment's section then `default`
//!
//! A value read from layer 2 or 3 is copied into the runtime layer, so later
//! reads are stable even if the lower layers change. The runtime layer can be
//! cleared per key or wholesale.
//!
//! The store also keeps a separate table of test values shared between test
//! steps ([`ConfigStore::set_value`]), keyed by normalized phrase.

use crate::document::SettingsDocument;
use crate::keys::normalize_key;
use crate::{ConfigurationError, ConfigurationResult};
use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info, trace, warn};

#[cfg(test)]
#[path = "config_store_tests.rs"]
mod tests;

/// Prefix of process environment variables that override settings.
pub const OVERRIDE_PREFIX: &str = "PAGEWRIGHT_";

/// Key of the active environment.
pub const ENVIRONMENT_KEY: &str = "env";

/// Environment used when none is configured.
pub const DEFAULT_ENVIRONMENT_NAME: &str = "localhost";

pub const BROWSER_KEY: &str = "browser";
pub const DEFAULT_BROWSER: &str = "chrome";
pub const OPERATING_SYSTEM_KEY: &str = "os";

/// Name of the environment variable overriding a setting.
///
/// camelCase words are split with `_`, other separators become `_`, and the
/// result is upper-cased.
///
/// ```
/// use config_resolver::override_variable;
///
/// assert_eq!(override_variable("timeout"), "PAGEWRIGHT_TIMEOUT");
/// assert_eq!(override_variable("longProcessTimeout"), "PAGEWRIGHT_LONG_PROCESS_TIMEOUT");
/// assert_eq!(override_variable("download.dir"), "PAGEWRIGHT_DOWNLOAD_DIR");
/// ```
pub fn override_variable(key: &str) -> String {
    let mut name = String::from(OVERRIDE_PREFIX);
    let mut previous_lower = false;
    for c in key.chars() {
        if c.is_ascii_uppercase() && previous_lower {
            name.push('_');
        }
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_uppercase());
        } else {
            name.push('_');
        }
        previous_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
    }
    name
}

/// Settings store shared by everything in one test context.
///
/// All methods take `&self`; interior state is guarded by `RwLock`s and
/// concurrent writers follow last-writer-wins.
#[derive(Debug, Default)]
pub struct ConfigStore {
    runtime: RwLock<HashMap<String, String>>,
    values: RwLock<HashMap<String, String>>,
    overrides: HashMap<String, String>,
    settings: SettingsDocument,
}

impl ConfigStore {
    /// Create a store over a settings document, capturing `PAGEWRIGHT_*`
    /// overrides from the process environment.
    pub fn new(settings: SettingsDocument) -> Self {
        let overrides: HashMap<String, String> = std::env::vars()
            .filter(|(name, _)| name.starts_with(OVERRIDE_PREFIX))
            .collect();
        debug!("Captured {} setting overrides", overrides.len());
        Self::with_overrides(settings, overrides)
    }

    /// Create a store with an explicit set of override variables
    /// (`PAGEWRIGHT_*` name to value).
    pub fn with_overrides<K, V>(
        settings: SettingsDocument,
        overrides: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            runtime: RwLock::new(HashMap::new()),
            values: RwLock::new(HashMap::new()),
            overrides: overrides
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            settings,
        }
    }

    /// The settings document backing the lowest layer.
    pub fn settings(&self) -> &SettingsDocument {
        &self.settings
    }

    /// Look up a setting through all layers.
    ///
    /// The environment key is never read from the settings document.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.runtime_value(key) {
            return Some(value);
        }

        let found = self.overrides.get(&override_variable(key)).cloned().or_else(|| {
            if key == ENVIRONMENT_KEY {
                return None;
            }
            let environment = self.environment();
            self.settings
                .get(&environment, key)
                .map(str::to_string)
        })?;

        trace!("Caching setting {}={}", key, found);
        self.update(key, found.clone());
        Some(found)
    }

    /// Look up a setting that must be present.
    ///
    /// # Errors
    ///
    /// `ConfigurationError::RequiredSettingMissing` naming the override variable.
    pub fn require(&self, key: &str) -> ConfigurationResult<String> {
        self.get(key)
            .ok_or_else(|| ConfigurationError::RequiredSettingMissing {
                key: key.to_string(),
                override_variable: override_variable(key),
            })
    }

    /// Look up a setting, storing and returning `default` if it is absent.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(value) => value,
            None => {
                warn!(
                    "{} being used by default for setting {}. Set it in the settings document or with {}",
                    default,
                    key,
                    override_variable(key)
                );
                self.update(key, default);
                default.to_string()
            }
        }
    }

    /// A setting read as a flag. `true` (any case) and the empty string are
    /// true; anything else, including absence, is false.
    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|value| value.is_empty() || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// A setting read as an unsigned integer.
    ///
    /// # Errors
    ///
    /// `ConfigurationError::InvalidValue` if the value is present but not a
    /// non-negative integer.
    pub fn get_u64(&self, key: &str) -> ConfigurationResult<Option<u64>> {
        self.parse_value(key, "expected a non-negative integer")
    }

    /// A setting read as a floating point number.
    ///
    /// # Errors
    ///
    /// `ConfigurationError::InvalidValue` if the value is present but not a number.
    pub fn get_f64(&self, key: &str) -> ConfigurationResult<Option<f64>> {
        self.parse_value(key, "expected a number")
    }

    /// Set a runtime value, masking overrides and the settings document.
    pub fn update(&self, key: &str, value: impl ToString) {
        self.runtime
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    /// Remove a runtime value so the next read goes back to the lower layers.
    pub fn clear(&self, key: &str) {
        self.runtime
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Remove every runtime value.
    pub fn clear_all(&self) {
        self.runtime
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        debug!("Cleared all runtime settings");
    }

    /// Runtime keys starting with `prefix` (case-sensitive).
    ///
    /// Only keys that have been set or read since the last
    /// [`clear_all`](Self::clear_all) are known to the runtime layer.
    pub fn keys_with_prefix(&self, prefix: &str) -> BTreeSet<String> {
        self.runtime
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn count_with_prefix(&self, prefix: &str) -> usize {
        self.keys_with_prefix(prefix).len()
    }

    /// Store a test value under a normalized phrase.
    pub fn set_value(&self, key: &str, value: impl Into<String>) {
        let key = normalize_key(key);
        let value = value.into();
        trace!("Stored test value {}={}", key, value);
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
    }

    /// Retrieve a test value stored with [`set_value`](Self::set_value).
    pub fn value(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&normalize_key(key))
            .cloned()
    }

    /// The active environment.
    ///
    /// Falls back to `localhost` (and remembers it) when neither a runtime
    /// value nor `PAGEWRIGHT_ENV` is set.
    pub fn environment(&self) -> String {
        if let Some(environment) = self.runtime_value(ENVIRONMENT_KEY) {
            return environment;
        }

        let environment = match self.overrides.get(&override_variable(ENVIRONMENT_KEY)) {
            Some(environment) => environment.clone(),
            None => {
                warn!(
                    "{} environment being used by default. Set it with {}",
                    DEFAULT_ENVIRONMENT_NAME,
                    override_variable(ENVIRONMENT_KEY)
                );
                DEFAULT_ENVIRONMENT_NAME.to_string()
            }
        };
        self.update(ENVIRONMENT_KEY, &environment);
        environment
    }

    /// Switch the active environment.
    pub fn set_environment(&self, environment: &str) {
        info!("Environment set to {}", environment);
        self.update(ENVIRONMENT_KEY, environment);
    }

    /// The configured browser, lower-cased with whitespace removed.
    ///
    /// Defaults to `chrome`; `ie` is expanded to `internetexplorer`.
    pub fn browser(&self) -> String {
        let browser = self.get(BROWSER_KEY).unwrap_or_else(|| {
            info!(
                "{} browser being used by default. Set it with {}",
                DEFAULT_BROWSER,
                override_variable(BROWSER_KEY)
            );
            DEFAULT_BROWSER.to_string()
        });

        let browser: String = browser
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        if browser == "ie" {
            "internetexplorer".to_string()
        } else {
            browser
        }
    }

    /// The configured operating system, or the detected one (`windows`,
    /// `mac` or `linux`).
    pub fn operating_system(&self) -> String {
        self.get(OPERATING_SYSTEM_KEY).unwrap_or_else(|| {
            let detected = detect_operating_system(std::env::consts::OS);
            info!("Operating system auto-detected: {}", detected);
            detected
        })
    }

    fn runtime_value(&self, key: &str) -> Option<String> {
        self.runtime
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn parse_value<T: std::str::FromStr>(
        &self,
        key: &str,
        expected: &str,
    ) -> ConfigurationResult<Option<T>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigurationError::InvalidValue {
                key: key.to_string(),
                value,
                reason: expected.to_string(),
            })
    }
}

fn detect_operating_system(os: &str) -> String {
    let os = os.to_lowercase();
    if os.contains("win") {
        "windows".to_string()
    } else if os.contains("mac") || os.contains("darwin") {
        "mac".to_string()
    } else if os.contains("nux") {
        "linux".to_string()
    } else {
        os
    }
}
