//! Wait timing read from settings.
//!
//! | Setting              | Unit                 | Default |
//! |----------------------|----------------------|---------|
//! | `timeout`            | `timeunit`           | 10      |
//! | `timeunit`           |                      | SECONDS |
//! | `longProcessTimeout` | seconds              | 60      |
//! | `interval`           | milliseconds         | 10      |
//! | `loopInterval`       | milliseconds         | 100     |
//!
//! A zero or absent value selects the default.

use crate::config_store::ConfigStore;
use crate::{ConfigurationError, ConfigurationResult};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

#[cfg(test)]
#[path = "timeouts_tests.rs"]
mod tests;

pub const TIMEOUT_KEY: &str = "timeout";
pub const TIME_UNIT_KEY: &str = "timeunit";
pub const LONG_PROCESS_TIMEOUT_KEY: &str = "longProcessTimeout";
pub const INTERVAL_KEY: &str = "interval";
pub const LOOP_INTERVAL_KEY: &str = "loopInterval";

const DEFAULT_TIMEOUT: u64 = 10;
const DEFAULT_LONG_PROCESS_TIMEOUT_SECS: u64 = 60;
const DEFAULT_INTERVAL_MILLIS: u64 = 10;
const DEFAULT_LOOP_INTERVAL_MILLIS: u64 = 100;

/// Unit of the `timeout` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnit {
    Days,
    Hours,
    Minutes,
    #[default]
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl TimeUnit {
    /// Converts an amount of this unit into a duration, saturating on overflow.
    pub fn duration(self, amount: u64) -> Duration {
        match self {
            Self::Days => Duration::from_secs(amount.saturating_mul(86_400)),
            Self::Hours => Duration::from_secs(amount.saturating_mul(3_600)),
            Self::Minutes => Duration::from_secs(amount.saturating_mul(60)),
            Self::Seconds => Duration::from_secs(amount),
            Self::Milliseconds => Duration::from_millis(amount),
            Self::Microseconds => Duration::from_micros(amount),
            Self::Nanoseconds => Duration::from_nanos(amount),
        }
    }
}

impl FromStr for TimeUnit {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAYS" => Ok(Self::Days),
            "HOURS" => Ok(Self::Hours),
            "MINUTES" => Ok(Self::Minutes),
            "SECONDS" => Ok(Self::Seconds),
            "MILLISECONDS" => Ok(Self::Milliseconds),
            "MICROSECONDS" => Ok(Self::Microseconds),
            "NANOSECONDS" => Ok(Self::Nanoseconds),
            _ => Err(ConfigurationError::InvalidValue {
                key: TIME_UNIT_KEY.to_string(),
                value: s.to_string(),
                reason: "expected one of DAYS, HOURS, MINUTES, SECONDS, MILLISECONDS, MICROSECONDS, NANOSECONDS".to_string(),
            }),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Days => "DAYS",
            Self::Hours => "HOURS",
            Self::Minutes => "MINUTES",
            Self::Seconds => "SECONDS",
            Self::Milliseconds => "MILLISECONDS",
            Self::Microseconds => "MICROSECONDS",
            Self::Nanoseconds => "NANOSECONDS",
        };
        f.write_str(name)
    }
}

/// Default wait timing for a test context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// How long element and page waits poll before giving up.
    pub timeout: Duration,
    /// Timeout for operations known to be slow, such as downloads.
    pub long_process_timeout: Duration,
    /// Pause between polls of a wait.
    pub interval: Duration,
    /// Pause between iterations of step-level retry loops.
    pub loop_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            long_process_timeout: Duration::from_secs(DEFAULT_LONG_PROCESS_TIMEOUT_SECS),
            interval: Duration::from_millis(DEFAULT_INTERVAL_MILLIS),
            loop_interval: Duration::from_millis(DEFAULT_LOOP_INTERVAL_MILLIS),
        }
    }
}

impl Timeouts {
    /// Read timing settings from a store.
    ///
    /// # Errors
    ///
    /// `ConfigurationError::InvalidValue` for a non-numeric amount or an
    /// unknown time unit.
    pub fn from_store(store: &ConfigStore) -> ConfigurationResult<Self> {
        let unit = match store.get(TIME_UNIT_KEY) {
            Some(unit) if !unit.trim().is_empty() => unit.parse()?,
            _ => TimeUnit::default(),
        };

        let timeout = match nonzero(store.get_u64(TIMEOUT_KEY)?) {
            Some(amount) => {
                info!("Timeout set to {} {}", amount, unit);
                unit.duration(amount)
            }
            None => {
                debug!("No timeout set, using {} seconds", DEFAULT_TIMEOUT);
                Duration::from_secs(DEFAULT_TIMEOUT)
            }
        };

        let long_process_timeout = Duration::from_secs(
            nonzero(store.get_u64(LONG_PROCESS_TIMEOUT_KEY)?)
                .unwrap_or(DEFAULT_LONG_PROCESS_TIMEOUT_SECS),
        );
        let interval = Duration::from_millis(
            nonzero(store.get_u64(INTERVAL_KEY)?).unwrap_or(DEFAULT_INTERVAL_MILLIS),
        );
        let loop_interval = Duration::from_millis(
            nonzero(store.get_u64(LOOP_INTERVAL_KEY)?).unwrap_or(DEFAULT_LOOP_INTERVAL_MILLIS),
        );

        Ok(Self {
            timeout,
            long_process_timeout,
            interval,
            loop_interval,
        })
    }
}

fn nonzero(value: Option<u64>) -> Option<u64> {
    value.filter(|amount| *amount > 0)
}
