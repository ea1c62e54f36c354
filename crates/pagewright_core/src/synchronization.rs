//! Bounded polling waits.
//!
//! Every wait in Pagewright is a [`Waiter`] polling a probe at a fixed
//! interval until the probe is ready, the timeout elapses, the probe fails
//! with a non-transient error, or the wait is cancelled. Sleeping happens
//! only here.
//!
//! # Examples
//!
//! ```
//! use pagewright_core::{Probe, WaitOptions, Waiter};
//! use std::convert::Infallible;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let mut polls = 0;
//! let waiter = Waiter::new(
//!     WaitOptions::new(Duration::from_secs(1), Duration::from_millis(10)),
//! );
//! let value = waiter
//!     .until("third poll", || {
//!         polls += 1;
//!         let ready = polls == 3;
//!         async move {
//!             Ok::<_, Infallible>(if ready { Probe::Ready(polls) } else { Probe::pending() })
//!         }
//!     })
//!     .await;
//! assert_eq!(value.unwrap(), 3);
//! # }
//! ```

use config_resolver::Timeouts;
use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

#[cfg(test)]
#[path = "synchronization_tests.rs"]
mod tests;

/// Classifies a probe failure.
///
/// Transient failures are retried until the deadline and reported with the
/// timeout. Any other failure ends the wait immediately.
pub trait Transience {
    fn is_transient(&self) -> bool;
}

impl Transience for Infallible {
    fn is_transient(&self) -> bool {
        match *self {}
    }
}

/// Timing and cancellation for one wait.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub interval: Duration,
    pub cancel: Option<CancellationToken>,
}

impl WaitOptions {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval,
            cancel: None,
        }
    }

    /// Options using a context's default timeout and poll interval.
    pub fn from_timeouts(timeouts: &Timeouts) -> Self {
        Self::new(timeouts.timeout, timeouts.interval)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::from_timeouts(&Timeouts::default())
    }
}

/// Outcome of a single poll.
#[derive(Debug, Clone, PartialEq)]
pub enum Probe<T> {
    Ready(T),
    /// Not ready yet, optionally with a description of what was observed.
    Pending(Option<String>),
}

impl<T> Probe<T> {
    pub fn pending() -> Self {
        Self::Pending(None)
    }

    pub fn observed(observation: impl Into<String>) -> Self {
        Self::Pending(Some(observation.into()))
    }
}

impl<T> From<Option<T>> for Probe<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Ready(value),
            None => Self::pending(),
        }
    }
}

/// Why a wait ended without a value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WaitError<E> {
    #[error("Timed out after {timeout:?} ({attempts} attempts) waiting for {description}")]
    TimedOut {
        description: String,
        timeout: Duration,
        attempts: u32,
        /// What the last pending poll reported, if it was pending.
        last_observation: Option<String>,
        /// The last transient failure, if the last poll failed.
        last_error: Option<E>,
    },

    #[error("Waiting for {description} failed: {error}")]
    Failed { description: String, error: E },

    #[error("Wait for {description} was cancelled after {attempts} attempts")]
    Cancelled { description: String, attempts: u32 },
}

/// Polls probes with one set of [`WaitOptions`].
#[derive(Debug, Clone, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    pub fn new(options: WaitOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll `probe` until it is ready.
    ///
    /// The probe runs at least once. After each pending or transient poll
    /// the waiter sleeps for the interval, shortened so that the final poll
    /// happens at the deadline. A probe that never becomes ready therefore
    /// fails no earlier than the timeout and no later than the timeout plus
    /// one interval plus the time spent probing.
    ///
    /// # Errors
    ///
    /// - `WaitError::TimedOut` when the deadline passes
    /// - `WaitError::Failed` on the first non-transient probe error
    /// - `WaitError::Cancelled` when the cancellation token fires
    pub async fn until<T, E, F, Fut>(
        &self,
        description: &str,
        mut probe: F,
    ) -> Result<T, WaitError<E>>
    where
        E: Transience + fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Probe<T>, E>>,
    {
        let deadline = Instant::now() + self.options.timeout;
        let mut attempts: u32 = 0;

        loop {
            if self.options.is_cancelled() {
                debug!("Wait for {} cancelled", description);
                return Err(WaitError::Cancelled {
                    description: description.to_string(),
                    attempts,
                });
            }

            attempts = attempts.saturating_add(1);
            let (last_observation, last_error) = match probe().await {
                Ok(Probe::Ready(value)) => {
                    debug!("{} ready after {} attempts", description, attempts);
                    return Ok(value);
                }
                Ok(Probe::Pending(observation)) => {
                    trace!("{} pending: {:?}", description, observation);
                    (observation, None)
                }
                Err(e) if e.is_transient() => {
                    trace!("{} not ready: {}", description, e);
                    (None, Some(e))
                }
                Err(e) => {
                    warn!("Waiting for {} failed: {}", description, e);
                    return Err(WaitError::Failed {
                        description: description.to_string(),
                        error: e,
                    });
                }
            };

            let now = Instant::now();
            if now >= deadline {
                debug!(
                    "Timed out after {:?} ({} attempts) waiting for {}",
                    self.options.timeout, attempts, description
                );
                return Err(WaitError::TimedOut {
                    description: description.to_string(),
                    timeout: self.options.timeout,
                    attempts,
                    last_observation,
                    last_error,
                });
            }

            let pause = self.options.interval.min(deadline - now);
            match &self.options.cancel {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => {
                            debug!("Wait for {} cancelled", description);
                            return Err(WaitError::Cancelled {
                                description: description.to_string(),
                                attempts,
                            });
                        }
                        _ = sleep(pause) => {}
                    }
                }
                None => sleep(pause).await,
            }
        }
    }

    /// Poll a boolean condition until it holds.
    pub async fn until_condition<E, F, Fut>(
        &self,
        description: &str,
        mut condition: F,
    ) -> Result<(), WaitError<E>>
    where
        E: Transience + fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, E>>,
    {
        self.until(description, || {
            let check = condition();
            async move {
                Ok(if check.await? {
                    Probe::Ready(())
                } else {
                    Probe::pending()
                })
            }
        })
        .await
    }
}
