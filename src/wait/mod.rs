//! Bounded polling until a remote resource reports a settled status.
//!
//! Every asynchronous lifecycle step (server power transitions, IP block
//! assignment, network membership release, storage network and Rancher
//! cluster provisioning) funnels through [`StateWaiter`]. The waiter sleeps
//! for an initial delay, then refreshes at a fixed cadence until the status
//! lands in the target set, lands in a failure set, leaves the pending set,
//! or the deadline passes.


use std::future::Future;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::api::ApiError;

/// Cadence of a single wait.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WaitSettings {
    /// Sleep before the first refresh.
    pub delay: Duration,
    /// Sleep between refreshes.
    pub min_interval: Duration,
    /// Overall budget measured from the start of the wait.
    pub timeout: Duration,
}

const MINUTE: u64 = 60;

impl WaitSettings {
    /// Server provisioning and power transitions.
    #[must_use]
    pub const fn server() -> Self {
        Self {
            delay: Duration::from_secs(5),
            min_interval: Duration::from_secs(3),
            timeout: Duration::from_secs(100 * MINUTE),
        }
    }

    /// IP block assignment changes.
    #[must_use]
    pub const fn ip_block() -> Self {
        Self {
            delay: Duration::from_secs(15),
            min_interval: Duration::from_secs(3),
            timeout: Duration::from_secs(15 * MINUTE),
        }
    }

    /// Release of private and public network memberships.
    #[must_use]
    pub const fn network_membership() -> Self {
        Self {
            delay: Duration::from_secs(10),
            min_interval: Duration::from_secs(3),
            timeout: Duration::from_secs(7 * MINUTE),
        }
    }

    /// Storage network and Rancher cluster provisioning.
    #[must_use]
    pub const fn provisioning() -> Self {
        Self::server()
    }

    /// Polls without sleeping first and gives up after `timeout`.
    #[must_use]
    pub const fn immediate(min_interval: Duration, timeout: Duration) -> Self {
        Self {
            delay: Duration::ZERO,
            min_interval,
            timeout,
        }
    }
}

/// Errors raised while waiting for a status transition.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum WaitError {
    /// Raised when the deadline passes while the status is still pending.
    #[error(
        "timeout while waiting for state to become '{expected}' (last state: '{last_state}', timeout: {timeout:?})"
    )]
    Timeout {
        /// Last status observed before the deadline.
        last_state: String,
        /// Comma separated target statuses.
        expected: String,
        /// Budget that was exhausted.
        timeout: Duration,
    },
    /// Raised when the status is neither pending nor a target.
    #[error("unexpected state '{state}', wanted target '{expected}'")]
    UnexpectedState {
        /// Status reported by the API.
        state: String,
        /// Comma separated target statuses.
        expected: String,
    },
    /// Raised when the resource reports an explicit failure status.
    #[error("resource entered failure state '{state}'")]
    FailureState {
        /// Status reported by the API.
        state: String,
    },
    /// Raised when the refresh call itself fails.
    #[error(transparent)]
    Refresh(#[from] ApiError),
}

/// Parameterised wait-for-state loop.
#[derive(Clone, Debug)]
pub struct StateWaiter {
    pending: &'static [&'static str],
    target: &'static [&'static str],
    failure: &'static [&'static str],
    settings: WaitSettings,
}

impl StateWaiter {
    /// Creates a waiter for `pending -> target` transitions.
    #[must_use]
    pub const fn new(
        pending: &'static [&'static str],
        target: &'static [&'static str],
        settings: WaitSettings,
    ) -> Self {
        Self {
            pending,
            target,
            failure: &[],
            settings,
        }
    }

    /// Declares statuses that abort the wait immediately.
    #[must_use]
    pub const fn with_failure(mut self, failure: &'static [&'static str]) -> Self {
        self.failure = failure;
        self
    }

    /// Polls `refresh` until the status settles.
    ///
    /// An empty status counts as pending. Returns the target status that
    /// ended the wait.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError`] on timeout, on an unexpected or failure status,
    /// or when `refresh` fails.
    pub async fn wait<F, Fut>(&self, mut refresh: F) -> Result<String, WaitError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String, ApiError>>,
    {
        let started = Instant::now();
        let deadline = started + self.settings.timeout;
        let expected = self.target.join(", ");
        info!(target_states = %expected, "waiting for state change");

        if !self.settings.delay.is_zero() {
            sleep(self.settings.delay).await;
        }

        let mut last_state = String::new();
        while Instant::now() <= deadline {
            let state = refresh().await?;
            debug!(state = %state, elapsed = ?started.elapsed(), "refreshed state");

            if self.target.contains(&state.as_str()) {
                return Ok(state);
            }
            if self.failure.contains(&state.as_str()) {
                return Err(WaitError::FailureState { state });
            }
            if !state.is_empty() && !self.pending.contains(&state.as_str()) {
                return Err(WaitError::UnexpectedState { state, expected });
            }

            last_state = state;
            sleep(self.settings.min_interval).await;
        }

        Err(WaitError::Timeout {
            last_state,
            expected,
            timeout: self.settings.timeout,
        })
    }
}
