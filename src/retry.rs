//! Credential-rotating request execution.
//!
//! [`RotatingExecutor`] delivers one logical request, switching to the next
//! credential in the pool after every failed attempt. A connection error and
//! a non-2xx status count the same. Retrying stops at the first 2xx response
//! or once the lookup deadline has passed. After each full cycle through the
//! pool the executor pauses briefly instead of busy-looping.
//!
//! The control flow lives in [`RetryLoop`], a small state machine that
//! knows nothing about HTTP or timers. That keeps the deadline and pause
//! rules testable on a virtual clock.

use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::{Clock, TokioClock};
use crate::credentials::CredentialPool;
use crate::errors::{Result, VtUrlsError};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Absolute time budget for one logical request
    pub deadline: Duration,

    /// Pause after each full cycle through the pool without success
    pub cycle_pause: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(60),
            cycle_pause: Duration::from_secs(1),
        }
    }
}

/// Position of a [`RetryLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Next step is an attempt with the current credential.
    Attempting,
    /// A full cycle just failed; pause before the next attempt.
    Cooling,
    /// Deadline reached without a success.
    Exhausted,
    /// An attempt returned a 2xx response.
    Succeeded,
}

/// Deadline and cycle bookkeeping for one logical request.
#[derive(Debug, Clone)]
pub struct RetryLoop {
    started: Instant,
    deadline: Duration,
    pool_size: usize,
    attempts: usize,
    state: RetryState,
}

impl RetryLoop {
    pub fn new(started: Instant, deadline: Duration, pool_size: usize) -> Self {
        Self {
            started,
            deadline,
            pool_size: pool_size.max(1),
            attempts: 0,
            state: RetryState::Attempting,
        }
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    /// Failed attempts recorded so far.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    /// Time left before the deadline.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_sub(self.elapsed(now))
    }

    /// Gate run before every attempt, including the first.
    pub fn begin_attempt(&mut self, now: Instant) -> RetryState {
        self.state = if self.elapsed(now) >= self.deadline {
            RetryState::Exhausted
        } else {
            RetryState::Attempting
        };
        self.state
    }

    pub fn record_success(&mut self) -> RetryState {
        self.state = RetryState::Succeeded;
        self.state
    }

    /// Count a failed attempt and decide what comes next.
    ///
    /// Past the deadline the loop exhausts right away. Otherwise it cools
    /// down when the attempt count has just completed a cycle.
    pub fn record_failure(&mut self, now: Instant) -> RetryState {
        self.attempts += 1;
        self.state = if self.elapsed(now) >= self.deadline {
            RetryState::Exhausted
        } else if self.attempts % self.pool_size == 0 {
            RetryState::Cooling
        } else {
            RetryState::Attempting
        };
        self.state
    }

    /// Leave the cooling state once the pause is over.
    pub fn finish_cooling(&mut self) {
        if self.state == RetryState::Cooling {
            self.state = RetryState::Attempting;
        }
    }
}

/// Status view of a delivered attempt.
pub trait AttemptResponse {
    fn status_code(&self) -> u16;

    fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code())
    }
}

impl AttemptResponse for reqwest::Response {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}

/// Retry executor that rotates credentials between attempts.
#[derive(Debug, Clone)]
pub struct RotatingExecutor<C = TokioClock> {
    config: RetryConfig,
    clock: C,
}

impl RotatingExecutor<TokioClock> {
    /// Create a new executor running on the tokio timer
    pub fn new(config: RetryConfig) -> Self {
        Self::with_clock(config, TokioClock)
    }
}

impl<C: Clock> RotatingExecutor<C> {
    pub fn with_clock(config: RetryConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Deliver one logical request.
    ///
    /// `send` receives the current credential and performs one attempt.
    /// The first 2xx response is returned as is, without touching its
    /// body. Failed attempts rotate `pool`, and the cursor is left where
    /// the loop stopped so the next lookup continues from there.
    ///
    /// `target` only labels log events and errors.
    pub async fn execute<F, Fut, R, E>(
        &self,
        pool: &mut CredentialPool,
        target: &str,
        cancel: &CancellationToken,
        mut send: F,
    ) -> Result<R>
    where
        F: FnMut(&str) -> Fut,
        Fut: Future<Output = std::result::Result<R, E>>,
        R: AttemptResponse,
        E: Display,
    {
        let mut tracker = RetryLoop::new(self.clock.now(), self.config.deadline, pool.size());

        loop {
            if tracker.begin_attempt(self.clock.now()) == RetryState::Exhausted {
                return Err(self.exhausted(&tracker, target));
            }

            let key_index = pool.position();
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(VtUrlsError::cancelled(target)),
                outcome = send(pool.current()) => outcome,
            };

            match outcome {
                Ok(response) if response.is_success() => {
                    tracker.record_success();
                    debug!(
                        target_domain = target,
                        key_index,
                        attempts = tracker.attempts() + 1,
                        status = response.status_code(),
                        "attempt succeeded"
                    );
                    return Ok(response);
                }
                Ok(response) => {
                    debug!(
                        target_domain = target,
                        key_index,
                        status = response.status_code(),
                        "attempt rejected, rotating credential"
                    );
                    drop(response);
                }
                Err(error) => {
                    debug!(
                        target_domain = target,
                        key_index,
                        error = %error,
                        "attempt failed, rotating credential"
                    );
                }
            }

            pool.rotate();

            match tracker.record_failure(self.clock.now()) {
                RetryState::Exhausted => return Err(self.exhausted(&tracker, target)),
                RetryState::Cooling => {
                    let pause = self
                        .config
                        .cycle_pause
                        .min(tracker.remaining(self.clock.now()));
                    info!(
                        target_domain = target,
                        attempts = tracker.attempts(),
                        pause_ms = saturating_millis(pause),
                        "every credential failed this cycle, pausing"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(VtUrlsError::cancelled(target)),
                        _ = self.clock.sleep(pause) => {}
                    }
                    tracker.finish_cooling();
                }
                RetryState::Attempting | RetryState::Succeeded => {}
            }
        }
    }

    fn exhausted(&self, tracker: &RetryLoop, target: &str) -> VtUrlsError {
        warn!(
            target_domain = target,
            attempts = tracker.attempts(),
            deadline_secs = self.config.deadline.as_secs(),
            "no credential succeeded before the deadline"
        );
        VtUrlsError::exhausted(tracker.attempts(), self.config.deadline)
    }
}

/// Whole milliseconds in `d`, clamped to `u64::MAX`.
fn saturating_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
