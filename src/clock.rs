//! Time source used by the rotating executor.
//!
//! Production code runs on [`TokioClock`]. Tests use [`ManualClock`], whose
//! virtual time only moves when something sleeps on it or advances it
//! explicitly, so deadline and pause behaviour can be checked without real
//! waits.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

/// Monotonic clock with an async sleep.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock. Sleeping advances virtual time immediately and is recorded.
///
/// Clones share the same timeline.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    inner: Arc<Mutex<ManualState>>,
}

#[derive(Debug, Default)]
struct ManualState {
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            inner: Arc::new(Mutex::new(ManualState::default())),
        }
    }

    /// Move virtual time forward without recording a sleep.
    pub fn advance(&self, by: Duration) {
        let mut state = self.lock();
        state.elapsed += by;
    }

    /// Virtual time elapsed since construction.
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }

    /// Every sleep requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock().sleeps.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        // A poisoned lock only means another test thread panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.lock().elapsed
    }

    async fn sleep(&self, duration: Duration) {
        let mut state = self.lock();
        state.elapsed += duration;
        state.sleeps.push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn manual_clock_records_sleeps() {
        let clock = ManualClock::new();
        let start = clock.now();

        clock.sleep(Duration::from_secs(1)).await;
        clock.advance(Duration::from_millis(500));
        clock.sleep(Duration::from_secs(2)).await;

        assert_eq!(clock.elapsed(), Duration::from_millis(3500));
        assert_eq!(clock.now() - start, Duration::from_millis(3500));
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn clones_share_timeline() {
        let clock = ManualClock::new();
        let other = clock.clone();
        other.advance(Duration::from_secs(10));
        assert_eq!(clock.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_clock_sleeps_on_runtime_timer() {
        let before = tokio::time::Instant::now();
        TokioClock.sleep(Duration::from_secs(5)).await;
        assert!(tokio::time::Instant::now() - before >= Duration::from_secs(5));
    }
}
