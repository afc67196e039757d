//! Monotonic "time since load" service.
//!
//! The hover-exit gate compares against the time elapsed since the widget was
//! loaded. The clock is injected into the controller so tests can drive it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

/// Source of elapsed time since the widget was loaded.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Time elapsed since load.
    fn since_load(&self) -> Duration;
}

/// Clock backed by [`tokio::time::Instant`].
///
/// Honours Tokio's paused time, so `start_paused` tests advance it together
/// with the popup timer.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    loaded_at: Instant,
}

impl MonotonicClock {
    /// Start a clock whose origin is now.
    #[must_use]
    pub fn start() -> Self {
        Self {
            loaded_at: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn since_load(&self) -> Duration {
        self.loaded_at.elapsed()
    }
}

/// Manually driven clock for tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    elapsed_ms: AtomicU64,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the elapsed time since load.
    pub fn set(&self, elapsed: Duration) {
        let ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.elapsed_ms.store(ms, Ordering::SeqCst);
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let ms = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.elapsed_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn since_load(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst))
    }
}
