//! Time abstraction for testability.
//!
//! This module provides a [`Clock`] trait that allows injecting mock clocks
//! in tests while using a real monotonic clock in production. Throttle
//! admission compares these readings, so they must never go backwards.

use std::time::Instant;

/// Abstraction over a monotonic millisecond clock.
///
/// Implementations return milliseconds elapsed since an arbitrary, fixed
/// epoch. Only differences between readings are meaningful.
///
/// # Example
///
/// ```
/// use keyed_gate::time::{Clock, MonotonicClock};
///
/// let clock = MonotonicClock::new();
/// let first = clock.now_millis();
/// let second = clock.now_millis();
/// assert!(second >= first);
/// ```
pub trait Clock: Send + Sync {
    /// Returns milliseconds elapsed since this clock's epoch.
    fn now_millis(&self) -> u64;
}

/// Production clock backed by [`Instant`].
///
/// The epoch is the moment the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a clock whose epoch is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u64 {
        // Saturates after ~584 million years.
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
