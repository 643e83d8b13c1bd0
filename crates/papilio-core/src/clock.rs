//! Monotonic time source used by bounded polling and pulse delays.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Time source and sleeper for the driver's busy-wait loops.
pub trait Clock {
    /// Monotonic time elapsed since an arbitrary, fixed origin.
    fn now(&self) -> Duration;

    /// Blocks the calling thread for at least `duration`.
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

/// Wall-clock implementation backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Creates a clock whose origin is the moment of construction.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Simulated clock: sleeping advances time instantly.
///
/// Lets tests exercise timeouts and pacing delays without real waiting.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
    sleeps: Cell<u32>,
    slept: Cell<Duration>,
}

impl ManualClock {
    /// Creates a clock starting at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward without counting a sleep.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Number of `sleep` calls observed.
    #[must_use]
    pub fn sleep_count(&self) -> u32 {
        self.sleeps.get()
    }

    /// Total duration requested through `sleep`.
    #[must_use]
    pub fn total_slept(&self) -> Duration {
        self.slept.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.set(self.sleeps.get().saturating_add(1));
        self.slept.set(self.slept.get() + duration);
        self.advance(duration);
    }
}
