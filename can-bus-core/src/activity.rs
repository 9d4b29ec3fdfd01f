//! Bus activity detection
//!
//! A bus is active when it received a frame within the last
//! [`ACTIVE_TIMEOUT_MS`]. Activity is recomputed from the last receive
//! timestamp on every query; no flag is stored.

use crate::bus::CanBus;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Time without received frames after which a bus counts as inactive
pub const ACTIVE_TIMEOUT_MS: u64 = 30_000;

/// Millisecond time source shared with the transport layer
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Monotonic clock counting from its creation
///
/// Starts at 1 ms so a timestamp taken from it never collides with the
/// "never received" sentinel.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64 + 1
    }
}

/// Clock driven by hand, for tests and log replay
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    pub fn set(&self, time_ms: u64) {
        self.now.store(time_ms, Ordering::Relaxed);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now.fetch_add(delta_ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}

/// True if `bus` received a frame less than [`ACTIVE_TIMEOUT_MS`] before `now_ms`
pub fn is_active(bus: &CanBus, now_ms: u64) -> bool {
    let last = bus.counters.last_message_received();
    last != 0 && now_ms.saturating_sub(last) < ACTIVE_TIMEOUT_MS
}

/// [`is_active`] against a clock
pub fn is_active_at(bus: &CanBus, clock: &impl Clock) -> bool {
    is_active(bus, clock.now_ms())
}
