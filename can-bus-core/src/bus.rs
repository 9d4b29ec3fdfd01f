//! Bus state
//!
//! Each [`CanBus`] carries two kinds of state with different writers:
//! - [`BusCounters`], written by the transport layer on every frame event.
//!   They are atomics behind an `Arc` so receive handlers can keep a
//!   [`counters_handle`](CanBus::counters_handle) and write while the
//!   statistics pass reads them.
//! - [`BusStatistics`], written only by the statistics pass.

use crate::statistics::{self, DeltaStatistic};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Raw counters owned by the transport layer
#[derive(Debug, Default)]
pub struct BusCounters {
    messages_received: AtomicU64,
    messages_dropped: AtomicU64,
    /// Milliseconds on the session clock; 0 means nothing received yet
    last_message_received: AtomicU64,
}

impl BusCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a received frame and stamp the receive time
    pub fn record_received(&self, now_ms: u64) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
        self.last_message_received.store(now_ms, Ordering::Relaxed);
    }

    /// Count a frame that could not be queued
    pub fn record_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Overwrite the cumulative counters, e.g. from a controller's own registers
    pub fn store(&self, received: u64, dropped: u64) {
        self.messages_received.store(received, Ordering::Relaxed);
        self.messages_dropped.store(dropped, Ordering::Relaxed);
    }

    pub fn set_last_message_received(&self, time_ms: u64) {
        self.last_message_received.store(time_ms, Ordering::Relaxed);
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    pub fn messages_dropped(&self) -> u64 {
        self.messages_dropped.load(Ordering::Relaxed)
    }

    pub fn last_message_received(&self) -> u64 {
        self.last_message_received.load(Ordering::Relaxed)
    }

    /// Clear counters and the receive timestamp
    pub fn reset(&self) {
        self.store(0, 0);
        self.set_last_message_received(0);
    }

    /// Read both counters for one statistics pass
    ///
    /// The two loads are independent, so a frame event between them can yield
    /// a pair that never existed at one instant. Each value is still a real
    /// counter reading and never goes backwards, which is all the statistics
    /// need; the skew is at most one in-flight event per counter.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            received: self.messages_received(),
            dropped: self.messages_dropped(),
        }
    }
}

/// Counter values read at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CounterSnapshot {
    pub received: u64,
    pub dropped: u64,
}

/// Smoothed statistics for one bus
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BusStatistics {
    /// Received plus dropped messages
    pub total_messages: DeltaStatistic,
    pub received_messages: DeltaStatistic,
    pub dropped_messages: DeltaStatistic,
    /// Received data volume in KB
    pub received_data: DeltaStatistic,
}

impl BusStatistics {
    pub fn initialize(&mut self) {
        statistics::initialize(&mut self.total_messages);
        statistics::initialize(&mut self.received_messages);
        statistics::initialize(&mut self.dropped_messages);
        statistics::initialize(&mut self.received_data);
    }
}

/// One physical CAN channel
#[derive(Debug)]
pub struct CanBus {
    /// Controller address (1, 2, ...)
    pub address: u8,
    pub counters: Arc<BusCounters>,
    pub stats: BusStatistics,
}

impl CanBus {
    /// Create a bus with cleared counters and statistics
    pub fn new(address: u8) -> Self {
        log::debug!("Initializing CAN node {}", address);
        Self {
            address,
            counters: Arc::new(BusCounters::new()),
            stats: BusStatistics::default(),
        }
    }

    /// Shared handle for the transport layer's receive path
    pub fn counters_handle(&self) -> Arc<BusCounters> {
        Arc::clone(&self.counters)
    }

    /// Reset the bus to its startup state
    pub fn initialize(&mut self) {
        log::debug!("Initializing CAN node {}", self.address);
        self.counters.reset();
        self.stats.initialize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bus_is_cleared() {
        let bus = CanBus::new(1);
        assert_eq!(bus.counters.snapshot(), CounterSnapshot::default());
        assert_eq!(bus.counters.last_message_received(), 0);
        assert_eq!(bus.stats, BusStatistics::default());
    }

    #[test]
    fn test_record_events() {
        let bus = CanBus::new(2);
        bus.counters.record_received(1500);
        bus.counters.record_received(1700);
        bus.counters.record_dropped();

        assert_eq!(bus.counters.snapshot(), CounterSnapshot { received: 2, dropped: 1 });
        assert_eq!(bus.counters.last_message_received(), 1700);
    }

    #[test]
    fn test_counters_handle_shares_state() {
        let bus = CanBus::new(1);
        let handle = bus.counters_handle();
        handle.record_received(300);
        handle.record_dropped();

        assert_eq!(bus.counters.snapshot(), CounterSnapshot { received: 1, dropped: 1 });
        assert_eq!(bus.counters.last_message_received(), 300);
    }

    #[test]
    fn test_initialize_resets_everything() {
        let mut bus = CanBus::new(1);
        bus.counters.store(10, 4);
        bus.counters.set_last_message_received(99);
        statistics::update(&mut bus.stats.received_messages, 10);

        bus.initialize();

        assert_eq!(bus.counters.snapshot(), CounterSnapshot::default());
        assert_eq!(bus.counters.last_message_received(), 0);
        assert_eq!(bus.stats.received_messages.total, 0);
    }
}
