//! CAN Bus Core Library
//!
//! Descriptor lookup and bus health telemetry for a vehicle bus translator.
//!
//! # Architecture
//!
//! This library answers two questions for the translation pipeline:
//! - Which signal, signal state or command corresponds to a generic name or value?
//! - Is a bus healthy and currently receiving traffic?
//!
//! The library does NOT:
//! - Encode or decode frames
//! - Own receive/send queues or transports
//! - Load configuration (descriptor tables are handed in by the caller)
//!
//! The transport layer updates each bus's [`BusCounters`]; a periodic timer
//! drives [`BusStatsTracker::tick`]; message encode/decode logic calls the
//! [`catalog`] lookups.
//!
//! # Example Usage
//!
//! ```
//! use can_bus_core::{activity, catalog, CanBus, Signal};
//!
//! let signals = vec![
//!     Signal::new("ENGINE_SPEED"),
//!     Signal::new("DOOR_LOCK").with_writable(true).add_state("LOCKED", 1),
//! ];
//!
//! // Only writable signals may be targeted by a write request
//! assert!(catalog::find_signal_filtered("DOOR_LOCK", &signals, true).is_some());
//! assert!(catalog::find_signal_filtered("ENGINE_SPEED", &signals, true).is_none());
//!
//! let bus = CanBus::new(1);
//! bus.counters.record_received(10_000);
//! assert!(activity::is_active(&bus, 11_000));
//! ```

// Public modules
pub mod activity;
pub mod bus;
pub mod catalog;
pub mod descriptors;
pub mod lookup;
pub mod statistics;
pub mod tracker;
pub mod types;

// Re-export main types for convenience
pub use activity::{is_active, Clock, ManualClock, MonotonicClock, ACTIVE_TIMEOUT_MS};
pub use bus::{BusCounters, BusStatistics, CanBus, CounterSnapshot};
pub use catalog::{CatalogStats, DescriptorCatalog};
pub use descriptors::{Command, Signal, SignalState};
pub use statistics::{DeltaStatistic, Statistic};
pub use tracker::{
    AggregateReport, BusReport, BusStatsTracker, StatsReport, CAN_MESSAGE_TOTAL_BIT_SIZE,
    STATS_LOG_INTERVAL_MS,
};
pub use types::{CatalogError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an empty catalog resolves nothing
        let catalog = DescriptorCatalog::default();
        assert_eq!(catalog.stats().num_signals, 0);
        assert!(catalog.signal("ENGINE_SPEED").is_none());
    }
}
