//! Bus statistics tracker
//!
//! Turns the raw per-bus counters into smoothed rate telemetry. A
//! [`BusStatsTracker`] is created once at startup and driven from a periodic
//! tick; it only reads the transport counters and writes the statistics
//! accumulators, so disabling it has no effect on message processing.
//!
//! # Example
//!
//! ```
//! use can_bus_core::{BusStatsTracker, CanBus};
//!
//! let mut buses = vec![CanBus::new(1), CanBus::new(2)];
//! let mut tracker = BusStatsTracker::new();
//!
//! buses[0].counters.store(120, 3);
//! let report = tracker.tick(&mut buses, 5_000).unwrap();
//! assert_eq!(report.aggregate.total_messages, 123);
//!
//! // Too early for the next pass
//! assert!(tracker.tick(&mut buses, 6_000).is_none());
//! ```

use crate::activity;
use crate::bus::CanBus;
use crate::statistics::{self, exponential_moving_average, DeltaStatistic};
use serde::Serialize;

/// Interval between two statistics passes
pub const STATS_LOG_INTERVAL_MS: u64 = 5_000;

/// Bits per CAN frame used to estimate received data volume
pub const CAN_MESSAGE_TOTAL_BIT_SIZE: u64 = 128;

const STATS_LOG_INTERVAL_S: f64 = (STATS_LOG_INTERVAL_MS / 1000) as f64;

/// Zero the four statistics accumulators of a bus
pub fn initialize(bus: &mut CanBus) {
    bus.stats.initialize();
}

/// Estimated KB received for a frame count
pub fn received_data_kb(messages_received: u64) -> u64 {
    messages_received * CAN_MESSAGE_TOTAL_BIT_SIZE / 8 / 1024
}

/// `numerator / denominator`, or 0.0 when there is nothing to divide by
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Telemetry for one bus after a statistics pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusReport {
    pub address: u8,
    pub active: bool,
    /// Received plus dropped messages since startup
    pub total_messages: u64,
    pub received_messages: u64,
    pub dropped_messages: u64,
    pub received_data_kb: u64,
    /// Dropped / total since startup, 0.0 before any message
    pub drop_ratio: f64,
    /// Smoothed received data rate in KB/s
    pub average_throughput_kbps: f64,
    /// Smoothed dropped / total per interval
    pub average_drop_ratio: f64,
}

/// Telemetry summed over all buses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    pub total_messages: u64,
    pub received_messages: u64,
    pub dropped_messages: u64,
    pub received_data_kb: u64,
    pub drop_ratio: f64,
    /// Smoothed dropped messages per second
    pub drop_rate: f64,
    /// Smoothed total messages per second
    pub message_rate: f64,
    /// Smoothed received data rate in KB/s
    pub throughput_kbps: f64,
    pub average_drop_ratio: f64,
}

/// Result of one statistics pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    /// Session time of the pass in milliseconds
    pub time_ms: u64,
    pub buses: Vec<BusReport>,
    pub aggregate: AggregateReport,
}

/// Process-wide statistics, summed over every bus
#[derive(Debug, Clone, Default)]
pub struct BusStatsTracker {
    total_messages: DeltaStatistic,
    received_messages: DeltaStatistic,
    dropped_messages: DeltaStatistic,
    received_data: DeltaStatistic,
    last_pass_ms: Option<u64>,
}

impl BusStatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all aggregate statistics and the cadence timer
    pub fn reset(&mut self) {
        statistics::initialize(&mut self.total_messages);
        statistics::initialize(&mut self.received_messages);
        statistics::initialize(&mut self.dropped_messages);
        statistics::initialize(&mut self.received_data);
        self.last_pass_ms = None;
    }

    pub fn total_messages(&self) -> &DeltaStatistic {
        &self.total_messages
    }

    pub fn received_messages(&self) -> &DeltaStatistic {
        &self.received_messages
    }

    pub fn dropped_messages(&self) -> &DeltaStatistic {
        &self.dropped_messages
    }

    pub fn received_data(&self) -> &DeltaStatistic {
        &self.received_data
    }

    /// Run a statistics pass if [`STATS_LOG_INTERVAL_MS`] has elapsed since the
    /// previous one. The first call always runs.
    pub fn tick(&mut self, buses: &mut [CanBus], now_ms: u64) -> Option<StatsReport> {
        if let Some(last) = self.last_pass_ms {
            if now_ms.saturating_sub(last) < STATS_LOG_INTERVAL_MS {
                return None;
            }
        }
        self.last_pass_ms = Some(now_ms);
        Some(self.aggregate(buses, now_ms))
    }

    /// Run a statistics pass unconditionally
    pub fn aggregate(&mut self, buses: &mut [CanBus], now_ms: u64) -> StatsReport {
        let mut total_messages = 0;
        let mut received_messages = 0;
        let mut dropped_messages = 0;
        let mut received_data = 0;
        let mut bus_reports = Vec::with_capacity(buses.len());

        for bus in buses.iter_mut() {
            let counters = bus.counters.snapshot();
            let active = activity::is_active(bus, now_ms);
            let stats = &mut bus.stats;

            statistics::update(&mut stats.received_data, received_data_kb(counters.received));
            statistics::update(&mut stats.total_messages, counters.received + counters.dropped);
            statistics::update(&mut stats.received_messages, counters.received);
            statistics::update(&mut stats.dropped_messages, counters.dropped);

            let report = BusReport {
                address: bus.address,
                active,
                total_messages: stats.total_messages.total,
                received_messages: stats.received_messages.total,
                dropped_messages: stats.dropped_messages.total,
                received_data_kb: stats.received_data.total,
                drop_ratio: ratio(
                    stats.dropped_messages.total as f64,
                    stats.total_messages.total as f64,
                ),
                average_throughput_kbps: exponential_moving_average(&stats.received_data)
                    / STATS_LOG_INTERVAL_S,
                average_drop_ratio: ratio(
                    exponential_moving_average(&stats.dropped_messages),
                    exponential_moving_average(&stats.total_messages),
                ),
            };

            total_messages += stats.total_messages.total;
            received_messages += counters.received;
            dropped_messages += counters.dropped;
            received_data += stats.received_data.total;
            bus_reports.push(report);
        }

        statistics::update(&mut self.total_messages, total_messages);
        statistics::update(&mut self.received_messages, received_messages);
        statistics::update(&mut self.dropped_messages, dropped_messages);
        statistics::update(&mut self.received_data, received_data);

        let report = StatsReport {
            time_ms: now_ms,
            buses: bus_reports,
            aggregate: AggregateReport {
                total_messages: self.total_messages.total,
                received_messages: self.received_messages.total,
                dropped_messages: self.dropped_messages.total,
                received_data_kb: self.received_data.total,
                drop_ratio: ratio(
                    self.dropped_messages.total as f64,
                    self.total_messages.total as f64,
                ),
                drop_rate: exponential_moving_average(&self.dropped_messages)
                    / STATS_LOG_INTERVAL_S,
                message_rate: exponential_moving_average(&self.total_messages)
                    / STATS_LOG_INTERVAL_S,
                throughput_kbps: exponential_moving_average(&self.received_data)
                    / STATS_LOG_INTERVAL_S,
                average_drop_ratio: ratio(
                    exponential_moving_average(&self.dropped_messages),
                    exponential_moving_average(&self.total_messages),
                ),
            },
        };

        log_report(&report);
        report
    }
}

#[cfg(feature = "log-stats")]
fn log_report(report: &StatsReport) {
    for bus in &report.buses {
        log::debug!("CAN messages received on bus {}: {}", bus.address, bus.total_messages);
        log::debug!("CAN messages processed on bus {}: {}", bus.address, bus.received_messages);
        log::debug!("CAN messages dropped on bus {}: {}", bus.address, bus.dropped_messages);
        if bus.dropped_messages > 0 {
            log::debug!(
                "Overall dropped message ratio on bus {}: {:.3} ({} / {})",
                bus.address,
                bus.drop_ratio,
                bus.dropped_messages,
                bus.total_messages
            );
            log::debug!(
                "Average dropped message ratio on bus {}: {:.3}",
                bus.address,
                bus.average_drop_ratio
            );
        }
        log::debug!("Overall data received on bus {}: {}KB", bus.address, bus.received_data_kb);
        log::debug!(
            "Average throughput on bus {}: {:.2}KB / s",
            bus.address,
            bus.average_throughput_kbps
        );
    }

    let total = &report.aggregate;
    log::debug!("Total CAN messages dropped on all buses: {}", total.dropped_messages);
    log::debug!(
        "Average message drop rate across all buses: {} msgs / s",
        total.drop_rate as u64
    );
    log::debug!(
        "Dropped message ratio across all buses: {:.3} ({} / {})",
        total.drop_ratio,
        total.dropped_messages,
        total.total_messages
    );
    log::debug!(
        "Total CAN messages received since startup on all buses: {}",
        total.total_messages
    );
    log::debug!(
        "Aggregate message rate across all buses since startup: {} msgs / s",
        total.message_rate as u64
    );
    log::debug!(
        "Aggregate throughput across all buses since startup: {:.2}KB / s",
        total.throughput_kbps
    );
    log::debug!(
        "Average dropped message ratio across all buses: {:.3}",
        total.average_drop_ratio
    );
}

#[cfg(not(feature = "log-stats"))]
fn log_report(_report: &StatsReport) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_received_data_estimate() {
        assert_eq!(received_data_kb(0), 0);
        assert_eq!(received_data_kb(63), 0);
        assert_eq!(received_data_kb(64), 1);
        assert_eq!(received_data_kb(6400), 100);
    }

    #[test]
    fn test_empty_bus_has_zero_ratios() {
        let mut buses = vec![CanBus::new(1)];
        let mut tracker = BusStatsTracker::new();

        let report = tracker.aggregate(&mut buses, 1_000);
        let bus = &report.buses[0];
        assert_eq!(bus.total_messages, 0);
        assert_eq!(bus.drop_ratio, 0.0);
        assert_eq!(bus.average_drop_ratio, 0.0);
        assert!(!bus.active);
        assert_eq!(report.aggregate.drop_ratio, 0.0);
        assert_eq!(report.aggregate.average_drop_ratio, 0.0);
    }

    #[test]
    fn test_per_bus_and_aggregate_totals() {
        let mut buses = vec![CanBus::new(1), CanBus::new(2)];
        buses[0].counters.store(900, 100);
        buses[0].counters.set_last_message_received(9_000);
        buses[1].counters.store(6400, 0);

        let mut tracker = BusStatsTracker::new();
        let report = tracker.aggregate(&mut buses, 10_000);

        let first = &report.buses[0];
        assert_eq!(first.total_messages, 1000);
        assert_eq!(first.received_messages, 900);
        assert_eq!(first.dropped_messages, 100);
        assert!(approx_eq(first.drop_ratio, 0.1));
        assert!(first.active);

        let second = &report.buses[1];
        assert_eq!(second.received_data_kb, 100);
        assert!(approx_eq(second.average_throughput_kbps, 20.0));
        assert!(!second.active);

        let total = &report.aggregate;
        assert_eq!(total.total_messages, 7400);
        assert_eq!(total.received_messages, 7300);
        assert_eq!(total.dropped_messages, 100);
        assert_eq!(total.received_data_kb, 14 + 100);
        assert!(approx_eq(total.message_rate, 7400.0 / 5.0));
        assert!(approx_eq(total.drop_ratio, 100.0 / 7400.0));
    }

    #[test]
    fn test_aggregate_does_not_touch_counters() {
        let mut buses = vec![CanBus::new(1)];
        buses[0].counters.store(42, 7);
        buses[0].counters.set_last_message_received(1234);

        BusStatsTracker::new().aggregate(&mut buses, 2_000);

        assert_eq!(buses[0].counters.messages_received(), 42);
        assert_eq!(buses[0].counters.messages_dropped(), 7);
        assert_eq!(buses[0].counters.last_message_received(), 1234);
    }

    #[test]
    fn test_tick_cadence() {
        let mut buses = vec![CanBus::new(1)];
        let mut tracker = BusStatsTracker::new();

        assert!(tracker.tick(&mut buses, 100).is_some());
        assert!(tracker.tick(&mut buses, 100 + STATS_LOG_INTERVAL_MS - 1).is_none());
        assert!(tracker.tick(&mut buses, 100 + STATS_LOG_INTERVAL_MS).is_some());
        assert_eq!(tracker.total_messages().delta.samples, 2);

        tracker.reset();
        assert!(tracker.tick(&mut buses, 200).is_some());
        assert_eq!(tracker.total_messages().delta.samples, 1);
    }

    #[test]
    fn test_initialize_bus_statistics() {
        let mut buses = vec![CanBus::new(1)];
        buses[0].counters.store(10, 0);
        BusStatsTracker::new().aggregate(&mut buses, 0);
        assert_eq!(buses[0].stats.received_messages.total, 10);

        initialize(&mut buses[0]);
        assert_eq!(buses[0].stats.received_messages.total, 0);
        assert_eq!(buses[0].counters.messages_received(), 10);
    }
}
