//! Replay of recorded bus counters through the statistics tracker

use crate::config::{AppConfig, CounterSample};
use can_bus_core::catalog::find_bus;
use can_bus_core::{BusStatsTracker, CanBus, Clock, ManualClock, StatsReport};

/// Outcome of a replay run
pub struct ReplayOutcome {
    pub reports: Vec<StatsReport>,
    pub buses: Vec<CanBus>,
    pub end_time_ms: u64,
}

/// Feed the samples into the bus counters in time order, ticking the tracker
/// once per distinct sample time
pub fn run(config: &AppConfig) -> ReplayOutcome {
    let clock = ManualClock::new(0);
    let mut buses = config.create_buses();
    let mut tracker = BusStatsTracker::new();
    let mut reports = Vec::new();

    let mut samples = config.sorted_samples().into_iter().peekable();
    while let Some(sample) = samples.next() {
        clock.set(sample.time_ms);
        apply_sample(&sample, &buses);

        // Every bus sampled at this time must be stored before the pass
        if samples
            .peek()
            .is_some_and(|next| next.time_ms == sample.time_ms)
        {
            continue;
        }

        if let Some(report) = tracker.tick(&mut buses, clock.now_ms()) {
            log::debug!("Statistics pass at {} ms", report.time_ms);
            reports.push(report);
        }
    }

    ReplayOutcome {
        reports,
        buses,
        end_time_ms: clock.now_ms(),
    }
}

/// Store one sample's counters on its bus, as the transport layer would
fn apply_sample(sample: &CounterSample, buses: &[CanBus]) {
    let Some(bus) = find_bus(sample.bus, buses) else {
        log::warn!("Skipping sample for unknown bus {}", sample.bus);
        return;
    };

    let previous = bus.counters.messages_received();
    bus.counters.store(sample.received, sample.dropped);
    match sample.last_message_ms {
        Some(time_ms) => bus.counters.set_last_message_received(time_ms),
        None if sample.received > previous => {
            bus.counters.set_last_message_received(sample.time_ms)
        }
        None => {}
    }
}
