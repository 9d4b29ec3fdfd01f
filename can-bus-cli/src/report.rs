//! Text rendering of lookup results and statistics reports

use can_bus_core::{CanBus, CatalogStats, StatsReport};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Render one statistics pass as a human readable block
pub fn render_stats(report: &StatsReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "── Statistics at {} ms ──", report.time_ms);

    for bus in &report.buses {
        let _ = writeln!(
            out,
            "  bus {}: {} total, {} received, {} dropped, {} KB ({})",
            bus.address,
            bus.total_messages,
            bus.received_messages,
            bus.dropped_messages,
            bus.received_data_kb,
            if bus.active { "active" } else { "inactive" }
        );
        let _ = writeln!(
            out,
            "         drop ratio {:.3} (avg {:.3}), throughput {:.2} KB/s",
            bus.drop_ratio, bus.average_drop_ratio, bus.average_throughput_kbps
        );
    }

    let total = &report.aggregate;
    let _ = writeln!(
        out,
        "  all buses: {} total, {} dropped, drop ratio {:.3}",
        total.total_messages, total.dropped_messages, total.drop_ratio
    );
    let _ = writeln!(
        out,
        "             {:.1} msgs/s, {:.1} dropped/s, {:.2} KB/s",
        total.message_rate, total.drop_rate, total.throughput_kbps
    );
    out
}

/// Header line stamped with wall-clock time
pub fn render_header(title: &str, generated_at: DateTime<Utc>) -> String {
    format!("{} ({})", title, generated_at.format("%Y-%m-%d %H:%M:%S UTC"))
}

pub fn render_catalog_stats(stats: &CatalogStats) -> String {
    format!(
        "Signals: {} ({} writable, {} states)\nCommands: {}",
        stats.num_signals, stats.num_writable_signals, stats.num_states, stats.num_commands
    )
}

/// One line per bus with its activity at `now_ms`
pub fn render_activity(buses: &[CanBus], now_ms: u64) -> String {
    let mut out = String::new();
    for bus in buses {
        let last = bus.counters.last_message_received();
        let state = if can_bus_core::is_active(bus, now_ms) {
            "active"
        } else {
            "inactive"
        };
        if last == 0 {
            let _ = writeln!(out, "  bus {}: {} (never received)", bus.address, state);
        } else {
            let _ = writeln!(
                out,
                "  bus {}: {} (last frame {} ms ago)",
                bus.address,
                state,
                now_ms.saturating_sub(last)
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use can_bus_core::BusStatsTracker;
    use chrono::TimeZone;

    #[test]
    fn test_render_stats() {
        let mut buses = vec![CanBus::new(1)];
        buses[0].counters.store(90, 10);
        let report = BusStatsTracker::new().aggregate(&mut buses, 5_000);

        let text = render_stats(&report);
        assert!(text.contains("Statistics at 5000 ms"));
        assert!(text.contains("bus 1: 100 total, 90 received, 10 dropped, 1 KB (inactive)"));
        assert!(text.contains("drop ratio 0.100"));
    }

    #[test]
    fn test_render_header() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(render_header("Replay", at), "Replay (2024-03-01 12:30:00 UTC)");
    }

    #[test]
    fn test_render_activity() {
        let buses = vec![CanBus::new(1), CanBus::new(2)];
        buses[1].counters.record_received(1_000);

        let text = render_activity(&buses, 3_000);
        assert!(text.contains("bus 1: inactive (never received)"));
        assert!(text.contains("bus 2: active (last frame 2000 ms ago)"));
    }
}
