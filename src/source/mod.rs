//! Typed seams to the external traffic-analysis pipeline.
//!
//! The dashboard never computes statistics itself. It pulls immutable
//! [`ReportSnapshot`] values from a [`ReportSource`] on every refresh pass and
//! reads raw pipeline counters through [`StatsSource`]. Both traits are narrow
//! on purpose: the capture/parse/analysis stack behind them is replaceable
//! without touching the presentation engine.

use chrono::{DateTime, Local};

pub mod sim;

/// One aggregated record in a report, keyed by whatever the analysis stage
/// groups on (cache key, endpoint, flow label, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    /// Display name of the key.
    pub name: String,
    /// Estimated request count within the accounting window.
    pub requests_estimate: u64,
    /// Observed payload size in bytes.
    pub size: u64,
    /// Estimated bandwidth in bytes/sec.
    pub traffic_estimate: u64,
}

/// Immutable point-in-time copy of aggregated traffic statistics.
///
/// Records are in display order; the dashboard renders them as-is and never
/// re-sorts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSnapshot {
    /// Per-key records, display order.
    pub keys: Vec<KeyRecord>,
    /// When the snapshot was produced.
    pub timestamp: DateTime<Local>,
}

impl ReportSnapshot {
    /// An empty snapshot stamped now. Used before the first real pull.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            keys: Vec::new(),
            timestamp: Local::now(),
        }
    }
}

/// Read-only pipeline counters, pulled fresh on every render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Packets delivered by the capture layer.
    pub packets_received: u64,
    /// Packets dropped before capture handoff (kernel ring overflow).
    pub packets_dropped_kernel: u64,
    /// Packets dropped by the protocol parser stage.
    pub packets_dropped_parser: u64,
    /// Packets dropped by the analysis stage.
    pub packets_dropped_analysis: u64,
    /// Successfully parsed responses.
    pub responses_parsed: u64,
}

impl Stats {
    /// Total packets dropped across all stages.
    #[must_use]
    pub const fn dropped_total(&self) -> u64 {
        self.packets_dropped_kernel + self.packets_dropped_parser + self.packets_dropped_analysis
    }

    /// Drop rate as a fraction of received packets.
    ///
    /// Defined as exactly 0 when nothing was received, so the footer never
    /// divides by zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn drop_rate(&self) -> f64 {
        if self.packets_received == 0 {
            0.0
        } else {
            self.dropped_total() as f64 / self.packets_received as f64
        }
    }
}

/// Produces report snapshots on demand.
///
/// `reset_window` controls interval vs. cumulative accounting: when true, the
/// source resets its internal accumulation window after producing the
/// snapshot. The dashboard calls this every refresh tick *regardless of pause
/// state* so the window keeps resetting and unpausing never bursts stale
/// data; implementations must tolerate that cadence.
pub trait ReportSource {
    /// Produce a point-in-time snapshot.
    fn report(&mut self, reset_window: bool) -> ReportSnapshot;
}

/// Synchronous read-only access to pipeline counters. No side effects.
pub trait StatsSource {
    /// Current counter values.
    fn stats(&self) -> Stats;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_total_sums_all_stages() {
        let stats = Stats {
            packets_received: 100,
            packets_dropped_kernel: 3,
            packets_dropped_parser: 5,
            packets_dropped_analysis: 7,
            responses_parsed: 80,
        };
        assert_eq!(stats.dropped_total(), 15);
    }

    #[test]
    fn drop_rate_is_zero_without_traffic() {
        let stats = Stats {
            packets_received: 0,
            packets_dropped_kernel: 42,
            ..Stats::default()
        };
        assert_eq!(stats.drop_rate(), 0.0);
    }

    #[test]
    fn drop_rate_fraction() {
        let stats = Stats {
            packets_received: 100,
            packets_dropped_kernel: 10,
            packets_dropped_parser: 10,
            packets_dropped_analysis: 5,
            ..Stats::default()
        };
        assert!((stats.drop_rate() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_snapshot_has_no_keys() {
        assert!(ReportSnapshot::empty().keys.is_empty());
    }
}
