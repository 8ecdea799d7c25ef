//! Synthetic traffic feed.
//!
//! Lets the shipped binary render a live dashboard without a capture stack
//! attached, and gives integration tests a deterministic, seedable source.
//! Numbers follow a rough hot-key distribution so the screen looks like real
//! cache traffic rather than white noise.

use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{KeyRecord, ReportSnapshot, ReportSource, Stats, StatsSource};

/// Number of synthetic keys tracked by the feed.
const KEY_COUNT: usize = 24;

/// Seedable fake report source with shared pipeline counters.
pub struct SimulatedSource {
    rng: StdRng,
    /// Per-key cumulative request totals, index-aligned with key names.
    totals: Vec<u64>,
    /// Requests observed since the last window reset.
    window: Vec<u64>,
    stats: Arc<Mutex<Stats>>,
}

/// Cloneable read handle over the simulated pipeline counters.
#[derive(Clone)]
pub struct SimStats(Arc<Mutex<Stats>>);

impl StatsSource for SimStats {
    fn stats(&self) -> Stats {
        *self.0.lock()
    }
}

impl SimulatedSource {
    /// Create a feed from a fixed seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            totals: vec![0; KEY_COUNT],
            window: vec![0; KEY_COUNT],
            stats: Arc::new(Mutex::new(Stats::default())),
        }
    }

    /// Handle for the counter side of the seam.
    #[must_use]
    pub fn stats_handle(&self) -> SimStats {
        SimStats(Arc::clone(&self.stats))
    }

    /// Advance the synthetic pipeline by one accounting step.
    fn step(&mut self) {
        let mut stats = self.stats.lock();
        for (i, slot) in self.window.iter_mut().enumerate() {
            // Low-index keys are "hot": a crude Zipf-ish skew.
            let ceiling = 400 / (i as u64 + 1) + 1;
            let hits = self.rng.random_range(0..ceiling);
            *slot += hits;
            self.totals[i] += hits;
            stats.packets_received += hits * 2; // request + response
            stats.responses_parsed += hits;
        }
        if self.rng.random_range(0..10) == 0 {
            stats.packets_dropped_kernel += self.rng.random_range(0..3);
            stats.packets_dropped_parser += self.rng.random_range(0..2);
        }
    }
}

impl ReportSource for SimulatedSource {
    fn report(&mut self, reset_window: bool) -> ReportSnapshot {
        self.step();

        let counts: &[u64] = if reset_window {
            &self.window
        } else {
            &self.totals
        };
        let mut keys: Vec<KeyRecord> = counts
            .iter()
            .enumerate()
            .filter(|&(_, &requests)| requests > 0)
            .map(|(i, &requests)| KeyRecord {
                name: format!("get:cache:item:{i:04}"),
                requests_estimate: requests,
                size: 64 + (i as u64 * 37) % 1400,
                traffic_estimate: requests * (64 + (i as u64 * 37) % 1400),
            })
            .collect();
        keys.sort_by(|a, b| b.traffic_estimate.cmp(&a.traffic_estimate));

        if reset_window {
            self.window.iter_mut().for_each(|slot| *slot = 0);
        }

        ReportSnapshot {
            keys,
            timestamp: Local::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_first_report() {
        let a = SimulatedSource::new(7).report(true);
        let b = SimulatedSource::new(7).report(true);
        assert_eq!(a.keys, b.keys);
    }

    #[test]
    fn window_resets_after_interval_pull() {
        let mut source = SimulatedSource::new(1);
        source.report(true);
        assert!(source.window.iter().all(|&slot| slot == 0));

        // A cumulative pull leaves the window intact.
        source.report(false);
        source.report(false);
        assert!(source.window.iter().any(|&slot| slot > 0));
    }

    #[test]
    fn cumulative_totals_are_monotonic() {
        let mut source = SimulatedSource::new(2);
        let first: u64 = source.report(false).keys.iter().map(|k| k.requests_estimate).sum();
        let second: u64 = source.report(false).keys.iter().map(|k| k.requests_estimate).sum();
        assert!(second >= first);
    }

    #[test]
    fn stats_handle_sees_progress() {
        let mut source = SimulatedSource::new(3);
        let stats = source.stats_handle();
        let before = stats.stats().packets_received;
        source.report(true);
        assert!(stats.stats().packets_received >= before);
    }

    #[test]
    fn records_are_sorted_by_traffic() {
        let mut source = SimulatedSource::new(4);
        let rep = source.report(false);
        for pair in rep.keys.windows(2) {
            assert!(pair[0].traffic_estimate >= pair[1].traffic_estimate);
        }
    }
}
