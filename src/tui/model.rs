//! Presentation state for the dashboard.
//!
//! All display state lives in [`DashboardModel`]; only the event loop mutates
//! it. No I/O happens here, which keeps every state transition directly
//! testable.

use std::collections::VecDeque;

use crate::source::ReportSnapshot;
use crate::tui::layout::LOG_LINES;

// ──────────────────── rolling log ────────────────────

/// Bounded FIFO of recent operator-visible messages, oldest first.
///
/// Capacity equals the on-screen log region ([`LOG_LINES`] rows), so the
/// buffer is exactly "what fits on screen".
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(LOG_LINES as usize)
    }
}

impl LogBuffer {
    /// Create a buffer holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a message, evicting the oldest entry when full.
    pub fn push(&mut self, message: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(message.into());
    }

    /// Entries oldest-first (display order).
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of buffered messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no messages are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained messages.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

// ──────────────────── dashboard state ────────────────────

/// Pause flag, last displayed snapshot, and the rolling log.
#[derive(Debug, Clone, Default)]
pub struct DashboardModel {
    /// When true, refresh ticks stop replacing the displayed snapshot.
    pub paused: bool,
    /// Snapshot currently on screen. `None` until the first render pass.
    pub displayed: Option<ReportSnapshot>,
    /// Rolling operator-visible message window.
    pub log: LogBuffer,
}

impl DashboardModel {
    /// Apply the pause policy to a freshly pulled snapshot.
    ///
    /// Unpaused, the snapshot becomes the displayed one. Paused, it is
    /// dropped on the floor — the pull still happened, so the source's
    /// accumulation window reset and unpausing will not burst stale data.
    pub fn absorb(&mut self, snapshot: ReportSnapshot) {
        if !self.paused {
            self.displayed = Some(snapshot);
        }
    }

    /// Toggle the pause flag and log the transition for the operator.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        if self.paused {
            self.log.push("Updates paused");
        } else {
            self.log.push("Updates unpaused");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::KeyRecord;
    use chrono::Local;
    use proptest::prelude::*;

    fn snapshot(names: &[&str]) -> ReportSnapshot {
        ReportSnapshot {
            keys: names
                .iter()
                .map(|n| KeyRecord {
                    name: (*n).to_string(),
                    requests_estimate: 1,
                    size: 1,
                    traffic_estimate: 1,
                })
                .collect(),
            timestamp: Local::now(),
        }
    }

    #[test]
    fn log_keeps_arrival_order() {
        let mut log = LogBuffer::default();
        log.push("one");
        log.push("two");
        let entries: Vec<&str> = log.iter().collect();
        assert_eq!(entries, vec!["one", "two"]);
    }

    #[test]
    fn log_evicts_oldest_when_full() {
        let mut log = LogBuffer::default();
        for i in 0..6 {
            log.push(format!("msg {i}"));
        }
        let entries: Vec<&str> = log.iter().collect();
        assert_eq!(entries, vec!["msg 2", "msg 3", "msg 4", "msg 5"]);
    }

    #[test]
    fn absorb_replaces_snapshot_when_running() {
        let mut model = DashboardModel::default();
        model.absorb(snapshot(&["a"]));
        model.absorb(snapshot(&["b"]));
        assert_eq!(model.displayed.as_ref().unwrap().keys[0].name, "b");
    }

    #[test]
    fn absorb_discards_snapshot_while_paused() {
        let mut model = DashboardModel::default();
        model.absorb(snapshot(&["frozen"]));
        model.toggle_pause();
        model.absorb(snapshot(&["fresh"]));
        assert_eq!(model.displayed.as_ref().unwrap().keys[0].name, "frozen");
    }

    #[test]
    fn double_toggle_restores_flag_and_logs_twice() {
        let mut model = DashboardModel::default();
        model.toggle_pause();
        model.toggle_pause();
        assert!(!model.paused);
        let entries: Vec<&str> = model.log.iter().collect();
        assert_eq!(entries, vec!["Updates paused", "Updates unpaused"]);
    }

    proptest! {
        #[test]
        fn log_never_exceeds_capacity(messages in prop::collection::vec(".{0,20}", 0..64)) {
            let mut log = LogBuffer::default();
            for msg in &messages {
                log.push(msg.clone());
            }
            prop_assert!(log.len() <= log.capacity());

            // After overflow, exactly the most recent `capacity` messages
            // remain, in arrival order.
            let expected: Vec<&str> = messages
                .iter()
                .rev()
                .take(log.capacity())
                .rev()
                .map(String::as_str)
                .collect();
            let actual: Vec<&str> = log.iter().collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
