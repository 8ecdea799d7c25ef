//! End-to-end dashboard scenarios through the public `run_dashboard` API:
//! full lifecycle (init, forwarder handshake, teardown), input routing,
//! body truncation, and backend failure propagation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::unbounded;
use crossterm::style::Color;

use snifftop::core::config::DashboardConfig;
use snifftop::core::errors::{Result, SniffError};
use snifftop::source::{KeyRecord, ReportSnapshot};
use snifftop::tui::backend::{Backend, EventSource, KeyInput, TermEvent};
use snifftop::tui::harness::{wait_until, FixedStats, ScriptedReport, TestBackend};
use snifftop::tui::runtime::run_dashboard;

fn config(refresh_ms: u64) -> DashboardConfig {
    DashboardConfig {
        refresh_ms,
        ..DashboardConfig::default()
    }
}

fn snapshot(count: usize) -> ReportSnapshot {
    let mut snapshot = ReportSnapshot::empty();
    snapshot.keys = (0..count)
        .map(|i| KeyRecord {
            name: format!("key-{i:02}"),
            requests_estimate: 5,
            size: 128,
            traffic_estimate: 640,
        })
        .collect();
    snapshot
}

// ══════════════════════════════════════════════════════════════════
// Section 1: lifecycle
// ══════════════════════════════════════════════════════════════════

#[test]
fn quit_key_ends_loop_cleanly() {
    let mut backend = TestBackend::new(100, 24);
    backend.send_key('q');

    let mut report = ScriptedReport::new(snapshot(2));
    let stats = FixedStats::default();
    let (_tx, rx) = unbounded();

    let result = run_dashboard(&mut backend, &mut report, &stats, &config(1000), rx);
    assert!(result.is_ok(), "quit must not be reported as an error");
    assert_eq!(backend.init_count(), 1);
    assert_eq!(backend.close_count(), 1);
    // Startup frame rendered even though no tick ever fired.
    assert!(backend.flush_count() >= 1);
    assert!(backend.frames()[0].contains("key-00"));
}

#[test]
fn refresh_ticks_drive_renders() {
    let backend = TestBackend::new(100, 24);
    let mut report = ScriptedReport::new(snapshot(1));
    let pulls = report.pull_counter();
    let stats = FixedStats::default();
    let (_tx, rx) = unbounded();

    let mut loop_backend = backend.clone();
    let handle = thread::spawn(move || {
        run_dashboard(&mut loop_backend, &mut report, &stats, &config(5), rx)
    });

    assert!(wait_until(Duration::from_secs(2), || {
        backend.flush_count() >= 3
    }));
    assert!(pulls.load(Ordering::SeqCst) >= 3);

    backend.send_key('q');
    handle.join().unwrap().unwrap();
}

#[test]
fn messages_reach_the_rolling_log() {
    let backend = TestBackend::new(100, 24);
    let mut report = ScriptedReport::new(snapshot(0));
    let stats = FixedStats::default();
    let (tx, rx) = unbounded();
    tx.send("listener ready".to_string()).unwrap();

    let mut loop_backend = backend.clone();
    let handle = thread::spawn(move || {
        run_dashboard(&mut loop_backend, &mut report, &stats, &config(5), rx)
    });

    assert!(wait_until(Duration::from_secs(2), || {
        backend.screen_text().contains("listener ready")
    }));

    backend.send_key('q');
    handle.join().unwrap().unwrap();
}

// ══════════════════════════════════════════════════════════════════
// Section 2: input routing through the forwarder thread
// ══════════════════════════════════════════════════════════════════

#[test]
fn forced_redraw_invokes_sync_once() {
    let mut backend = TestBackend::new(100, 24);
    backend.send(TermEvent::Key(KeyInput::CtrlL));
    backend.send_key('q');

    let mut report = ScriptedReport::new(snapshot(1));
    let stats = FixedStats::default();
    let (_tx, rx) = unbounded();

    run_dashboard(&mut backend, &mut report, &stats, &config(1000), rx).unwrap();
    assert_eq!(backend.sync_count(), 1);
    // Startup render plus the forced repaint.
    assert!(backend.flush_count() >= 2);
}

#[test]
fn unbound_keys_never_disturb_the_loop() {
    let mut backend = TestBackend::new(100, 24);
    for ch in ['x', 'Z', '1', ' '] {
        backend.send_key(ch);
    }
    backend.send(TermEvent::Key(KeyInput::Other));
    backend.send_key('q');

    let mut report = ScriptedReport::new(snapshot(0));
    let stats = FixedStats::default();
    let (_tx, rx) = unbounded();

    run_dashboard(&mut backend, &mut report, &stats, &config(1000), rx).unwrap();
    assert_eq!(backend.sync_count(), 0);
}

#[test]
fn oversized_report_truncates_to_visible_rows() {
    // Height 12 leaves 5 body rows; 20 records must render exactly 5.
    let mut backend = TestBackend::new(100, 12);
    backend.send_key('q');

    let mut report = ScriptedReport::new(snapshot(20));
    let stats = FixedStats::default();
    let (_tx, rx) = unbounded();

    run_dashboard(&mut backend, &mut report, &stats, &config(1000), rx).unwrap();

    let frame = &backend.frames()[0];
    for key in 0..5 {
        assert!(frame.contains(&format!("key-{key:02}")), "missing row {key}");
    }
    assert!(!frame.contains("key-05"), "row beyond the body region leaked");
}

// ══════════════════════════════════════════════════════════════════
// Section 3: failure semantics
// ══════════════════════════════════════════════════════════════════

/// Wraps `TestBackend` and fails `flush` after a set number of calls.
struct FlakyBackend {
    inner: TestBackend,
    flushes: Arc<AtomicUsize>,
    fail_on: usize,
}

impl FlakyBackend {
    fn new(inner: TestBackend, fail_on: usize) -> Self {
        Self {
            inner,
            flushes: Arc::new(AtomicUsize::new(0)),
            fail_on,
        }
    }
}

impl Backend for FlakyBackend {
    type Events = <TestBackend as Backend>::Events;

    fn init(&mut self) -> Result<()> {
        self.inner.init()
    }

    fn close(&mut self) {
        self.inner.close();
    }

    fn size(&self) -> (u16, u16) {
        self.inner.size()
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, fg: Color, bg: Color) {
        self.inner.set_cell(x, y, ch, fg, bg);
    }

    fn clear(&mut self, fg: Color, bg: Color) -> Result<()> {
        self.inner.clear(fg, bg)
    }

    fn flush(&mut self) -> Result<()> {
        let n = self.flushes.fetch_add(1, Ordering::SeqCst) + 1;
        if n >= self.fail_on {
            return Err(SniffError::backend(
                "flush",
                std::io::Error::other("terminal went away"),
            ));
        }
        self.inner.flush()
    }

    fn sync(&mut self) -> Result<()> {
        self.inner.sync()
    }

    fn interrupt(&self) {
        self.inner.interrupt();
    }

    fn events(&self) -> Self::Events {
        self.inner.events()
    }
}

#[test]
fn flush_failure_aborts_with_backend_error_and_releases_terminal() {
    let grid = TestBackend::new(100, 24);
    let mut backend = FlakyBackend::new(grid.clone(), 1);

    let mut report = ScriptedReport::new(snapshot(1));
    let stats = FixedStats::default();
    let (_tx, rx) = unbounded();

    // The startup render pass already hits the failing flush.
    let err = run_dashboard(&mut backend, &mut report, &stats, &config(1000), rx).unwrap_err();
    assert_eq!(err.code(), "SNF-2001");

    // The terminal is still released and the forwarder unblocked.
    assert_eq!(grid.close_count(), 1);
    let mut events = grid.events();
    assert_eq!(events.poll(), TermEvent::Interrupt);
}
