//! Headless backend and scripted sources for deterministic dashboard tests.
//!
//! [`TestBackend`] implements the full [`Backend`] contract over an in-memory
//! cell grid: no PTY, no terminal, no timing dependencies. Every handle is
//! cheaply cloneable and shares state, so a test can drive a dashboard loop
//! on one thread while asserting on frames from another. Embedders can use it
//! to snapshot-test their own report sources.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use crossterm::style::Color;
use parking_lot::Mutex;

use crate::core::errors::Result;
use crate::source::{ReportSnapshot, ReportSource, Stats, StatsSource};
use crate::tui::backend::{Backend, EventSource, TermEvent};

// ──────────────────── in-memory backend ────────────────────

#[derive(Debug)]
struct GridState {
    cols: u16,
    rows: u16,
    cells: HashMap<(u16, u16), char>,
}

impl GridState {
    fn render(&self) -> String {
        let mut out = String::new();
        for y in 0..self.rows {
            let mut line = String::new();
            for x in 0..self.cols {
                line.push(self.cells.get(&(x, y)).copied().unwrap_or(' '));
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

/// Cloneable in-memory terminal backend.
///
/// `set_cell` writes land in a shared grid; `flush` appends a text snapshot
/// of the grid to the frame log. Input events are scripted through
/// [`TestBackend::send`] and delivered to the forwarder thread exactly like
/// the production backend delivers decoded terminal input.
#[derive(Clone)]
pub struct TestBackend {
    grid: Arc<Mutex<GridState>>,
    frames: Arc<Mutex<Vec<String>>>,
    clear_calls: Arc<AtomicUsize>,
    flush_calls: Arc<AtomicUsize>,
    sync_calls: Arc<AtomicUsize>,
    init_calls: Arc<AtomicUsize>,
    close_calls: Arc<AtomicUsize>,
    interrupted: Arc<AtomicBool>,
    events_tx: Sender<TermEvent>,
    events_rx: Receiver<TermEvent>,
}

impl TestBackend {
    /// Create a backend with the given grid dimensions.
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            grid: Arc::new(Mutex::new(GridState {
                cols,
                rows,
                cells: HashMap::new(),
            })),
            frames: Arc::new(Mutex::new(Vec::new())),
            clear_calls: Arc::new(AtomicUsize::new(0)),
            flush_calls: Arc::new(AtomicUsize::new(0)),
            sync_calls: Arc::new(AtomicUsize::new(0)),
            init_calls: Arc::new(AtomicUsize::new(0)),
            close_calls: Arc::new(AtomicUsize::new(0)),
            interrupted: Arc::new(AtomicBool::new(false)),
            events_tx,
            events_rx,
        }
    }

    /// Queue a scripted event for the forwarder thread.
    pub fn send(&self, event: TermEvent) {
        let _ = self.events_tx.send(event);
    }

    /// Queue a plain character key press.
    pub fn send_key(&self, ch: char) {
        self.send(TermEvent::Key(crate::tui::backend::KeyInput::Char(ch)));
    }

    /// Change the reported terminal dimensions (no resize event is emitted;
    /// pair with [`TestBackend::send`] when the loop should react).
    pub fn set_size(&self, cols: u16, rows: u16) {
        let mut grid = self.grid.lock();
        grid.cols = cols;
        grid.rows = rows;
    }

    /// Current screen contents, one line per row, trailing blanks trimmed.
    #[must_use]
    pub fn screen_text(&self) -> String {
        self.grid.lock().render()
    }

    /// One screen row as text.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        let grid = self.grid.lock();
        let mut line = String::new();
        for x in 0..grid.cols {
            line.push(grid.cells.get(&(x, y)).copied().unwrap_or(' '));
        }
        line.trim_end().to_string()
    }

    /// Glyph at a cell, if one was written since the last clear.
    #[must_use]
    pub fn cell(&self, x: u16, y: u16) -> Option<char> {
        self.grid.lock().cells.get(&(x, y)).copied()
    }

    /// Snapshots captured at each flush, oldest first.
    #[must_use]
    pub fn frames(&self) -> Vec<String> {
        self.frames.lock().clone()
    }

    /// Number of `clear` calls so far.
    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.clear_calls.load(Ordering::SeqCst)
    }

    /// Number of `flush` calls so far.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        self.flush_calls.load(Ordering::SeqCst)
    }

    /// Number of `sync` calls so far.
    #[must_use]
    pub fn sync_count(&self) -> usize {
        self.sync_calls.load(Ordering::SeqCst)
    }

    /// Number of `init` calls so far.
    #[must_use]
    pub fn init_count(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    /// Number of `close` calls so far.
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

}

/// Block until `predicate` holds or `timeout` elapses. Returns whether the
/// predicate held. Keeps scripted tests free of fixed sleeps.
pub fn wait_until(timeout: Duration, mut predicate: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    predicate()
}

impl Backend for TestBackend {
    type Events = TestEvents;

    fn init(&mut self) -> Result<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&mut self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn size(&self) -> (u16, u16) {
        let grid = self.grid.lock();
        (grid.cols, grid.rows)
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, _fg: Color, _bg: Color) {
        let mut grid = self.grid.lock();
        if x < grid.cols && y < grid.rows {
            grid.cells.insert((x, y), ch);
        }
    }

    fn clear(&mut self, _fg: Color, _bg: Color) -> Result<()> {
        self.grid.lock().cells.clear();
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let snapshot = self.grid.lock().render();
        self.frames.lock().push(snapshot);
        self.flush_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        self.grid.lock().cells.clear();
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    fn events(&self) -> TestEvents {
        TestEvents {
            rx: self.events_rx.clone(),
            interrupted: Arc::clone(&self.interrupted),
        }
    }
}

/// Scripted event stream for the forwarder thread.
pub struct TestEvents {
    rx: Receiver<TermEvent>,
    interrupted: Arc<AtomicBool>,
}

impl EventSource for TestEvents {
    fn poll(&mut self) -> TermEvent {
        loop {
            if self.interrupted.load(Ordering::SeqCst) {
                return TermEvent::Interrupt;
            }
            match self.rx.recv_timeout(Duration::from_millis(5)) {
                Ok(event) => return event,
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                    return TermEvent::Interrupt;
                }
            }
        }
    }
}

// ──────────────────── scripted sources ────────────────────

/// Report source that replays a fixed snapshot and counts pulls.
pub struct ScriptedReport {
    snapshot: ReportSnapshot,
    pulls: Arc<AtomicUsize>,
}

impl ScriptedReport {
    /// Replay `snapshot` on every pull.
    #[must_use]
    pub fn new(snapshot: ReportSnapshot) -> Self {
        Self {
            snapshot,
            pulls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared pull counter, readable while the loop owns the source.
    #[must_use]
    pub fn pull_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.pulls)
    }

    /// Replace the snapshot served on subsequent pulls.
    pub fn set_snapshot(&mut self, snapshot: ReportSnapshot) {
        self.snapshot = snapshot;
    }
}

impl ReportSource for ScriptedReport {
    fn report(&mut self, _reset_window: bool) -> ReportSnapshot {
        self.pulls.fetch_add(1, Ordering::SeqCst);
        self.snapshot.clone()
    }
}

/// Stats source returning a fixed counter set.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStats(pub Stats);

impl StatsSource for FixedStats {
    fn stats(&self) -> Stats {
        self.0
    }
}
