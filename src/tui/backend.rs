//! Terminal backend contract and the crossterm production implementation.
//!
//! The engine only ever touches the terminal through [`Backend`]: cell
//! writes, size queries, clear/flush/sync, and a blocking decoded event
//! stream obtained via [`Backend::events`]. The event handle is `Send` so a
//! dedicated forwarder thread can block on [`EventSource::poll`] while the
//! event loop owns the drawing side; [`Backend::interrupt`] unblocks a
//! pending poll with the [`TermEvent::Interrupt`] sentinel so that thread can
//! exit before the terminal is restored.

use std::io::{self, Write};
use std::panic;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};

use crate::core::errors::{Result, SniffError};

// ──────────────────── event model ────────────────────

/// Decoded terminal input, reduced to what the dashboard reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermEvent {
    /// A key press.
    Key(KeyInput),
    /// The terminal was resized.
    Resize {
        /// New width in columns.
        cols: u16,
        /// New height in rows.
        rows: u16,
    },
    /// Sentinel delivered to a poll unblocked by [`Backend::interrupt`].
    Interrupt,
}

/// Key classification. Anything the dashboard does not bind decodes to
/// [`KeyInput::Other`] and is ignored upstream, which keeps unknown keys
/// forward-compatible instead of erroneous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// A plain printable character.
    Char(char),
    /// Ctrl-L: forced redraw and backend resynchronization.
    CtrlL,
    /// Any other key.
    Other,
}

// ──────────────────── contracts ────────────────────

/// Blocking decoded event stream, polled from a dedicated thread.
pub trait EventSource: Send + 'static {
    /// Block until the next event. Returns [`TermEvent::Interrupt`] once the
    /// owning backend has been interrupted.
    fn poll(&mut self) -> TermEvent;
}

/// Narrow terminal contract consumed by the render pipeline and event loop.
///
/// `set_cell` is an infallible write into the pending frame; the frame
/// reaches the physical terminal on `flush`. Errors from `init`, `clear`,
/// `flush`, and `sync` are fatal to the dashboard — an unusable terminal has
/// no recovery path.
pub trait Backend {
    /// Event-stream handle type for the forwarder thread.
    type Events: EventSource;

    /// Acquire the terminal (raw mode, alternate screen).
    fn init(&mut self) -> Result<()>;

    /// Release the terminal, restoring its prior mode. Best-effort; must be
    /// called only after the event forwarder has been interrupted.
    fn close(&mut self);

    /// Current (width, height) in cells.
    fn size(&self) -> (u16, u16);

    /// Write one glyph into the pending frame.
    fn set_cell(&mut self, x: u16, y: u16, ch: char, fg: Color, bg: Color);

    /// Clear the screen buffer to the given colors.
    fn clear(&mut self, fg: Color, bg: Color) -> Result<()>;

    /// Push the pending frame to the physical terminal.
    fn flush(&mut self) -> Result<()>;

    /// Re-synchronize with the physical terminal to repair external
    /// corruption; the caller re-renders immediately afterwards.
    fn sync(&mut self) -> Result<()>;

    /// Unblock a pending [`EventSource::poll`] with the interrupt sentinel.
    fn interrupt(&self);

    /// Create the event-stream handle for the forwarder thread.
    fn events(&self) -> Self::Events;
}

// ──────────────────── crossterm implementation ────────────────────

/// Raw-mode flag checked by the panic hook so a panicking process still
/// restores the operator's terminal before the backtrace prints.
static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

const ALT_SCREEN_LEAVE: &[u8] = b"\x1b[?1049l";
const CURSOR_SHOW: &[u8] = b"\x1b[?25h";

/// How often a blocked poll wakes to check the interrupt flag.
const POLL_SLICE: Duration = Duration::from_millis(100);

/// Production backend over crossterm: queued `MoveTo` + `Print` cell writes
/// into an in-memory frame buffer, flushed to stdout per frame.
pub struct CrosstermBackend {
    /// Pending frame bytes (escape sequences + glyphs).
    frame: Vec<u8>,
    interrupted: Arc<AtomicBool>,
    active: bool,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    /// Create an inactive backend; [`Backend::init`] acquires the terminal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frame: Vec::with_capacity(16 * 1024),
            interrupted: Arc::new(AtomicBool::new(false)),
            active: false,
        }
    }
}

impl Backend for CrosstermBackend {
    type Events = CrosstermEvents;

    fn init(&mut self) -> Result<()> {
        terminal::enable_raw_mode().map_err(|e| SniffError::backend("init", e))?;
        execute!(io::stdout(), EnterAlternateScreen, Hide)
            .map_err(|e| SniffError::backend("init", e))?;
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);
        self.active = true;

        // Restore the terminal before the default panic message prints, so
        // the backtrace lands on a readable screen.
        let prev = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal_best_effort();
            prev(info);
        }));

        Ok(())
    }

    fn close(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        RAW_MODE_ACTIVE.store(false, Ordering::SeqCst);
        let _ = panic::take_hook();
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }

    fn size(&self) -> (u16, u16) {
        terminal::size().unwrap_or((80, 24))
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, fg: Color, bg: Color) {
        // Writes into a Vec cannot fail.
        let _ = queue!(
            self.frame,
            MoveTo(x, y),
            SetForegroundColor(fg),
            SetBackgroundColor(bg),
            Print(ch)
        );
    }

    fn clear(&mut self, fg: Color, bg: Color) -> Result<()> {
        queue!(
            self.frame,
            SetForegroundColor(fg),
            SetBackgroundColor(bg),
            Clear(ClearType::All)
        )
        .map_err(|e| SniffError::backend("clear", e))
    }

    fn flush(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        stdout
            .write_all(&self.frame)
            .and_then(|()| stdout.flush())
            .map_err(|e| SniffError::backend("flush", e))?;
        self.frame.clear();
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        // crossterm keeps no internal cell model to reconcile: wipe the
        // physical screen immediately so the caller's follow-up render pass
        // repaints every cell from scratch.
        self.frame.clear();
        execute!(io::stdout(), Clear(ClearType::Purge), Clear(ClearType::All))
            .map_err(|e| SniffError::backend("sync", e))
    }

    fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    fn events(&self) -> CrosstermEvents {
        CrosstermEvents {
            interrupted: Arc::clone(&self.interrupted),
        }
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        self.close();
    }
}

/// Blocking event reader handed to the forwarder thread.
pub struct CrosstermEvents {
    interrupted: Arc<AtomicBool>,
}

impl EventSource for CrosstermEvents {
    fn poll(&mut self) -> TermEvent {
        loop {
            if self.interrupted.load(Ordering::SeqCst) {
                return TermEvent::Interrupt;
            }
            // Short poll slices keep interrupt latency bounded without
            // burning CPU between keystrokes.
            if !event::poll(POLL_SLICE).unwrap_or(false) {
                continue;
            }
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    return TermEvent::Key(decode_key(key.code, key.modifiers));
                }
                Ok(Event::Resize(cols, rows)) => return TermEvent::Resize { cols, rows },
                // Mouse, focus, paste, key releases: not bound.
                Ok(_) => {}
                // A failed read means the terminal handle is going away;
                // behave as if interrupted so the forwarder can exit.
                Err(_) => return TermEvent::Interrupt,
            }
        }
    }
}

fn decode_key(code: KeyCode, modifiers: KeyModifiers) -> KeyInput {
    match code {
        KeyCode::Char('l' | 'L') if modifiers.contains(KeyModifiers::CONTROL) => KeyInput::CtrlL,
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => KeyInput::Char(c),
        _ => KeyInput::Other,
    }
}

fn restore_terminal_best_effort() {
    if RAW_MODE_ACTIVE.swap(false, Ordering::SeqCst) {
        let _ = terminal::disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = stdout.write_all(ALT_SCREEN_LEAVE);
        let _ = stdout.write_all(CURSOR_SHOW);
        let _ = stdout.flush();
    }
}
