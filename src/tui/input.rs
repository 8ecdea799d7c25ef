//! Key routing: terminal events to dashboard actions.
//!
//! The binding table is tiny and flat. Unbound events resolve to `None` and
//! are dropped by the event loop, never treated as errors — unknown keys and
//! future event types must stay harmless.

use crate::tui::backend::{KeyInput, TermEvent};

/// Actions the event loop knows how to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Toggle the pause flag and log the transition.
    TogglePause,
    /// Stop the loop normally.
    Quit,
    /// Repaint and ask the backend to repair external screen corruption.
    ForceRedraw,
    /// Repaint at the current terminal dimensions (resize arrived).
    Redraw,
}

/// Resolve a terminal event to an action, or `None` for anything unbound.
#[must_use]
pub const fn resolve_event(event: TermEvent) -> Option<InputAction> {
    match event {
        TermEvent::Key(KeyInput::Char('p')) => Some(InputAction::TogglePause),
        TermEvent::Key(KeyInput::Char('q')) => Some(InputAction::Quit),
        TermEvent::Key(KeyInput::CtrlL) => Some(InputAction::ForceRedraw),
        TermEvent::Resize { .. } => Some(InputAction::Redraw),
        TermEvent::Key(_) | TermEvent::Interrupt => None,
    }
}
