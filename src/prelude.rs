//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use snifftop::prelude::*;
//! ```

// Core
pub use crate::core::config::DashboardConfig;
pub use crate::core::errors::{Result, SniffError};

// Sources
pub use crate::source::sim::SimulatedSource;
pub use crate::source::{KeyRecord, ReportSnapshot, ReportSource, Stats, StatsSource};

// TUI
pub use crate::tui::backend::{Backend, CrosstermBackend, EventSource, KeyInput, TermEvent};
pub use crate::tui::model::{DashboardModel, LogBuffer};
pub use crate::tui::harness::{FixedStats, ScriptedReport, TestBackend};
pub use crate::tui::runtime::run_dashboard;
