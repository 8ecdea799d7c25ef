#![forbid(unsafe_code)]

//! snifftop — live terminal dashboard engine for streaming traffic-analysis
//! statistics.
//!
//! The crate owns the screen, nothing else. Three asynchronous event sources
//! (a refresh timer, an inbound log-message feed, and decoded user input) are
//! merged into one ordered update loop that maintains a small amount of
//! presentation state and repaints a fixed terminal-cell layout each pass.
//!
//! Capture, protocol parsing, and statistics computation live elsewhere and
//! are consumed through two narrow seams:
//! - [`source::ReportSource`] / [`source::StatsSource`] — point-in-time
//!   report snapshots plus read-only counters
//! - [`tui::backend::Backend`] — cell writing, size query, clear/flush/sync,
//!   and a blocking event stream with cooperative interrupt
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use snifftop::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use snifftop::core::config::DashboardConfig;
//! use snifftop::tui::runtime::run_dashboard;
//! ```

pub mod prelude;

pub mod core;
pub mod source;
pub mod tui;
