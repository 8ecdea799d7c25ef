//! Terminal presentation engine.
//!
//! Seams are deliberately stable: `backend` (terminal contract), `layout`
//! (pure coordinates), `model` (presentation state), `input` (key routing),
//! `render` (frame pipeline), `runtime` (event-merging loop). Behavior can
//! evolve inside any of them without churning the others.

pub mod backend;
pub mod harness;
pub mod input;
pub mod layout;
pub mod model;
pub mod render;
pub mod runtime;

pub use runtime::run_dashboard;
