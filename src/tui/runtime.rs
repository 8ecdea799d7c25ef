//! Event-merging dashboard loop.
//!
//! One loop thread selects over exactly three channels — the refresh ticker,
//! the inbound message feed, and input events forwarded from a dedicated
//! poll thread — and is the only writer of presentation state and the only
//! caller of the render pipeline. Shutdown is a cooperative handshake:
//! interrupt the backend so the poll thread observes the sentinel and exits,
//! join it, and only then restore the terminal. That ordering holds on error
//! paths too, so a failed flush never strands a thread blocked on a dead
//! terminal handle.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded, never, select, tick};
use tracing::{debug, info, trace, warn};

use crate::core::config::DashboardConfig;
use crate::core::errors::{Result, SniffError};
use crate::source::{ReportSource, StatsSource};
use crate::tui::backend::{Backend, EventSource, TermEvent};
use crate::tui::input::{InputAction, resolve_event};
use crate::tui::model::DashboardModel;
use crate::tui::render;

/// Forwarded-input channel capacity. Keystrokes are rare; a small bound just
/// keeps a wedged loop from buffering input unboundedly.
const INPUT_CHANNEL_CAP: usize = 32;

/// Loop continuation decision after handling one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Run the dashboard until the user quits or the backend fails.
///
/// Acquires the terminal, spawns the input forwarder, runs the event loop,
/// and releases everything in the reverse order on every exit path. A `q`
/// keypress returns `Ok(())`; backend failures propagate as errors.
///
/// `messages` is the operator-visible log feed; each string lands in the
/// on-screen rolling log. The feed may be dropped by the producer at any
/// time without stopping the dashboard.
pub fn run_dashboard<B, R, S>(
    backend: &mut B,
    report: &mut R,
    stats: &S,
    config: &DashboardConfig,
    messages: Receiver<String>,
) -> Result<()>
where
    B: Backend,
    R: ReportSource,
    S: StatsSource,
{
    backend.init()?;
    info!(
        refresh_ms = config.refresh_ms,
        cumulative = config.cumulative,
        "dashboard starting"
    );

    let result = run_with_forwarder(backend, report, stats, config, messages);

    backend.close();
    match &result {
        Ok(()) => info!("dashboard stopped"),
        Err(err) => warn!(code = err.code(), %err, "dashboard aborted"),
    }
    result
}

/// Spawn the input forwarder, run the loop, and guarantee the
/// interrupt-then-join handshake before returning (and therefore before the
/// caller releases the terminal).
fn run_with_forwarder<B, R, S>(
    backend: &mut B,
    report: &mut R,
    stats: &S,
    config: &DashboardConfig,
    messages: Receiver<String>,
) -> Result<()>
where
    B: Backend,
    R: ReportSource,
    S: StatsSource,
{
    let (input_tx, input_rx) = bounded(INPUT_CHANNEL_CAP);
    let forwarder = spawn_forwarder(backend.events(), input_tx)?;

    let mut event_loop = EventLoop {
        backend,
        report,
        stats,
        cumulative: config.cumulative,
        model: DashboardModel::default(),
    };
    let result = event_loop.run(&tick(config.refresh()), messages, &input_rx);

    backend.interrupt();
    if forwarder.join().is_err() {
        warn!("input forwarder panicked during shutdown");
    }
    result
}

/// Background thread that blocks on the backend's event stream and forwards
/// decoded events until the interrupt sentinel (or a gone receiver).
fn spawn_forwarder<E: EventSource>(
    mut events: E,
    tx: Sender<TermEvent>,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("snifftop-input".to_string())
        .spawn(move || {
            loop {
                let event = events.poll();
                if event == TermEvent::Interrupt {
                    debug!("input forwarder interrupted");
                    break;
                }
                if tx.send(event).is_err() {
                    break;
                }
            }
        })
        .map_err(|e| SniffError::Runtime {
            details: format!("failed to spawn input forwarder: {e}"),
        })
}

/// The single consumer of all three event channels, and the single writer of
/// dashboard state.
struct EventLoop<'a, B, R, S> {
    backend: &'a mut B,
    report: &'a mut R,
    stats: &'a S,
    cumulative: bool,
    model: DashboardModel,
}

impl<B, R, S> EventLoop<'_, B, R, S>
where
    B: Backend,
    R: ReportSource,
    S: StatsSource,
{
    fn run(
        &mut self,
        ticker: &Receiver<std::time::Instant>,
        mut messages: Receiver<String>,
        input: &Receiver<TermEvent>,
    ) -> Result<()> {
        // First frame before the first tick, so the screen is never blank.
        self.render_pass()?;

        loop {
            select! {
                recv(ticker) -> _ => {
                    trace!("refresh tick");
                    self.render_pass()?;
                }
                recv(messages) -> msg => match msg {
                    Ok(msg) => {
                        debug!(message = %msg, "log message received");
                        // Picked up by the next refresh pass; a message by
                        // itself does not repaint.
                        self.model.log.push(msg);
                    }
                    Err(_) => {
                        debug!("message feed disconnected");
                        messages = never();
                    }
                },
                recv(input) -> event => {
                    let event = event.map_err(|_| SniffError::ChannelClosed {
                        component: "input",
                    })?;
                    if self.handle_input(event)? == Flow::Quit {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn handle_input(&mut self, event: TermEvent) -> Result<Flow> {
        match resolve_event(event) {
            Some(InputAction::TogglePause) => {
                self.model.toggle_pause();
                debug!(paused = self.model.paused, "pause toggled");
            }
            Some(InputAction::Quit) => {
                debug!("quit requested");
                return Ok(Flow::Quit);
            }
            Some(InputAction::ForceRedraw) => {
                debug!("forced redraw");
                // Wipe the physical screen first so the follow-up pass
                // repaints every cell over a known-clean surface.
                self.backend.sync()?;
                self.render_pass()?;
            }
            Some(InputAction::Redraw) => {
                trace!("resize redraw");
                self.render_pass()?;
            }
            None => trace!(?event, "unbound event ignored"),
        }
        Ok(Flow::Continue)
    }

    fn render_pass(&mut self) -> Result<()> {
        render::render_pass(
            self.backend,
            &mut self.model,
            self.report,
            self.stats,
            self.cumulative,
        )
    }
}
