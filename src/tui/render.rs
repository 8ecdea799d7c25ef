//! Full-frame render pipeline.
//!
//! One [`render_pass`] produces one complete frame, in a fixed order: clear,
//! snapshot pull (with the pause policy applied), header, report body, footer
//! status line, log lines, flush. The pipeline is stateless given its inputs;
//! all placement goes through the layout module so every element scales with
//! the terminal.

use crossterm::style::Color;
use unicode_width::UnicodeWidthChar;

use crate::core::errors::Result;
use crate::source::{ReportSnapshot, ReportSource, Stats, StatsSource};
use crate::tui::backend::Backend;
use crate::tui::layout::{self, BODY_START_ROW, NUM_COLUMNS, STATUS_LINES};
use crate::tui::model::{DashboardModel, LogBuffer};

/// Draw one complete frame.
///
/// The snapshot is pulled every pass even while paused, so the source's
/// accumulation window keeps resetting and unpause never bursts stale data;
/// see [`DashboardModel::absorb`] for the retention rule.
pub fn render_pass<B, R, S>(
    backend: &mut B,
    model: &mut DashboardModel,
    report: &mut R,
    stats: &S,
    cumulative: bool,
) -> Result<()>
where
    B: Backend,
    R: ReportSource + ?Sized,
    S: StatsSource + ?Sized,
{
    backend.clear(Color::Reset, Color::Reset)?;

    let snapshot = report.report(!cumulative);
    model.absorb(snapshot);

    draw_header(backend);
    draw_report(backend, model.displayed.as_ref());
    draw_footer(backend, model.displayed.as_ref(), &stats.stats());
    draw_messages(backend, &model.log);

    backend.flush()
}

// ──────────────────── frame elements ────────────────────

fn draw_header<B: Backend>(backend: &mut B) {
    draw_text(backend, 0, 0, "Key");
    draw_text(backend, 8, 0, "Requests (est)");
    draw_text(backend, 9, 0, "Size");
    draw_text(backend, 10, 0, "Bandwidth (est)");
    draw_line(backend, 0, NUM_COLUMNS, 1, '-');
}

fn draw_report<B: Backend>(backend: &mut B, snapshot: Option<&ReportSnapshot>) {
    let Some(snapshot) = snapshot else { return };
    let (_, height) = backend.size();
    let last_y = layout::body_last_row(height);

    for (i, record) in snapshot.keys.iter().enumerate() {
        let Ok(offset) = u16::try_from(i) else { break };
        let y = BODY_START_ROW + offset;
        if y > last_y {
            break;
        }
        draw_text(backend, 0, y, &record.name);
        draw_text(backend, 8, y, &record.requests_estimate.to_string());
        draw_text(backend, 9, y, &record.size.to_string());
        draw_text(backend, 10, y, &record.traffic_estimate.to_string());
    }
}

fn draw_footer<B: Backend>(backend: &mut B, snapshot: Option<&ReportSnapshot>, stats: &Stats) {
    let (_, height) = backend.size();
    let y = layout::y_from_bottom(height, 0);

    let timestamp = snapshot.map_or_else(
        || "--:--:--.---".to_string(),
        |s| s.timestamp.format("%H:%M:%S%.3f").to_string(),
    );
    draw_text(backend, 0, y, &timestamp);
    draw_text(backend, 2, y, &drop_label(stats));
    draw_text(backend, 4, y, &format!("Packets: {:10}", stats.packets_received));
    draw_text(backend, 6, y, &format!("Responses: {:10}", stats.responses_parsed));
}

fn draw_messages<B: Backend>(backend: &mut B, log: &LogBuffer) {
    let (_, height) = backend.size();
    for (i, message) in log.iter().enumerate() {
        let Ok(offset) = u16::try_from(i) else { break };
        let y = layout::y_from_bottom(height, offset + STATUS_LINES);
        draw_text(backend, 0, y, message);
    }
}

/// Footer drop summary: per-stage drops, their total, and the total as a
/// percentage of packets received (0 when nothing was received).
fn drop_label(stats: &Stats) -> String {
    format!(
        "Dropped: {}+{}+{}={} ({:5.2}%)",
        stats.packets_dropped_kernel,
        stats.packets_dropped_parser,
        stats.packets_dropped_analysis,
        stats.dropped_total(),
        stats.drop_rate() * 100.0,
    )
}

// ──────────────────── cell-level text drawing ────────────────────

/// Draw text starting at a logical column, advancing by display width so
/// wide glyphs keep subsequent columns aligned.
fn draw_text<B: Backend>(backend: &mut B, col: u16, y: u16, text: &str) {
    let (width, _) = backend.size();
    let mut x = layout::column_x(width, col);
    for ch in text.chars() {
        backend.set_cell(x, y, ch, Color::Reset, Color::Reset);
        x += ch.width().unwrap_or(0) as u16;
    }
}

/// Fill the span between two logical columns with a repeated glyph.
fn draw_line<B: Backend>(backend: &mut B, col: u16, span: u16, y: u16, ch: char) {
    let (width, _) = backend.size();
    let step = ch.width().unwrap_or(1).max(1) as u16;
    let end = layout::column_x(width, col.saturating_add(span));
    let mut x = layout::column_x(width, col);
    while x < end {
        backend.set_cell(x, y, ch, Color::Reset, Color::Reset);
        x += step;
    }
}
