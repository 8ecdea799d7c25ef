//! Pure coordinate mapping for the fixed dashboard grid.
//!
//! The terminal width is divided into [`NUM_COLUMNS`] logical columns so
//! label positions scale proportionally on resize. Vertical addressing for
//! the footer and log region counts rows from the bottom of the screen, so
//! those rows stay glued to the bottom edge regardless of terminal height.

/// Logical columns across the terminal width.
pub const NUM_COLUMNS: u16 = 12;

/// Rows reserved for the footer status line.
pub const STATUS_LINES: u16 = 1;

/// Rows reserved for the rolling activity log (also the log capacity).
pub const LOG_LINES: u16 = 4;

/// First body row: header label row plus separator row sit above it.
pub const BODY_START_ROW: u16 = 2;

/// Absolute x coordinate of a logical column.
///
/// A column index at or beyond [`NUM_COLUMNS`] maps to the right edge.
#[must_use]
pub const fn column_x(width: u16, col: u16) -> u16 {
    if col >= NUM_COLUMNS {
        return width;
    }
    ((width as u32 * col as u32) / NUM_COLUMNS as u32) as u16
}

/// Absolute y coordinate of row `n` counted from the bottom edge.
///
/// Row 0 from bottom is the footer. Saturates at 0 for terminals shorter
/// than `n`.
#[must_use]
pub const fn y_from_bottom(height: u16, n: u16) -> u16 {
    height.saturating_sub(1).saturating_sub(n)
}

/// Last usable y coordinate for report body rows: everything below it is
/// reserved for the log region and the footer.
#[must_use]
pub const fn body_last_row(height: u16) -> u16 {
    y_from_bottom(height, STATUS_LINES + LOG_LINES)
}

/// How many report rows fit between the header and the reserved bottom
/// region. Zero on terminals too short to show any body.
#[must_use]
pub const fn max_body_rows(height: u16) -> u16 {
    let last = body_last_row(height);
    if last < BODY_START_ROW {
        0
    } else {
        last - BODY_START_ROW + 1
    }
}
