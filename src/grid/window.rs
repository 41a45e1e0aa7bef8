//! Virtual scrolling: which slice of the flattened rows to render

use std::ops::Range;

/// Rows rendered above and below the viewport
pub const DEFAULT_BUFFER_ROWS: usize = 5;

/// The rows to render and where to place them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleWindow<'s, T> {
    pub rows: &'s [T],
    /// Index of `rows[0]` in the full sequence
    pub start: usize,
    /// One past the last rendered index
    pub end: usize,
    pub total_rows: usize,
    pub row_height: f64,
}

impl<'s, T> VisibleWindow<'s, T> {
    /// Height of the scrollable content, rendered or not
    pub fn total_height(&self) -> f64 {
        self.total_rows as f64 * self.row_height
    }

    /// Absolute top offset of the i-th rendered row
    pub fn top_of(&self, i: usize) -> f64 {
        (self.start + i) as f64 * self.row_height
    }

    /// Rendered rows paired with their absolute top offsets
    pub fn positioned(&self) -> impl Iterator<Item = (f64, &'s T)> + '_ {
        self.rows.iter().enumerate().map(move |(i, row)| (self.top_of(i), row))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Index range intersecting the viewport, widened by `buffer_rows` each way
///
/// Never longer than `ceil(viewport_height / row_height) + 2 * buffer_rows`.
/// Negative scroll is treated as 0; a non-positive row height yields `0..0`.
pub fn window_bounds(
    total_rows: usize,
    scroll_offset: f64,
    viewport_height: f64,
    row_height: f64,
    buffer_rows: usize,
) -> Range<usize> {
    if row_height <= 0.0 || !row_height.is_finite() {
        return 0..0;
    }

    let scroll = if scroll_offset.is_finite() { scroll_offset.max(0.0) } else { 0.0 };
    let viewport = if viewport_height.is_finite() { viewport_height.max(0.0) } else { 0.0 };

    let first_visible = (scroll / row_height).floor() as usize;
    let visible_count = (viewport / row_height).ceil() as usize;

    let start = first_visible.saturating_sub(buffer_rows).min(total_rows);
    let span = visible_count.saturating_add(buffer_rows.saturating_mul(2));
    let end = start.saturating_add(span).min(total_rows);

    start..end
}

/// Slice `rows` down to what the viewport needs at `scroll_offset`
pub fn visible_window<T>(
    rows: &[T],
    scroll_offset: f64,
    viewport_height: f64,
    row_height: f64,
    buffer_rows: usize,
) -> VisibleWindow<'_, T> {
    let range = window_bounds(rows.len(), scroll_offset, viewport_height, row_height, buffer_rows);
    VisibleWindow {
        rows: &rows[range.clone()],
        start: range.start,
        end: range.end,
        total_rows: rows.len(),
        row_height: if row_height.is_finite() && row_height > 0.0 { row_height } else { 0.0 },
    }
}
