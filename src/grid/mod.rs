//! Hierarchical reporting grid model
//!
//! Presents per-period PEPM rows (with nested line items) as a sortable,
//! expandable, virtually-scrolled sequence.
//!
//! # Pipeline
//!
//! 1. [`build_rows`]: period records to a row tree (PEPM + variance per row)
//! 2. [`flatten`]: tree to pre-order sequence honoring expansion state
//! 3. [`sort_rows`]: stable sort of the flattened sequence by one column
//! 4. [`visible_window`]: slice intersecting the viewport, plus buffer rows
//!
//! [`GridModel`] owns the tree and the UI state (expanded ids, sort, cohort
//! filter) and caches the result of steps 2–3 until that state changes.

mod row;
mod build;
mod flatten;
mod sort;
mod window;
mod model;

pub use row::{GridRow, SortColumn, SortDirection, SortSpec};
pub use build::{build_rows, PeriodRecord};
pub use flatten::{flatten, FlatRow};
pub use sort::{parse_month, sort_rows};
pub use window::{visible_window, window_bounds, VisibleWindow, DEFAULT_BUFFER_ROWS};
pub use model::{DisplayRow, GridLayout, GridModel, GridSummary, ViewMode};
