//! Stateful grid: expansion, sort, cohort filter and scroll position

use std::cell::OnceCell;
use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use super::flatten::{flatten, FlatRow};
use super::row::{GridRow, SortColumn, SortDirection, SortSpec};
use super::sort::sort_rows;
use super::window::{visible_window, VisibleWindow, DEFAULT_BUFFER_ROWS};
use crate::calculation::VarianceDirection;
use crate::peers::CohortFilter;

/// Fixed geometry of the scrolling viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridLayout {
    pub row_height: f64,
    pub viewport_height: f64,
    pub buffer_rows: usize,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            row_height: 48.0,
            viewport_height: 600.0,
            buffer_rows: DEFAULT_BUFFER_ROWS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Focus,
    Advanced,
}

/// Footer figures; expanded/visible counts only in advanced mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSummary {
    pub total_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<usize>,
}

/// A flattened row as handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    pub id: String,
    pub month: String,
    #[serde(rename = "actualPEPM")]
    pub actual_pepm: f64,
    #[serde(rename = "targetPEPM")]
    pub target_pepm: f64,
    pub variance: f64,
    pub percent_diff: f64,
    pub direction: VarianceDirection,
    pub level: usize,
    pub has_line_items: bool,
    pub is_expanded: bool,
}

impl DisplayRow {
    fn from_flat(flat: &FlatRow<'_>, expanded: &HashSet<String>) -> Self {
        let row = flat.row;
        Self {
            id: row.id.clone(),
            month: row.month.clone(),
            actual_pepm: row.actual_pepm,
            target_pepm: row.target_pepm,
            variance: row.variance,
            percent_diff: row.percent_diff(),
            direction: VarianceDirection::from_variance(row.variance),
            level: flat.level,
            has_line_items: row.has_line_items(),
            is_expanded: row.has_line_items() && expanded.contains(&row.id),
        }
    }
}

/// Owns the row tree and its presentation state
///
/// The flattened, sorted sequence is computed lazily and kept until the
/// tree, expansion set, sort or filter changes. Scrolling never invalidates it.
#[derive(Debug, Clone, Default)]
pub struct GridModel {
    rows: Vec<GridRow>,
    expanded: HashSet<String>,
    sort: Option<SortSpec>,
    filter: Option<CohortFilter>,
    layout: GridLayout,
    view_mode: ViewMode,
    scroll_offset: f64,
    display: OnceCell<Vec<DisplayRow>>,
}

impl GridModel {
    pub fn new(rows: Vec<GridRow>) -> Self {
        Self::with_layout(rows, GridLayout::default())
    }

    pub fn with_layout(rows: Vec<GridRow>, layout: GridLayout) -> Self {
        Self {
            rows,
            layout,
            ..Default::default()
        }
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    /// Replace the tree; expansion state for ids that still exist is kept
    ///
    /// `toggle_expansion` does not check ids, so an unknown id counts toward
    /// `expanded_count` until the next `set_rows`.
    pub fn set_rows(&mut self, rows: Vec<GridRow>) {
        let mut present = HashSet::new();
        let mut stack: Vec<&GridRow> = rows.iter().collect();
        while let Some(row) = stack.pop() {
            present.insert(row.id.as_str());
            stack.extend(row.line_items.iter());
        }
        self.expanded.retain(|id| present.contains(id.as_str()));
        self.rows = rows;
        self.invalidate();
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn set_viewport_height(&mut self, viewport_height: f64) {
        self.layout.viewport_height = viewport_height;
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn expanded_count(&self) -> usize {
        self.expanded.len()
    }

    /// Flip one row's expansion; returns the new state
    pub fn toggle_expansion(&mut self, id: &str) -> bool {
        let now_expanded = if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        };
        self.invalidate();
        now_expanded
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
        self.invalidate();
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    /// Header click: same column flips direction, a new column starts ascending
    pub fn toggle_sort(&mut self, column: SortColumn) -> SortSpec {
        let next = match self.sort {
            Some(current) if current.column == column => SortSpec {
                column,
                direction: current.direction.flipped(),
            },
            _ => SortSpec {
                column,
                direction: SortDirection::Asc,
            },
        };
        self.set_sort(Some(next));
        next
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        if self.sort != sort {
            self.sort = sort;
            self.invalidate();
        }
    }

    /// Restrict root rows to a peer cohort; `None` shows every row
    pub fn set_filter(&mut self, filter: Option<CohortFilter>) {
        self.filter = filter;
        self.invalidate();
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn scroll_to(&mut self, scroll_offset: f64) {
        self.scroll_offset = scroll_offset;
    }

    /// The full flattened (and sorted, if a column is active) sequence
    pub fn display_rows(&self) -> &[DisplayRow] {
        self.display.get_or_init(|| self.compute())
    }

    /// Slice of [`display_rows`](Self::display_rows) at the current scroll position
    pub fn visible(&self) -> VisibleWindow<'_, DisplayRow> {
        visible_window(
            self.display_rows(),
            self.scroll_offset,
            self.layout.viewport_height,
            self.layout.row_height,
            self.layout.buffer_rows,
        )
    }

    pub fn summary(&self) -> GridSummary {
        let total_rows = self.display_rows().len();
        match self.view_mode {
            ViewMode::Focus => GridSummary {
                total_rows,
                expanded: None,
                visible: None,
            },
            ViewMode::Advanced => GridSummary {
                total_rows,
                expanded: Some(self.expanded.len()),
                visible: Some(self.visible().len()),
            },
        }
    }

    fn invalidate(&mut self) {
        self.display.take();
    }

    fn compute(&self) -> Vec<DisplayRow> {
        let roots = self
            .rows
            .iter()
            .filter(|row| self.filter.as_ref().map_or(true, |f| f.contains(&row.id)));
        let mut flat = flatten(roots, &self.expanded);

        if let Some(spec) = self.sort {
            sort_rows(&mut flat, spec.column, spec.direction);
        }

        debug!(
            "grid recomputed: {} rows, {} expanded, sort {:?}",
            flat.len(),
            self.expanded.len(),
            self.sort
        );

        flat.iter()
            .map(|flat| DisplayRow::from_flat(flat, &self.expanded))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn month_row(i: usize, actual: f64) -> GridRow {
        let month = chrono::NaiveDate::from_ymd_opt(2020 + (i / 12) as i32, (i % 12) as u32 + 1, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default();
        GridRow::new(format!("row-{}", i), month, actual, 200.0, actual - 200.0).with_line_items(
            (1..=3)
                .map(|n| GridRow::new(format!("row-{}-{}", i, n), format!("Line Item {}", n), actual / 3.0, 66.0, 0.0))
                .collect(),
        )
    }

    fn model(n: usize) -> GridModel {
        GridModel::new((0..n).map(|i| month_row(i, 180.0 + (i % 7) as f64 * 5.0)).collect())
    }

    fn ids(model: &GridModel) -> Vec<&str> {
        model.display_rows().iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_toggle_expansion_reflattens() {
        let mut grid = model(3);
        assert_eq!(ids(&grid), vec!["row-0", "row-1", "row-2"]);

        assert!(grid.toggle_expansion("row-1"));
        assert_eq!(ids(&grid), vec!["row-0", "row-1", "row-1-1", "row-1-2", "row-1-3", "row-2"]);
        assert_eq!(grid.display_rows()[2].level, 1);
        assert!(grid.display_rows()[1].is_expanded);

        assert!(!grid.toggle_expansion("row-1"));
        assert_eq!(ids(&grid).len(), 3);
    }

    #[test]
    fn test_set_rows_drops_stale_expansion() {
        let mut grid = model(3);
        grid.toggle_expansion("row-1");
        grid.toggle_expansion("row-2");
        grid.toggle_expansion("ghost");
        assert_eq!(grid.expanded_count(), 3);

        grid.set_rows((0..2).map(|i| month_row(i, 190.0)).collect());
        assert_eq!(grid.expanded_count(), 1);
        assert!(grid.is_expanded("row-1"));
        assert!(!grid.is_expanded("ghost"));
        assert_eq!(ids(&grid), vec!["row-0", "row-1", "row-1-1", "row-1-2", "row-1-3"]);
    }

    #[test]
    fn test_toggle_sort_cycles_direction() {
        let mut grid = model(3);
        assert_eq!(grid.toggle_sort(SortColumn::ActualPepm).direction, SortDirection::Asc);
        assert_eq!(grid.toggle_sort(SortColumn::ActualPepm).direction, SortDirection::Desc);
        assert_eq!(grid.toggle_sort(SortColumn::Month).direction, SortDirection::Asc);
    }

    #[test]
    fn test_sorted_by_month_desc() {
        let mut grid = model(3);
        grid.set_sort(Some(SortSpec {
            column: SortColumn::Month,
            direction: SortDirection::Desc,
        }));
        assert_eq!(ids(&grid), vec!["row-2", "row-1", "row-0"]);
    }

    #[test]
    fn test_sort_can_separate_children_from_parent() {
        let mut grid = model(2);
        grid.toggle_expansion("row-0");
        grid.set_sort(Some(SortSpec {
            column: SortColumn::ActualPepm,
            direction: SortDirection::Asc,
        }));
        let rows = ids(&grid);
        assert_eq!(&rows[..3], &["row-0-1", "row-0-2", "row-0-3"]);
    }

    #[test]
    fn test_cohort_filter_restricts_roots() {
        let mut grid = model(4);
        grid.toggle_expansion("row-2");
        grid.set_filter(Some(CohortFilter::from_ids(["row-2", "row-3"])));
        assert_eq!(ids(&grid), vec!["row-2", "row-2-1", "row-2-2", "row-2-3", "row-3"]);
        grid.set_filter(None);
        assert_eq!(ids(&grid).len(), 7);
    }

    #[test]
    fn test_visible_window_follows_scroll() {
        let mut grid = model(500);
        let window = grid.visible();
        assert_eq!(window.start, 0);
        assert_eq!(window.len(), 23);

        grid.scroll_to(48.0 * 100.0);
        let window = grid.visible();
        assert_eq!(window.start, 95);
        assert_eq!(window.rows[0].id, "row-95");
        assert_eq!(window.total_height(), 500.0 * 48.0);
    }

    #[test]
    fn test_summary_by_view_mode() {
        let mut grid = model(50);
        grid.toggle_expansion("row-0");
        grid.toggle_expansion("row-1");

        let focus = grid.summary();
        assert_eq!(focus.total_rows, 56);
        assert_eq!(focus.expanded, None);

        grid.set_view_mode(ViewMode::Advanced);
        let advanced = grid.summary();
        assert_eq!(advanced.expanded, Some(2));
        assert_eq!(advanced.visible, Some(23));
    }

    #[test]
    fn test_display_row_cells() {
        let grid = GridModel::new(vec![GridRow::new("z", "May 2024", 120.0, 0.0, 120.0)]);
        let row = &grid.display_rows()[0];
        assert_eq!(row.percent_diff, 0.0);
        assert_eq!(row.direction, VarianceDirection::Unfavorable);
        assert!(!row.has_line_items);
    }

    #[test]
    fn test_large_grid_within_budget() {
        let mut grid = model(2_000);
        for i in (0..2_000).step_by(2) {
            grid.toggle_expansion(&format!("row-{}", i));
        }
        let started = Instant::now();
        grid.toggle_sort(SortColumn::Variance);
        let total = grid.display_rows().len();
        grid.scroll_to(10_000.0);
        let window = grid.visible();
        assert_eq!(total, 2_000 + 1_000 * 3);
        assert!(window.len() <= 23);
        assert!(started.elapsed().as_millis() < 50);
    }
}
