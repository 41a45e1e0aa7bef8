//! Grid row tree and sort descriptors

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::calculation::percent_diff;

/// One period (or line item) in the reporting grid
///
/// Rows are never mutated to reflect UI state; expansion lives in the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRow {
    pub id: String,
    /// Display label and sort key (e.g. "January 2024" or "Line Item 1")
    pub month: String,
    #[serde(rename = "actualPEPM")]
    pub actual_pepm: f64,
    #[serde(rename = "targetPEPM")]
    pub target_pepm: f64,
    pub variance: f64,
    #[serde(default, rename = "lineItems", skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<GridRow>,
}

impl GridRow {
    pub fn new(id: impl Into<String>, month: impl Into<String>, actual_pepm: f64, target_pepm: f64, variance: f64) -> Self {
        Self {
            id: id.into(),
            month: month.into(),
            actual_pepm,
            target_pepm,
            variance,
            line_items: Vec::new(),
        }
    }

    pub fn with_line_items(mut self, line_items: Vec<GridRow>) -> Self {
        self.line_items = line_items;
        self
    }

    pub fn has_line_items(&self) -> bool {
        !self.line_items.is_empty()
    }

    /// Percent difference cell (0 for a zero target)
    pub fn percent_diff(&self) -> f64 {
        percent_diff(self.actual_pepm, self.target_pepm)
    }

    /// Number of rows in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        1 + self.line_items.iter().map(GridRow::subtree_len).sum::<usize>()
    }
}

/// Sortable grid columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortColumn {
    #[serde(rename = "month")]
    Month,
    #[serde(rename = "actualPEPM")]
    ActualPepm,
    #[serde(rename = "targetPEPM")]
    TargetPepm,
    #[serde(rename = "variance")]
    Variance,
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "month" => Ok(SortColumn::Month),
            "actualpepm" | "actual" => Ok(SortColumn::ActualPepm),
            "targetpepm" | "target" => Ok(SortColumn::TargetPepm),
            "variance" => Ok(SortColumn::Variance),
            other => Err(format!("unknown sort column: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_diff_zero_target() {
        let row = GridRow::new("r", "January 2024", 120.0, 0.0, 120.0);
        assert_eq!(row.percent_diff(), 0.0);
    }

    #[test]
    fn test_subtree_len() {
        let row = GridRow::new("r", "January 2024", 1.0, 1.0, 0.0).with_line_items(vec![
            GridRow::new("r-1", "Line Item 1", 1.0, 1.0, 0.0)
                .with_line_items(vec![GridRow::new("r-1-a", "Detail", 1.0, 1.0, 0.0)]),
            GridRow::new("r-2", "Line Item 2", 1.0, 1.0, 0.0),
        ]);
        assert_eq!(row.subtree_len(), 4);
    }

    #[test]
    fn test_serde_field_names() {
        let json = r#"{"id":"row-0","month":"January 2024","actualPEPM":45000,"targetPEPM":50000,"variance":-5000}"#;
        let row: GridRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.actual_pepm, 45_000.0);
        assert!(!row.has_line_items());
        assert_eq!("actualPEPM".parse::<SortColumn>().unwrap(), SortColumn::ActualPepm);
    }
}
