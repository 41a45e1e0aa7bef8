//! Column sorting of the flattened sequence

use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate};

use super::flatten::FlatRow;
use super::row::{SortColumn, SortDirection};

/// Parse a period label into the first day of its month
///
/// Accepts "January 2024", "Jan 2024", "2024-01", "2024-01-15" and "01/2024".
pub fn parse_month(label: &str) -> Option<NaiveDate> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }

    let candidates = [
        (format!("1 {}", label), "%d %B %Y"),
        (format!("{}-01", label), "%Y-%m-%d"),
        (label.to_string(), "%Y-%m-%d"),
        (format!("01/{}", label), "%d/%m/%Y"),
    ];

    candidates
        .iter()
        .find_map(|(text, fmt)| NaiveDate::parse_from_str(text, fmt).ok())
        .and_then(|date| date.with_day0(0))
}

#[derive(Debug, Clone, Copy)]
enum SortKey {
    Month(Option<NaiveDate>),
    Number(f64),
}

impl SortKey {
    fn of(row: &FlatRow<'_>, column: SortColumn) -> Self {
        match column {
            SortColumn::Month => SortKey::Month(parse_month(&row.row.month)),
            SortColumn::ActualPepm => SortKey::Number(row.row.actual_pepm),
            SortColumn::TargetPepm => SortKey::Number(row.row.target_pepm),
            SortColumn::Variance => SortKey::Number(row.row.variance),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            // unparseable labels sort after every date
            (SortKey::Month(a), SortKey::Month(b)) => match (a, b) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            _ => Ordering::Equal,
        }
    }
}

/// Stable sort of the flattened rows by one column
///
/// Equal keys keep their flattened order in both directions.
pub fn sort_rows(rows: &mut Vec<FlatRow<'_>>, column: SortColumn, direction: SortDirection) {
    let keys: Vec<SortKey> = rows.iter().map(|row| SortKey::of(row, column)).collect();
    let mut order: Vec<usize> = (0..rows.len()).collect();

    order.sort_by(|&a, &b| {
        let ord = keys[a].compare(&keys[b]);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    let sorted: Vec<FlatRow<'_>> = order.into_iter().map(|i| rows[i]).collect();
    *rows = sorted;
}
