//! Expansion-aware flattening of the row tree

use std::collections::HashSet;

use super::row::GridRow;

/// A row in display order with its nesting depth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatRow<'a> {
    pub row: &'a GridRow,
    /// 0 for top-level periods
    pub level: usize,
}

impl<'a> FlatRow<'a> {
    pub fn id(&self) -> &'a str {
        &self.row.id
    }
}

/// Pre-order walk of `roots`, descending only into expanded rows
///
/// Children follow their parent immediately, in their original order, at
/// `level + 1`. Rows under a collapsed ancestor never appear.
pub fn flatten<'a, I>(roots: I, expanded: &HashSet<String>) -> Vec<FlatRow<'a>>
where
    I: IntoIterator<Item = &'a GridRow>,
{
    let mut stack: Vec<FlatRow<'a>> = roots
        .into_iter()
        .map(|row| FlatRow { row, level: 0 })
        .collect();
    stack.reverse();

    let mut out = Vec::with_capacity(stack.len());
    while let Some(flat) = stack.pop() {
        if flat.row.has_line_items() && expanded.contains(&flat.row.id) {
            stack.extend(
                flat.row
                    .line_items
                    .iter()
                    .rev()
                    .map(|row| FlatRow { row, level: flat.level + 1 }),
            );
        }
        out.push(flat);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Vec<GridRow> {
        let leaf = |id: &str| GridRow::new(id, id, 1.0, 1.0, 0.0);
        vec![
            leaf("jan").with_line_items(vec![
                leaf("jan-1").with_line_items(vec![leaf("jan-1-a")]),
                leaf("jan-2"),
            ]),
            leaf("feb").with_line_items(vec![leaf("feb-1")]),
            leaf("mar"),
        ]
    }

    fn ids(rows: &[FlatRow<'_>]) -> Vec<String> {
        rows.iter().map(|r| r.id().to_string()).collect()
    }

    fn expanded(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_collapsed_tree_shows_roots_only() {
        let rows = tree();
        let flat = flatten(&rows, &HashSet::new());
        assert_eq!(ids(&flat), vec!["jan", "feb", "mar"]);
        assert!(flat.iter().all(|r| r.level == 0));
    }

    #[test]
    fn test_expanded_children_follow_parent() {
        let rows = tree();
        let flat = flatten(&rows, &expanded(&["jan", "jan-1"]));
        assert_eq!(ids(&flat), vec!["jan", "jan-1", "jan-1-a", "jan-2", "feb", "mar"]);
        let levels: Vec<_> = flat.iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![0, 1, 2, 1, 0, 0]);
    }

    #[test]
    fn test_collapsed_ancestor_hides_expanded_descendant() {
        let rows = tree();
        let flat = flatten(&rows, &expanded(&["jan-1"]));
        assert!(!ids(&flat).contains(&"jan-1-a".to_string()));
    }

    #[test]
    fn test_unknown_and_leaf_ids_are_ignored() {
        let rows = tree();
        let flat = flatten(&rows, &expanded(&["mar", "nope"]));
        assert_eq!(flat.len(), 3);
    }
}
