//! Build the row tree from flat period records

use std::collections::HashMap;

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::row::GridRow;
use crate::calculation::{calculate_pepm, calculate_variance, PepmInput};
use crate::error::GridError;

/// One validated input record: a period or a line item under `parent_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecord {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub month: String,
    pub total_claims: f64,
    pub member_months: f64,
    #[serde(default)]
    pub admin_fees: f64,
    #[serde(default)]
    pub stop_loss_recovery: f64,
    pub target_pepm: f64,
}

impl PeriodRecord {
    fn parent(&self) -> Option<&str> {
        self.parent_id.as_deref().filter(|p| !p.is_empty())
    }

    fn to_row(&self) -> Result<GridRow, GridError> {
        let input = PepmInput {
            total_claims: self.total_claims,
            member_months: self.member_months,
            admin_fees: self.admin_fees,
            stop_loss_recovery: self.stop_loss_recovery,
        };
        let pepm = calculate_pepm(&input).map_err(|source| GridError::Calculation {
            id: self.id.clone(),
            source,
        })?;
        let variance = calculate_variance(pepm.pepm_actual, self.target_pepm);

        Ok(GridRow::new(
            self.id.clone(),
            self.month.clone(),
            pepm.pepm_actual,
            self.target_pepm,
            variance.variance,
        ))
    }
}

/// Compute PEPM/variance for every record and nest line items under parents
///
/// Input order is kept among siblings. Fails on duplicate ids, parents that
/// do not exist or never reach a root, and invalid claims.
pub fn build_rows(records: &[PeriodRecord]) -> Result<Vec<GridRow>, GridError> {
    let rows: Vec<GridRow> = records
        .par_iter()
        .map(PeriodRecord::to_row)
        .collect::<Result<_, _>>()?;

    let mut index: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        if index.insert(record.id.as_str(), i).is_some() {
            return Err(GridError::DuplicateId(record.id.clone()));
        }
    }

    let mut roots = Vec::new();
    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, record) in records.iter().enumerate() {
        match record.parent() {
            None => roots.push(i),
            Some(parent) => match index.get(parent) {
                Some(&p) => children.entry(p).or_default().push(i),
                None => {
                    return Err(GridError::UnknownParent {
                        id: record.id.clone(),
                        parent_id: parent.to_string(),
                    })
                }
            },
        }
    }

    let mut slots: Vec<Option<GridRow>> = rows.into_iter().map(Some).collect();
    let tree: Vec<GridRow> = roots
        .iter()
        .filter_map(|&i| assemble(i, &mut slots, &children))
        .collect();

    // anything left over hangs off a parent cycle
    if let Some(i) = slots.iter().position(Option::is_some) {
        let record = &records[i];
        return Err(GridError::UnknownParent {
            id: record.id.clone(),
            parent_id: record.parent().unwrap_or_default().to_string(),
        });
    }

    debug!("built {} root rows from {} records", tree.len(), records.len());
    Ok(tree)
}

fn assemble(
    i: usize,
    slots: &mut [Option<GridRow>],
    children: &HashMap<usize, Vec<usize>>,
) -> Option<GridRow> {
    let mut row = slots[i].take()?;
    if let Some(kids) = children.get(&i) {
        row.line_items = kids
            .iter()
            .filter_map(|&k| assemble(k, slots, children))
            .collect();
    }
    Some(row)
}
