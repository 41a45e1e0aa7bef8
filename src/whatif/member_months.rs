//! Headcount adjustment expressed on member months

use serde::{Deserialize, Serialize};

use super::scenario::AdjustmentBounds;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberMonthBase {
    pub pepm: f64,
    pub member_months: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberMonthAdjustment {
    pub member_months: f64,
    pub pepm: f64,
    /// Change in PEPM relative to the base
    pub impact: f64,
}

/// Scale member months by `pct` percent, holding total cost constant
pub fn adjust_member_months(base: &MemberMonthBase, pct: f64) -> MemberMonthAdjustment {
    let pct = AdjustmentBounds::default().normalize(pct);
    let member_months = (base.member_months * (1.0 + pct / 100.0)).round().max(0.0);

    let pepm = if member_months > 0.0 {
        base.total_cost / member_months
    } else {
        base.pepm
    };

    MemberMonthAdjustment {
        member_months,
        pepm,
        impact: pepm - base.pepm,
    }
}
