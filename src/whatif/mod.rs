//! What-if scenario modeling
//!
//! Reversible percentage adjustments applied to a pre-aggregated baseline:
//! - Employee count adjustment with cost held constant ([`project`])
//! - Interactive session with apply/reset semantics ([`WhatIfSession`])
//! - Quarterly rebate timing shifts ([`shift_rebates`])
//! - Member-month flavour of the headcount adjustment ([`adjust_member_months`])

mod scenario;
mod session;
mod rebate;
mod member_months;

pub use scenario::{project, AdjustedValues, AdjustmentBounds, WhatIfScenario};
pub use session::{ScenarioView, WhatIfSession, WhatIfState};
pub use rebate::{shift_rebates, RebateSchedule, RebateShift, ShiftMode};
pub use member_months::{adjust_member_months, MemberMonthAdjustment, MemberMonthBase};
