//! Rebate timing shifts
//!
//! Quarterly rebates are received in the last month of their quarter. A
//! timing shift moves each receipt by a number of months and re-buckets it
//! into the quarter it now lands in.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

const MONTHS_PER_YEAR: i64 = 12;
const MONTHS_PER_QUARTER: i64 = 3;

/// Rebate amounts received per plan-year quarter
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RebateSchedule {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub q4: f64,
}

impl RebateSchedule {
    pub fn from_quarters(quarters: [f64; 4]) -> Self {
        Self {
            q1: quarters[0],
            q2: quarters[1],
            q3: quarters[2],
            q4: quarters[3],
        }
    }

    pub fn quarters(&self) -> [f64; 4] {
        [self.q1, self.q2, self.q3, self.q4]
    }

    pub fn total(&self) -> f64 {
        self.quarters().iter().sum()
    }
}

/// What happens to a receipt shifted across the plan-year boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftMode {
    /// Wrap around into the other end of the plan year
    #[default]
    Rotate,
    /// Leave the plan year: the receipt no longer counts
    Defer,
}

impl FromStr for ShiftMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rotate" => Ok(ShiftMode::Rotate),
            "defer" => Ok(ShiftMode::Defer),
            other => Err(format!("unknown shift mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebateShift {
    pub rebates: RebateSchedule,
    /// PEPM delta: `(shifted total - original total) / member months`
    pub impact: f64,
}

/// Shift quarterly rebate receipts by `months` and report the PEPM impact
pub fn shift_rebates(
    schedule: &RebateSchedule,
    months: i32,
    mode: ShiftMode,
    member_months: f64,
) -> RebateShift {
    let mut shifted = [0.0; 4];

    for (quarter, amount) in schedule.quarters().into_iter().enumerate() {
        let received = quarter as i64 * MONTHS_PER_QUARTER + (MONTHS_PER_QUARTER - 1);
        let moved = received + i64::from(months);

        let month = match mode {
            ShiftMode::Rotate => moved.rem_euclid(MONTHS_PER_YEAR),
            ShiftMode::Defer if (0..MONTHS_PER_YEAR).contains(&moved) => moved,
            ShiftMode::Defer => continue,
        };
        shifted[(month / MONTHS_PER_QUARTER) as usize] += amount;
    }

    let rebates = RebateSchedule::from_quarters(shifted);
    let impact = if member_months > 0.0 {
        (rebates.total() - schedule.total()) / member_months
    } else {
        0.0
    };

    RebateShift { rebates, impact }
}
