//! Scenario state and the derived-value algorithm

use serde::{Deserialize, Serialize};

/// Aggregated scenario state for one organization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatIfScenario {
    pub employee_count: u32,

    /// Pending headcount adjustment in percent (0 = baseline)
    #[serde(default)]
    pub employee_adjustment: f64,

    pub pepm_actual: f64,
    pub pepm_target: f64,

    /// Annual savings at the current headcount
    pub total_savings: f64,
}

impl WhatIfScenario {
    pub fn new(employee_count: u32, pepm_actual: f64, pepm_target: f64, total_savings: f64) -> Self {
        Self {
            employee_count,
            employee_adjustment: 0.0,
            pepm_actual,
            pepm_target,
            total_savings,
        }
    }

    /// Copy of this scenario with a different pending adjustment
    pub fn with_adjustment(mut self, employee_adjustment: f64) -> Self {
        self.employee_adjustment = employee_adjustment;
        self
    }

    pub fn is_baseline(&self) -> bool {
        self.employee_adjustment == 0.0
    }
}

/// Values derived from a scenario's pending adjustment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedValues {
    pub adjusted_employee_count: u32,
    pub employee_delta: i64,
    pub adjusted_pepm: f64,
    pub adjusted_savings: f64,
    pub savings_delta: f64,
}

/// Derive adjusted headcount, PEPM and savings
///
/// Total dollar cost is held constant and redistributed over the adjusted
/// headcount. With no remaining employees the PEPM is left unchanged.
pub fn project(scenario: &WhatIfScenario) -> AdjustedValues {
    let adjustment_factor = 1.0 + scenario.employee_adjustment / 100.0;
    let employee_count = f64::from(scenario.employee_count);

    // float-to-int casts saturate, so a negative product lands on 0
    let adjusted_employee_count = (employee_count * adjustment_factor).round() as u32;
    let employee_delta = i64::from(adjusted_employee_count) - i64::from(scenario.employee_count);

    let total_cost = scenario.pepm_actual * employee_count;
    let adjusted_pepm = if adjusted_employee_count > 0 {
        total_cost / f64::from(adjusted_employee_count)
    } else {
        scenario.pepm_actual
    };

    let adjusted_savings =
        (scenario.pepm_target - adjusted_pepm) * f64::from(adjusted_employee_count) * 12.0;
    let savings_delta = adjusted_savings - scenario.total_savings;

    AdjustedValues {
        adjusted_employee_count,
        employee_delta,
        adjusted_pepm,
        adjusted_savings,
        savings_delta,
    }
}

/// Allowed range and granularity of an adjustment request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for AdjustmentBounds {
    fn default() -> Self {
        Self {
            min: -5.0,
            max: 5.0,
            step: 0.1,
        }
    }
}

impl AdjustmentBounds {
    /// Clamp a raw request into range and onto the step grid (NaN becomes 0)
    pub fn normalize(&self, requested: f64) -> f64 {
        if requested.is_nan() {
            return 0.0;
        }
        let mut value = requested.clamp(self.min, self.max);
        if self.step > 0.0 {
            let snapped = (value / self.step).round() * self.step;
            // strip representation noise such as 0.30000000000000004
            value = ((snapped * 1e9).round() / 1e9).clamp(self.min, self.max);
        }
        // avoid a -0.0 that would print as "-0%"
        if value == 0.0 {
            0.0
        } else {
            value
        }
    }
}
