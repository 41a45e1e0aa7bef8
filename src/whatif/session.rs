//! Interactive what-if session: Baseline/Adjusted state machine
//!
//! A session owns three things: the snapshot it was created from, the
//! working scenario (baseline plus pending adjustment), and a revision
//! counter. Every mutation bumps the revision so a caller sitting behind a
//! debounce/dispatch layer can tell a stale view from the latest one.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::scenario::{project, AdjustedValues, AdjustmentBounds, WhatIfScenario};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WhatIfState {
    /// No pending adjustment
    Baseline,
    /// Non-zero adjustment pending
    Adjusted,
}

/// Working scenario plus its derived values at a given revision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioView {
    pub revision: u64,
    pub scenario: WhatIfScenario,
    pub adjusted: AdjustedValues,
}

/// Per-user what-if session
///
/// Not shared between callers; each interactive session owns one.
#[derive(Debug, Clone)]
pub struct WhatIfSession {
    original: WhatIfScenario,
    working: WhatIfScenario,
    bounds: AdjustmentBounds,
    revision: u64,
}

impl WhatIfSession {
    /// Start a session from an upstream scenario with default bounds
    pub fn new(initial: WhatIfScenario) -> Self {
        Self::with_bounds(initial, AdjustmentBounds::default())
    }

    pub fn with_bounds(initial: WhatIfScenario, bounds: AdjustmentBounds) -> Self {
        let initial = initial.with_adjustment(bounds.normalize(initial.employee_adjustment));
        Self {
            original: initial,
            working: initial,
            bounds,
            revision: 0,
        }
    }

    pub fn state(&self) -> WhatIfState {
        if self.working.is_baseline() {
            WhatIfState::Baseline
        } else {
            WhatIfState::Adjusted
        }
    }

    /// Snapshot supplied at session start
    pub fn original(&self) -> &WhatIfScenario {
        &self.original
    }

    /// Working scenario including any pending adjustment
    pub fn scenario(&self) -> &WhatIfScenario {
        &self.working
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn bounds(&self) -> &AdjustmentBounds {
        &self.bounds
    }

    /// Current view, recomputed from the working scenario
    pub fn view(&self) -> ScenarioView {
        ScenarioView {
            revision: self.revision,
            scenario: self.working,
            adjusted: project(&self.working),
        }
    }

    /// Whether a previously returned view still reflects the session
    pub fn is_current(&self, view: &ScenarioView) -> bool {
        view.revision == self.revision
    }

    /// Request a headcount adjustment in percent
    ///
    /// Out-of-range requests are clamped; the baseline is not touched.
    pub fn set_adjustment(&mut self, requested_pct: f64) -> ScenarioView {
        let pct = self.bounds.normalize(requested_pct);
        self.working.employee_adjustment = pct;
        self.revision += 1;
        debug!(
            "what-if adjustment {} (requested {}) at revision {}",
            pct, requested_pct, self.revision
        );
        self.view()
    }

    /// Fold the pending adjustment into the baseline
    ///
    /// Returns the new baseline, or `None` when nothing is pending.
    pub fn apply(&mut self) -> Option<WhatIfScenario> {
        if self.working.is_baseline() {
            return None;
        }
        let adjusted = project(&self.working);
        self.working = WhatIfScenario {
            employee_count: adjusted.adjusted_employee_count,
            employee_adjustment: 0.0,
            pepm_actual: adjusted.adjusted_pepm,
            pepm_target: self.working.pepm_target,
            total_savings: adjusted.adjusted_savings,
        };
        self.revision += 1;
        info!(
            "what-if applied: {} employees, PEPM {:.2}, savings {:.2}",
            self.working.employee_count, self.working.pepm_actual, self.working.total_savings
        );
        Some(self.working)
    }

    /// Discard everything and return to the session's original snapshot
    pub fn reset(&mut self) -> ScenarioView {
        self.working = self.original;
        self.revision += 1;
        info!("what-if reset to original snapshot");
        self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn baseline() -> WhatIfScenario {
        WhatIfScenario::new(1000, 500.0, 450.0, 600_000.0)
    }

    #[test]
    fn test_initial_state_is_baseline() {
        let session = WhatIfSession::new(baseline());
        assert_eq!(session.state(), WhatIfState::Baseline);
        assert_eq!(session.revision(), 0);
    }

    #[test]
    fn test_set_adjustment_does_not_touch_baseline() {
        let mut session = WhatIfSession::new(baseline());
        let view = session.set_adjustment(5.0);
        assert_eq!(session.state(), WhatIfState::Adjusted);
        assert_eq!(view.adjusted.adjusted_employee_count, 1050);
        assert_abs_diff_eq!(view.adjusted.adjusted_pepm, 476.19, epsilon = 0.005);
        assert_eq!(session.scenario().employee_count, 1000);
        assert_eq!(session.scenario().pepm_actual, 500.0);
    }

    #[test]
    fn test_out_of_range_clamped() {
        let mut session = WhatIfSession::new(baseline());
        let view = session.set_adjustment(25.0);
        assert_eq!(view.scenario.employee_adjustment, 5.0);
        let view = session.set_adjustment(-25.0);
        assert_eq!(view.scenario.employee_adjustment, -5.0);
    }

    #[test]
    fn test_latest_request_wins() {
        let mut session = WhatIfSession::new(baseline());
        let first = session.set_adjustment(2.0);
        let second = session.set_adjustment(-3.0);
        assert!(!session.is_current(&first));
        assert!(session.is_current(&second));
        assert_eq!(session.view(), second);
        assert_eq!(session.scenario().employee_adjustment, -3.0);
    }

    #[test]
    fn test_apply_commits_adjusted_values() {
        let mut session = WhatIfSession::new(baseline());
        let pre_apply = session.set_adjustment(5.0);
        let committed = session.apply().unwrap();

        assert_eq!(committed.employee_adjustment, 0.0);
        assert_eq!(committed.employee_count, pre_apply.adjusted.adjusted_employee_count);
        assert_eq!(committed.pepm_actual, pre_apply.adjusted.adjusted_pepm);
        assert_eq!(committed.total_savings, pre_apply.adjusted.adjusted_savings);
        assert_eq!(committed.pepm_target, 450.0);
        assert_eq!(session.state(), WhatIfState::Baseline);
        assert!(!session.is_current(&pre_apply));
    }

    #[test]
    fn test_apply_at_baseline_is_noop() {
        let mut session = WhatIfSession::new(baseline());
        assert!(session.apply().is_none());
        assert_eq!(session.revision(), 0);
        assert_eq!(*session.scenario(), baseline());
    }

    #[test]
    fn test_reset_restores_original_not_applied_baseline() {
        let mut session = WhatIfSession::new(baseline());
        session.set_adjustment(5.0);
        session.apply();
        session.set_adjustment(-2.0);
        let view = session.reset();

        assert_eq!(view.scenario, baseline());
        assert_eq!(session.state(), WhatIfState::Baseline);
    }

    #[test]
    fn test_reset_has_no_drift() {
        let mut session = WhatIfSession::new(baseline());
        for i in 0..500 {
            session.set_adjustment(((i % 101) as f64 - 50.0) / 10.0);
            if i % 7 == 0 {
                session.apply();
            }
        }
        session.reset();
        assert_eq!(*session.scenario(), *session.original());
        assert_eq!(*session.scenario(), baseline());
    }

    #[test]
    fn test_recompute_under_budget() {
        let mut session = WhatIfSession::new(baseline());
        let start = std::time::Instant::now();
        for step in -50..=50 {
            session.set_adjustment(step as f64 / 10.0);
        }
        assert!(start.elapsed().as_millis() < 50);
    }
}
