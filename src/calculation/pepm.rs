//! Per-employee-per-month cost calculation

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::rounding::round2;
use crate::error::CalcError;

/// Share of claims attributed to medical spend in the breakdown
pub const MEDICAL_RATIO: f64 = 0.72;

/// Share of claims attributed to pharmacy spend in the breakdown
pub const RX_RATIO: f64 = 0.216;

/// Message carried by a result computed over zero member months
pub const ZERO_MEMBER_MONTHS_ERROR: &str = "Cannot calculate PEPM with zero member months";

/// Raw claims/membership inputs for one PEPM calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PepmInput {
    pub total_claims: f64,
    pub member_months: f64,
    #[serde(default)]
    pub admin_fees: f64,
    #[serde(default)]
    pub stop_loss_recovery: f64,
}

impl PepmInput {
    /// Claims and member months only; admin fees and stop-loss default to zero
    pub fn new(total_claims: f64, member_months: f64) -> Self {
        Self {
            total_claims,
            member_months,
            admin_fees: 0.0,
            stop_loss_recovery: 0.0,
        }
    }

    pub fn with_admin_fees(mut self, admin_fees: f64) -> Self {
        self.admin_fees = admin_fees;
        self
    }

    pub fn with_stop_loss_recovery(mut self, stop_loss_recovery: f64) -> Self {
        self.stop_loss_recovery = stop_loss_recovery;
        self
    }

    /// Human-readable echo of the inputs
    pub fn formula(&self) -> String {
        format!(
            "({} + {} - {}) / {}",
            self.total_claims, self.admin_fees, self.stop_loss_recovery, self.member_months
        )
    }

    fn validate(&self) -> Result<(), CalcError> {
        let fields = [
            ("totalClaims", self.total_claims),
            ("memberMonths", self.member_months),
            ("adminFees", self.admin_fees),
            ("stopLossRecovery", self.stop_loss_recovery),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(CalcError::NonFinite { field });
            }
        }
        if self.total_claims < 0.0 {
            return Err(CalcError::NegativeClaims(self.total_claims));
        }
        Ok(())
    }
}

/// Per-category PEPM components
///
/// Each component is derived independently from fixed ratios, so the parts
/// do not sum to `pepm_actual`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PepmBreakdown {
    pub medical: f64,
    pub rx: f64,
    pub admin: f64,
    /// Negative: stop-loss recovery offsets cost
    pub stop_loss: f64,
}

/// Result of a PEPM calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PepmResult {
    pub pepm_actual: f64,
    pub breakdown: PepmBreakdown,
    pub formula: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PepmResult {
    /// True when the result is a zero-member-month placeholder
    pub fn is_degenerate(&self) -> bool {
        self.error.is_some()
    }
}

/// Calculate PEPM and its category breakdown
///
/// Negative or non-finite inputs fail with [`CalcError`]. Zero (or negative)
/// member months is a valid state for a new group and yields a zero result
/// with `error` set.
pub fn calculate_pepm(input: &PepmInput) -> Result<PepmResult, CalcError> {
    input.validate()?;

    let formula = input.formula();

    if input.member_months <= 0.0 {
        warn!(
            "PEPM requested with {} member months (claims {})",
            input.member_months, input.total_claims
        );
        return Ok(PepmResult {
            pepm_actual: 0.0,
            breakdown: PepmBreakdown::default(),
            formula,
            error: Some(ZERO_MEMBER_MONTHS_ERROR.to_string()),
        });
    }

    let mm = input.member_months;
    let pepm_actual = round2(input.total_claims / mm);
    let breakdown = PepmBreakdown {
        medical: round2(input.total_claims * MEDICAL_RATIO / mm),
        rx: round2(input.total_claims * RX_RATIO / mm),
        admin: round2(input.admin_fees / mm),
        stop_loss: round2(-input.stop_loss_recovery / mm),
    };

    debug!("PEPM {} = {:.2}", formula, pepm_actual);

    Ok(PepmResult {
        pepm_actual,
        breakdown,
        formula,
        error: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::time::Instant;

    #[test]
    fn test_standard_inputs() {
        let input = PepmInput::new(2_500_000.0, 12_000.0)
            .with_admin_fees(50_000.0)
            .with_stop_loss_recovery(100_000.0);
        let result = calculate_pepm(&input).unwrap();

        assert_eq!(result.pepm_actual, 208.33);
        assert_abs_diff_eq!(result.breakdown.medical, 150.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.breakdown.rx, 45.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.breakdown.admin, 4.17, epsilon = 1e-9);
        assert_abs_diff_eq!(result.breakdown.stop_loss, -8.33, epsilon = 1e-9);
        assert_eq!(result.formula, "(2500000 + 50000 - 100000) / 12000");
        assert!(result.error.is_none());
    }

    #[test]
    fn test_breakdown_does_not_sum_to_total() {
        let input = PepmInput::new(2_500_000.0, 12_000.0)
            .with_admin_fees(50_000.0)
            .with_stop_loss_recovery(100_000.0);
        let result = calculate_pepm(&input).unwrap();
        let b = result.breakdown;
        let sum = b.medical + b.rx + b.admin + b.stop_loss;
        assert!((sum - result.pepm_actual).abs() > 1.0);
    }

    #[test]
    fn test_zero_member_months() {
        let result = calculate_pepm(&PepmInput::new(1_000_000.0, 0.0)).unwrap();
        assert_eq!(result.pepm_actual, 0.0);
        assert_eq!(result.breakdown, PepmBreakdown::default());
        assert_eq!(result.error.as_deref(), Some(ZERO_MEMBER_MONTHS_ERROR));
        assert_eq!(result.formula, "(1000000 + 0 - 0) / 0");
        assert!(result.is_degenerate());
    }

    #[test]
    fn test_negative_claims_rejected() {
        let err = calculate_pepm(&PepmInput::new(-1.0, 100.0)).unwrap_err();
        assert_eq!(err, CalcError::NegativeClaims(-1.0));
        assert_eq!(err.to_string(), "Total claims cannot be negative");
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = calculate_pepm(&PepmInput::new(100.0, f64::NAN)).unwrap_err();
        assert_eq!(err, CalcError::NonFinite { field: "memberMonths" });
    }

    #[test]
    fn test_pepm_matches_rounded_ratio() {
        for (claims, mm) in [(0.0, 1.0), (123_456.78, 321.0), (9_999_999.0, 77_777.0), (1.0, 3.0)] {
            let result = calculate_pepm(&PepmInput::new(claims, mm)).unwrap();
            assert!(result.error.is_none());
            assert_eq!(result.pepm_actual, round2(claims / mm));
        }
    }

    #[test]
    fn test_deserialize_defaults() {
        let input: PepmInput =
            serde_json::from_str(r#"{"totalClaims": 5000, "memberMonths": 10}"#).unwrap();
        assert_eq!(input.admin_fees, 0.0);
        assert_eq!(input.stop_loss_recovery, 0.0);
    }

    #[test]
    fn test_under_performance_budget() {
        let input = PepmInput::new(5_000_000.0, 25_000.0)
            .with_admin_fees(100_000.0)
            .with_stop_loss_recovery(200_000.0);
        let start = Instant::now();
        calculate_pepm(&input).unwrap();
        assert!(start.elapsed().as_millis() < 50);
    }
}
