//! Two-decimal rounding used across every reported metric

/// Round to 2 decimals, half away from zero
///
/// Matches how the dashboard has always displayed cents (`toFixed(2)`), so
/// negative values round symmetrically with positive ones.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(208.333333), 208.33);
        assert_eq!(round2(4.1666), 4.17);
        assert_eq!(round2(-8.3333), -8.33);
        assert_eq!(round2(150.0), 150.0);
    }

    #[test]
    fn test_round2_symmetric() {
        assert_eq!(round2(-4.1666), -round2(4.1666));
    }
}
