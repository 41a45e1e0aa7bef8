//! Display formatting for currency and percentages

use serde::{Deserialize, Serialize};

/// Unit of a raw monetary amount
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyUnit {
    #[default]
    Cents,
    Dollars,
}

impl CurrencyUnit {
    fn to_dollars(self, value: f64) -> f64 {
        match self {
            CurrencyUnit::Cents => value / 100.0,
            CurrencyUnit::Dollars => value,
        }
    }
}

fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format as USD, e.g. `$1,234` or `-$1,234.56`
///
/// Amounts of ten million dollars or more collapse to `$12.3M`. NaN and
/// infinities print as `$0`.
pub fn format_currency(value: f64, unit: CurrencyUnit, show_cents: bool) -> String {
    if !value.is_finite() {
        return "$0".to_string();
    }

    let dollars = unit.to_dollars(value);
    let abs = dollars.abs();

    if abs >= 10_000_000.0 {
        let sign = if dollars < 0.0 { "-" } else { "" };
        return format!("{}${:.1}M", sign, abs / 1_000_000.0);
    }

    let (whole, cents) = if show_cents {
        let total_cents = (abs * 100.0).round() as u64;
        (total_cents / 100, Some(total_cents % 100))
    } else {
        (abs.round() as u64, None)
    };

    let sign = if dollars < 0.0 && (whole > 0 || cents.is_some_and(|c| c > 0)) { "-" } else { "" };
    match cents {
        Some(c) => format!("{}${}.{:02}", sign, group_thousands(whole), c),
        None => format!("{}${}", sign, group_thousands(whole)),
    }
}

/// Compact form for tight columns: `$1.2B`, `$3.4M`, `$56K`, `$789`
pub fn format_compact_currency(value: f64, unit: CurrencyUnit) -> String {
    if !value.is_finite() {
        return "$0".to_string();
    }

    let dollars = unit.to_dollars(value);
    let abs = dollars.abs();
    let sign = if dollars < 0.0 { "-" } else { "" };

    if abs >= 1_000_000_000.0 {
        format!("{}${:.1}B", sign, abs / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{}${:.1}M", sign, abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{}${:.0}K", sign, abs / 1_000.0)
    } else {
        format_currency(dollars, CurrencyUnit::Dollars, false)
    }
}

/// Parse a formatted amount (`$1,234.56`, `$12.5M`) back into `unit`
///
/// Anything unparseable is 0.
pub fn parse_currency(text: &str, unit: CurrencyUnit) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();

    let (number, scale) = match cleaned.strip_suffix('M') {
        Some(rest) => (rest, 1_000_000.0),
        None => (cleaned.as_str(), 1.0),
    };
    let dollars = number.parse::<f64>().unwrap_or(0.0) * scale;

    match unit {
        CurrencyUnit::Cents => (dollars * 100.0).round(),
        CurrencyUnit::Dollars => dollars,
    }
}

/// Percentage with an explicit sign for positive values, e.g. `+2.5%`
pub fn format_signed_percent(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "0%".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+∞%" } else { "-∞%" }.to_string();
    }
    let sign = if value > 0.0 { "+" } else { "" };
    format!("{}{:.*}%", sign, decimals, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cents_input_by_default() {
        assert_eq!(format_currency(123_456.0, CurrencyUnit::default(), false), "$1,235");
        assert_eq!(format_currency(123_456.0, CurrencyUnit::Cents, true), "$1,234.56");
        assert_eq!(format_currency(-123_456.0, CurrencyUnit::Cents, true), "-$1,234.56");
    }

    #[test]
    fn test_dollar_grouping() {
        assert_eq!(format_currency(0.0, CurrencyUnit::Dollars, false), "$0");
        assert_eq!(format_currency(999.0, CurrencyUnit::Dollars, false), "$999");
        assert_eq!(format_currency(1_000.0, CurrencyUnit::Dollars, false), "$1,000");
        assert_eq!(format_currency(9_876_543.0, CurrencyUnit::Dollars, false), "$9,876,543");
    }

    #[test]
    fn test_large_amounts_collapse_to_millions() {
        assert_eq!(format_currency(12_345_678.0, CurrencyUnit::Dollars, false), "$12.3M");
        assert_eq!(format_currency(-25_000_000.0, CurrencyUnit::Dollars, true), "-$25.0M");
    }

    #[test]
    fn test_non_finite_is_zero() {
        assert_eq!(format_currency(f64::NAN, CurrencyUnit::Dollars, false), "$0");
        assert_eq!(format_compact_currency(f64::INFINITY, CurrencyUnit::Dollars), "$0");
    }

    #[test]
    fn test_compact() {
        assert_eq!(format_compact_currency(2_100_000_000.0, CurrencyUnit::Dollars), "$2.1B");
        assert_eq!(format_compact_currency(3_400_000.0, CurrencyUnit::Dollars), "$3.4M");
        assert_eq!(format_compact_currency(450_000.0, CurrencyUnit::Dollars), "$450K");
        assert_eq!(format_compact_currency(-450_000.0, CurrencyUnit::Dollars), "-$450K");
        assert_eq!(format_compact_currency(78_900.0, CurrencyUnit::Cents), "$789");
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("$1,234.56", CurrencyUnit::Cents), 123_456.0);
        assert_eq!(parse_currency("$12.5M", CurrencyUnit::Dollars), 12_500_000.0);
        assert_eq!(parse_currency("n/a", CurrencyUnit::Dollars), 0.0);
    }

    #[test]
    fn test_signed_percent() {
        assert_eq!(format_signed_percent(2.5, 1), "+2.5%");
        assert_eq!(format_signed_percent(-0.3, 1), "-0.3%");
        assert_eq!(format_signed_percent(0.0, 1), "0.0%");
        assert_eq!(format_signed_percent(f64::INFINITY, 1), "+∞%");
    }
}
