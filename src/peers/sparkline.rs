//! Sparkline geometry for a peer's monthly PEPM series

/// Normalise a series onto a 100x100 canvas, y pointing down
///
/// A flat series is drawn along the bottom edge; a single value sits at x = 0.
pub fn sparkline_points(data: &[f64]) -> Vec<(f64, f64)> {
    if data.is_empty() {
        return Vec::new();
    }

    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let range = if max - min == 0.0 { 1.0 } else { max - min };
    let last = (data.len() - 1).max(1) as f64;

    data.iter()
        .enumerate()
        .map(|(i, value)| {
            let x = i as f64 / last * 100.0;
            let y = 100.0 - (value - min) / range * 100.0;
            (x, y)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extremes_hit_canvas_edges() {
        let points = sparkline_points(&[10.0, 20.0, 15.0]);
        assert_eq!(points, vec![(0.0, 100.0), (50.0, 0.0), (100.0, 50.0)]);
    }

    #[test]
    fn test_flat_and_degenerate_series() {
        assert!(sparkline_points(&[]).is_empty());
        assert_eq!(sparkline_points(&[7.0, 7.0]), vec![(0.0, 100.0), (100.0, 100.0)]);
        assert_eq!(sparkline_points(&[3.0]), vec![(0.0, 100.0)]);
    }
}
