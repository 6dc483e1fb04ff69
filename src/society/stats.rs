//! Population statistics

/// Gini coefficient of a distribution of non-negative values
///
/// 0.0 for perfect equality, approaching 1.0 as one holder owns everything.
/// Empty, single-element and all-zero inputs give 0.0.
pub fn gini(values: &[f32]) -> f32 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mut sorted: Vec<f64> = values.iter().map(|v| v.max(0.0) as f64).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let sum: f64 = sorted.iter().sum();
    if sum <= 0.0 {
        return 0.0;
    }
    // G = (2 * sum(i * x_i)) / (n * sum) - (n + 1) / n, with 1-based ranks
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, x)| (i as f64 + 1.0) * x)
        .sum();
    let n = n as f64;
    let g = 2.0 * weighted / (n * sum) - (n + 1.0) / n;
    g.clamp(0.0, 1.0) as f32
}

pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Population variance
pub fn variance(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f32>() / values.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gini_equal_is_zero() {
        assert_eq!(gini(&[5.0, 5.0, 5.0, 5.0]), 0.0);
        assert_eq!(gini(&[]), 0.0);
        assert_eq!(gini(&[42.0]), 0.0);
        assert_eq!(gini(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_gini_concentrated() {
        // One of four holds everything: (n - 1) / n
        assert!((gini(&[0.0, 0.0, 0.0, 100.0]) - 0.75).abs() < 1e-5);
        // Order does not matter
        assert!((gini(&[100.0, 0.0, 0.0, 0.0]) - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_gini_known_value() {
        // 1,2,3,4: 2*(1+4+9+16)/(4*10) - 5/4 = 0.25
        assert!((gini(&[1.0, 2.0, 3.0, 4.0]) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_variance() {
        assert_eq!(variance(&[3.0, 3.0]), 0.0);
        assert!((variance(&[0.0, 100.0]) - 2500.0).abs() < 1e-3);
        assert_eq!(mean(&[]), 0.0);
    }
}
