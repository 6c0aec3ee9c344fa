/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rounds to two decimal places, the precision used for reported metrics.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_mean_normal_values() {
        assert_eq!(mean(&[10.0, 20.0, 30.0]), 20.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(10.333333), 10.33);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(30.0), 30.0);
    }
}
