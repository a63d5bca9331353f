/// Rounding helpers for rating and score fields.
///
/// Ratings and percentage metrics are stored and reported to 2 decimals;
/// value scores and hour conversions to 1 decimal.

/// Round to 1 decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round1() {
        assert_eq!(round1(7.488), 7.5);
        assert_eq!(round1(3.333), 3.3);
        assert_eq!(round1(4.0), 4.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(4.666666), 4.67);
        assert_eq!(round2(95.0), 95.0);
        assert_eq!(round2(88.888), 88.89);
    }
}
