//! Decimal statistics helpers shared by the book and the indicator engine.
//!
//! Everything here stays in `Decimal`; prices and derived statistics never
//! round-trip through binary floating point.

use rust_decimal::{Decimal, RoundingStrategy};

/// Convergence tolerance for the Newton square root (1e-4).
const SQRT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Square root by Newton iteration.
///
/// Iterates `x <- (x + v/x) / 2` starting from `v` until successive
/// iterates differ by at most 1e-4. The tolerance is the termination
/// criterion; results are reproducible across runs. Non-positive input
/// yields zero.
pub fn sqrt_newton(value: Decimal) -> Decimal {
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut x = value;
    loop {
        let next = (x + value / x) / Decimal::TWO;
        if (next - x).abs() <= SQRT_TOLERANCE {
            return next;
        }
        x = next;
    }
}

/// Arithmetic mean; zero for an empty slice.
pub fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = values.iter().sum();
    sum / Decimal::from(values.len())
}

/// Population variance (divides by N); zero for an empty slice.
pub fn population_variance(values: &[Decimal], mean: Decimal) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = values.iter().map(|v| (*v - mean) * (*v - mean)).sum();
    sum / Decimal::from(values.len())
}

/// Population standard deviation; zero when fewer than two values.
pub fn population_std_dev(values: &[Decimal], mean: Decimal) -> Decimal {
    if values.len() < 2 {
        return Decimal::ZERO;
    }
    sqrt_newton(population_variance(values, mean))
}

/// Round half-up (away from zero at the midpoint) to `dp` fractional digits.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sqrt_exact_squares() {
        let root = sqrt_newton(dec!(144));
        assert!((root - dec!(12)).abs() <= dec!(0.0001));

        let root = sqrt_newton(dec!(2.25));
        assert!((root - dec!(1.5)).abs() <= dec!(0.0001));
    }

    #[test]
    fn test_sqrt_irrational_within_tolerance() {
        let root = sqrt_newton(dec!(2));
        assert!((root - dec!(1.41421356)).abs() < dec!(0.001));
    }

    #[test]
    fn test_sqrt_zero_and_negative() {
        assert_eq!(sqrt_newton(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(sqrt_newton(dec!(-4)), Decimal::ZERO);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), Decimal::ZERO);
        assert_eq!(mean(&[dec!(1), dec!(2), dec!(3)]), dec!(2));
    }

    #[test]
    fn test_population_variance() {
        // Values 2, 4, 6: mean 4, variance (4 + 0 + 4) / 3
        let values = [dec!(2), dec!(4), dec!(6)];
        let m = mean(&values);
        let var = population_variance(&values, m);
        assert!((var - dec!(2.6666666666666666666666666667)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_population_std_dev_requires_two_values() {
        assert_eq!(population_std_dev(&[dec!(5)], dec!(5)), Decimal::ZERO);

        let values = [dec!(1), dec!(5)];
        let sd = population_std_dev(&values, mean(&values));
        assert!((sd - dec!(2)).abs() <= dec!(0.0001));
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(dec!(100.245), 2), dec!(100.25));
        assert_eq!(round_half_up(dec!(100.244), 2), dec!(100.24));
        assert_eq!(round_half_up(dec!(0.125), 2), dec!(0.13));
    }
}
