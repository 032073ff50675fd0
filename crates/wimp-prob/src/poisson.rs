//! Poisson distribution utilities.
//!
//! The limit solvers evaluate `pmf(i, mu)` for every `i <= N` at each Newton
//! step, so the unchecked [`pmf`] is the hot path. [`logpmf`] and [`cdf`]
//! validate their inputs.

use statrs::function::factorial::ln_factorial;
use wimp_core::{Error, Result};

fn validate_mean(lambda: f64) -> Result<()> {
    if !lambda.is_finite() || lambda < 0.0 {
        return Err(Error::Validation(format!("lambda must be finite and >= 0, got {}", lambda)));
    }
    Ok(())
}

/// Log-PMF of Poisson(k | lambda).
///
/// `lambda = 0` is the degenerate distribution at `k = 0`.
pub fn logpmf(k: u64, lambda: f64) -> Result<f64> {
    validate_mean(lambda)?;
    if lambda == 0.0 {
        return Ok(if k == 0 { 0.0 } else { f64::NEG_INFINITY });
    }
    Ok(k as f64 * lambda.ln() - lambda - ln_factorial(k))
}

/// PMF of Poisson(k | mu) for a mean already known to be finite and `>= 0`.
#[inline]
pub fn pmf(k: u64, mu: f64) -> f64 {
    debug_assert!(mu.is_finite() && mu >= 0.0, "pmf: invalid mean {mu}");
    if mu == 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    (k as f64 * mu.ln() - mu - ln_factorial(k)).exp()
}

/// `P(X <= k)` for `X ~ Poisson(lambda)`, by direct summation.
pub fn cdf(k: u64, lambda: f64) -> Result<f64> {
    validate_mean(lambda)?;
    let s: f64 = (0..=k).map(|i| pmf(i, lambda)).sum();
    Ok(s.min(1.0))
}

/// `d/dmu P(X <= k)` written as `sum_{i<=k} (i/mu - 1) pmf(i, mu)`.
///
/// Equal to `-pmf(k, mu)`; the summed form is kept because the Newton
/// solvers evaluate it alongside the CDF in one pass. Requires `mu > 0`.
pub fn cdf_derivative(k: u64, mu: f64) -> f64 {
    debug_assert!(mu > 0.0);
    (0..=k).map(|i| (i as f64 / mu - 1.0) * pmf(i, mu)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_k0() {
        assert_relative_eq!(logpmf(0, 2.0).unwrap(), -2.0, epsilon = 1e-12);
        assert_relative_eq!(pmf(0, 2.0), (-2.0f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn test_zero_mean() {
        assert_eq!(pmf(0, 0.0), 1.0);
        assert_eq!(pmf(3, 0.0), 0.0);
        assert_eq!(logpmf(0, 0.0).unwrap(), 0.0);
        assert_eq!(cdf(0, 0.0).unwrap(), 1.0);
    }

    #[test]
    fn test_invalid_mean() {
        assert!(logpmf(1, -1.0).is_err());
        assert!(cdf(1, f64::NAN).is_err());
    }

    #[test]
    fn test_cdf_known_value() {
        // P(X <= 2 | 3) = e^-3 (1 + 3 + 4.5)
        let expected = (-3.0f64).exp() * 8.5;
        assert_relative_eq!(cdf(2, 3.0).unwrap(), expected, epsilon = 1e-14);
    }

    #[test]
    fn test_derivative_identity() {
        for (k, mu) in [(0u64, 0.5), (3, 2.5), (10, 7.0), (25, 40.0)] {
            assert_relative_eq!(cdf_derivative(k, mu), -pmf(k, mu), epsilon = 1e-12);
        }
    }

    proptest! {
        #[test]
        fn prop_pmf_sums_to_one(mu in 0.01f64..50.0) {
            let kmax = (mu + 20.0 * mu.sqrt() + 30.0) as u64;
            let total: f64 = (0..=kmax).map(|k| pmf(k, mu)).sum();
            prop_assert!((total - 1.0).abs() < 1e-9);
        }
    }
}
