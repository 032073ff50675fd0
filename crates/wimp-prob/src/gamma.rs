//! Gamma-function helpers used by the Bayesian limits.

use statrs::function::gamma::{gamma_lr, gamma_ur, ln_gamma};
use wimp_core::{Error, Result};

fn validate(a: f64, x: f64) -> Result<()> {
    if !a.is_finite() || a <= 0.0 {
        return Err(Error::Validation(format!("shape must be finite and > 0, got {}", a)));
    }
    if !x.is_finite() || x < 0.0 {
        return Err(Error::Validation(format!("x must be finite and >= 0, got {}", x)));
    }
    Ok(())
}

/// Regularized lower incomplete gamma `P(a, x)`.
pub fn regularized_lower(a: f64, x: f64) -> Result<f64> {
    validate(a, x)?;
    if x == 0.0 {
        return Ok(0.0);
    }
    Ok(gamma_lr(a, x))
}

/// Regularized upper incomplete gamma `Q(a, x) = 1 - P(a, x)`.
pub fn regularized_upper(a: f64, x: f64) -> Result<f64> {
    validate(a, x)?;
    if x == 0.0 {
        return Ok(1.0);
    }
    Ok(gamma_ur(a, x))
}

/// Gamma(shape=a, rate=1) density at `x > 0`: `x^{a-1} e^{-x} / Γ(a)`.
pub fn density_unit_rate(x: f64, a: f64) -> Result<f64> {
    validate(a, x)?;
    if x == 0.0 {
        return Ok(if a < 1.0 {
            f64::INFINITY
        } else if a == 1.0 {
            1.0
        } else {
            0.0
        });
    }
    Ok(((a - 1.0) * x.ln() - x - ln_gamma(a)).exp())
}
