//! Gaussian log-densities.

use wimp_core::{Error, Result};

/// `0.5 * ln(2π)`.
const HALF_LN_TWO_PI: f64 = 0.918_938_533_204_672_7;

fn check_width(sigma: f64) -> Result<()> {
    if sigma.is_finite() && sigma > 0.0 {
        return Ok(());
    }
    Err(Error::Validation(format!("normal width must be finite and > 0, got {sigma}")))
}

/// `ln N(x | mu, sigma)`.
pub fn logpdf(x: f64, mu: f64, sigma: f64) -> Result<f64> {
    check_width(sigma)?;
    let t = (x - mu) / sigma;
    Ok(-0.5 * t * t - sigma.ln() - HALF_LN_TWO_PI)
}

/// Log-PDF of an isotropic 3D normal with per-component width `sigma`,
/// evaluated at offset `d = x - mean`.
///
/// With `sigma = v0/sqrt(2)` this is the un-truncated Maxwell-Boltzmann
/// shape `(π v0²)^{-3/2} exp(-|d|²/v0²)`.
pub fn logpdf_isotropic3(d: [f64; 3], sigma: f64) -> Result<f64> {
    check_width(sigma)?;
    let r2 = d[0] * d[0] + d[1] * d[1] + d[2] * d[2];
    Ok(-0.5 * r2 / (sigma * sigma) - 3.0 * (sigma.ln() + HALF_LN_TWO_PI))
}
