//! Solver configurations.

use serde::{Deserialize, Serialize};
use wimp_core::{Error, Result};

pub(crate) fn validate_cl(cl: f64) -> Result<()> {
    if !(cl > 0.0 && cl < 1.0) {
        return Err(Error::Validation(format!("confidence level must be in (0,1), got {cl}")));
    }
    Ok(())
}

pub(crate) fn validate_background(b: f64) -> Result<()> {
    if !b.is_finite() || b < 0.0 {
        return Err(Error::Validation(format!("background must be finite and >= 0, got {b}")));
    }
    Ok(())
}

/// Configuration of the Newton-type limit solvers (Poisson, CLs, Jeffreys).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitConfig {
    /// Confidence level (default 0.9).
    pub cl: f64,
    /// Stop when `|residual| / (1 - cl) < tol` (default 1e-4).
    pub tol: f64,
    /// Iteration bound (default 200).
    pub max_iterations: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self { cl: 0.9, tol: 1e-4, max_iterations: 200 }
    }
}

impl LimitConfig {
    /// Same defaults at confidence level `cl`.
    pub fn with_cl(cl: f64) -> Self {
        Self { cl, ..Default::default() }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        validate_cl(self.cl)?;
        if !(self.tol > 0.0 && self.tol < 1.0) {
            return Err(Error::Validation(format!("tol must be in (0,1), got {}", self.tol)));
        }
        if self.max_iterations == 0 {
            return Err(Error::Validation("max_iterations must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Feldman-Cousins configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeldmanCousinsConfig {
    /// Confidence level (default 0.9).
    pub cl: f64,
    /// Width at which the binary searches on `s` stop (default 1e-2).
    pub search_tol: f64,
    /// Bound on doublings of the `n` range and of the upper `s` bracket.
    pub max_range_doublings: usize,
}

impl Default for FeldmanCousinsConfig {
    fn default() -> Self {
        Self { cl: 0.9, search_tol: 1e-2, max_range_doublings: 40 }
    }
}

impl FeldmanCousinsConfig {
    /// Same defaults at confidence level `cl`.
    pub fn with_cl(cl: f64) -> Self {
        Self { cl, ..Default::default() }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        validate_cl(self.cl)?;
        if !(self.search_tol > 0.0 && self.search_tol.is_finite()) {
            return Err(Error::Validation(format!(
                "search_tol must be finite and > 0, got {}",
                self.search_tol
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(LimitConfig::default().validate().is_ok());
        assert!(FeldmanCousinsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_cl() {
        assert!(LimitConfig::with_cl(1.0).validate().is_err());
        assert!(LimitConfig::with_cl(0.0).validate().is_err());
        assert!(FeldmanCousinsConfig::with_cl(f64::NAN).validate().is_err());
        assert!(validate_background(-0.1).is_err());
    }
}
