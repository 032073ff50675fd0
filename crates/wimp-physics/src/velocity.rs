//! Truncated Maxwell-Boltzmann halo velocity distribution.
//!
//! `f(v) = norm * exp(-|v + vE|^2 / v0^2)` for `|v + vE| < vesc`, zero
//! otherwise. `v` is the WIMP velocity in the lab frame and `vE` the velocity
//! of the lab through the halo, so `v + vE` is the galactic-frame velocity.

use nalgebra::Vector3;
use rand::Rng;
use statrs::function::erf::erf;
use wimp_core::{Error, Result};

use crate::params::ParameterUpdate;

/// Result of a Monte-Carlo normalization run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloNormalization {
    /// Estimated integral of the un-normalized density.
    pub integral: f64,
    /// Standard error of `integral`.
    pub std_error: f64,
    /// Number of points used.
    pub n_points: usize,
}

/// Truncated Maxwell-Boltzmann velocity distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityDistribution {
    v0: f64,
    vesc: f64,
    v_earth: Vector3<f64>,
    norm: f64,
    needs_norm: bool,
}

pub(crate) fn validate_speed(name: &str, v: f64) -> Result<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(Error::Validation(format!("{name} must be finite and > 0, got {v}")));
    }
    Ok(())
}

impl VelocityDistribution {
    /// Create a normalized distribution.
    pub fn new(v0: f64, vesc: f64, v_earth: Vector3<f64>) -> Result<Self> {
        validate_speed("v0", v0)?;
        validate_speed("vesc", vesc)?;
        if !v_earth.iter().all(|c| c.is_finite()) {
            return Err(Error::Validation(format!("vE must be finite, got {v_earth:?}")));
        }
        let mut dist = Self { v0, vesc, v_earth, norm: f64::NAN, needs_norm: true };
        dist.normalize();
        Ok(dist)
    }

    /// Dispersion velocity.
    pub fn v0(&self) -> f64 {
        self.v0
    }

    /// Galactic escape velocity.
    pub fn vesc(&self) -> f64 {
        self.vesc
    }

    /// Velocity of the lab frame through the halo.
    pub fn v_earth(&self) -> &Vector3<f64> {
        &self.v_earth
    }

    /// Normalization constant.
    pub fn norm(&self) -> f64 {
        self.norm
    }

    /// `true` between a `v0`/`vesc` change and the next normalization.
    pub fn needs_normalization(&self) -> bool {
        self.needs_norm
    }

    /// Truncated density at lab-frame velocity `v`.
    #[inline]
    pub fn density(&self, v: &Vector3<f64>) -> f64 {
        debug_assert!(!self.needs_norm, "density evaluated before normalization");
        let u2 = (v + self.v_earth).norm_squared();
        if u2 >= self.vesc * self.vesc {
            return 0.0;
        }
        self.norm * (-u2 / (self.v0 * self.v0)).exp()
    }

    /// Density without the escape-velocity cutoff (same normalization).
    #[inline]
    pub fn density_unbounded(&self, v: &Vector3<f64>) -> f64 {
        debug_assert!(!self.needs_norm, "density evaluated before normalization");
        let u2 = (v + self.v_earth).norm_squared();
        self.norm * (-u2 / (self.v0 * self.v0)).exp()
    }

    /// Integral of `exp(-|u|^2/v0^2)` over the ball `|u| < vesc`.
    ///
    /// `π v0³ (√π erf(r) − 2 r e^{−r²})` with `r = vesc / v0`.
    pub fn analytic_integral(v0: f64, vesc: f64) -> f64 {
        let r = vesc / v0;
        let sqrt_pi = std::f64::consts::PI.sqrt();
        std::f64::consts::PI * v0.powi(3) * (sqrt_pi * erf(r) - 2.0 * r * (-r * r).exp())
    }

    /// Recompute `norm` from the closed-form integral.
    pub fn normalize(&mut self) {
        self.norm = 1.0 / Self::analytic_integral(self.v0, self.vesc);
        self.needs_norm = false;
    }

    /// Normalize by Monte Carlo: uniform points in the ball `|u| < vesc`.
    ///
    /// Sets `norm = 1 / integral` and returns the estimate.
    pub fn normalize_monte_carlo<R: Rng + ?Sized>(
        &mut self,
        n_points: usize,
        rng: &mut R,
    ) -> Result<MonteCarloNormalization> {
        if n_points < 2 {
            return Err(Error::Validation(format!("n_points must be >= 2, got {n_points}")));
        }
        let volume = 4.0 / 3.0 * std::f64::consts::PI * self.vesc.powi(3);
        let inv_v02 = 1.0 / (self.v0 * self.v0);

        let mut sum = 0.0;
        let mut sum2 = 0.0;
        for _ in 0..n_points {
            // Only |u| matters for the integrand, so the direction is not drawn.
            let r = self.vesc * rng.random::<f64>().cbrt();
            let f = (-r * r * inv_v02).exp();
            sum += f;
            sum2 += f * f;
        }
        let n = n_points as f64;
        let mean = sum / n;
        let var = (sum2 / n - mean * mean).max(0.0) / (n - 1.0);
        let integral = volume * mean;

        self.norm = 1.0 / integral;
        self.needs_norm = false;
        Ok(MonteCarloNormalization { integral, std_error: volume * var.sqrt(), n_points })
    }

    /// Apply the velocity part of `update` (`v0`, `vE`, `vesc`).
    ///
    /// Validates before mutating; renormalizes if `v0` or `vesc` changed.
    pub fn set_parameters(&mut self, update: &ParameterUpdate) -> Result<()> {
        if let Some(v0) = update.v0 {
            validate_speed("v0", v0)?;
        }
        if let Some(vesc) = update.vesc {
            validate_speed("vesc", vesc)?;
        }
        if let Some(v_earth) = update.v_earth {
            if !v_earth.iter().all(|c| c.is_finite()) {
                return Err(Error::Validation(format!("vE must be finite, got {v_earth:?}")));
            }
            self.v_earth = Vector3::from(v_earth);
        }
        if let Some(v0) = update.v0 {
            self.needs_norm |= v0 != self.v0;
            self.v0 = v0;
        }
        if let Some(vesc) = update.vesc {
            self.needs_norm |= vesc != self.vesc;
            self.vesc = vesc;
        }
        if self.needs_norm {
            self.normalize();
        }
        Ok(())
    }
}
