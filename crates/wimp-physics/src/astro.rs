//! Astrophysical inputs: halo velocity distribution and local WIMP density.

use nalgebra::Vector3;
use wimp_core::{Error, Result};

use crate::params::ParameterUpdate;
use crate::units::{GEV, KM, SEC};
use crate::velocity::VelocityDistribution;

/// Default local WIMP mass density (0.3 GeV/cm^3).
pub const DEFAULT_RHO: f64 = 0.3 * GEV;
/// Default halo dispersion velocity.
pub const DEFAULT_V0: f64 = 220.0 * KM / SEC;
/// Default galactic escape velocity.
pub const DEFAULT_VESC: f64 = 550.0 * KM / SEC;
/// Default lab speed through the halo (along +z).
pub const DEFAULT_VE: f64 = 220.0 * KM / SEC;

/// Velocity distribution plus local WIMP mass density.
#[derive(Debug, Clone, PartialEq)]
pub struct AstroModel {
    velocity: VelocityDistribution,
    rho: f64,
}

impl Default for AstroModel {
    fn default() -> Self {
        // Standard halo constants are positive and finite.
        let velocity = VelocityDistribution::new(
            DEFAULT_V0,
            DEFAULT_VESC,
            Vector3::new(0.0, 0.0, DEFAULT_VE),
        )
        .expect("standard halo parameters are valid");
        Self { velocity, rho: DEFAULT_RHO }
    }
}

impl AstroModel {
    /// Create from a velocity distribution and density `rho`.
    pub fn new(velocity: VelocityDistribution, rho: f64) -> Result<Self> {
        if !rho.is_finite() || rho < 0.0 {
            return Err(Error::Validation(format!("rhox must be finite and >= 0, got {rho}")));
        }
        Ok(Self { velocity, rho })
    }

    /// Halo velocity distribution.
    pub fn velocity(&self) -> &VelocityDistribution {
        &self.velocity
    }

    /// Mutable access, e.g. for Monte-Carlo normalization.
    pub fn velocity_mut(&mut self) -> &mut VelocityDistribution {
        &mut self.velocity
    }

    /// Local WIMP mass density.
    pub fn rho(&self) -> f64 {
        self.rho
    }

    /// Apply `v0`, `vE`, `vesc` and `rhox` from `update`.
    pub fn set_parameters(&mut self, update: &ParameterUpdate) -> Result<()> {
        if let Some(rho) = update.rho {
            if !rho.is_finite() || rho < 0.0 {
                return Err(Error::Validation(format!("rhox must be finite and >= 0, got {rho}")));
            }
        }
        self.velocity.set_parameters(update)?;
        if let Some(rho) = update.rho {
            self.rho = rho;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let a = AstroModel::default();
        assert_eq!(a.rho(), 300.0);
        assert_eq!(a.velocity().v0(), 2.2e7);
        assert_eq!(a.velocity().v_earth().z, 2.2e7);
    }

    #[test]
    fn test_set_density() {
        let mut a = AstroModel::default();
        a.set_parameters(&ParameterUpdate { rho: Some(400.0), ..Default::default() }).unwrap();
        assert_eq!(a.rho(), 400.0);
        let bad = ParameterUpdate { rho: Some(-1.0), v0: Some(1e7), ..Default::default() };
        assert!(a.set_parameters(&bad).is_err());
        assert_eq!(a.velocity().v0(), 2.2e7);
    }
}
