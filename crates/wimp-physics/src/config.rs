//! JSON model configuration.
//!
//! All quantities are in natural units (MeV, cm, s). Missing fields take the
//! standard-halo defaults; unknown fields are rejected.
//!
//! ```json
//! {
//!   "astro": { "v0": 2.3e7, "vesc": 5.44e7, "v_earth": [0, 0, 2.3e7], "rho": 300.0 },
//!   "interaction": { "mx": 5.0e4, "mt": 122026.5, "mtot": 5.60958e31, "total_xs": 2e-39 }
//! }
//! ```

use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use wimp_core::Result;

use crate::astro::{AstroModel, DEFAULT_RHO, DEFAULT_V0, DEFAULT_VE, DEFAULT_VESC};
use crate::interaction::{
    DEFAULT_MT, DEFAULT_MTOT, DEFAULT_MX, DEFAULT_TOTAL_XS, InteractionModel,
};
use crate::model::PhysicsModel;
use crate::velocity::VelocityDistribution;

/// Halo parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AstroParams {
    /// Dispersion velocity.
    pub v0: f64,
    /// Galactic escape velocity.
    pub vesc: f64,
    /// Lab velocity through the halo.
    pub v_earth: [f64; 3],
    /// Local WIMP mass density.
    pub rho: f64,
}

impl Default for AstroParams {
    fn default() -> Self {
        Self { v0: DEFAULT_V0, vesc: DEFAULT_VESC, v_earth: [0.0, 0.0, DEFAULT_VE], rho: DEFAULT_RHO }
    }
}

/// Interaction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractionParams {
    /// WIMP mass.
    pub mx: f64,
    /// Target nucleus mass.
    pub mt: f64,
    /// Detector fiducial mass.
    pub mtot: f64,
    /// Total WIMP-nucleus cross section.
    pub total_xs: f64,
}

impl Default for InteractionParams {
    fn default() -> Self {
        Self { mx: DEFAULT_MX, mt: DEFAULT_MT, mtot: DEFAULT_MTOT, total_xs: DEFAULT_TOTAL_XS }
    }
}

/// Complete model configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsConfig {
    /// Halo parameters.
    pub astro: AstroParams,
    /// Interaction parameters.
    pub interaction: InteractionParams,
}

impl PhysicsConfig {
    /// Parse from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Build a [`PhysicsModel`] (validates every value).
    pub fn build(&self) -> Result<PhysicsModel> {
        let a = &self.astro;
        let velocity = VelocityDistribution::new(a.v0, a.vesc, Vector3::from(a.v_earth))?;
        let astro = AstroModel::new(velocity, a.rho)?;
        let i = &self.interaction;
        let interaction = InteractionModel::new(i.mx, i.mt, i.mtot, i.total_xs)?;
        Ok(PhysicsModel::new(astro, interaction))
    }
}
