//! Collaborator traits
//!
//! The samplers and limit code only talk to the scattering physics and the
//! detector through these traits. Concrete nuclear models, efficiency curves
//! and resolution smearing live outside the core.

use std::fmt;
use std::sync::Arc;

use crate::types::Sample;

/// WIMP-nucleus scattering kinematics and normalization.
///
/// Implementations are immutable: changing masses or the total cross section
/// produces a new object through [`CrossSection::with_parameters`], so a
/// sampler snapshot holding an `Arc` never observes a half-updated model.
pub trait CrossSection: Send + Sync + fmt::Debug {
    /// Maximum nuclear recoil energy for WIMP kinetic energy `ex`.
    fn max_recoil_energy(&self, ex: f64) -> f64;

    /// Cosine of the lab-frame recoil angle w.r.t. the incoming WIMP direction.
    fn cos_theta_lab(&self, ex: f64, er: f64) -> f64;

    /// Total WIMP-nucleus cross section.
    fn total_xs(&self) -> f64;

    /// Same model re-derived for new masses and total cross section.
    fn with_parameters(&self, mx: f64, mt: f64, total_xs: f64) -> Arc<dyn CrossSection>;

    /// Model name (e.g. "elastic")
    fn name(&self) -> &str;
}

/// Squared nuclear form factor `|F(Q^2)|^2`.
pub trait FormFactor: Send + Sync + fmt::Debug {
    /// `|F|^2` at squared momentum transfer `q2 = 2 Mt Er`.
    fn ff2(&self, q2: f64) -> f64;

    /// Model name (e.g. "unity")
    fn name(&self) -> &str {
        "custom"
    }
}

/// Detector response applied to generated samples.
///
/// Sets the detector weight and/or the reconstructed quantities; samplers are
/// unaware of this step.
pub trait DetectorResponse: Send + Sync {
    /// Apply efficiency / smearing to one sample.
    fn apply(&self, sample: Sample) -> Sample;
}
