//! Model snapshot captured by samplers at `initialize()`.
//!
//! A sampler never reads the live [`PhysicsModel`]. It copies the values it
//! needs once and remembers the model generation they came from, so a later
//! parameter change cannot leak into a half-initialized sampler.

use std::sync::Arc;

use nalgebra::Vector3;
use rand::Rng;
use wimp_core::{CrossSection, FormFactor, OrthonormalFrame};
use wimp_physics::units::SPEED_OF_LIGHT;
use wimp_physics::{PhysicsModel, VelocityDistribution};

/// Recoil kinematics for one WIMP velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recoil {
    /// WIMP kinetic energy `1/2 Mx (|v|/c)^2`.
    pub ex: f64,
    /// Maximum recoil energy for `ex`.
    pub emax: f64,
    /// Recoil energy drawn uniformly in `[0, emax)`.
    pub er: f64,
    /// `|F(2 Mt er)|^2`.
    pub ff2: f64,
}

/// Values cached from a [`PhysicsModel`].
#[derive(Debug, Clone)]
pub struct ModelSnapshot {
    /// Generation of the model this was captured from.
    pub generation: u64,
    /// Lab velocity through the halo.
    pub v_earth: Vector3<f64>,
    /// `|vE|`.
    pub v_earth_speed: f64,
    /// Dispersion velocity.
    pub v0: f64,
    /// Escape velocity.
    pub vesc: f64,
    /// WIMP mass.
    pub mx: f64,
    /// Target nucleus mass.
    pub mt: f64,
    /// Detector fiducial mass.
    pub mtot: f64,
    /// Total cross section.
    pub total_xs: f64,
    /// Local WIMP density.
    pub rho: f64,
    /// `totalXs * rho / Mx * Mtot / Mt`.
    pub normalization: f64,
    /// Frame with `e1` along `vE`.
    pub frame: OrthonormalFrame,
    /// Private copy of the velocity distribution.
    pub velocity: VelocityDistribution,
    /// Cross-section handle.
    pub cross_section: Arc<dyn CrossSection>,
    /// Form-factor handle.
    pub form_factor: Arc<dyn FormFactor>,
}

impl ModelSnapshot {
    /// Copy everything a sampler needs out of `model`.
    pub fn capture(model: &PhysicsModel) -> Self {
        let velocity = model.velocity().clone();
        let interaction = model.interaction();
        let v_earth = *velocity.v_earth();
        Self {
            generation: model.generation(),
            v_earth,
            v_earth_speed: v_earth.norm(),
            v0: velocity.v0(),
            vesc: velocity.vesc(),
            mx: interaction.mx(),
            mt: interaction.mt(),
            mtot: interaction.mtot(),
            total_xs: interaction.total_xs(),
            rho: model.astro().rho(),
            normalization: model.rate_normalization(),
            frame: OrthonormalFrame::from_direction(&v_earth),
            velocity,
            cross_section: Arc::clone(interaction.cross_section()),
            form_factor: Arc::clone(interaction.form_factor()),
        }
    }

    /// WIMP kinetic energy for lab velocity `v`.
    #[inline]
    pub fn kinetic_energy(&self, v: &Vector3<f64>) -> f64 {
        let beta = v.norm() / SPEED_OF_LIGHT;
        0.5 * self.mx * beta * beta
    }

    /// `|F|^2` at recoil energy `er`.
    #[inline]
    pub fn ff2(&self, er: f64) -> f64 {
        self.form_factor.ff2(2.0 * self.mt * er)
    }

    /// Draw `Er ~ U(0, Emax(v))` and evaluate the form factor there.
    pub fn draw_recoil<R: Rng + ?Sized>(&self, v: &Vector3<f64>, rng: &mut R) -> Recoil {
        let ex = self.kinetic_energy(v);
        let emax = self.cross_section.max_recoil_energy(ex);
        let er = emax * rng.random::<f64>();
        Recoil { ex, emax, er, ff2: self.ff2(er) }
    }

    /// Lab-frame recoil direction: azimuth `U(0, 2pi)` around `v`, polar
    /// angle from the cross section.
    pub fn recoil_direction<R: Rng + ?Sized>(
        &self,
        v: &Vector3<f64>,
        recoil: &Recoil,
        rng: &mut R,
    ) -> Vector3<f64> {
        let phi = std::f64::consts::TAU * rng.random::<f64>();
        let cos_theta = self.cross_section.cos_theta_lab(recoil.ex, recoil.er);
        OrthonormalFrame::from_direction(v).rotate(cos_theta, phi)
    }
}

/// Uniform direction on the unit sphere.
pub fn isotropic_direction<R: Rng + ?Sized>(rng: &mut R) -> Vector3<f64> {
    let cos_theta = 2.0 * rng.random::<f64>() - 1.0;
    let phi = std::f64::consts::TAU * rng.random::<f64>();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vector3::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}
