//! Envelope accept/reject sampler.
//!
//! Proposes a speed uniform in `[vmin, vmax]`, an isotropic direction and a
//! recoil energy uniform in `[0, Emax)`. Because the speed-uniform proposal
//! has density proportional to `1/|v|^2` in velocity space, the target
//! `|v| f(v) |F|^2` becomes `P = |v|^3 f(v) |F|^2` relative to the proposal.
//! The envelope `maxP` is the maximum of `|v|^3 f_unbounded(v)`, reached
//! along `-vE`.

use nalgebra::Vector3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use wimp_core::{Error, Result, Sample};
use wimp_physics::PhysicsModel;

use crate::cache::{ModelSnapshot, isotropic_direction};
use crate::sampler::{EventSampler, SamplerDiagnostics, not_initialized};

/// Accept/reject configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AcceptRejectConfig {
    /// Proposals per sample before giving up (default 10 000).
    pub max_iterations: usize,
}

impl Default for AcceptRejectConfig {
    fn default() -> Self {
        Self { max_iterations: 10_000 }
    }
}

/// Envelope and speed range computed at `initialize()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    /// Speed maximizing `|v|^3 f_unbounded(v)`.
    pub v_max_p: f64,
    /// Envelope height.
    pub max_p: f64,
    /// Lowest proposed speed, `max(0, |vE| - vesc)`.
    pub vmin: f64,
    /// Highest proposed speed, `vesc + |vE|`.
    pub vmax: f64,
}

impl Envelope {
    fn compute(snap: &ModelSnapshot) -> Self {
        let ve = snap.v_earth_speed;
        let v_max_p = 0.5 * (ve + (ve * ve + 6.0 * snap.v0 * snap.v0).sqrt());
        let direction =
            if ve < 1e-12 { Vector3::z() } else { -snap.v_earth / ve };
        let max_p = v_max_p.powi(3) * snap.velocity.density_unbounded(&(direction * v_max_p));
        Self { v_max_p, max_p, vmin: (ve - snap.vesc).max(0.0), vmax: snap.vesc + ve }
    }
}

/// Unweighted sampler by rejection from a uniform-speed envelope.
#[derive(Debug, Clone)]
pub struct AcceptRejectSampler<R: Rng> {
    rng: R,
    config: AcceptRejectConfig,
    snapshot: Option<ModelSnapshot>,
    envelope: Option<Envelope>,
    diagnostics: SamplerDiagnostics,
}

impl<R: Rng> AcceptRejectSampler<R> {
    /// Sampler with the default configuration.
    pub fn new(rng: R) -> Self {
        Self::with_config(rng, AcceptRejectConfig::default())
    }

    /// Sampler with an explicit configuration.
    pub fn with_config(rng: R, config: AcceptRejectConfig) -> Self {
        Self { rng, config, snapshot: None, envelope: None, diagnostics: SamplerDiagnostics::default() }
    }

    /// Envelope (after `initialize()`).
    pub fn envelope(&self) -> Option<&Envelope> {
        self.envelope.as_ref()
    }
}

impl<R: Rng> EventSampler for AcceptRejectSampler<R> {
    fn initialize(&mut self, model: &PhysicsModel) -> Result<()> {
        if self.config.max_iterations == 0 {
            return Err(Error::Validation("max_iterations must be > 0".to_string()));
        }
        let snap = ModelSnapshot::capture(model);
        let envelope = Envelope::compute(&snap);
        if !(envelope.max_p.is_finite() && envelope.max_p > 0.0) {
            return Err(Error::Computation(format!(
                "accept/reject envelope must be finite and > 0, got {}",
                envelope.max_p
            )));
        }
        log::debug!(
            "accept/reject sampler initialized: vMaxP={:.4e}, maxP={:.4e}, speed range [{:.4e}, {:.4e}]",
            envelope.v_max_p,
            envelope.max_p,
            envelope.vmin,
            envelope.vmax
        );
        self.snapshot = Some(snap);
        self.envelope = Some(envelope);
        self.diagnostics = SamplerDiagnostics::default();
        Ok(())
    }

    fn sample(&mut self) -> Result<Sample> {
        let (Some(snap), Some(env)) = (self.snapshot.as_ref(), self.envelope.as_ref()) else {
            return Err(not_initialized(self.name()));
        };
        let rng = &mut self.rng;
        let diag = &mut self.diagnostics;

        let mut last_p = 0.0;
        for _ in 0..self.config.max_iterations {
            let speed = env.vmin + (env.vmax - env.vmin) * rng.random::<f64>();
            let v = isotropic_direction(rng) * speed;
            let recoil = snap.draw_recoil(&v, rng);

            let p = speed.powi(3) * snap.velocity.density(&v) * recoil.ff2;
            diag.n_proposals += 1;
            last_p = p;
            if !p.is_finite() || p < 0.0 {
                log::warn!("accept/reject target is invalid ({p}) at v = {v:?}");
                diag.n_invalid += 1;
                continue;
            }
            if p > env.max_p {
                log::warn!("accept/reject target {p:.6e} exceeds envelope {:.6e}", env.max_p);
                diag.n_envelope_violations += 1;
            }

            let u = env.max_p * rng.random::<f64>();
            if p > u {
                let dir = snap.recoil_direction(&v, &recoil, rng);
                diag.n_accepted += 1;
                diag.n_samples += 1;
                return Ok(Sample::new(recoil.er, dir, 1.0, v));
            }
        }
        Err(Error::convergence("accept_reject", self.config.max_iterations, last_p))
    }

    fn name(&self) -> &'static str {
        "accept_reject"
    }

    fn generation(&self) -> Option<u64> {
        self.snapshot.as_ref().map(|s| s.generation)
    }

    fn diagnostics(&self) -> SamplerDiagnostics {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;
    use wimp_core::FormFactor;
    use wimp_physics::ParameterUpdate;

    #[derive(Debug)]
    struct Suppressing;

    impl FormFactor for Suppressing {
        fn ff2(&self, _q2: f64) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_envelope_is_maximum_along_minus_earth_velocity() {
        let model = PhysicsModel::default();
        let mut s = AcceptRejectSampler::new(StdRng::seed_from_u64(1));
        s.initialize(&model).unwrap();
        let env = *s.envelope().unwrap();
        let d = model.velocity();
        let dir = -d.v_earth().normalize();
        let p = |speed: f64| speed.powi(3) * d.density_unbounded(&(dir * speed));
        assert_relative_eq!(p(env.v_max_p), env.max_p, max_relative = 1e-12);
        assert!(p(env.v_max_p * 1.01) < env.max_p);
        assert!(p(env.v_max_p * 0.99) < env.max_p);
        assert_eq!(env.vmin, 0.0);
        assert_relative_eq!(env.vmax, d.vesc() + d.v_earth().norm());
    }

    #[test]
    fn test_unit_weights_and_no_envelope_violation() {
        let model = PhysicsModel::default();
        let mut s = AcceptRejectSampler::new(StdRng::seed_from_u64(2));
        s.initialize(&model).unwrap();
        for x in s.sample_n(2000).unwrap() {
            assert_eq!(x.gen_weight, 1.0);
            assert!((x.wimp_velocity + model.velocity().v_earth()).norm() < model.velocity().vesc());
        }
        let d = s.diagnostics();
        assert_eq!(d.n_samples, 2000);
        assert_eq!(d.n_envelope_violations, 0);
        assert!(d.acceptance_rate() > 0.02 && d.acceptance_rate() < 0.2);
    }

    #[test]
    fn test_exhaustion_is_convergence_error() {
        let mut model = PhysicsModel::default();
        model.set_form_factor(Arc::new(Suppressing));
        let config = AcceptRejectConfig { max_iterations: 10 };
        let mut s = AcceptRejectSampler::with_config(StdRng::seed_from_u64(3), config);
        s.initialize(&model).unwrap();
        let err = s.sample().unwrap_err();
        assert!(err.is_convergence());
        assert_eq!(s.diagnostics().n_proposals, 10);
    }

    #[test]
    fn test_stale_after_parameter_change() {
        let mut model = PhysicsModel::default();
        let mut s = AcceptRejectSampler::new(StdRng::seed_from_u64(4));
        s.initialize(&model).unwrap();
        assert!(s.ensure_current(&model).is_ok());
        model.set_parameters(&ParameterUpdate { v0: Some(2.5e7), ..Default::default() }).unwrap();
        assert!(s.ensure_current(&model).is_err());
        s.initialize(&model).unwrap();
        assert!(s.ensure_current(&model).is_ok());
    }

    #[test]
    fn test_zero_earth_velocity_uses_z_axis() {
        let mut model = PhysicsModel::default();
        model.set_parameters(&ParameterUpdate { v_earth: Some([0.0; 3]), ..Default::default() })
            .unwrap();
        let mut s = AcceptRejectSampler::new(StdRng::seed_from_u64(5));
        s.initialize(&model).unwrap();
        let env = s.envelope().unwrap();
        let v0 = model.velocity().v0();
        assert_relative_eq!(env.v_max_p, 0.5 * 6f64.sqrt() * v0, max_relative = 1e-12);
        assert!(s.sample().is_ok());
    }
}
