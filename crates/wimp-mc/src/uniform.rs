//! Uniform-box importance sampler.
//!
//! Velocities are drawn uniformly in the box around `-vE` that encloses the
//! escape-velocity ball, expressed in the frame of `vE`. Each sample carries
//! the full rate weight, so the sum of weights over `N` draws divided by `N`
//! estimates the event rate.

use nalgebra::Vector3;
use rand::Rng;
use wimp_core::{Result, Sample};
use wimp_physics::PhysicsModel;

use crate::cache::ModelSnapshot;
use crate::sampler::{EventSampler, SamplerDiagnostics, not_initialized};

#[derive(Debug, Clone)]
struct Bounds {
    e1: (f64, f64),
    transverse: (f64, f64),
    volume: f64,
}

/// Weighted sampler with a uniform velocity proposal.
#[derive(Debug, Clone)]
pub struct UniformWeightedSampler<R: Rng> {
    rng: R,
    snapshot: Option<ModelSnapshot>,
    bounds: Option<Bounds>,
    diagnostics: SamplerDiagnostics,
}

impl<R: Rng> UniformWeightedSampler<R> {
    /// Sampler drawing from `rng`.
    pub fn new(rng: R) -> Self {
        Self { rng, snapshot: None, bounds: None, diagnostics: SamplerDiagnostics::default() }
    }

    /// Proposal box volume (after `initialize()`).
    pub fn volume(&self) -> Option<f64> {
        self.bounds.as_ref().map(|b| b.volume)
    }
}

impl<R: Rng> EventSampler for UniformWeightedSampler<R> {
    fn initialize(&mut self, model: &PhysicsModel) -> Result<()> {
        let snap = ModelSnapshot::capture(model);
        let (vesc, ve) = (snap.vesc, snap.v_earth_speed);
        let bounds = Bounds {
            e1: (-vesc - ve, vesc - ve),
            transverse: (-vesc, vesc),
            volume: 8.0 * vesc * vesc * vesc,
        };
        log::debug!(
            "uniform sampler initialized: box volume {:.4e}, generation {}",
            bounds.volume,
            snap.generation
        );
        self.snapshot = Some(snap);
        self.bounds = Some(bounds);
        self.diagnostics = SamplerDiagnostics::default();
        Ok(())
    }

    fn sample(&mut self) -> Result<Sample> {
        let (Some(snap), Some(b)) = (self.snapshot.as_ref(), self.bounds.as_ref()) else {
            return Err(not_initialized(self.name()));
        };
        let rng = &mut self.rng;

        let a1 = b.e1.0 + (b.e1.1 - b.e1.0) * rng.random::<f64>();
        let a2 = b.transverse.0 + (b.transverse.1 - b.transverse.0) * rng.random::<f64>();
        let a3 = b.transverse.0 + (b.transverse.1 - b.transverse.0) * rng.random::<f64>();
        let v: Vector3<f64> = snap.frame.compose(a1, a2, a3);

        let recoil = snap.draw_recoil(&v, rng);
        let dir = snap.recoil_direction(&v, &recoil, rng);
        let weight =
            b.volume * snap.velocity.density(&v) * v.norm() * recoil.ff2 * snap.normalization;

        self.diagnostics.n_samples += 1;
        self.diagnostics.n_proposals += 1;
        self.diagnostics.n_accepted += 1;
        if !weight.is_finite() || weight < 0.0 {
            log::warn!("uniform sampler produced invalid weight {weight} at v = {v:?}");
            self.diagnostics.n_invalid += 1;
        }
        Ok(Sample::new(recoil.er, dir, weight, v))
    }

    fn name(&self) -> &'static str {
        "uniform"
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
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_sample_before_initialize() {
        let mut s = UniformWeightedSampler::new(StdRng::seed_from_u64(1));
        let err = s.sample().unwrap_err();
        assert!(err.to_string().contains("before initialize"));
        assert!(s.ensure_current(&PhysicsModel::default()).is_err());
    }

    #[test]
    fn test_samples_cover_escape_ball() {
        let model = PhysicsModel::default();
        let mut s = UniformWeightedSampler::new(StdRng::seed_from_u64(2));
        s.initialize(&model).unwrap();
        let vesc = model.velocity().vesc();
        let ve = model.velocity().v_earth();
        let mut inside = 0;
        for _ in 0..20_000 {
            let x = s.sample().unwrap();
            let u = (x.wimp_velocity + ve).norm();
            if x.gen_weight > 0.0 {
                assert!(u < vesc);
                inside += 1;
            }
            assert!(u < vesc * 3f64.sqrt() + 1.0);
        }
        // Ball-to-cube volume ratio is pi/6.
        let frac = inside as f64 / 20_000.0;
        assert!((frac - std::f64::consts::PI / 6.0).abs() < 0.02, "frac = {frac}");
        assert_eq!(s.diagnostics().n_samples, 20_000);
    }
}
