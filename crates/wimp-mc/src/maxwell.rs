//! Maxwellian importance sampler.
//!
//! Velocities come from the untruncated halo Gaussian,
//! `Normal(-vE, v0/sqrt(2))` per component, so the importance ratio
//! `density / proposal` is constant inside the escape ball and zero outside.
//! This is the lowest-variance weighted sampler and the default behind rate
//! estimation.

use nalgebra::Vector3;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use wimp_core::{Error, Result, Sample};
use wimp_physics::PhysicsModel;
use wimp_prob::normal;

use crate::cache::ModelSnapshot;
use crate::sampler::{EventSampler, SamplerDiagnostics, not_initialized};

/// Weighted sampler with a Maxwellian velocity proposal.
#[derive(Debug, Clone)]
pub struct MaxwellWeightedSampler<R: Rng> {
    rng: R,
    snapshot: Option<ModelSnapshot>,
    proposal: Option<[Normal<f64>; 3]>,
    diagnostics: SamplerDiagnostics,
}

impl<R: Rng> MaxwellWeightedSampler<R> {
    /// Sampler drawing from `rng`.
    pub fn new(rng: R) -> Self {
        Self { rng, snapshot: None, proposal: None, diagnostics: SamplerDiagnostics::default() }
    }

    /// Log proposal density: isotropic normal around `-vE` with standard
    /// deviation `v0/sqrt(2)`, i.e. `(pi v0^2)^{-3/2} exp(-|v+vE|^2/v0^2)`.
    pub fn ln_proposal_density(v0: f64, v_earth: &Vector3<f64>, v: &Vector3<f64>) -> Result<f64> {
        let d = v + v_earth;
        normal::logpdf_isotropic3([d.x, d.y, d.z], v0 / std::f64::consts::SQRT_2)
    }
}

impl<R: Rng> EventSampler for MaxwellWeightedSampler<R> {
    fn initialize(&mut self, model: &PhysicsModel) -> Result<()> {
        let snap = ModelSnapshot::capture(model);
        let sd = snap.v0 / std::f64::consts::SQRT_2;
        let component = |mean: f64| {
            Normal::new(mean, sd)
                .map_err(|e| Error::Validation(format!("invalid Maxwellian proposal: {e}")))
        };
        let proposal = [
            component(-snap.v_earth.x)?,
            component(-snap.v_earth.y)?,
            component(-snap.v_earth.z)?,
        ];
        log::debug!(
            "maxwell sampler initialized: v0={:.4e}, |vE|={:.4e}, generation {}",
            snap.v0,
            snap.v_earth_speed,
            snap.generation
        );
        self.snapshot = Some(snap);
        self.proposal = Some(proposal);
        self.diagnostics = SamplerDiagnostics::default();
        Ok(())
    }

    fn sample(&mut self) -> Result<Sample> {
        let (Some(snap), Some(proposal)) = (self.snapshot.as_ref(), self.proposal.as_ref()) else {
            return Err(not_initialized(self.name()));
        };
        let rng = &mut self.rng;

        let v = Vector3::new(
            proposal[0].sample(rng),
            proposal[1].sample(rng),
            proposal[2].sample(rng),
        );
        let recoil = snap.draw_recoil(&v, rng);
        let dir = snap.recoil_direction(&v, &recoil, rng);

        // Ratio in log space: far-tail proposals underflow otherwise.
        let f = snap.velocity.density(&v);
        let ratio = if f > 0.0 {
            (f.ln() - Self::ln_proposal_density(snap.v0, &snap.v_earth, &v)?).exp()
        } else {
            0.0
        };
        let weight = ratio * v.norm() * recoil.ff2 * snap.normalization;

        self.diagnostics.n_samples += 1;
        self.diagnostics.n_proposals += 1;
        self.diagnostics.n_accepted += 1;
        if !weight.is_finite() || weight < 0.0 {
            log::warn!("maxwell sampler produced invalid weight {weight} at v = {v:?}");
            self.diagnostics.n_invalid += 1;
        }
        Ok(Sample::new(recoil.er, dir, weight, v))
    }

    fn name(&self) -> &'static str {
        "maxwell"
    }

    fn generation(&self) -> Option<u64> {
        self.snapshot.as_ref().map(|s| s.generation)
    }

    fn diagnostics(&self) -> SamplerDiagnostics {
        self.diagnostics
    }
}
