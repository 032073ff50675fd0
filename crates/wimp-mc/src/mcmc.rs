//! Metropolis-Hastings sampler over the WIMP velocity.
//!
//! Target (up to normalization) in `(v, Er)` space: `|v| f(v) |F|^2 / Emax`.
//! `Er` is proposed uniformly in `[0, Emax(v')]`, which cancels the `1/Emax`
//! factor, and the Gaussian velocity step is symmetric, so the acceptance
//! ratio reduces to `P'/P` with `P = |v| f(v) |F(2 Mt Er)|^2`.
//!
//! A rejected proposal is re-proposed from the same state rather than
//! emitted again; every `sample()` call returns a newly accepted point.
//! Consecutive samples are autocorrelated.

use nalgebra::Vector3;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use wimp_core::{Error, Result, Sample};
use wimp_physics::PhysicsModel;
use wimp_physics::units::{KM, SEC};

use crate::cache::{ModelSnapshot, Recoil, isotropic_direction};
use crate::sampler::{EventSampler, SamplerDiagnostics, not_initialized};

/// MCMC configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct McmcConfig {
    /// Per-component proposal standard deviation (default 20 km/s).
    pub sigma: f64,
    /// Samples discarded during `initialize()` (default 1000).
    pub n_burnin: usize,
    /// Proposals allowed for one emitted sample (default 1 000 000).
    pub max_tries: u64,
}

impl Default for McmcConfig {
    fn default() -> Self {
        Self { sigma: 20.0 * KM / SEC, n_burnin: 1000, max_tries: 1_000_000 }
    }
}

/// Current state of the chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainState {
    /// Velocity of the last accepted point.
    pub last_velocity: Vector3<f64>,
    /// Recoil energy of the last accepted point.
    pub last_energy: f64,
    /// Unnormalized target at the last accepted point.
    pub last_probability: f64,
    /// Proposals needed for the last emitted sample.
    pub tries_since_last_accept: u64,
}

/// Unweighted Metropolis-Hastings sampler.
#[derive(Debug, Clone)]
pub struct McmcSampler<R: Rng> {
    rng: R,
    config: McmcConfig,
    snapshot: Option<ModelSnapshot>,
    step: Option<Normal<f64>>,
    state: Option<ChainState>,
    diagnostics: SamplerDiagnostics,
    burnin_acceptance: f64,
}

fn target(snap: &ModelSnapshot, v: &Vector3<f64>, recoil: &Recoil) -> f64 {
    v.norm() * snap.velocity.density(v) * recoil.ff2
}

impl<R: Rng> McmcSampler<R> {
    /// Sampler with the default configuration.
    pub fn new(rng: R) -> Self {
        Self::with_config(rng, McmcConfig::default())
    }

    /// Sampler with an explicit configuration.
    pub fn with_config(rng: R, config: McmcConfig) -> Self {
        Self {
            rng,
            config,
            snapshot: None,
            step: None,
            state: None,
            diagnostics: SamplerDiagnostics::default(),
            burnin_acceptance: f64::NAN,
        }
    }

    /// Chain state (after `initialize()`).
    pub fn state(&self) -> Option<&ChainState> {
        self.state.as_ref()
    }

    /// Acceptance rate observed during burn-in (NaN before `initialize()`).
    pub fn burnin_acceptance(&self) -> f64 {
        self.burnin_acceptance
    }

    fn reset(&mut self) {
        self.snapshot = None;
        self.step = None;
        self.state = None;
        self.burnin_acceptance = f64::NAN;
    }

    /// Advance the chain to the next accepted point.
    fn advance(&mut self) -> Result<()> {
        let (Some(snap), Some(step), Some(state)) =
            (self.snapshot.as_ref(), self.step.as_ref(), self.state.as_mut())
        else {
            return Err(not_initialized("mcmc"));
        };
        let rng = &mut self.rng;
        let diag = &mut self.diagnostics;

        let mut tries = 0u64;
        loop {
            if tries >= self.config.max_tries {
                state.tries_since_last_accept = tries;
                return Err(Error::convergence(
                    "mcmc",
                    tries as usize,
                    state.last_probability,
                ));
            }
            tries += 1;
            diag.n_proposals += 1;

            let v = state.last_velocity
                + Vector3::new(step.sample(rng), step.sample(rng), step.sample(rng));
            let recoil = snap.draw_recoil(&v, rng);
            let p = target(snap, &v, &recoil);

            if !p.is_finite() || p < 0.0 {
                log::warn!("mcmc target is invalid ({p}) at v = {v:?}");
                diag.n_invalid += 1;
                continue;
            }
            if p == 0.0 {
                continue;
            }
            // u * P_last < P' also accepts every positive proposal from a
            // zero-probability seed.
            if rng.random::<f64>() * state.last_probability < p {
                diag.n_accepted += 1;
                state.last_velocity = v;
                state.last_energy = recoil.er;
                state.last_probability = p;
                state.tries_since_last_accept = tries;
                return Ok(());
            }
        }
    }
}

impl<R: Rng> EventSampler for McmcSampler<R> {
    fn initialize(&mut self, model: &PhysicsModel) -> Result<()> {
        self.reset();
        let sigma = self.config.sigma;
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(Error::Validation(format!("MCMC sigma must be finite and > 0, got {sigma}")));
        }
        let step = Normal::new(0.0, sigma)
            .map_err(|e| Error::Validation(format!("invalid MCMC step sigma {sigma}: {e}")))?;
        if self.config.max_tries == 0 {
            return Err(Error::Validation("max_tries must be > 0".to_string()));
        }
        let snap = ModelSnapshot::capture(model);

        let radius = 0.95 * snap.vesc * self.rng.random::<f64>().cbrt();
        let v = isotropic_direction(&mut self.rng) * radius - snap.v_earth;
        let recoil = snap.draw_recoil(&v, &mut self.rng);
        let state = ChainState {
            last_velocity: v,
            last_energy: recoil.er,
            last_probability: target(&snap, &v, &recoil),
            tries_since_last_accept: 0,
        };

        self.snapshot = Some(snap);
        self.step = Some(step);
        self.state = Some(state);
        self.diagnostics = SamplerDiagnostics::default();

        for _ in 0..self.config.n_burnin {
            if let Err(e) = self.advance() {
                // A chain that did not finish burn-in is not usable.
                self.reset();
                return Err(e);
            }
        }
        self.burnin_acceptance = self.diagnostics.acceptance_rate();
        log::debug!(
            "mcmc sampler initialized: sigma={:.4e}, burn-in {} samples, acceptance {:.3}",
            sigma,
            self.config.n_burnin,
            self.burnin_acceptance
        );
        self.diagnostics = SamplerDiagnostics::default();
        Ok(())
    }

    fn sample(&mut self) -> Result<Sample> {
        if self.snapshot.is_none() {
            return Err(not_initialized(self.name()));
        }
        self.advance()?;
        let (Some(snap), Some(state)) = (self.snapshot.as_ref(), self.state.as_ref()) else {
            return Err(not_initialized(self.name()));
        };
        let v = state.last_velocity;
        let ex = snap.kinetic_energy(&v);
        let recoil = Recoil {
            ex,
            emax: snap.cross_section.max_recoil_energy(ex),
            er: state.last_energy,
            ff2: snap.ff2(state.last_energy),
        };
        let dir = snap.recoil_direction(&v, &recoil, &mut self.rng);
        self.diagnostics.n_samples += 1;
        Ok(Sample::new(state.last_energy, dir, 1.0, v))
    }

    fn name(&self) -> &'static str {
        "mcmc"
    }

    fn generation(&self) -> Option<u64> {
        self.snapshot.as_ref().map(|s| s.generation)
    }

    fn diagnostics(&self) -> SamplerDiagnostics {
        self.diagnostics
    }
}
