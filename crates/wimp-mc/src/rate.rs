//! Expected event-rate estimation.
//!
//! The rate is the mean total weight of the in-window samples over all draws:
//! for the weighted samplers this is the event rate (events per unit time)
//! implied by the model. For unweighted samplers (accept/reject, MCMC) the
//! same estimator gives the in-window fraction.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use wimp_core::{DetectorResponse, Error, Result};
use wimp_physics::PhysicsModel;

use crate::maxwell::MaxwellWeightedSampler;
use crate::sampler::EventSampler;

/// Rate estimation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateConfig {
    /// Lower edge of the recoil-energy window (inclusive).
    pub er_min: f64,
    /// Upper edge of the window (exclusive); `None` for no upper edge.
    pub er_max: Option<f64>,
    /// Stop once the relative standard error drops below this.
    pub target_rel_error: f64,
    /// Samples drawn before the stopping rule is checked.
    pub min_samples: u64,
    /// Hard bound on samples drawn.
    pub max_samples: u64,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            er_min: 0.0,
            er_max: None,
            target_rel_error: 1e-2,
            min_samples: 10_000,
            max_samples: 10_000_000,
        }
    }
}

impl RateConfig {
    fn validate(&self) -> Result<()> {
        if !(self.target_rel_error > 0.0) {
            return Err(Error::Validation(format!(
                "target_rel_error must be > 0, got {}",
                self.target_rel_error
            )));
        }
        if self.min_samples < 2 || self.max_samples < self.min_samples {
            return Err(Error::Validation(format!(
                "need 2 <= min_samples <= max_samples, got {} and {}",
                self.min_samples, self.max_samples
            )));
        }
        if let Some(hi) = self.er_max {
            if !(hi > self.er_min) {
                return Err(Error::Validation(format!(
                    "empty energy window [{}, {hi})",
                    self.er_min
                )));
            }
        }
        Ok(())
    }

    fn contains(&self, er: f64) -> bool {
        er >= self.er_min && self.er_max.is_none_or(|hi| er < hi)
    }
}

/// Result of a rate estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateEstimate {
    /// Estimated rate.
    pub rate: f64,
    /// Relative standard error of `rate`.
    pub rel_error: f64,
    /// Samples drawn.
    pub n_samples: u64,
    /// Samples that fell inside the energy window.
    pub n_in_window: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    n: u64,
    n_in_window: u64,
    sum: f64,
    sum2: f64,
}

impl Accumulator {
    fn push(&mut self, value: Option<f64>) {
        self.n += 1;
        if let Some(w) = value {
            self.n_in_window += 1;
            self.sum += w;
            self.sum2 += w * w;
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.n += other.n;
        self.n_in_window += other.n_in_window;
        self.sum += other.sum;
        self.sum2 += other.sum2;
        self
    }

    fn rel_error(&self) -> f64 {
        if self.n < 2 || self.sum <= 0.0 {
            return f64::INFINITY;
        }
        let n = self.n as f64;
        let mean = self.sum / n;
        let var = (self.sum2 / n - mean * mean).max(0.0) / (n - 1.0);
        var.sqrt() / mean
    }

    fn estimate(&self) -> RateEstimate {
        RateEstimate {
            rate: if self.n == 0 { 0.0 } else { self.sum / self.n as f64 },
            rel_error: self.rel_error(),
            n_samples: self.n,
            n_in_window: self.n_in_window,
        }
    }
}

fn accumulate<S: EventSampler + ?Sized>(
    sampler: &mut S,
    config: &RateConfig,
    response: Option<&dyn DetectorResponse>,
    target_rel_error: f64,
    min_samples: u64,
    max_samples: u64,
) -> Result<Accumulator> {
    let mut acc = Accumulator::default();
    while acc.n < max_samples {
        let mut sample = sampler.sample()?;
        if let Some(r) = response {
            sample = r.apply(sample);
        }
        acc.push(config.contains(sample.er()).then(|| sample.weight()));
        if acc.n >= min_samples && acc.rel_error() < target_rel_error {
            return Ok(acc);
        }
    }
    Err(Error::convergence("estimate_rate", acc.n as usize, acc.estimate().rate))
}

/// Estimate the in-window rate with an initialized `sampler`.
pub fn estimate_rate<S: EventSampler + ?Sized>(
    sampler: &mut S,
    config: &RateConfig,
) -> Result<RateEstimate> {
    estimate_rate_with_response(sampler, config, None)
}

/// [`estimate_rate`] with a detector response applied to every sample.
pub fn estimate_rate_with_response<S: EventSampler + ?Sized>(
    sampler: &mut S,
    config: &RateConfig,
    response: Option<&dyn DetectorResponse>,
) -> Result<RateEstimate> {
    config.validate()?;
    let acc = accumulate(
        sampler,
        config,
        response,
        config.target_rel_error,
        config.min_samples,
        config.max_samples,
    )?;
    let est = acc.estimate();
    log::debug!(
        "{} rate estimate {:.6e} +- {:.2}% from {} samples ({} in window)",
        sampler.name(),
        est.rate,
        100.0 * est.rel_error,
        est.n_samples,
        est.n_in_window
    );
    Ok(est)
}

/// Estimate the rate with `n_workers` independent Maxwell samplers.
///
/// Worker `i` draws from `StdRng::seed_from_u64(seed + i)`. Each worker stops
/// at `target_rel_error * sqrt(n_workers)` so the combined estimate meets the
/// target; sample bounds are split evenly.
pub fn estimate_rate_parallel(
    model: &PhysicsModel,
    n_workers: usize,
    seed: u64,
    config: &RateConfig,
) -> Result<RateEstimate> {
    use rayon::prelude::*;

    config.validate()?;
    if n_workers == 0 {
        return Err(Error::Validation("n_workers must be > 0".to_string()));
    }
    let k = n_workers as u64;
    let worker_target = config.target_rel_error * (n_workers as f64).sqrt();
    let worker_min = config.min_samples.div_ceil(k).max(2);
    let worker_max = config.max_samples.div_ceil(k).max(worker_min);

    let parts: Vec<Result<Accumulator>> = (0..n_workers)
        .into_par_iter()
        .map(|worker| {
            let rng = StdRng::seed_from_u64(seed.wrapping_add(worker as u64));
            let mut sampler = MaxwellWeightedSampler::new(rng);
            sampler.initialize(model)?;
            accumulate(&mut sampler, config, None, worker_target, worker_min, worker_max)
        })
        .collect();

    let acc = parts
        .into_iter()
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .fold(Accumulator::default(), Accumulator::merge);
    let est = acc.estimate();
    log::debug!(
        "parallel rate estimate {:.6e} +- {:.2}% from {} workers, {} samples",
        est.rate,
        100.0 * est.rel_error,
        n_workers,
        est.n_samples
    );
    Ok(est)
}
