//! Conversion of event-count limits into cross-section limits.
//!
//! The expected number of events scales linearly with the total cross
//! section, so a limit `n_limit` on the signal count at reference cross
//! section `xs_ref` with rate `R(xs_ref)` and exposure time `T` becomes
//! `xs_limit = n_limit * xs_ref / (R * T)`.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use wimp_core::{Error, Result};
use wimp_mc::{EventSampler, MaxwellWeightedSampler, RateConfig, RateEstimate, estimate_rate};
use wimp_physics::{ParameterUpdate, PhysicsModel};

use crate::bayes::bayes_jeffreys_upper_limit;
use crate::cls::cls_upper_limit;
use crate::config::{FeldmanCousinsConfig, LimitConfig};
use crate::feldman_cousins::feldman_cousins_interval;
use crate::poisson_ul::poisson_upper_limit;

/// Count-limit method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitMethod {
    /// Background-free Poisson upper limit (background ignored).
    Poisson,
    /// CLs upper limit.
    Cls,
    /// Feldman-Cousins interval.
    FeldmanCousins,
    /// Bayesian upper limit with a Jeffreys prior.
    BayesJeffreys,
}

/// Limit on the signal count, as an interval (`lower = 0` for upper limits).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CountLimit {
    /// Lower end.
    pub lower: f64,
    /// Upper end.
    pub upper: f64,
}

/// Cross-section limit and the inputs it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct XsLimit {
    /// Lower cross-section limit (0 for upper limits).
    pub xs_lower: f64,
    /// Upper cross-section limit.
    pub xs_upper: f64,
    /// Count limits.
    pub counts: CountLimit,
    /// Rate estimate at the reference cross section.
    pub rate: RateEstimate,
    /// WIMP mass used.
    pub mx: f64,
}

/// Count limit for `n_obs` over `background` with `method`.
pub fn count_limit(
    method: LimitMethod,
    n_obs: u64,
    background: f64,
    limit: &LimitConfig,
    fc: &FeldmanCousinsConfig,
) -> Result<CountLimit> {
    let upper_only = |upper: f64| CountLimit { lower: 0.0, upper };
    let out = match method {
        LimitMethod::Poisson => upper_only(poisson_upper_limit(n_obs, limit)?),
        LimitMethod::Cls => upper_only(cls_upper_limit(n_obs, background, limit)?),
        LimitMethod::BayesJeffreys => {
            upper_only(bayes_jeffreys_upper_limit(n_obs, background, limit)?)
        }
        LimitMethod::FeldmanCousins => {
            let i = feldman_cousins_interval(n_obs, background, fc)?;
            CountLimit { lower: i.lower, upper: i.upper }
        }
    };
    if !(out.upper > 0.0) {
        return Err(Error::Computation(format!("{method:?}: count limit {} <= 0", out.upper)));
    }
    Ok(out)
}

/// Computes cross-section limits for a [`PhysicsModel`].
#[derive(Debug, Clone)]
pub struct CrossSectionLimitCalculator {
    model: PhysicsModel,
    exposure: f64,
    method: LimitMethod,
    rate_config: RateConfig,
    limit_config: LimitConfig,
    fc_config: FeldmanCousinsConfig,
    seed: u64,
}

impl CrossSectionLimitCalculator {
    /// Calculator for `model` (its total cross section is the reference) over
    /// exposure time `exposure`.
    pub fn new(model: PhysicsModel, exposure: f64, method: LimitMethod) -> Result<Self> {
        if !(exposure.is_finite() && exposure > 0.0) {
            return Err(Error::Validation(format!("exposure must be finite and > 0, got {exposure}")));
        }
        if !(model.interaction().total_xs() > 0.0) {
            return Err(Error::Validation("reference cross section must be > 0".to_string()));
        }
        Ok(Self {
            model,
            exposure,
            method,
            rate_config: RateConfig::default(),
            limit_config: LimitConfig::default(),
            fc_config: FeldmanCousinsConfig::default(),
            seed: 0,
        })
    }

    /// Energy window and precision of the rate estimate.
    pub fn with_rate_config(mut self, config: RateConfig) -> Self {
        self.rate_config = config;
        self
    }

    /// Confidence level and solver settings for all methods.
    pub fn with_cl(mut self, cl: f64) -> Self {
        self.limit_config.cl = cl;
        self.fc_config.cl = cl;
        self
    }

    /// Solver settings for Poisson, CLs and Jeffreys.
    pub fn with_limit_config(mut self, config: LimitConfig) -> Self {
        self.limit_config = config;
        self
    }

    /// Feldman-Cousins settings.
    pub fn with_fc_config(mut self, config: FeldmanCousinsConfig) -> Self {
        self.fc_config = config;
        self
    }

    /// Seed of the internal Maxwell sampler.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Underlying model.
    pub fn model(&self) -> &PhysicsModel {
        &self.model
    }

    /// Expected rate at the reference cross section (Maxwell sampler).
    pub fn expected_rate(&self) -> Result<RateEstimate> {
        let mut sampler = MaxwellWeightedSampler::new(StdRng::seed_from_u64(self.seed));
        sampler.initialize(&self.model)?;
        estimate_rate(&mut sampler, &self.rate_config)
    }

    /// Cross-section limit for `n_obs` events over `background`.
    pub fn xs_limit(&self, n_obs: u64, background: f64) -> Result<XsLimit> {
        let rate = self.expected_rate()?;
        self.convert(n_obs, background, rate)
    }

    /// [`xs_limit`](Self::xs_limit) with a caller-provided weighted sampler,
    /// which must be initialized on this calculator's model.
    pub fn xs_limit_with_sampler<S: EventSampler + ?Sized>(
        &self,
        sampler: &mut S,
        n_obs: u64,
        background: f64,
    ) -> Result<XsLimit> {
        sampler.ensure_current(&self.model)?;
        let rate = estimate_rate(sampler, &self.rate_config)?;
        self.convert(n_obs, background, rate)
    }

    /// Limits for several WIMP masses, one rayon task per mass (seeded
    /// `seed + i`).
    pub fn xs_limit_curve(&self, masses: &[f64], n_obs: u64, background: f64) -> Result<Vec<XsLimit>> {
        use rayon::prelude::*;

        masses
            .par_iter()
            .enumerate()
            .map(|(i, &mx)| {
                let mut calc = self.clone();
                calc.model.set_parameters(&ParameterUpdate { mx: Some(mx), ..Default::default() })?;
                calc.seed = self.seed.wrapping_add(i as u64);
                calc.xs_limit(n_obs, background)
            })
            .collect()
    }

    fn convert(&self, n_obs: u64, background: f64, rate: RateEstimate) -> Result<XsLimit> {
        if !(rate.rate > 0.0) {
            return Err(Error::Computation(format!(
                "expected rate {} in the energy window is not positive",
                rate.rate
            )));
        }
        let counts =
            count_limit(self.method, n_obs, background, &self.limit_config, &self.fc_config)?;
        let xs_ref = self.model.interaction().total_xs();
        let per_event = xs_ref / (rate.rate * self.exposure);
        let out = XsLimit {
            xs_lower: counts.lower * per_event,
            xs_upper: counts.upper * per_event,
            counts,
            rate,
            mx: self.model.interaction().mx(),
        };
        log::debug!(
            "{:?} cross-section limit at Mx={:.4e}: [{:.4e}, {:.4e}] (rate {:.4e})",
            self.method,
            out.mx,
            out.xs_lower,
            out.xs_upper,
            rate.rate
        );
        Ok(out)
    }
}
