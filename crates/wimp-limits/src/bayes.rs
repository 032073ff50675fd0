//! Bayesian upper limits with a known background.

use wimp_core::{Error, Result};
use wimp_prob::gamma;

use crate::cls::cls_upper_limit;
use crate::config::{LimitConfig, validate_background};

/// Bayesian upper limit with a flat prior on `s >= 0`.
///
/// The posterior credible bound coincides with the CLs limit.
pub fn bayes_uniform_upper_limit(n_obs: u64, background: f64, config: &LimitConfig) -> Result<f64> {
    cls_upper_limit(n_obs, background, config)
}

/// Bayesian upper limit with the Jeffreys prior `(s + b)^{-1/2}`.
///
/// The posterior mass below `s` is `1 - Q(a, s+b) / Q(a, b)` with
/// `a = n_obs + 1/2` and `Q` the regularized upper incomplete gamma
/// function. Solved by Newton's method kept inside a bisection bracket.
pub fn bayes_jeffreys_upper_limit(
    n_obs: u64,
    background: f64,
    config: &LimitConfig,
) -> Result<f64> {
    config.validate()?;
    validate_background(background)?;
    let (cl, b) = (config.cl, background);
    let a = n_obs as f64 + 0.5;

    // Upper-tail form: P(a, b) rounds to 1 for large backgrounds.
    let q_bkg = gamma::regularized_upper(a, b)?;
    if !(q_bkg > 0.0) {
        return Err(Error::Computation(format!(
            "jeffreys: posterior normalization Q({a}, {b}) underflows to zero"
        )));
    }
    let residual =
        |s: f64| -> Result<f64> { Ok(1.0 - gamma::regularized_upper(a, s + b)? / q_bkg - cl) };

    // Bracket: residual(0) = -cl < 0; grow the top until it turns positive.
    let nf = n_obs as f64;
    let mut s = (nf + 0.5 * nf.sqrt()).max(1.0);
    let (mut lo, mut hi) = (0.0, s);
    while residual(hi)? < 0.0 {
        lo = hi;
        hi *= 2.0;
        if !hi.is_finite() {
            return Err(Error::Computation("jeffreys: failed to bracket the limit".to_string()));
        }
    }
    s = s.clamp(lo, hi);

    for iter in 0..config.max_iterations {
        let r = residual(s)?;
        if r.abs() / (1.0 - cl) < config.tol {
            log::debug!(
                "jeffreys upper limit: n_obs={n_obs}, b={b}, cl={cl} -> {s:.6} ({iter} iterations)"
            );
            return Ok(s);
        }
        if r < 0.0 {
            lo = s;
        } else {
            hi = s;
        }
        let slope = gamma::density_unit_rate(s + b, a)? / q_bkg;
        let newton = s - r / slope;
        s = if slope > 0.0 && newton > lo && newton < hi { newton } else { 0.5 * (lo + hi) };
    }
    Err(Error::convergence("bayes_jeffreys_upper_limit", config.max_iterations, s))
}
