//! CLs upper limit for a counting experiment with known background.

use wimp_core::{Error, Result};
use wimp_prob::poisson;

use crate::config::{LimitConfig, validate_background};

/// CLs upper limit on the signal mean `s`.
///
/// Solves `P(X <= n_obs | s + b) / P(X <= n_obs | b) = 1 - cl`. Newton steps
/// that would overshoot past zero halve `s` instead. With zero observed
/// events the background cancels and the limit is `-ln(1 - cl)` for any `b`.
pub fn cls_upper_limit(n_obs: u64, background: f64, config: &LimitConfig) -> Result<f64> {
    config.validate()?;
    validate_background(background)?;
    let cl = config.cl;
    if n_obs == 0 {
        return Ok(-(1.0 - cl).ln());
    }

    let pvb = poisson::cdf(n_obs, background)?;
    if !(pvb > 0.0) {
        return Err(Error::Computation(format!(
            "CLs: P(X <= {n_obs} | b={background}) underflows to zero"
        )));
    }

    let mut s = (n_obs as f64 - background).max(5.0);
    for iter in 0..config.max_iterations {
        let mu = s + background;
        let diff = (1.0 - cl) - poisson::cdf(n_obs, mu)? / pvb;
        if diff.abs() / (1.0 - cl) < config.tol {
            log::debug!(
                "CLs upper limit: n_obs={n_obs}, b={background}, cl={cl} -> {s:.6} ({iter} iterations)"
            );
            return Ok(s);
        }
        let dfds = -poisson::cdf_derivative(n_obs, mu) / pvb;
        if !(dfds.is_finite() && dfds != 0.0) {
            return Err(Error::Computation(format!("CLs: degenerate derivative {dfds} at s={s}")));
        }
        let step = diff / dfds;
        if step < s {
            s -= step;
        } else {
            s *= 0.5;
        }
        if !(s > 0.0) {
            return Err(Error::Computation(format!("CLs: signal fell to {s}")));
        }
    }
    Err(Error::convergence("cls_upper_limit", config.max_iterations, s))
}
