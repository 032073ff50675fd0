//! Background-free Poisson upper limit.

use wimp_core::{Error, Result};
use wimp_prob::poisson;

use crate::config::LimitConfig;

/// Last three Newton residuals.
#[derive(Debug, Clone, Copy)]
struct StallWindow {
    recent: [f64; 3],
    len: usize,
}

impl StallWindow {
    fn new() -> Self {
        Self { recent: [0.0; 3], len: 0 }
    }

    /// Record `g`; true when the last three residuals agree to `eps`
    /// relative. The window is cleared after a stall is reported.
    fn push(&mut self, g: f64, eps: f64) -> bool {
        self.recent.rotate_left(1);
        self.recent[2] = g;
        self.len = (self.len + 1).min(3);
        if self.len < 3 {
            return false;
        }
        let [a, b, c] = self.recent;
        let stalled = (1.0 - a / c).abs() < eps && (1.0 - b / c).abs() < eps;
        if stalled {
            self.len = 0;
        }
        stalled
    }
}

/// Upper limit on the Poisson mean given `n_obs` observed events.
///
/// Solves `P(X <= n_obs | n) = 1 - cl` for `n`. Zero events has the closed
/// form `-ln(1 - cl)`; otherwise Newton's method starting at
/// `n_obs + sqrt(n_obs)/2`.
pub fn poisson_upper_limit(n_obs: u64, config: &LimitConfig) -> Result<f64> {
    config.validate()?;
    let cl = config.cl;
    if n_obs == 0 {
        return Ok(-(1.0 - cl).ln());
    }

    let nf = n_obs as f64;
    let mut n = nf + 0.5 * nf.sqrt();
    let mut window = StallWindow::new();
    for iter in 0..config.max_iterations {
        let g = (cl - 1.0) + poisson::cdf(n_obs, n)?;
        if g.abs() / (1.0 - cl) < config.tol {
            log::debug!("poisson upper limit: n_obs={n_obs}, cl={cl} -> {n:.6} ({iter} iterations)");
            return Ok(n);
        }
        let dg = poisson::cdf_derivative(n_obs, n);
        if !(dg.is_finite() && dg != 0.0) {
            return Err(Error::Computation(format!(
                "poisson upper limit: degenerate derivative {dg} at n={n}"
            )));
        }
        n -= g / dg;
        if n <= 0.0 {
            return Err(Error::Computation(format!(
                "poisson upper limit: mean fell to {n} (n_obs={n_obs}, cl={cl})"
            )));
        }
        if window.push(g, config.tol * config.tol) {
            log::warn!("poisson upper limit: stalled at n={n}, nudging by {}", config.tol);
            n += config.tol;
        }
    }
    Err(Error::convergence("poisson_upper_limit", config.max_iterations, n))
}
