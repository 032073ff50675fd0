//! Feldman-Cousins unified intervals.
//!
//! For a signal mean `s` and background `b`, counts `n` are ranked by the
//! likelihood ratio `P(n | s+b) / P(n | max(b, n))` and added to the
//! acceptance region in decreasing order until the accumulated probability
//! reaches `cl`. The confidence interval for an observed count is the set of
//! `s` whose acceptance region contains it; both ends are located by binary
//! search.

use serde::Serialize;
use statrs::function::erf::erf_inv;
use wimp_core::{Error, Result};
use wimp_prob::poisson;

use crate::config::{FeldmanCousinsConfig, validate_background, validate_cl};

/// Acceptance region `[lim_min, lim_max]` for one `(s, b)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AcceptanceRegion {
    /// Smallest accepted count.
    pub lim_min: u64,
    /// Largest accepted count.
    pub lim_max: u64,
    /// Probability covered by the accepted counts.
    pub probability: f64,
}

impl AcceptanceRegion {
    /// `true` if `n` lies inside the region.
    pub fn contains(&self, n: u64) -> bool {
        self.lim_min <= n && n <= self.lim_max
    }
}

/// Feldman-Cousins interval on the signal mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FcInterval {
    /// Lower limit (0 when `upper_limit_only`).
    pub lower: f64,
    /// Upper limit.
    pub upper: f64,
    /// The observed count is compatible with zero signal.
    pub upper_limit_only: bool,
}

fn sigma_for(cl: f64) -> f64 {
    std::f64::consts::SQRT_2 * erf_inv(cl)
}

/// Ranked acceptance region over `n = 0..n_max`, or `None` if it reaches the
/// end of the range.
fn accept_in_range(mu: f64, b: f64, cl: f64, n_max: u64) -> Option<AcceptanceRegion> {
    let pval: Vec<f64> = (0..n_max).map(|n| poisson::pmf(n, mu)).collect();
    let mut order: Vec<(u64, f64)> = pval
        .iter()
        .enumerate()
        .map(|(n, &p)| {
            let n = n as u64;
            let best = poisson::pmf(n, b.max(n as f64));
            (n, if best > 0.0 { p / best } else { 0.0 })
        })
        .collect();
    // Stable: ties keep ascending n.
    order.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut total = 0.0;
    let mut lim_min = n_max;
    let mut lim_max = 0;
    for &(n, _) in &order {
        if total >= cl {
            break;
        }
        total += pval[n as usize];
        lim_min = lim_min.min(n);
        lim_max = lim_max.max(n);
    }
    if lim_max + 1 >= n_max {
        return None;
    }
    Some(AcceptanceRegion { lim_min, lim_max, probability: total })
}

fn acceptance(s: f64, b: f64, cl: f64, max_doublings: usize) -> Result<AcceptanceRegion> {
    let mu = s + b;
    let start = (mu + 4.0 * sigma_for(cl) * mu.sqrt()).max(20.0);
    let mut n_max = 2 * start as u64;
    for _ in 0..=max_doublings {
        if let Some(region) = accept_in_range(mu, b, cl, n_max) {
            return Ok(region);
        }
        n_max *= 2;
    }
    Err(Error::convergence("fc_acceptance", max_doublings, n_max as f64))
}

/// Acceptance region for signal `s`, background `b` at confidence `cl`.
pub fn fc_acceptance(s: f64, b: f64, cl: f64) -> Result<AcceptanceRegion> {
    validate_cl(cl)?;
    validate_background(b)?;
    if !s.is_finite() || s < 0.0 {
        return Err(Error::Validation(format!("signal must be finite and >= 0, got {s}")));
    }
    acceptance(s, b, cl, FeldmanCousinsConfig::default().max_range_doublings)
}

/// Feldman-Cousins interval for `n_obs` events over background `b`.
pub fn feldman_cousins_interval(
    n_obs: u64,
    background: f64,
    config: &FeldmanCousinsConfig,
) -> Result<FcInterval> {
    config.validate()?;
    validate_background(background)?;
    let (b, cl, tol) = (background, config.cl, config.search_tol);
    let accept = |s: f64| acceptance(s, b, cl, config.max_range_doublings);

    let nf = n_obs as f64;
    let mut hi = (nf + 10.0 * sigma_for(cl) * nf.sqrt()).max(20.0);
    let mut doublings = 0;
    while accept(hi)?.lim_min <= n_obs {
        if doublings == config.max_range_doublings {
            return Err(Error::convergence("feldman_cousins_interval", doublings, hi));
        }
        hi *= 2.0;
        doublings += 1;
    }
    if doublings > 4 {
        log::warn!("feldman-cousins: upper bracket doubled {doublings} times to {hi}");
    }

    let upper_limit_only = n_obs == 0 || accept(0.0)?.contains(n_obs);
    let mut lower = 0.0;
    if !upper_limit_only {
        // Smallest s whose acceptance region reaches n_obs.
        let (mut lo, mut up) = (0.0, hi);
        while up - lo > tol {
            let mid = 0.5 * (lo + up);
            if accept(mid)?.lim_max >= n_obs {
                up = mid;
            } else {
                lo = mid;
            }
        }
        lower = lo;
    }

    // Largest s whose acceptance region still starts at or below n_obs.
    let (mut lo, mut up) = (0.0, hi);
    while up - lo > tol {
        let mid = 0.5 * (lo + up);
        if accept(mid)?.lim_min <= n_obs {
            lo = mid;
        } else {
            up = mid;
        }
    }
    let upper = lo;
    if !(upper > 0.0) {
        return Err(Error::Computation(format!(
            "feldman-cousins: upper limit {upper} for n_obs={n_obs}, b={b}"
        )));
    }

    log::debug!("feldman-cousins: n_obs={n_obs}, b={b}, cl={cl} -> [{lower:.4}, {upper:.4}]");
    Ok(FcInterval { lower, upper, upper_limit_only })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_acceptance_zero_signal_zero_background() {
        let r = fc_acceptance(0.0, 0.0, 0.9).unwrap();
        assert_eq!((r.lim_min, r.lim_max), (0, 0));
        assert_eq!(r.probability, 1.0);
    }

    #[test]
    fn test_acceptance_covers_cl() {
        for (s, b) in [(0.5, 0.0), (3.0, 1.0), (12.0, 4.0), (80.0, 20.0)] {
            let r = fc_acceptance(s, b, 0.9).unwrap();
            assert!(r.probability >= 0.9, "s={s}, b={b}: {r:?}");
            assert!(r.lim_min as f64 <= s + b && s + b <= r.lim_max as f64);
        }
    }

    #[test]
    fn test_truncated_range_is_rejected() {
        for (s, b) in [(30.0, 0.0), (25.0, 5.0)] {
            let mu = s + b;
            assert_eq!(accept_in_range(mu, b, 0.9, 20), None, "s={s}, b={b}");

            let wide = accept_in_range(mu, b, 0.9, 1000).unwrap();
            let grown = acceptance(s, b, 0.9, 4).unwrap();
            assert_eq!((grown.lim_min, grown.lim_max), (wide.lim_min, wide.lim_max));
            assert_relative_eq!(grown.probability, wide.probability, max_relative = 1e-12);

            // The last bin of the range must stay outside the region.
            assert_eq!(accept_in_range(mu, b, 0.9, wide.lim_max + 1), None);
            let tight = accept_in_range(mu, b, 0.9, wide.lim_max + 2).unwrap();
            assert_eq!((tight.lim_min, tight.lim_max), (wide.lim_min, wide.lim_max));
        }
    }

    #[test]
    fn test_table_values_no_background() {
        let cfg = FeldmanCousinsConfig::default();
        let i0 = feldman_cousins_interval(0, 0.0, &cfg).unwrap();
        assert!(i0.upper_limit_only);
        assert_eq!(i0.lower, 0.0);
        assert_relative_eq!(i0.upper, 2.44, epsilon = 0.02);

        let i1 = feldman_cousins_interval(1, 0.0, &cfg).unwrap();
        assert!(!i1.upper_limit_only);
        assert_relative_eq!(i1.lower, 0.11, epsilon = 0.02);
        assert_relative_eq!(i1.upper, 4.36, epsilon = 0.02);

        let i3 = feldman_cousins_interval(3, 0.0, &cfg).unwrap();
        assert_relative_eq!(i3.lower, 1.10, epsilon = 0.02);
        assert_relative_eq!(i3.upper, 7.42, epsilon = 0.02);
    }

    #[test]
    fn test_zero_count_upper_limit_falls_with_background() {
        let cfg = FeldmanCousinsConfig::default();
        let ul: Vec<f64> = [0.0, 1.0, 3.0]
            .iter()
            .map(|&b| feldman_cousins_interval(0, b, &cfg).unwrap().upper)
            .collect();
        assert!(ul.windows(2).all(|w| w[1] < w[0]), "{ul:?}");
        assert_relative_eq!(ul[2], 0.95, epsilon = 0.02);
    }

    #[test]
    fn test_small_excess_over_background_is_upper_limit() {
        let i = feldman_cousins_interval(2, 3.0, &FeldmanCousinsConfig::default()).unwrap();
        assert!(i.upper_limit_only);
        assert_relative_eq!(i.upper, 3.03, epsilon = 0.02);
    }

    #[test]
    fn test_invalid_inputs() {
        let cfg = FeldmanCousinsConfig::default();
        assert!(feldman_cousins_interval(1, -1.0, &cfg).is_err());
        assert!(feldman_cousins_interval(1, 0.0, &FeldmanCousinsConfig::with_cl(1.5)).is_err());
        assert!(fc_acceptance(-1.0, 0.0, 0.9).is_err());
    }
}
