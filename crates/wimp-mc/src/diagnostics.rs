//! Weighted-sample summaries and MCMC chain diagnostics.

use serde::Serialize;
use wimp_core::Sample;

/// Running weighted mean and variance of a per-sample quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeightedSummary {
    /// Number of pushed values.
    pub n: u64,
    /// Sum of weights.
    pub sum_w: f64,
    /// Sum of squared weights.
    pub sum_w2: f64,
    /// Sum of `w * x`.
    pub sum_wx: f64,
    /// Sum of `w * x^2`.
    pub sum_wx2: f64,
}

impl WeightedSummary {
    /// Add `x` with weight `w`.
    #[inline]
    pub fn push(&mut self, x: f64, w: f64) {
        self.n += 1;
        self.sum_w += w;
        self.sum_w2 += w * w;
        self.sum_wx += w * x;
        self.sum_wx2 += w * x * x;
    }

    /// Summary of `f(sample)` weighted by the generator weight.
    pub fn from_samples<'a>(
        samples: impl IntoIterator<Item = &'a Sample>,
        f: impl Fn(&Sample) -> f64,
    ) -> Self {
        let mut s = Self::default();
        for x in samples {
            s.push(f(x), x.gen_weight);
        }
        s
    }

    /// Combine two summaries.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            n: self.n + other.n,
            sum_w: self.sum_w + other.sum_w,
            sum_w2: self.sum_w2 + other.sum_w2,
            sum_wx: self.sum_wx + other.sum_wx,
            sum_wx2: self.sum_wx2 + other.sum_wx2,
        }
    }

    /// Weighted mean (NaN if the weights sum to zero).
    pub fn mean(&self) -> f64 {
        self.sum_wx / self.sum_w
    }

    /// Weighted population variance.
    pub fn variance(&self) -> f64 {
        let m = self.mean();
        (self.sum_wx2 / self.sum_w - m * m).max(0.0)
    }

    /// Kish effective sample size `(sum w)^2 / sum w^2`.
    pub fn effective_sample_size(&self) -> f64 {
        if self.sum_w2 <= 0.0 {
            return 0.0;
        }
        self.sum_w * self.sum_w / self.sum_w2
    }

    /// Standard error of the weighted mean, using the Kish sample size.
    pub fn std_error(&self) -> f64 {
        let ess = self.effective_sample_size();
        if ess <= 1.0 {
            return f64::INFINITY;
        }
        (self.variance() / (ess - 1.0)).sqrt()
    }
}

/// Integrated autocorrelation time of a single chain.
///
/// Autocorrelations come from the variogram, summed in adjacent pairs with
/// Geyer's initial monotone sequence. Returns 1 for chains too short or
/// constant.
pub fn integrated_autocorrelation_time(chain: &[f64]) -> f64 {
    let n = chain.len();
    if n < 4 {
        return 1.0;
    }
    let n_f = n as f64;
    let mean = chain.iter().sum::<f64>() / n_f;
    let var = chain.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / (n_f - 1.0);
    if !var.is_finite() || var < 1e-300 {
        return 1.0;
    }

    let mut rho: Vec<f64> = Vec::new();
    for lag in 1..n {
        let v = chain.windows(lag + 1).map(|w| (w[0] - w[lag]).powi(2)).sum::<f64>()
            / (n - lag) as f64;
        rho.push((1.0 - v / (2.0 * var)).clamp(-1.0, 1.0));
        let k = rho.len();
        if k % 2 == 0 && rho[k - 2] + rho[k - 1] < 0.0 {
            break;
        }
    }

    let mut tau = 1.0;
    let mut prev = f64::INFINITY;
    for pair in rho.chunks_exact(2) {
        let g = pair[0] + pair[1];
        if g < 0.0 {
            break;
        }
        let g = g.min(prev);
        tau += 2.0 * g;
        prev = g;
    }
    tau.max(1.0)
}

/// `n / tau` for a single chain.
pub fn effective_sample_size(chain: &[f64]) -> f64 {
    let n = chain.len() as f64;
    (n / integrated_autocorrelation_time(chain)).clamp(0.0, n)
}
