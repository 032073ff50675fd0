//! Common sampler contract.

use serde::Serialize;
use wimp_core::{Error, Result, Sample};
use wimp_physics::PhysicsModel;

/// Counters collected while sampling.
///
/// Numeric-domain problems (an envelope violation, a NaN or negative target
/// value) do not abort sampling; they are logged and counted here so the
/// caller can flag the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SamplerDiagnostics {
    /// Samples emitted by `sample()` (burn-in excluded).
    pub n_samples: u64,
    /// Proposals drawn (equal to `n_samples` for weighted samplers).
    pub n_proposals: u64,
    /// Proposals accepted.
    pub n_accepted: u64,
    /// Accept/reject proposals whose target exceeded the envelope.
    pub n_envelope_violations: u64,
    /// Non-finite or negative weights/probabilities encountered.
    pub n_invalid: u64,
}

impl SamplerDiagnostics {
    /// `n_accepted / n_proposals` (1 before any proposal).
    pub fn acceptance_rate(&self) -> f64 {
        if self.n_proposals == 0 {
            return 1.0;
        }
        self.n_accepted as f64 / self.n_proposals as f64
    }

    /// `true` if any numeric-domain problem was recorded.
    pub fn has_warnings(&self) -> bool {
        self.n_envelope_violations > 0 || self.n_invalid > 0
    }
}

/// A generator of WIMP scattering [`Sample`]s.
///
/// Samplers capture the model at [`initialize`](EventSampler::initialize)
/// and do not track later changes; re-initialize after every parameter
/// update.
pub trait EventSampler {
    /// Capture `model` and precompute sampler-specific bounds.
    fn initialize(&mut self, model: &PhysicsModel) -> Result<()>;

    /// Draw one sample.
    fn sample(&mut self) -> Result<Sample>;

    /// Sampler name (e.g. "maxwell").
    fn name(&self) -> &'static str;

    /// Model generation captured at the last `initialize()`, if any.
    fn generation(&self) -> Option<u64>;

    /// Counters since the last `initialize()`.
    fn diagnostics(&self) -> SamplerDiagnostics;

    /// Error if never initialized or if `model` changed since.
    fn ensure_current(&self, model: &PhysicsModel) -> Result<()> {
        match self.generation() {
            None => Err(not_initialized(self.name())),
            Some(g) if g != model.generation() => Err(Error::Validation(format!(
                "{} sampler is stale: initialized at model generation {g}, model is at {}; \
                 call initialize() again",
                self.name(),
                model.generation()
            ))),
            Some(_) => Ok(()),
        }
    }

    /// Draw `n` samples.
    fn sample_n(&mut self, n: usize) -> Result<Vec<Sample>> {
        (0..n).map(|_| self.sample()).collect()
    }
}

pub(crate) fn not_initialized(name: &str) -> Error {
    Error::Validation(format!("{name} sampler used before initialize()"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptance_rate() {
        let d = SamplerDiagnostics { n_proposals: 8, n_accepted: 2, ..Default::default() };
        assert_eq!(d.acceptance_rate(), 0.25);
        assert_eq!(SamplerDiagnostics::default().acceptance_rate(), 1.0);
        assert!(!d.has_warnings());
        assert!(SamplerDiagnostics { n_invalid: 1, ..Default::default() }.has_warnings());
    }
}
