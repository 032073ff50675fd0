//! # wimp-mc
//!
//! Monte Carlo event generation for WIMP direct detection.
//!
//! Four samplers implement [`EventSampler`], all targeting the same density
//! `|v| f(v) |F(Q^2)|^2 / Emax` over WIMP velocity and recoil energy:
//!
//! - [`UniformWeightedSampler`]: uniform velocity box, importance weights
//! - [`MaxwellWeightedSampler`]: Maxwellian proposal, importance weights
//! - [`AcceptRejectSampler`]: unweighted, envelope rejection
//! - [`McmcSampler`]: unweighted, Metropolis-Hastings (autocorrelated)
//!
//! Weighted samplers carry the full rate normalization in their weights;
//! [`estimate_rate`] and [`estimate_rate_parallel`] turn them into expected
//! event rates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accept_reject;
pub mod cache;
pub mod diagnostics;
pub mod maxwell;
pub mod mcmc;
pub mod rate;
pub mod sampler;
pub mod uniform;

pub use accept_reject::{AcceptRejectConfig, AcceptRejectSampler, Envelope};
pub use cache::ModelSnapshot;
pub use diagnostics::{WeightedSummary, effective_sample_size, integrated_autocorrelation_time};
pub use maxwell::MaxwellWeightedSampler;
pub use mcmc::{ChainState, McmcConfig, McmcSampler};
pub use rate::{
    RateConfig, RateEstimate, estimate_rate, estimate_rate_parallel, estimate_rate_with_response,
};
pub use sampler::{EventSampler, SamplerDiagnostics};
pub use uniform::UniformWeightedSampler;
