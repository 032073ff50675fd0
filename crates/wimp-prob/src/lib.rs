//! Probability building blocks for WIMP limit setting.
//!
//! This crate hosts the small amount of probability math shared by the
//! samplers and the limit solvers:
//! - Poisson pmf/cdf (and the CDF derivative used by Newton solvers)
//! - normal log-densities (the Maxwellian importance proposal)
//! - regularized incomplete gamma functions (Bayesian Jeffreys limits)

pub mod gamma;
pub mod normal;
pub mod poisson;
