//! # wimp-limits
//!
//! Limits on the signal count of a counting experiment, and their conversion
//! into WIMP-nucleus cross-section limits:
//!
//! - [`poisson_upper_limit`]: background-free classical upper limit
//! - [`cls_upper_limit`]: modified frequentist CLs upper limit
//! - [`feldman_cousins_interval`]: unified (Feldman-Cousins) intervals
//! - [`bayes_uniform_upper_limit`] / [`bayes_jeffreys_upper_limit`]
//! - [`CrossSectionLimitCalculator`]: count limit to cross-section limit

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bayes;
pub mod cls;
pub mod config;
pub mod feldman_cousins;
pub mod poisson_ul;
pub mod xs_limit;

pub use bayes::{bayes_jeffreys_upper_limit, bayes_uniform_upper_limit};
pub use cls::cls_upper_limit;
pub use config::{FeldmanCousinsConfig, LimitConfig};
pub use feldman_cousins::{AcceptanceRegion, FcInterval, fc_acceptance, feldman_cousins_interval};
pub use poisson_ul::poisson_upper_limit;
pub use xs_limit::{CountLimit, CrossSectionLimitCalculator, LimitMethod, XsLimit, count_limit};
