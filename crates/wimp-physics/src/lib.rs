//! # wimp-physics
//!
//! Physics inputs for WIMP direct-detection simulation:
//! - [`VelocityDistribution`]: truncated Maxwell-Boltzmann halo in the lab frame
//! - [`AstroModel`] / [`InteractionModel`] / [`PhysicsModel`]
//! - [`ElasticCrossSection`] and [`UnityFormFactor`]
//! - [`ParameterUpdate`] for validated, atomic parameter changes
//! - [`PhysicsConfig`] for JSON configuration
//!
//! Everything is expressed in natural units (MeV, cm, s); see [`units`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod astro;
pub mod config;
pub mod cross_section;
pub mod form_factor;
pub mod interaction;
pub mod model;
pub mod params;
pub mod units;
pub mod velocity;

pub use astro::AstroModel;
pub use config::{AstroParams, InteractionParams, PhysicsConfig};
pub use cross_section::ElasticCrossSection;
pub use form_factor::UnityFormFactor;
pub use interaction::InteractionModel;
pub use model::PhysicsModel;
pub use params::{PARAMETER_KEYS, ParamValue, ParameterUpdate};
pub use velocity::{MonteCarloNormalization, VelocityDistribution};
