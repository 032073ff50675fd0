//! # wimp-core
//!
//! Core types for the WIMP direct-detection Monte Carlo.
//!
//! This crate provides:
//! - the workspace [`Error`] type and [`Result`] alias
//! - collaborator traits ([`CrossSection`], [`FormFactor`], [`DetectorResponse`])
//! - the generated event record [`Sample`]
//! - [`OrthonormalFrame`] for rotating scattering angles into lab coordinates
//!
//! ## Architecture
//!
//! Samplers (`wimp-mc`) and limit code (`wimp-limits`) depend on the traits
//! defined here, NOT on concrete nuclear physics implementations.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod frame;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use frame::{DEFAULT_FRAME_TOL, OrthonormalFrame};
pub use traits::{CrossSection, DetectorResponse, FormFactor};
pub use types::Sample;

/// Re-exported vector type used for velocities and directions.
pub type Vec3 = nalgebra::Vector3<f64>;
