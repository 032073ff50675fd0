//! Common data types

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// One generated scattering event.
///
/// The true recoil energy and direction are fixed at generation time. The
/// reconstructed copies start equal to the true values and are the only
/// quantities a detector response is expected to change (together with
/// `det_weight`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    er: f64,
    recoil_dir: Vector3<f64>,

    /// Generator weight: importance weight, or 1 for unweighted samplers.
    pub gen_weight: f64,

    /// Detector weight (default 1).
    pub det_weight: f64,

    /// WIMP velocity in the lab frame before scattering.
    pub wimp_velocity: Vector3<f64>,

    /// Reconstructed recoil energy.
    pub er_reco: f64,

    /// Reconstructed recoil direction.
    pub recoil_dir_reco: Vector3<f64>,
}

impl Sample {
    /// Create a sample with detector weight 1 and reconstructed values equal
    /// to the true ones.
    pub fn new(er: f64, recoil_dir: Vector3<f64>, gen_weight: f64, wimp_velocity: Vector3<f64>) -> Self {
        Self {
            er,
            recoil_dir,
            gen_weight,
            det_weight: 1.0,
            wimp_velocity,
            er_reco: er,
            recoil_dir_reco: recoil_dir,
        }
    }

    /// True recoil energy.
    pub fn er(&self) -> f64 {
        self.er
    }

    /// True recoil direction (unit vector, lab frame).
    pub fn recoil_dir(&self) -> &Vector3<f64> {
        &self.recoil_dir
    }

    /// Total weight: generator weight times detector weight.
    pub fn weight(&self) -> f64 {
        self.gen_weight * self.det_weight
    }

    /// `true` if `er_min <= Er < er_max` (true energy).
    pub fn in_window(&self, er_min: f64, er_max: f64) -> bool {
        self.er >= er_min && self.er < er_max
    }
}
