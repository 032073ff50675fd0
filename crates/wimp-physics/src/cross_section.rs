//! Elastic WIMP-nucleus scattering.
//!
//! Isotropic in the centre-of-mass frame (the zero-momentum-transfer limit
//! of spin-independent and most spin-dependent couplings). The recoil energy
//! is then uniform on `[0, MaxEr]` and fixes the lab recoil angle.

use std::sync::Arc;

use wimp_core::{CrossSection, Error, Result};

/// Elastic, CM-isotropic cross section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticCrossSection {
    mx: f64,
    mt: f64,
    total_xs: f64,
}

impl ElasticCrossSection {
    /// Create for WIMP mass `mx`, target mass `mt` and total cross section.
    pub fn new(mx: f64, mt: f64, total_xs: f64) -> Result<Self> {
        if !(mx.is_finite() && mx > 0.0 && mt.is_finite() && mt > 0.0) {
            return Err(Error::Validation(format!(
                "masses must be finite and > 0, got Mx={mx}, Mt={mt}"
            )));
        }
        if !total_xs.is_finite() || total_xs < 0.0 {
            return Err(Error::Validation(format!(
                "total cross section must be finite and >= 0, got {total_xs}"
            )));
        }
        Ok(Self { mx, mt, total_xs })
    }

    pub(crate) const fn new_unchecked(mx: f64, mt: f64, total_xs: f64) -> Self {
        Self { mx, mt, total_xs }
    }

    /// Kinematic factor `4 Mx Mt / (Mx + Mt)^2`.
    pub fn kinematic_factor(&self) -> f64 {
        4.0 * self.mx * self.mt / ((self.mx + self.mt) * (self.mx + self.mt))
    }

    /// `dσ/dEr`: flat in `[0, MaxEr)`.
    pub fn dsigma_der(&self, ex: f64, er: f64) -> f64 {
        let emax = self.max_recoil_energy(ex);
        if er < 0.0 || er >= emax {
            return 0.0;
        }
        self.total_xs / emax
    }

    /// Recoil energy for lab-frame cosine `cos_theta`.
    pub fn recoil_energy(&self, ex: f64, cos_theta: f64) -> f64 {
        self.max_recoil_energy(ex) * cos_theta * cos_theta
    }

    /// Centre-of-mass cosine corresponding to lab cosine `cos_theta`.
    pub fn cos_theta_cm(cos_theta: f64) -> f64 {
        2.0 * cos_theta * cos_theta - 1.0
    }
}

impl CrossSection for ElasticCrossSection {
    fn max_recoil_energy(&self, ex: f64) -> f64 {
        self.kinematic_factor() * ex
    }

    fn cos_theta_lab(&self, ex: f64, er: f64) -> f64 {
        let emax = self.max_recoil_energy(ex);
        if emax <= 0.0 {
            // WIMP at rest in the lab: only a forward zero-energy recoil.
            return 1.0;
        }
        (er / emax).clamp(0.0, 1.0).sqrt()
    }

    fn total_xs(&self) -> f64 {
        self.total_xs
    }

    fn with_parameters(&self, mx: f64, mt: f64, total_xs: f64) -> Arc<dyn CrossSection> {
        Arc::new(Self { mx, mt, total_xs })
    }

    fn name(&self) -> &str {
        "elastic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{GEV, KEV};
    use approx::assert_relative_eq;

    #[test]
    fn test_equal_masses_full_transfer() {
        let xs = ElasticCrossSection::new(100.0 * GEV, 100.0 * GEV, 1.0).unwrap();
        assert_relative_eq!(xs.kinematic_factor(), 1.0);
        assert_relative_eq!(xs.max_recoil_energy(30.0 * KEV), 30.0 * KEV);
    }

    #[test]
    fn test_angle_energy_relation() {
        let xs = ElasticCrossSection::new(50.0 * GEV, 122.0 * GEV, 1.0).unwrap();
        let ex = 25.0 * KEV;
        let emax = xs.max_recoil_energy(ex);
        assert_relative_eq!(xs.cos_theta_lab(ex, emax), 1.0);
        assert_relative_eq!(xs.cos_theta_lab(ex, 0.0), 0.0);
        let c = xs.cos_theta_lab(ex, 0.3 * emax);
        assert_relative_eq!(xs.recoil_energy(ex, c), 0.3 * emax, max_relative = 1e-12);
        assert_relative_eq!(ElasticCrossSection::cos_theta_cm(1.0), 1.0);
    }

    #[test]
    fn test_dsigma_der_integrates_to_total() {
        let xs = ElasticCrossSection::new(50.0 * GEV, 122.0 * GEV, 3.0).unwrap();
        let ex = 25.0 * KEV;
        let emax = xs.max_recoil_energy(ex);
        let n = 1000;
        let de = emax / n as f64;
        let total: f64 = (0..n).map(|i| xs.dsigma_der(ex, (i as f64 + 0.5) * de) * de).sum();
        assert_relative_eq!(total, 3.0, max_relative = 1e-12);
        assert_eq!(xs.dsigma_der(ex, emax), 0.0);
    }

    #[test]
    fn test_with_parameters_and_validation() {
        let xs = ElasticCrossSection::new(1.0, 1.0, 1.0).unwrap();
        let other = xs.with_parameters(2.0, 1.0, 5.0);
        assert_eq!(other.total_xs(), 5.0);
        assert_eq!(other.name(), "elastic");
        assert!(ElasticCrossSection::new(0.0, 1.0, 1.0).is_err());
        assert!(ElasticCrossSection::new(1.0, 1.0, -1.0).is_err());
    }

    #[test]
    fn test_zero_energy_wimp() {
        let xs = ElasticCrossSection::new(1.0, 1.0, 1.0).unwrap();
        assert_eq!(xs.cos_theta_lab(0.0, 0.0), 1.0);
    }
}
