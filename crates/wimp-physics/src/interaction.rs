//! WIMP-nucleus interaction: masses, detector mass and scattering physics.

use std::sync::Arc;

use wimp_core::{CrossSection, Error, FormFactor, Result};

use crate::cross_section::ElasticCrossSection;
use crate::form_factor::UnityFormFactor;
use crate::params::ParameterUpdate;
use crate::units::{CM, GEV, KG};

/// Default WIMP mass.
pub const DEFAULT_MX: f64 = 100.0 * GEV;
/// Default target nucleus mass.
pub const DEFAULT_MT: f64 = 100.0 * GEV;
/// Default detector fiducial mass.
pub const DEFAULT_MTOT: f64 = 100.0 * KG;
/// Default total cross section (1e-40 cm^2).
pub const DEFAULT_TOTAL_XS: f64 = 1e-40 * CM * CM;

/// Masses, detector mass and the shared cross-section / form-factor objects.
#[derive(Debug, Clone)]
pub struct InteractionModel {
    mx: f64,
    mt: f64,
    mtot: f64,
    cross_section: Arc<dyn CrossSection>,
    form_factor: Arc<dyn FormFactor>,
}

impl Default for InteractionModel {
    fn default() -> Self {
        Self {
            mx: DEFAULT_MX,
            mt: DEFAULT_MT,
            mtot: DEFAULT_MTOT,
            cross_section: Arc::new(ElasticCrossSection::new_unchecked(
                DEFAULT_MX,
                DEFAULT_MT,
                DEFAULT_TOTAL_XS,
            )),
            form_factor: Arc::new(UnityFormFactor),
        }
    }
}

impl InteractionModel {
    /// Elastic scattering with a unity form factor.
    pub fn new(mx: f64, mt: f64, mtot: f64, total_xs: f64) -> Result<Self> {
        if !mtot.is_finite() || mtot <= 0.0 {
            return Err(Error::Validation(format!("Mtot must be finite and > 0, got {mtot}")));
        }
        let cross_section = Arc::new(ElasticCrossSection::new(mx, mt, total_xs)?);
        Ok(Self { mx, mt, mtot, cross_section, form_factor: Arc::new(UnityFormFactor) })
    }

    /// WIMP mass.
    pub fn mx(&self) -> f64 {
        self.mx
    }

    /// Target nucleus mass.
    pub fn mt(&self) -> f64 {
        self.mt
    }

    /// Detector fiducial mass.
    pub fn mtot(&self) -> f64 {
        self.mtot
    }

    /// Total cross section, as held by the cross-section object.
    pub fn total_xs(&self) -> f64 {
        self.cross_section.total_xs()
    }

    /// WIMP-nucleus reduced mass.
    pub fn reduced_mass(&self) -> f64 {
        self.mx * self.mt / (self.mx + self.mt)
    }

    /// Shared cross-section handle.
    pub fn cross_section(&self) -> &Arc<dyn CrossSection> {
        &self.cross_section
    }

    /// Shared form-factor handle.
    pub fn form_factor(&self) -> &Arc<dyn FormFactor> {
        &self.form_factor
    }

    /// Replace the cross-section model. It is re-derived for the current
    /// masses, keeping its own total cross section.
    pub fn set_cross_section(&mut self, cross_section: Arc<dyn CrossSection>) {
        let xs = cross_section.total_xs();
        self.cross_section = cross_section.with_parameters(self.mx, self.mt, xs);
    }

    /// Replace the form factor.
    pub fn set_form_factor(&mut self, form_factor: Arc<dyn FormFactor>) {
        self.form_factor = form_factor;
    }

    /// Apply `Mx`, `Mt`, `Mtot` and `XS`. The cross section is re-derived
    /// once, after all values are in place.
    pub fn set_parameters(&mut self, update: &ParameterUpdate) -> Result<()> {
        update.validate()?;
        if !update.touches_interaction() {
            return Ok(());
        }
        self.mx = update.mx.unwrap_or(self.mx);
        self.mt = update.mt.unwrap_or(self.mt);
        self.mtot = update.mtot.unwrap_or(self.mtot);
        let xs = update.total_xs.unwrap_or_else(|| self.cross_section.total_xs());
        self.cross_section = self.cross_section.with_parameters(self.mx, self.mt, xs);
        Ok(())
    }
}
