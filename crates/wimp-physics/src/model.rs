//! The complete physics model handed to samplers.

use std::sync::Arc;

use wimp_core::{CrossSection, FormFactor, Result};

use crate::astro::AstroModel;
use crate::interaction::InteractionModel;
use crate::params::{ParamValue, ParameterUpdate};
use crate::velocity::VelocityDistribution;

/// Astrophysics + interaction, with a generation counter.
///
/// Every successful mutation bumps [`PhysicsModel::generation`]. Samplers
/// record the generation they captured at `initialize()` and use it to detect
/// a stale snapshot.
#[derive(Debug, Clone, Default)]
pub struct PhysicsModel {
    astro: AstroModel,
    interaction: InteractionModel,
    generation: u64,
}

impl PhysicsModel {
    /// Combine an astro and an interaction model.
    pub fn new(astro: AstroModel, interaction: InteractionModel) -> Self {
        Self { astro, interaction, generation: 0 }
    }

    /// Astrophysical inputs.
    pub fn astro(&self) -> &AstroModel {
        &self.astro
    }

    /// Interaction inputs.
    pub fn interaction(&self) -> &InteractionModel {
        &self.interaction
    }

    /// Halo velocity distribution.
    pub fn velocity(&self) -> &VelocityDistribution {
        self.astro.velocity()
    }

    /// Mutation counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Rate normalization `totalXs * rho / Mx * Mtot / Mt`.
    pub fn rate_normalization(&self) -> f64 {
        let i = &self.interaction;
        i.total_xs() * self.astro.rho() / i.mx() * i.mtot() / i.mt()
    }

    /// Validate `update` completely, then apply it.
    ///
    /// On error nothing changes. An empty update is a no-op and does not bump
    /// the generation.
    pub fn set_parameters(&mut self, update: &ParameterUpdate) -> Result<()> {
        update.validate()?;
        if update.is_empty() {
            return Ok(());
        }
        let mut astro = self.astro.clone();
        astro.set_parameters(update)?;
        let mut interaction = self.interaction.clone();
        interaction.set_parameters(update)?;

        self.astro = astro;
        self.interaction = interaction;
        self.generation += 1;
        log::debug!(
            "physics model updated to generation {} (v0={:.4e}, vesc={:.4e}, Mx={:.4e}, XS={:.4e})",
            self.generation,
            self.velocity().v0(),
            self.velocity().vesc(),
            self.interaction.mx(),
            self.interaction.total_xs()
        );
        Ok(())
    }

    /// [`set_parameters`](Self::set_parameters) from string-keyed entries.
    pub fn set_parameter_map<I, K>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, ParamValue)>,
        K: AsRef<str>,
    {
        let update = ParameterUpdate::from_map(entries)?;
        self.set_parameters(&update)
    }

    /// Replace the form factor.
    pub fn set_form_factor(&mut self, form_factor: Arc<dyn FormFactor>) {
        self.interaction.set_form_factor(form_factor);
        self.generation += 1;
    }

    /// Replace the cross-section model.
    pub fn set_cross_section(&mut self, cross_section: Arc<dyn CrossSection>) {
        self.interaction.set_cross_section(cross_section);
        self.generation += 1;
    }

    /// Mutable access to the velocity distribution (bumps the generation).
    pub fn velocity_mut(&mut self) -> &mut VelocityDistribution {
        self.generation += 1;
        self.astro.velocity_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{GEV, KM, SEC};
    use approx::assert_relative_eq;

    #[test]
    fn test_generation_bumps_on_mutation() {
        let mut m = PhysicsModel::default();
        assert_eq!(m.generation(), 0);
        m.set_parameters(&ParameterUpdate { mx: Some(50.0 * GEV), ..Default::default() })
            .unwrap();
        assert_eq!(m.generation(), 1);
        m.set_parameters(&ParameterUpdate::default()).unwrap();
        assert_eq!(m.generation(), 1);
    }

    #[test]
    fn test_failed_update_is_atomic() {
        let mut m = PhysicsModel::default();
        let update = ParameterUpdate {
            v0: Some(230.0 * KM / SEC),
            mx: Some(50.0 * GEV),
            vesc: Some(0.0),
            ..Default::default()
        };
        assert!(m.set_parameters(&update).is_err());
        assert_eq!(m.generation(), 0);
        assert_eq!(m.velocity().v0(), 220.0 * KM / SEC);
        assert_eq!(m.interaction().mx(), 100.0 * GEV);
    }

    #[test]
    fn test_parameter_map() {
        let mut m = PhysicsModel::default();
        m.set_parameter_map([("XS", ParamValue::from(2e-39)), ("rhox", ParamValue::from(400.0))])
            .unwrap();
        assert_eq!(m.interaction().total_xs(), 2e-39);
        assert_eq!(m.astro().rho(), 400.0);
        assert!(m.set_parameter_map([("sigma", ParamValue::from(1.0))]).is_err());
        assert_eq!(m.generation(), 1);
    }

    #[test]
    fn test_rate_normalization() {
        let m = PhysicsModel::default();
        let i = m.interaction();
        let expected = i.total_xs() * m.astro().rho() * i.mtot() / (i.mx() * i.mt());
        assert_relative_eq!(m.rate_normalization(), expected, max_relative = 1e-14);
    }
}
