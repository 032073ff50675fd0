//! Parameter updates.
//!
//! A [`ParameterUpdate`] lists every parameter a caller may change after
//! construction. It can be built directly, deserialized from JSON, or parsed
//! from string-keyed entries with [`ParameterUpdate::from_map`]; the keys are
//! fixed and anything else is rejected.

use serde::{Deserialize, Serialize};
use wimp_core::{Error, Result};

/// Recognized parameter keys.
///
/// | key | field | meaning |
/// |---|---|---|
/// | `v0` | [`ParameterUpdate::v0`] | halo dispersion velocity |
/// | `vE` | [`ParameterUpdate::v_earth`] | lab velocity through the halo (3-vector) |
/// | `vesc` | [`ParameterUpdate::vesc`] | galactic escape velocity |
/// | `rhox` | [`ParameterUpdate::rho`] | local WIMP mass density |
/// | `Mx` | [`ParameterUpdate::mx`] | WIMP mass |
/// | `Mt` | [`ParameterUpdate::mt`] | target nucleus mass |
/// | `Mtot` | [`ParameterUpdate::mtot`] | detector fiducial mass |
/// | `XS` | [`ParameterUpdate::total_xs`] | total WIMP-nucleus cross section |
pub const PARAMETER_KEYS: [&str; 8] = ["v0", "vE", "vesc", "rhox", "Mx", "Mt", "Mtot", "XS"];

/// A single parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Scalar parameter.
    Scalar(f64),
    /// 3-vector parameter (`vE`).
    Vector([f64; 3]),
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Scalar(v)
    }
}

impl From<[f64; 3]> for ParamValue {
    fn from(v: [f64; 3]) -> Self {
        ParamValue::Vector(v)
    }
}

/// Explicit set of optional parameter changes. `None` leaves a value as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterUpdate {
    /// Halo dispersion velocity `v0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v0: Option<f64>,
    /// Lab velocity through the halo `vE`.
    #[serde(rename = "vE", default, skip_serializing_if = "Option::is_none")]
    pub v_earth: Option<[f64; 3]>,
    /// Galactic escape velocity `vesc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vesc: Option<f64>,
    /// Local WIMP mass density.
    #[serde(rename = "rhox", default, skip_serializing_if = "Option::is_none")]
    pub rho: Option<f64>,
    /// WIMP mass.
    #[serde(rename = "Mx", default, skip_serializing_if = "Option::is_none")]
    pub mx: Option<f64>,
    /// Target nucleus mass.
    #[serde(rename = "Mt", default, skip_serializing_if = "Option::is_none")]
    pub mt: Option<f64>,
    /// Detector fiducial mass.
    #[serde(rename = "Mtot", default, skip_serializing_if = "Option::is_none")]
    pub mtot: Option<f64>,
    /// Total WIMP-nucleus cross section.
    #[serde(rename = "XS", default, skip_serializing_if = "Option::is_none")]
    pub total_xs: Option<f64>,
}

fn scalar(key: &str, value: ParamValue) -> Result<f64> {
    match value {
        ParamValue::Scalar(v) => Ok(v),
        ParamValue::Vector(_) => {
            Err(Error::Validation(format!("parameter '{key}' expects a scalar, got a 3-vector")))
        }
    }
}

fn positive(name: &str, v: Option<f64>) -> Result<()> {
    match v {
        Some(x) if !x.is_finite() || x <= 0.0 => {
            Err(Error::Validation(format!("{name} must be finite and > 0, got {x}")))
        }
        _ => Ok(()),
    }
}

fn non_negative(name: &str, v: Option<f64>) -> Result<()> {
    match v {
        Some(x) if !x.is_finite() || x < 0.0 => {
            Err(Error::Validation(format!("{name} must be finite and >= 0, got {x}")))
        }
        _ => Ok(()),
    }
}

impl ParameterUpdate {
    /// Parse string-keyed entries. Unknown keys, repeated keys and values of
    /// the wrong kind are errors.
    pub fn from_map<I, K>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, ParamValue)>,
        K: AsRef<str>,
    {
        let mut out = ParameterUpdate::default();
        for (key, value) in entries {
            let key = key.as_ref();
            let slot_was_set = match key {
                "v0" => out.v0.replace(scalar(key, value)?).is_some(),
                "vesc" => out.vesc.replace(scalar(key, value)?).is_some(),
                "rhox" => out.rho.replace(scalar(key, value)?).is_some(),
                "Mx" => out.mx.replace(scalar(key, value)?).is_some(),
                "Mt" => out.mt.replace(scalar(key, value)?).is_some(),
                "Mtot" => out.mtot.replace(scalar(key, value)?).is_some(),
                "XS" => out.total_xs.replace(scalar(key, value)?).is_some(),
                "vE" => match value {
                    ParamValue::Vector(v) => out.v_earth.replace(v).is_some(),
                    ParamValue::Scalar(_) => {
                        return Err(Error::Validation(
                            "parameter 'vE' expects a 3-vector, got a scalar".to_string(),
                        ));
                    }
                },
                other => {
                    return Err(Error::Validation(format!(
                        "unknown parameter '{other}' (expected one of {})",
                        PARAMETER_KEYS.join(", ")
                    )));
                }
            };
            if slot_was_set {
                return Err(Error::Validation(format!("parameter '{key}' given more than once")));
            }
        }
        Ok(out)
    }

    /// Parse a JSON object such as `{"Mx": 50000.0, "vE": [0, 0, 2.3e7]}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// `true` if no parameter is set.
    pub fn is_empty(&self) -> bool {
        *self == ParameterUpdate::default()
    }

    /// Check every set value without applying anything.
    pub fn validate(&self) -> Result<()> {
        positive("v0", self.v0)?;
        positive("vesc", self.vesc)?;
        non_negative("rhox", self.rho)?;
        positive("Mx", self.mx)?;
        positive("Mt", self.mt)?;
        positive("Mtot", self.mtot)?;
        non_negative("XS", self.total_xs)?;
        if let Some(v) = self.v_earth {
            if !v.iter().all(|c| c.is_finite()) {
                return Err(Error::Validation(format!("vE must be finite, got {v:?}")));
            }
        }
        Ok(())
    }

    /// `true` if the update changes the interaction model.
    pub fn touches_interaction(&self) -> bool {
        self.mx.is_some() || self.mt.is_some() || self.mtot.is_some() || self.total_xs.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_map_known_keys() {
        let u = ParameterUpdate::from_map([
            ("v0", ParamValue::from(2.3e7)),
            ("vE", ParamValue::from([0.0, 0.0, 2.3e7])),
            ("XS", ParamValue::from(2e-39)),
        ])
        .unwrap();
        assert_eq!(u.v0, Some(2.3e7));
        assert_eq!(u.v_earth, Some([0.0, 0.0, 2.3e7]));
        assert_eq!(u.total_xs, Some(2e-39));
        assert!(u.mx.is_none());
        assert!(u.touches_interaction());
    }

    #[test]
    fn test_from_map_rejects_unknown_key() {
        let err = ParameterUpdate::from_map([("MCMCSigma", ParamValue::from(1.0))]).unwrap_err();
        assert!(err.to_string().contains("unknown parameter 'MCMCSigma'"));
    }

    #[test]
    fn test_from_map_rejects_wrong_kind_and_duplicates() {
        assert!(ParameterUpdate::from_map([("vE", ParamValue::from(1.0))]).is_err());
        assert!(ParameterUpdate::from_map([("Mx", ParamValue::from([1.0, 2.0, 3.0]))]).is_err());
        let dup = [("Mx", ParamValue::from(1.0)), ("Mx", ParamValue::from(2.0))];
        assert!(ParameterUpdate::from_map(dup).is_err());
    }

    #[test]
    fn test_json_keys_and_unknown_rejection() {
        let u = ParameterUpdate::from_json_str(r#"{"Mx": 50000.0, "rhox": 300.0}"#).unwrap();
        assert_eq!(u.mx, Some(50000.0));
        assert_eq!(u.rho, Some(300.0));
        assert!(ParameterUpdate::from_json_str(r#"{"mx": 1.0}"#).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(ParameterUpdate::default().validate().is_ok());
        assert!(ParameterUpdate::default().is_empty());
        assert!(ParameterUpdate { v0: Some(0.0), ..Default::default() }.validate().is_err());
        assert!(ParameterUpdate { total_xs: Some(0.0), ..Default::default() }.validate().is_ok());
        assert!(ParameterUpdate { rho: Some(-1.0), ..Default::default() }.validate().is_err());
        let bad_ve = ParameterUpdate { v_earth: Some([f64::NAN, 0.0, 0.0]), ..Default::default() };
        assert!(bad_ve.validate().is_err());
    }
}
