//! Natural units.
//!
//! Mass and energy in MeV, length in cm, time in seconds, angles in radians.
//! Every numeric input of the workspace is expected in these units; multiply
//! by a constant to convert into them and divide to convert out
//! (`230.0 * KM / SEC`, `er / KEV`).

/// Megaelectronvolt (unit of mass and energy).
pub const MEV: f64 = 1.0;
/// Gigaelectronvolt.
pub const GEV: f64 = 1000.0 * MEV;
/// Kiloelectronvolt.
pub const KEV: f64 = 1e-3 * MEV;
/// Electronvolt.
pub const EV: f64 = 1e-6 * MEV;
/// Teraelectronvolt.
pub const TEV: f64 = 1e6 * MEV;
/// Atomic mass unit.
pub const AMU: f64 = 931.5 * MEV;

/// Kilogram, as a mass-energy.
pub const KG: f64 = 5.60958e29 * MEV;
/// Gram.
pub const GRAM: f64 = 1e-3 * KG;
/// Metric tonne.
pub const TONNE: f64 = 1000.0 * KG;

/// Centimetre (unit of length).
pub const CM: f64 = 1.0;
/// Femtometre.
pub const FM: f64 = 1e-13 * CM;
/// Metre.
pub const METER: f64 = 100.0 * CM;
/// Kilometre.
pub const KM: f64 = 1e5 * CM;

/// Second (unit of time).
pub const SEC: f64 = 1.0;
/// Minute.
pub const MINUTE: f64 = 60.0 * SEC;
/// Hour.
pub const HOUR: f64 = 3600.0 * SEC;
/// Day.
pub const DAY: f64 = 86_400.0 * SEC;
/// Week.
pub const WEEK: f64 = 7.0 * DAY;
/// Julian year.
pub const YEAR: f64 = 365.25 * DAY;

/// Speed of light.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0 * METER / SEC;
/// `ħc` in MeV·cm.
pub const HBARC: f64 = 197.327 * MEV * FM;
/// Degree.
pub const DEG: f64 = std::f64::consts::PI / 180.0;
