//! Loading the standard-halo fixture and driving the model through updates.

use approx::assert_relative_eq;
use wimp_core::CrossSection;
use wimp_physics::units::{AMU, GEV, KEV, KM, SEC, SPEED_OF_LIGHT, TONNE};
use wimp_physics::{ParamValue, PhysicsConfig, PhysicsModel};

fn load_standard_halo() -> PhysicsModel {
    let json = include_str!("../../../tests/fixtures/standard_halo.json");
    PhysicsConfig::from_json_str(json).unwrap().build().unwrap()
}

#[test]
fn test_fixture_values() {
    let m = load_standard_halo();
    assert_relative_eq!(m.velocity().v0(), 230.0 * KM / SEC);
    assert_relative_eq!(m.velocity().vesc(), 544.0 * KM / SEC);
    assert_relative_eq!(m.interaction().mx(), 50.0 * GEV);
    assert_relative_eq!(m.interaction().mt(), 131.0 * AMU);
    assert_relative_eq!(m.interaction().mtot(), TONNE, max_relative = 1e-12);
    assert_eq!(m.generation(), 0);
}

#[test]
fn test_recoil_kinematics_at_fixture_masses() {
    let m = load_standard_halo();
    let v = 500.0 * KM / SEC;
    let ex = 0.5 * m.interaction().mx() * (v / SPEED_OF_LIGHT).powi(2);
    let emax = m.interaction().cross_section().max_recoil_energy(ex);
    // 50 GeV WIMP on xenon at 500 km/s: about 57 keV.
    assert!(emax > 30.0 * KEV && emax < 70.0 * KEV, "emax = {} keV", emax / KEV);
}

#[test]
fn test_update_sequence() {
    let mut m = load_standard_halo();
    let norm = m.velocity().norm();
    m.set_parameter_map([("vE", ParamValue::from([0.0, 2.3e7, 0.0]))]).unwrap();
    assert_eq!(m.velocity().norm(), norm);
    m.set_parameter_map([("vesc", ParamValue::from(6.0e7))]).unwrap();
    assert!(m.velocity().norm() < norm);
    assert_eq!(m.generation(), 2);
    assert!(m.set_parameter_map([("Mx", ParamValue::from(0.0))]).is_err());
    assert_eq!(m.generation(), 2);
}
