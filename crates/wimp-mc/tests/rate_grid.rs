//! End-to-end rate check: Maxwell sampler against a direct grid integration.

use rand::SeedableRng;
use rand::rngs::StdRng;
use wimp_core::CrossSection;
use wimp_mc::{EventSampler, MaxwellWeightedSampler, RateConfig, estimate_rate_parallel};
use wimp_physics::units::{KEV, SPEED_OF_LIGHT};
use wimp_physics::{PhysicsConfig, PhysicsModel};

fn load_standard_halo() -> PhysicsModel {
    let json = include_str!("../../../tests/fixtures/standard_halo.json");
    PhysicsConfig::from_json_str(json).unwrap().build().unwrap()
}

/// `N * ∫ d³v f(v) |v| min(1, Ecut / Emax(v))` in galactic-frame spherical
/// coordinates around `vE` (azimuthal symmetry leaves a 2D integral).
fn grid_rate(model: &PhysicsModel, e_cut: f64) -> f64 {
    let d = model.velocity();
    let xs = model.interaction().cross_section();
    let mx = model.interaction().mx();
    let ve = d.v_earth().norm();
    let (n_u, n_c) = (2000, 400);
    let du = d.vesc() / n_u as f64;
    let dc = 2.0 / n_c as f64;
    let mut total = 0.0;
    for i in 0..n_u {
        let u = (i as f64 + 0.5) * du;
        let f = d.norm() * (-(u * u) / (d.v0() * d.v0())).exp();
        for j in 0..n_c {
            let c = -1.0 + (j as f64 + 0.5) * dc;
            let speed = (u * u + ve * ve - 2.0 * u * ve * c).max(0.0).sqrt();
            let ex = 0.5 * mx * (speed / SPEED_OF_LIGHT).powi(2);
            let emax = xs.max_recoil_energy(ex);
            let frac = if emax > e_cut { e_cut / emax } else { 1.0 };
            total += 2.0 * std::f64::consts::PI * u * u * f * speed * frac * du * dc;
        }
    }
    total * model.rate_normalization()
}

#[test]
fn test_standard_halo_rate_matches_grid_integration() {
    let model = load_standard_halo();
    let e_cut = 100.0 * KEV;
    let expected = grid_rate(&model, e_cut);

    let mut sampler = MaxwellWeightedSampler::new(StdRng::seed_from_u64(2024));
    sampler.initialize(&model).unwrap();
    let n = 1_000_000;
    let mut sum = 0.0;
    for _ in 0..n {
        let s = sampler.sample().unwrap();
        if s.er() < e_cut {
            sum += s.weight();
        }
    }
    let rate = sum / n as f64;
    let rel = rate / expected - 1.0;
    assert!(rel.abs() < 0.05, "MC rate {rate:.6e} vs grid {expected:.6e} ({:.2}%)", 100.0 * rel);
}

#[test]
fn test_parallel_estimate_matches_grid_integration() {
    let model = load_standard_halo();
    let e_cut = 100.0 * KEV;
    let expected = grid_rate(&model, e_cut);
    let cfg = RateConfig { er_max: Some(e_cut), target_rel_error: 2e-3, ..Default::default() };
    let est = estimate_rate_parallel(&model, 4, 99, &cfg).unwrap();
    let rel = est.rate / expected - 1.0;
    assert!(rel.abs() < 0.02, "parallel rate off by {:.2}%", 100.0 * rel);
    assert!(est.n_in_window <= est.n_samples);
}
