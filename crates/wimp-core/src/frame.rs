//! Orthonormal frames built around a direction.
//!
//! Scattering angles are naturally expressed relative to the incoming WIMP
//! velocity. [`OrthonormalFrame`] maps such an angle back to fixed lab
//! coordinates.

use nalgebra::Vector3;

/// Default minimum length below which a direction is replaced by the z-axis.
pub const DEFAULT_FRAME_TOL: f64 = 1e-4;

/// Three mutually orthogonal unit vectors, `e1` parallel to the seed direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthonormalFrame {
    /// Unit vector along the seed direction.
    pub e1: Vector3<f64>,
    /// First transverse unit vector.
    pub e2: Vector3<f64>,
    /// Second transverse unit vector (`e1 x e2`).
    pub e3: Vector3<f64>,
}

impl OrthonormalFrame {
    /// Frame around `v` with the default tolerance.
    pub fn from_direction(v: &Vector3<f64>) -> Self {
        Self::with_tolerance(v, DEFAULT_FRAME_TOL)
    }

    /// Frame around `v`; if `|v| < tol` the z-axis is used instead.
    pub fn with_tolerance(v: &Vector3<f64>, tol: f64) -> Self {
        let e1 = if v.norm_squared() < tol * tol { Vector3::z() } else { v.normalize() };

        let mut e2 = e1.cross(&Vector3::x());
        if e2.norm_squared() < 1e-8 {
            // e1 is (anti)parallel to x.
            e2 = e1.cross(&Vector3::y());
        }
        let e2 = e2.normalize();
        let e3 = e1.cross(&e2).normalize();
        Self { e1, e2, e3 }
    }

    /// Unit vector at polar cosine `cos_theta` from `e1` and azimuth `phi`
    /// measured from `e2` towards `e3`.
    #[inline]
    pub fn rotate(&self, cos_theta: f64, phi: f64) -> Vector3<f64> {
        // Clamp: cos_theta_lab can exceed 1 by rounding.
        let c = cos_theta.clamp(-1.0, 1.0);
        let s = (1.0 - c * c).sqrt();
        let (sin_phi, cos_phi) = phi.sin_cos();
        self.e1 * c + (self.e2 * cos_phi + self.e3 * sin_phi) * s
    }

    /// Point with coordinates `(a1, a2, a3)` along `(e1, e2, e3)`.
    #[inline]
    pub fn compose(&self, a1: f64, a2: f64, a3: f64) -> Vector3<f64> {
        self.e1 * a1 + self.e2 * a2 + self.e3 * a3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn assert_orthonormal(f: &OrthonormalFrame) {
        assert_relative_eq!(f.e1.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(f.e2.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(f.e3.norm(), 1.0, epsilon = 1e-12);
        assert!(f.e1.dot(&f.e2).abs() < 1e-12);
        assert!(f.e1.dot(&f.e3).abs() < 1e-12);
        assert!(f.e2.dot(&f.e3).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector_defaults_to_z() {
        let f = OrthonormalFrame::from_direction(&Vector3::zeros());
        assert_eq!(f.e1, Vector3::z());
        assert_orthonormal(&f);
    }

    #[test]
    fn test_tolerance_is_configurable() {
        let v = Vector3::new(1e-3, 0.0, 0.0);
        assert_eq!(OrthonormalFrame::with_tolerance(&v, 1e-2).e1, Vector3::z());
        assert_relative_eq!(OrthonormalFrame::with_tolerance(&v, 1e-4).e1, Vector3::x());
    }

    #[test]
    fn test_x_axis_uses_y_fallback() {
        let f = OrthonormalFrame::from_direction(&Vector3::new(-3.0, 0.0, 0.0));
        assert_relative_eq!(f.e1, -Vector3::x(), epsilon = 1e-15);
        assert_orthonormal(&f);
    }

    #[test]
    fn test_rotate_forward_and_transverse() {
        let f = OrthonormalFrame::from_direction(&Vector3::new(0.0, 0.0, 230.0));
        assert_relative_eq!(f.rotate(1.0, 0.7), f.e1, epsilon = 1e-12);
        assert_relative_eq!(f.rotate(0.0, 0.0), f.e2, epsilon = 1e-12);
        assert_relative_eq!(f.rotate(0.0, std::f64::consts::FRAC_PI_2), f.e3, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn prop_frame_orthonormal(x in -1e3f64..1e3, y in -1e3f64..1e3, z in -1e3f64..1e3) {
            let v = Vector3::new(x, y, z);
            let f = OrthonormalFrame::from_direction(&v);
            assert_orthonormal(&f);
            if v.norm() >= DEFAULT_FRAME_TOL {
                prop_assert!((f.e1.dot(&v) - v.norm()).abs() < 1e-9 * v.norm().max(1.0));
            }
        }

        #[test]
        fn prop_rotate_is_unit(c in -1.0f64..=1.0, phi in 0.0f64..std::f64::consts::TAU) {
            let f = OrthonormalFrame::from_direction(&Vector3::new(0.3, -1.2, 2.0));
            let d = f.rotate(c, phi);
            prop_assert!((d.norm() - 1.0).abs() < 1e-12);
            prop_assert!((d.dot(&f.e1) - c).abs() < 1e-12);
        }
    }
}
