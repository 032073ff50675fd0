//! Form factors.

use wimp_core::FormFactor;

/// Point-like nucleus: `|F(Q^2)|^2 = 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnityFormFactor;

impl FormFactor for UnityFormFactor {
    #[inline]
    fn ff2(&self, _q2: f64) -> f64 {
        1.0
    }

    fn name(&self) -> &str {
        "unity"
    }
}
