//! Error types for the WIMP Monte Carlo workspace

use thiserror::Error;

/// Workspace error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid parameter or configuration, or a violated call precondition
    /// (sampling before `initialize()`, sampling on a stale model snapshot).
    #[error("Validation error: {0}")]
    Validation(String),

    /// An iterative routine exhausted its iteration bound.
    ///
    /// Carries the last best estimate so callers can inspect how far off the
    /// routine was when it gave up.
    #[error(
        "{routine} did not converge after {iterations} iterations (last estimate {last_estimate})"
    )]
    Convergence {
        /// Routine that gave up (e.g. `"accept_reject"`, `"cls_upper_limit"`).
        routine: &'static str,
        /// Number of iterations performed.
        iterations: usize,
        /// Last best estimate (NaN if none is meaningful).
        last_estimate: f64,
    },

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

impl Error {
    /// Shorthand for building a [`Error::Convergence`].
    pub fn convergence(routine: &'static str, iterations: usize, last_estimate: f64) -> Self {
        Error::Convergence { routine, iterations, last_estimate }
    }

    /// `true` if this is an iteration-bound exhaustion rather than a hard failure.
    pub fn is_convergence(&self) -> bool {
        matches!(self, Error::Convergence { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convergence_display_carries_estimate() {
        let e = Error::convergence("poisson_upper_limit", 200, 3.25);
        let msg = e.to_string();
        assert!(msg.contains("poisson_upper_limit"));
        assert!(msg.contains("200"));
        assert!(msg.contains("3.25"));
        assert!(e.is_convergence());
    }

    #[test]
    fn test_validation_is_not_convergence() {
        let e = Error::Validation("v0 must be > 0".to_string());
        assert!(!e.is_convergence());
    }
}
