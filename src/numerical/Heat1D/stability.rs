//! Stability advisory.
//!
//! r = alpha dt / dx^2 is the quantity that limits the explicit (forward Euler) scheme to
//! r <= 1/2. Crank-Nicolson is unconditionally stable, but large r lets stiff high-frequency
//! modes oscillate and decay slowly, so exceeding the limit is reported and never fatal.
use log::{info, warn};

pub const EXPLICIT_STABILITY_LIMIT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityReport {
    pub ratio: f64,
    pub exceeds_explicit_limit: bool,
}

pub fn stability_ratio(alpha: f64, dt: f64, dx: f64) -> f64 {
    alpha * dt / (dx * dx)
}

pub fn check_stability(alpha: f64, dt: f64, dx: f64) -> StabilityReport {
    let ratio = stability_ratio(alpha, dt, dx);
    let exceeds_explicit_limit = ratio > EXPLICIT_STABILITY_LIMIT;
    info!("stability ratio alpha*dt/dx^2 = {:.6}", ratio);
    if exceeds_explicit_limit {
        warn!(
            "stability ratio {:.4} exceeds {} (explicit scheme limit); Crank-Nicolson stays stable but the solution may show oscillations, consider a smaller time step",
            ratio, EXPLICIT_STABILITY_LIMIT
        );
    }
    StabilityReport {
        ratio,
        exceeds_explicit_limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ratio() {
        // dx = 1/6 for five cells
        let report = check_stability(0.01, 0.01, 1.0 / 6.0);
        assert_relative_eq!(report.ratio, 0.0036, epsilon = 1e-12);
        assert!(!report.exceeds_explicit_limit);
    }

    #[test]
    fn test_advisory_above_limit() {
        let report = check_stability(1.0, 0.01, 0.01);
        assert_relative_eq!(report.ratio, 100.0, epsilon = 1e-9);
        assert!(report.exceeds_explicit_limit);
        // exactly at the limit is fine
        assert!(!check_stability(0.5, 1.0, 1.0).exceeds_explicit_limit);
    }
}
