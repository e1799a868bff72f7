use crate::numerical::Heat1D::heat_errors::{HeatError, HeatResult};
use log::{info, warn};
use nalgebra::{DMatrix, DVector, SVD};

/// Checks the pivots (diagonal of U) of a finished LU factorization. A pivot that is zero,
/// non-finite or negligible compared with the largest one (|u_ii| <= n * eps * max|u_jj|)
/// means the matrix is numerically singular.
pub fn check_pivots(pivots: &DVector<f64>) -> HeatResult<()> {
    let n = pivots.len();
    let max_pivot = pivots.amax();
    let tolerance = n as f64 * f64::EPSILON * max_pivot;
    for (row, &pivot) in pivots.iter().enumerate() {
        if !pivot.is_finite() || pivot == 0.0 || pivot.abs() <= tolerance {
            warn!("negligible pivot {:.3e} in row {} (tolerance {:.3e})", pivot, row, tolerance);
            return Err(HeatError::SingularOperator { row, pivot });
        }
    }
    Ok(())
}

/// sweeps allowed per matrix dimension before the SVD is considered not converged
pub const SVD_SWEEPS_PER_ROW: usize = 100;

/// The condition number of a matrix is the ratio of the largest singular value to the smallest
/// one. It measures how strongly errors in the right-hand side are amplified by the solution.
/// Non-finite matrices and an SVD that does not converge give infinity.
pub fn condition_number(A: &DMatrix<f64>) -> f64 {
    if A.iter().any(|v| !v.is_finite()) {
        return f64::INFINITY;
    }
    let max_niter = SVD_SWEEPS_PER_ROW * A.nrows().max(1);
    let Some(svd) = SVD::try_new(A.clone(), false, false, f64::EPSILON, max_niter) else {
        warn!("SVD did not converge in {} iterations", max_niter);
        return f64::INFINITY;
    };
    let max_sigma = svd.singular_values.max();
    let min_sigma = svd.singular_values.min();
    if min_sigma == 0.0 {
        f64::INFINITY
    } else {
        max_sigma / min_sigma
    }
}

/// Fails with `IllConditioned` when cond(A) exceeds `threshold`, otherwise returns cond(A).
pub fn check_conditioning(A: &DMatrix<f64>, threshold: f64) -> HeatResult<f64> {
    let condition_number = condition_number(A);
    if condition_number > threshold || condition_number.is_nan() {
        warn!(
            "condition number {:.3e} exceeds threshold {:.3e}",
            condition_number, threshold
        );
        return Err(HeatError::IllConditioned {
            condition_number,
            threshold,
        });
    }
    info!("condition number of the left-hand operator: {:.3e}", condition_number);
    Ok(condition_number)
}
