//! One-time factorization of the left-hand operator behind a common trait, so that the
//! stepping loop does not care which linear algebra crate does the work.
//!
//! - `Dense`: nalgebra `lu()` on the full matrix
//! - `Banded`: band-limited LU from RustedLINPACK, linear in N for tridiagonal operators
//! - `Faer`: faer dense partial pivoting LU
use crate::numerical::Heat1D::heat_errors::{HeatError, HeatResult};
use crate::somelinalg::RustedLINPACK::lu_band_nalg::LU_nalgebra;
use crate::somelinalg::linear_sys_diagnostics::{check_conditioning, check_pivots};
use faer::linalg::solvers::{PartialPivLu, Solve};
use faer::{Col, Mat};
use log::{debug, info};
use nalgebra::{DMatrix, DVector, Dyn, LU};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum SolverBackend {
    Dense,
    #[default]
    Banded,
    Faer,
}

/// A factorized square matrix M that can solve M x = b repeatedly.
pub trait FactorizedSystem: Send + Sync {
    fn solve(&self, rhs: &DVector<f64>) -> HeatResult<DVector<f64>>;
    fn backend(&self) -> SolverBackend;
    fn dim(&self) -> usize;
}

struct DenseLU {
    lu: LU<f64, Dyn, Dyn>,
    n: usize,
}

impl FactorizedSystem for DenseLU {
    fn solve(&self, rhs: &DVector<f64>) -> HeatResult<DVector<f64>> {
        check_rhs(self.n, rhs)?;
        self.lu.solve(rhs).ok_or(HeatError::SingularOperator {
            row: 0,
            pivot: 0.0,
        })
    }
    fn backend(&self) -> SolverBackend {
        SolverBackend::Dense
    }
    fn dim(&self) -> usize {
        self.n
    }
}

struct BandedLU {
    lu: LU_nalgebra,
}

impl FactorizedSystem for BandedLU {
    fn solve(&self, rhs: &DVector<f64>) -> HeatResult<DVector<f64>> {
        self.lu.solve(rhs)
    }
    fn backend(&self) -> SolverBackend {
        SolverBackend::Banded
    }
    fn dim(&self) -> usize {
        self.lu.dim()
    }
}

struct FaerLU {
    lu: PartialPivLu<f64>,
    n: usize,
}

impl FactorizedSystem for FaerLU {
    fn solve(&self, rhs: &DVector<f64>) -> HeatResult<DVector<f64>> {
        check_rhs(self.n, rhs)?;
        let b = Col::<f64>::from_fn(self.n, |i| rhs[i]);
        let x: Mat<f64> = self.lu.solve(b.as_mat());
        Ok(DVector::from_fn(self.n, |i, _| x[(i, 0)]))
    }
    fn backend(&self) -> SolverBackend {
        SolverBackend::Faer
    }
    fn dim(&self) -> usize {
        self.n
    }
}

fn check_rhs(n: usize, rhs: &DVector<f64>) -> HeatResult<()> {
    if rhs.len() != n {
        return Err(HeatError::DimensionMismatch {
            expected: n,
            got: rhs.len(),
        });
    }
    Ok(())
}

/// Factorizes `matrix` once with the chosen backend. Singular matrices are rejected by the
/// pivot check; when `condition_threshold` is given the condition number is checked too
/// (an SVD, so callers only ask for it on small systems).
pub fn factorize(
    matrix: &DMatrix<f64>,
    backend: SolverBackend,
    condition_threshold: Option<f64>,
) -> HeatResult<Box<dyn FactorizedSystem>> {
    if !matrix.is_square() {
        return Err(HeatError::DimensionMismatch {
            expected: matrix.nrows(),
            got: matrix.ncols(),
        });
    }
    let n = matrix.nrows();
    if let Some(threshold) = condition_threshold {
        check_conditioning(matrix, threshold)?;
    }
    info!("factorizing {}x{} left-hand operator with {} backend", n, n, backend);
    let factorized: Box<dyn FactorizedSystem> = match backend {
        SolverBackend::Dense => {
            let lu = matrix.clone().lu();
            check_pivots(&lu.u().diagonal())?;
            Box::new(DenseLU { lu, n })
        }
        SolverBackend::Banded => {
            let lu = LU_nalgebra::new(matrix.clone(), None)?;
            debug!("bandwidths (kl, ku) = {:?}", lu.bandwidths());
            check_pivots(&lu.pivots())?;
            Box::new(BandedLU { lu })
        }
        SolverBackend::Faer => {
            let mat = Mat::<f64>::from_fn(n, n, |i, j| matrix[(i, j)]);
            let lu = mat.partial_piv_lu();
            let u = lu.U();
            check_pivots(&DVector::from_fn(n, |i, _| u[(i, i)]))?;
            Box::new(FaerLU { lu, n })
        }
    };
    Ok(factorized)
}
