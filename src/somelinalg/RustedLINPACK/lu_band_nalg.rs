#![allow(non_snake_case)]
#![allow(non_camel_case_types)]
use crate::numerical::Heat1D::heat_errors::{HeatError, HeatResult};
use nalgebra::{DMatrix, DVector};

/// LU decomposition with partial (row) pivoting restricted to the band of the matrix.
/// Storage stays dense (nalgebra DMatrix), but every elimination step only touches the
/// kl rows below the diagonal and the kl+ku columns to the right of it, so the cost is
/// O(N*kl*(kl+ku)) instead of O(N^3). For the tridiagonal Crank-Nicolson operator that
/// is linear in N.
///
/// Multipliers of column i are stored below the diagonal and are NOT permuted by later
/// row swaps; the swaps are replayed step by step during forward substitution (the
/// LINPACK/LAPACK gbtrf convention).
#[derive(Debug, Clone)]
pub struct LU_nalgebra {
    lu: DMatrix<f64>,
    /// row exchanged with row i at elimination step i
    swaps: Vec<usize>,
    kl: usize,
    ku: usize,
}

impl LU_nalgebra {
    /// Factorizes `matrix`. Bandwidths are detected from the sparsity pattern when not given.
    pub fn new(matrix: DMatrix<f64>, bandwidth: Option<(usize, usize)>) -> HeatResult<LU_nalgebra> {
        if !matrix.is_square() {
            return Err(HeatError::DimensionMismatch {
                expected: matrix.nrows(),
                got: matrix.ncols(),
            });
        }
        let (kl, ku) = bandwidth.unwrap_or_else(|| Self::find_bandwidths(&matrix));
        let n = matrix.nrows();
        let mut lu = LU_nalgebra {
            lu: matrix,
            swaps: (0..n).collect(),
            kl,
            ku,
        };
        lu.LU()?;
        Ok(lu)
    }

    /// (lower, upper) bandwidth: largest distance of a non-zero element below and above the diagonal
    pub fn find_bandwidths(A: &DMatrix<f64>) -> (usize, usize) {
        let mut kl = 0;
        let mut ku = 0;
        for ((i, j), value) in A
            .iter()
            .enumerate()
            .map(|(k, v)| ((k % A.nrows(), k / A.nrows()), v))
        {
            if *value != 0.0 {
                if i > j {
                    kl = kl.max(i - j);
                } else {
                    ku = ku.max(j - i);
                }
            }
        }
        (kl, ku)
    }

    pub fn bandwidths(&self) -> (usize, usize) {
        (self.kl, self.ku)
    }

    pub fn dim(&self) -> usize {
        self.lu.nrows()
    }

    fn LU(&mut self) -> HeatResult<()> {
        let n = self.lu.nrows();
        let kl = self.kl;
        // row swaps widen the upper band of U by kl
        let fill = self.kl + self.ku;
        for i in 0..n {
            let lower_border = std::cmp::min(n, i + kl + 1);
            let right_border = std::cmp::min(n, i + fill + 1);
            let piv = self.lu.view_range(i..lower_border, i).iamax() + i;
            let diag = self.lu[(piv, i)];
            if diag == 0.0 || !diag.is_finite() {
                return Err(HeatError::SingularOperator { row: i, pivot: diag });
            }
            if piv != i {
                self.swaps[i] = piv;
                for col in i..right_border {
                    self.lu.swap((i, col), (piv, col));
                }
            }
            Self::gauss_step(&mut self.lu, diag, i, lower_border, right_border);
        }
        Ok(())
    }

    /// One step of gaussian elimination on the i-th column, restricted to
    /// rows i..lower_border and columns i..right_border.
    fn gauss_step(
        matrix: &mut DMatrix<f64>,
        diag: f64,
        i: usize,
        lower_border: usize,
        right_border: usize,
    ) {
        // nothing below the pivot
        if lower_border <= i + 1 {
            return;
        }
        let mut submat = matrix.view_range_mut(i..lower_border, i..right_border);
        let inv_diag = 1.0 / diag;
        // coeffs: column i below the pivot, submat: the rest of the band
        let (mut coeffs, mut submat) = submat.columns_range_pair_mut(0, 1..);
        let mut coeffs = coeffs.rows_range_mut(1..);
        coeffs *= inv_diag;
        let (pivot_row, mut down) = submat.rows_range_pair_mut(0, 1..);
        for k in 0..pivot_row.ncols() {
            down.column_mut(k).axpy(-pivot_row[k], &coeffs, 1.0);
        }
    }

    /// diagonal of U, i.e. the pivots
    pub fn pivots(&self) -> DVector<f64> {
        self.lu.diagonal()
    }

    pub fn solve(&self, b: &DVector<f64>) -> HeatResult<DVector<f64>> {
        let n = self.dim();
        if b.len() != n {
            return Err(HeatError::DimensionMismatch {
                expected: n,
                got: b.len(),
            });
        }
        let mut x = b.clone_owned();
        // forward substitution, L has unit diagonal
        for i in 0..n {
            let piv = self.swaps[i];
            if piv != i {
                x.swap_rows(i, piv);
            }
            let xi = x[i];
            let lower_border = std::cmp::min(n, i + self.kl + 1);
            for r in i + 1..lower_border {
                x[r] -= self.lu[(r, i)] * xi;
            }
        }
        // backward substitution with U
        let fill = self.kl + self.ku;
        for i in (0..n).rev() {
            let right_border = std::cmp::min(n, i + fill + 1);
            let mut acc = x[i];
            for c in i + 1..right_border {
                acc -= self.lu[(i, c)] * x[c];
            }
            x[i] = acc / self.lu[(i, i)];
        }
        Ok(x)
    }
}
