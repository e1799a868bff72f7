//! Compact approximation of the second derivative.
//!
//! The scheme couples neighbouring second derivatives implicitly:
//! (T''_{i-1} + 4 T''_i + T''_{i+1}) / 6 = (T_{i-1} - 2 T_i + T_{i+1}) / dx^2
//! i.e. A * T'' = B * T with the averaging operator A and the diffusion operator B.
//! T'' is never formed explicitly (that would need A^{-1}); both operators enter the
//! Crank-Nicolson system instead.
//!
//! Two averaging stencils are available. `Simpson` (1/6, 4/6, 1/6) is the default, its
//! leading truncation error is -dx^2/12 * T''''. `Pade` (1/12, 10/12, 1/12) cancels that
//! term and is fourth order accurate.
//!
//! Boundary rows use ghost cells at indices -1 and N:
//! - Insulated (zero flux): ghost -1 mirrors cell 1 and ghost N mirrors cell N-2.
//!   For a single cell the mirror image of its neighbour is the cell itself.
//! - FixedValue: ghosts hold prescribed temperatures; their contribution to B*T is a
//!   constant vector kept in `ghost_diffusion`.
use crate::numerical::Heat1D::grid::Grid;
use crate::numerical::Heat1D::heat_errors::{HeatError, HeatResult};
use nalgebra::{DMatrix, DVector};
use std::fmt::Display;
use std::str::FromStr;
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};

/// undivided second difference for (i-1, i, i+1)
pub const DIFFUSION_STENCIL: [f64; 3] = [1.0, -2.0, 1.0];

/// weights of the averaging operator for (i-1, i, i+1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, StrumDisplay, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum AveragingStencil {
    #[default]
    Simpson,
    Pade,
}

impl AveragingStencil {
    pub fn weights(&self) -> [f64; 3] {
        match self {
            AveragingStencil::Simpson => [1.0 / 6.0, 4.0 / 6.0, 1.0 / 6.0],
            AveragingStencil::Pade => [1.0 / 12.0, 10.0 / 12.0, 1.0 / 12.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BoundaryCondition {
    /// adiabatic walls, the physical model of the solver
    #[default]
    Insulated,
    /// temperatures pinned at x = 0 and x = L
    FixedValue { left: f64, right: f64 },
}

impl Display for BoundaryCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryCondition::Insulated => write!(f, "insulated"),
            BoundaryCondition::FixedValue { left, right } => {
                write!(f, "fixed:{},{}", left, right)
            }
        }
    }
}

/// "insulated" or "fixed:<left>,<right>"
impl FromStr for BoundaryCondition {
    type Err = HeatError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("insulated") || s.eq_ignore_ascii_case("adiabatic") {
            return Ok(BoundaryCondition::Insulated);
        }
        let invalid = || HeatError::InvalidParameter {
            name: "boundary",
            reason: format!(
                "expected `insulated` or `fixed:<left>,<right>`, got `{}`",
                s
            ),
        };
        let values = s.strip_prefix("fixed:").ok_or_else(invalid)?;
        let parsed: Vec<f64> = values
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| invalid())?;
        match parsed.as_slice() {
            [left, right] => BoundaryCondition::fixed(*left, *right),
            _ => Err(invalid()),
        }
    }
}

impl BoundaryCondition {
    pub fn fixed(left: f64, right: f64) -> HeatResult<BoundaryCondition> {
        if !left.is_finite() || !right.is_finite() {
            return Err(HeatError::InvalidParameter {
                name: "boundary",
                reason: "boundary temperatures must be finite".to_string(),
            });
        }
        Ok(BoundaryCondition::FixedValue { left, right })
    }
}

enum Neighbour {
    Cell(usize),
    Ghost(f64),
}

/// Resolves the column of neighbour `j` of a row, `j` may be the ghost index -1 or N.
fn neighbour(j: isize, n: usize, boundary: BoundaryCondition) -> Neighbour {
    if j >= 0 && (j as usize) < n {
        return Neighbour::Cell(j as usize);
    }
    match boundary {
        BoundaryCondition::Insulated => {
            if n == 1 {
                Neighbour::Cell(0)
            } else if j < 0 {
                Neighbour::Cell(1)
            } else {
                Neighbour::Cell(n - 2)
            }
        }
        BoundaryCondition::FixedValue { left, right } => {
            if j < 0 {
                Neighbour::Ghost(left)
            } else {
                Neighbour::Ghost(right)
            }
        }
    }
}

/// Averaging operator A and diffusion operator B (already divided by dx^2), both N x N.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactOperators {
    pub averaging: DMatrix<f64>,
    pub diffusion: DMatrix<f64>,
    /// B applied to the ghost values, zero for insulated walls
    pub ghost_diffusion: DVector<f64>,
    pub boundary: BoundaryCondition,
    pub stencil: AveragingStencil,
}

impl CompactOperators {
    /// Builds A and B row by row. Assembly is deterministic: the same grid, boundary and
    /// stencil always give bit-identical operators.
    pub fn assemble(
        grid: &Grid,
        boundary: BoundaryCondition,
        stencil: AveragingStencil,
    ) -> CompactOperators {
        let averaging_stencil = stencil.weights();
        let n = grid.num_x();
        let mut averaging = DMatrix::zeros(n, n);
        let mut diffusion = DMatrix::zeros(n, n);
        let mut ghost_diffusion = DVector::zeros(n);
        for i in 0..n {
            averaging[(i, i)] += averaging_stencil[1];
            diffusion[(i, i)] += DIFFUSION_STENCIL[1];
            for (offset, k) in [(-1isize, 0usize), (1, 2)] {
                match neighbour(i as isize + offset, n, boundary) {
                    Neighbour::Cell(col) => {
                        averaging[(i, col)] += averaging_stencil[k];
                        diffusion[(i, col)] += DIFFUSION_STENCIL[k];
                    }
                    // ghost values do not change in time, so their averaging share
                    // drops out of the time derivative
                    Neighbour::Ghost(value) => ghost_diffusion[i] += DIFFUSION_STENCIL[k] * value,
                }
            }
        }
        let dx2 = grid.dx() * grid.dx();
        diffusion /= dx2;
        ghost_diffusion /= dx2;
        CompactOperators {
            averaging,
            diffusion,
            ghost_diffusion,
            boundary,
            stencil,
        }
    }

    pub fn dim(&self) -> usize {
        self.averaging.nrows()
    }
}
