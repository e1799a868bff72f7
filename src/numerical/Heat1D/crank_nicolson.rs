//! Crank-Nicolson system built from the compact operator pair.
//!
//! A dT/dt = alpha B T, averaged between time levels n and n+1:
//!   (A - f B) T^{n+1} = (A + f B) T^n + alpha dt g,   f = alpha dt / 2
//! where g is the (time independent) ghost contribution of fixed-value walls.
use crate::numerical::Heat1D::compact_operators::CompactOperators;
use crate::numerical::Heat1D::heat_errors::{HeatError, HeatResult};
use crate::somelinalg::factorization::{FactorizedSystem, SolverBackend, factorize};
use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone)]
pub struct CrankNicolsonSystem {
    pub lhs: DMatrix<f64>,
    pub rhs: DMatrix<f64>,
    /// boundary source added to every right-hand side
    pub source: DVector<f64>,
    /// f = alpha * dt / 2
    pub factor: f64,
}

impl CrankNicolsonSystem {
    pub fn build(operators: &CompactOperators, alpha: f64, dt: f64) -> CrankNicolsonSystem {
        let factor = alpha * dt / 2.0;
        let lhs = &operators.averaging - &operators.diffusion * factor;
        let rhs = &operators.averaging + &operators.diffusion * factor;
        // f*g from level n plus f*g from level n+1
        let source = &operators.ghost_diffusion * (2.0 * factor);
        CrankNicolsonSystem {
            lhs,
            rhs,
            source,
            factor,
        }
    }

    pub fn dim(&self) -> usize {
        self.lhs.nrows()
    }

    /// b = RHS * T + source
    pub fn right_hand_vector(&self, state: &DVector<f64>) -> HeatResult<DVector<f64>> {
        if state.len() != self.dim() {
            return Err(HeatError::DimensionMismatch {
                expected: self.dim(),
                got: state.len(),
            });
        }
        Ok(&self.rhs * state + &self.source)
    }

    /// Factorizes the left-hand operator. Called once per run.
    pub fn factorize(
        &self,
        backend: SolverBackend,
        condition_threshold: Option<f64>,
    ) -> HeatResult<Box<dyn FactorizedSystem>> {
        factorize(&self.lhs, backend, condition_threshold)
    }
}
