//! Uniform cell-centred grid on [0, L] and the initial temperature field.
//!
//! Cells are interior points: cell i sits at x_i = (i+1)*dx with dx = L/(N+1), so the
//! domain ends x=0 and x=L are never cells themselves.
use crate::numerical::Heat1D::heat_errors::{HeatError, HeatResult};
use nalgebra::DVector;

/// length of the domain, not configurable
pub const DOMAIN_LENGTH: f64 = 1.0;
/// closed sub-interval of the domain that starts hot
pub const HOT_BAND: (f64, f64) = (0.4, 0.6);
pub const HOT_TEMPERATURE: f64 = 100.0;
pub const COLD_TEMPERATURE: f64 = 0.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    num_x: usize,
    length: f64,
    dx: f64,
}

impl Grid {
    /// Grid with `num_x` cells on the fixed domain. `num_x <= 0` is rejected before any
    /// allocation happens.
    pub fn new(num_x: i64) -> HeatResult<Grid> {
        if num_x <= 0 {
            return Err(HeatError::NonPositiveCellCount(num_x));
        }
        let num_x = usize::try_from(num_x).map_err(|_| HeatError::InvalidParameter {
            name: "num_x",
            reason: format!("{} cells do not fit into memory index", num_x),
        })?;
        let dx = DOMAIN_LENGTH / (num_x as f64 + 1.0);
        Ok(Grid {
            num_x,
            length: DOMAIN_LENGTH,
            dx,
        })
    }

    pub fn num_x(&self) -> usize {
        self.num_x
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn position(&self, i: usize) -> f64 {
        (i + 1) as f64 * self.dx
    }

    pub fn positions(&self) -> DVector<f64> {
        DVector::from_fn(self.num_x, |i, _| self.position(i))
    }

    /// Hot band initial condition: 100 for every cell with x in [0.4, 0.6], 0 elsewhere.
    pub fn initial_state(&self) -> DVector<f64> {
        let (lower, upper) = HOT_BAND;
        DVector::from_fn(self.num_x, |i, _| {
            let x = self.position(i);
            if x >= lower && x <= upper {
                HOT_TEMPERATURE
            } else {
                COLD_TEMPERATURE
            }
        })
    }

    /// Quadrature weights of the discrete energy conserved by the insulated scheme.
    /// The reflective closure mirrors the field about cells 0 and N-1, so those two cells
    /// carry half weight: w = [1/2, 1, ..., 1, 1/2]. A single cell carries weight 1.
    pub fn energy_weights(&self) -> DVector<f64> {
        let n = self.num_x;
        DVector::from_fn(n, |i, _| {
            if n > 1 && (i == 0 || i == n - 1) {
                0.5
            } else {
                1.0
            }
        })
    }

    /// dx * sum(w_i * T_i), constant in time for insulated boundaries
    pub fn thermal_energy(&self, state: &DVector<f64>) -> f64 {
        self.dx * self.energy_weights().dot(state)
    }

    /// Mean temperature the insulated field relaxes to as t -> infinity.
    pub fn equilibrium_temperature(&self, state: &DVector<f64>) -> f64 {
        let weights = self.energy_weights();
        weights.dot(state) / weights.sum()
    }
}
