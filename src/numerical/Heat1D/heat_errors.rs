//! Error taxonomy of the heat solver: invalid configuration, numerical failure of the
//! implicit system and failures of the result sinks. The stability advisory is not an error,
//! it is only logged.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeatError {
    #[error("number of cells is required")]
    MissingCellCount,
    #[error("number of cells must be positive (got {0})")]
    NonPositiveCellCount(i64),
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("task file error: {0}")]
    TaskParse(String),
    /// zero or negligible pivot met while factorizing the left-hand operator
    #[error("left-hand operator is singular: pivot {pivot:.3e} in row {row}")]
    SingularOperator { row: usize, pivot: f64 },
    #[error(
        "left-hand operator is ill-conditioned: condition number {condition_number:.3e} exceeds {threshold:.3e}"
    )]
    IllConditioned { condition_number: f64, threshold: f64 },
    #[error("state after time step {step} contains NaN or infinite values")]
    NonFiniteState { step: usize },
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("solver is in state `{0}`, operation is not allowed")]
    WrongStatus(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("plotting failed: {0}")]
    Plot(String),
}

pub type HeatResult<T> = Result<T, HeatError>;

impl HeatError {
    /// configuration errors are reported before anything is allocated
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            HeatError::MissingCellCount
                | HeatError::NonPositiveCellCount(_)
                | HeatError::InvalidParameter { .. }
                | HeatError::TaskParse(_)
        )
    }

    pub fn is_numerical_failure(&self) -> bool {
        matches!(
            self,
            HeatError::SingularOperator { .. }
                | HeatError::IllConditioned { .. }
                | HeatError::NonFiniteState { .. }
        )
    }
}
