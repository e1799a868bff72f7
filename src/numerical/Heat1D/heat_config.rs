//! Run parameters.
//!
//! Layers, lowest precedence first: `HeatConfig::default()`, a task file (see
//! `Utils::task_parser`), command line flags. Everything is checked by `validate()` before
//! any operator is allocated.
//!
//! Task file sections and keys:
//! ```text
//! grid     num_cells: <int>
//! physics  alpha: <float>   boundary: insulated | fixed, <left>, <right>   stencil: simpson | pade
//! time     dt: <float>      total_time: <float>
//! output   prefix: <path>   retain_history: <bool>   timestamped: <bool>   plot: <bool>
//! solver   backend: dense | banded | faer   loglevel: <level>   condition_threshold: <float> | off
//! ```
use crate::Utils::task_parser::{TaskDocument, Value, parse_task, parse_task_file};
use crate::numerical::Heat1D::compact_operators::{AveragingStencil, BoundaryCondition};
use crate::numerical::Heat1D::grid::Grid;
use crate::numerical::Heat1D::heat_errors::{HeatError, HeatResult};
use crate::somelinalg::factorization::SolverBackend;
use log::info;
use std::path::Path;
use std::str::FromStr;
use tabled::{builder::Builder, settings::Style};

pub const DEFAULT_ALPHA: f64 = 0.01;
pub const DEFAULT_DT: f64 = 0.01;
pub const DEFAULT_TOTAL_TIME: f64 = 1.0;
pub const DEFAULT_OUTPUT_PREFIX: &str = "results/temperature";
pub const DEFAULT_CONDITION_THRESHOLD: f64 = 1e12;
/// the SVD condition estimate is skipped above this many cells
pub const CONDITION_CHECK_MAX_CELLS: usize = 400;

#[derive(Debug, Clone, PartialEq)]
pub struct HeatConfig {
    /// number of cells, required
    pub num_x: Option<i64>,
    /// thermal diffusivity
    pub alpha: f64,
    pub dt: f64,
    pub total_time: f64,
    pub output_prefix: String,
    /// keep every state in memory; otherwise states are only streamed to the sink
    pub retain_history: bool,
    pub boundary: BoundaryCondition,
    pub stencil: AveragingStencil,
    pub backend: SolverBackend,
    pub loglevel: Option<String>,
    /// None disables the condition number check
    pub condition_threshold: Option<f64>,
    pub timestamped: bool,
    pub plot: bool,
}

impl Default for HeatConfig {
    fn default() -> Self {
        HeatConfig {
            num_x: None,
            alpha: DEFAULT_ALPHA,
            dt: DEFAULT_DT,
            total_time: DEFAULT_TOTAL_TIME,
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            retain_history: true,
            boundary: BoundaryCondition::Insulated,
            stencil: AveragingStencil::Simpson,
            backend: SolverBackend::Banded,
            loglevel: Some("info".to_string()),
            condition_threshold: Some(DEFAULT_CONDITION_THRESHOLD),
            timestamped: false,
            plot: false,
        }
    }
}

/// Parameters that passed validation, with the derived grid and step count.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedParams {
    pub grid: Grid,
    pub alpha: f64,
    pub dt: f64,
    pub total_time: f64,
    /// floor(total_time / dt)
    pub num_steps: usize,
    pub output_prefix: String,
    pub retain_history: bool,
    pub boundary: BoundaryCondition,
    pub stencil: AveragingStencil,
    pub backend: SolverBackend,
    /// already dropped for grids above CONDITION_CHECK_MAX_CELLS
    pub condition_threshold: Option<f64>,
}

fn invalid(name: &'static str, reason: impl Into<String>) -> HeatError {
    HeatError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

fn single<'a>(section: &str, key: &str, values: &'a [Value]) -> HeatResult<&'a Value> {
    match values {
        [value] => Ok(value),
        _ => Err(HeatError::TaskParse(format!(
            "`{}.{}` expects exactly one value, got {}",
            section,
            key,
            values.len()
        ))),
    }
}

fn float_value(section: &str, key: &str, values: &[Value]) -> HeatResult<f64> {
    let value = single(section, key, values)?;
    value.as_float().ok_or_else(|| {
        HeatError::TaskParse(format!("`{}.{}` must be a number, got `{}`", section, key, value))
    })
}

fn integer_value(section: &str, key: &str, values: &[Value]) -> HeatResult<i64> {
    let value = single(section, key, values)?;
    value.as_integer().ok_or_else(|| {
        HeatError::TaskParse(format!("`{}.{}` must be an integer, got `{}`", section, key, value))
    })
}

fn bool_value(section: &str, key: &str, values: &[Value]) -> HeatResult<bool> {
    let value = single(section, key, values)?;
    value.as_boolean().ok_or_else(|| {
        HeatError::TaskParse(format!("`{}.{}` must be true or false, got `{}`", section, key, value))
    })
}

fn text_value(section: &str, key: &str, values: &[Value]) -> HeatResult<String> {
    Ok(single(section, key, values)?.to_string())
}

fn parse_named<T: FromStr>(section: &str, key: &str, values: &[Value]) -> HeatResult<T> {
    let text = text_value(section, key, values)?;
    text.parse::<T>()
        .map_err(|_| HeatError::TaskParse(format!("unknown {}.{} `{}`", section, key, text)))
}

/// `insulated` or `fixed, <left>, <right>`
fn boundary_value(values: &[Value]) -> HeatResult<BoundaryCondition> {
    match values {
        [Value::String(kind)] if kind.as_str() == "insulated" || kind.as_str() == "adiabatic" => {
            Ok(BoundaryCondition::Insulated)
        }
        [Value::String(kind), left, right] if kind.as_str() == "fixed" => {
            match (left.as_float(), right.as_float()) {
                (Some(left), Some(right)) => BoundaryCondition::fixed(left, right),
                _ => Err(HeatError::TaskParse(
                    "fixed boundary temperatures must be numbers".to_string(),
                )),
            }
        }
        _ => Err(HeatError::TaskParse(
            "`physics.boundary` must be `insulated` or `fixed, <left>, <right>`".to_string(),
        )),
    }
}

impl HeatConfig {
    pub fn new(num_x: i64) -> HeatConfig {
        HeatConfig {
            num_x: Some(num_x),
            ..HeatConfig::default()
        }
    }

    pub fn from_task_str(input: &str) -> HeatResult<HeatConfig> {
        let mut config = HeatConfig::default();
        config.apply_task(&parse_task(input)?)?;
        Ok(config)
    }

    pub fn from_task_file<P: AsRef<Path>>(path: P) -> HeatResult<HeatConfig> {
        let mut config = HeatConfig::default();
        config.apply_task(&parse_task_file(path)?)?;
        Ok(config)
    }

    /// Overrides fields named in the task document. Unknown sections and keys are errors.
    pub fn apply_task(&mut self, document: &TaskDocument) -> HeatResult<()> {
        for section in &document.sections {
            let title = section.title.as_str();
            for (key, values) in &section.entries {
                match (title, key.as_str()) {
                    ("grid", "num_cells") => self.num_x = Some(integer_value(title, key, values)?),
                    ("physics", "alpha") => self.alpha = float_value(title, key, values)?,
                    ("physics", "boundary") => self.boundary = boundary_value(values)?,
                    ("physics", "stencil") => self.stencil = parse_named(title, key, values)?,
                    ("time", "dt") => self.dt = float_value(title, key, values)?,
                    ("time", "total_time") => self.total_time = float_value(title, key, values)?,
                    ("output", "prefix") => self.output_prefix = text_value(title, key, values)?,
                    ("output", "retain_history") => {
                        self.retain_history = bool_value(title, key, values)?
                    }
                    ("output", "timestamped") => self.timestamped = bool_value(title, key, values)?,
                    ("output", "plot") => self.plot = bool_value(title, key, values)?,
                    ("solver", "backend") => self.backend = parse_named(title, key, values)?,
                    ("solver", "loglevel") => self.loglevel = Some(text_value(title, key, values)?),
                    ("solver", "condition_threshold") => {
                        self.condition_threshold = match single(title, key, values)? {
                            Value::String(s) if s.as_str() == "off" => None,
                            _ => Some(float_value(title, key, values)?),
                        }
                    }
                    ("grid" | "physics" | "time" | "output" | "solver", _) => {
                        return Err(HeatError::TaskParse(format!(
                            "unknown key `{}` in section `{}`",
                            key, title
                        )));
                    }
                    _ => {
                        return Err(HeatError::TaskParse(format!("unknown section `{}`", title)));
                    }
                }
            }
        }
        Ok(())
    }

    /// Checks every parameter and derives the grid and the number of steps.
    pub fn validate(&self) -> HeatResult<ValidatedParams> {
        let num_x = self.num_x.ok_or(HeatError::MissingCellCount)?;
        if num_x <= 0 {
            return Err(HeatError::NonPositiveCellCount(num_x));
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(invalid(
                "alpha",
                format!("diffusivity must be finite and non-negative, got {}", self.alpha),
            ));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(invalid(
                "dt",
                format!("time step must be finite and positive, got {}", self.dt),
            ));
        }
        if !self.total_time.is_finite() || self.total_time < 0.0 {
            return Err(invalid(
                "total_time",
                format!("total time must be finite and non-negative, got {}", self.total_time),
            ));
        }
        if let Some(threshold) = self.condition_threshold {
            if !(threshold > 1.0) {
                return Err(invalid(
                    "condition_threshold",
                    format!("must be greater than 1, got {}", threshold),
                ));
            }
        }
        if self.output_prefix.trim().is_empty() {
            return Err(invalid("output_prefix", "must not be empty"));
        }
        let steps = (self.total_time / self.dt).floor();
        if steps > u32::MAX as f64 {
            return Err(invalid(
                "dt",
                format!("{} time steps are too many", steps),
            ));
        }
        let grid = Grid::new(num_x)?;
        let condition_threshold = if grid.num_x() <= CONDITION_CHECK_MAX_CELLS {
            self.condition_threshold
        } else {
            None
        };
        Ok(ValidatedParams {
            grid,
            alpha: self.alpha,
            dt: self.dt,
            total_time: self.total_time,
            num_steps: steps as usize,
            output_prefix: self.output_prefix.clone(),
            retain_history: self.retain_history,
            boundary: self.boundary,
            stencil: self.stencil,
            backend: self.backend,
            condition_threshold,
        })
    }
}

impl ValidatedParams {
    pub fn summary_table(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(["parameter", "value"]);
        builder.push_record(["number of cells".to_string(), self.grid.num_x().to_string()]);
        builder.push_record(["domain length".to_string(), self.grid.length().to_string()]);
        builder.push_record(["dx".to_string(), format!("{:.6e}", self.grid.dx())]);
        builder.push_record(["alpha".to_string(), self.alpha.to_string()]);
        builder.push_record(["dt".to_string(), self.dt.to_string()]);
        builder.push_record(["total time".to_string(), self.total_time.to_string()]);
        builder.push_record(["time steps".to_string(), self.num_steps.to_string()]);
        builder.push_record(["boundary".to_string(), self.boundary.to_string()]);
        builder.push_record(["stencil".to_string(), self.stencil.to_string()]);
        builder.push_record(["backend".to_string(), self.backend.to_string()]);
        builder.push_record(["retain history".to_string(), self.retain_history.to_string()]);
        builder.push_record(["output prefix".to_string(), self.output_prefix.clone()]);
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }

    pub fn log_summary(&self) {
        info!("\n \n HEAT 1D TASK \n \n {}", self.summary_table());
    }
}
