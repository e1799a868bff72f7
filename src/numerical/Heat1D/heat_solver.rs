//! Time-stepping loop.
//!
//! Everything is created in one linear sequence: grid -> initial state -> operators ->
//! Crank-Nicolson system -> factorization. The factorization is owned by the solver and is
//! reused for every step; nothing is refactored during a run.
//!
//! Status: `Initialized` after construction, `Stepping` once the initial state has been
//! recorded, `Complete` after `num_steps` steps.
use crate::numerical::Heat1D::compact_operators::CompactOperators;
use crate::numerical::Heat1D::crank_nicolson::CrankNicolsonSystem;
use crate::numerical::Heat1D::grid::Grid;
use crate::numerical::Heat1D::heat_config::{HeatConfig, ValidatedParams};
use crate::numerical::Heat1D::heat_errors::{HeatError, HeatResult};
use crate::numerical::Heat1D::stability::{StabilityReport, check_stability};
use crate::somelinalg::factorization::FactorizedSystem;
use log::{error, info};
use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;
use std::time::Instant;
use strum_macros::Display;
use tabled::{builder::Builder, settings::Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SolverStatus {
    Initialized,
    Stepping,
    Complete,
}

/// Receives every recorded state: the initial one (step 0) and one per time step.
pub trait StateSink {
    fn consume(
        &mut self,
        step: usize,
        time: f64,
        grid: &Grid,
        state: &DVector<f64>,
    ) -> HeatResult<()>;
    fn finish(&mut self) -> HeatResult<()> {
        Ok(())
    }
}

/// Append-only sequence of states, index = time step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateHistory {
    states: Vec<DVector<f64>>,
}

impl StateHistory {
    pub fn new() -> StateHistory {
        StateHistory { states: Vec::new() }
    }

    fn push(&mut self, state: DVector<f64>) {
        self.states.push(state);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, step: usize) -> Option<&DVector<f64>> {
        self.states.get(step)
    }

    pub fn last(&self) -> Option<&DVector<f64>> {
        self.states.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DVector<f64>> {
        self.states.iter()
    }

    /// rows are time steps, columns are cells
    pub fn to_matrix(&self) -> DMatrix<f64> {
        let ncols = self.states.first().map_or(0, |s| s.len());
        DMatrix::from_fn(self.states.len(), ncols, |t, i| self.states[t][i])
    }
}

/// Result of a finished run.
#[derive(Debug, Clone)]
pub struct SimulationOutput {
    pub alpha: f64,
    pub dt: f64,
    pub grid: Grid,
    /// empty when the history was not retained
    pub history: StateHistory,
    pub final_state: DVector<f64>,
    pub final_time: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub thermal_energy: f64,
    pub stability: StabilityReport,
}

/// `0.000000, 100.000000, ...`: six decimals, comma separated
pub fn format_profile(state: &DVector<f64>) -> String {
    state
        .iter()
        .map(|v| format!("{:.6}", v))
        .collect::<Vec<String>>()
        .join(", ")
}

pub struct HeatSolver {
    params: ValidatedParams,
    operators: CompactOperators,
    system: CrankNicolsonSystem,
    factorized: Box<dyn FactorizedSystem>,
    stability: StabilityReport,
    current: DVector<f64>,
    history: StateHistory,
    status: SolverStatus,
    step: usize,
    calc_statistics: HashMap<String, String>,
}

impl HeatSolver {
    pub fn new(params: ValidatedParams) -> HeatResult<HeatSolver> {
        params.log_summary();
        let grid = &params.grid;
        let stability = check_stability(params.alpha, params.dt, grid.dx());
        let current = grid.initial_state();
        info!("initial temperature profile: {}", format_profile(&current));
        let begin = Instant::now();
        let operators = CompactOperators::assemble(grid, params.boundary, params.stencil);
        let system = CrankNicolsonSystem::build(&operators, params.alpha, params.dt);
        let factorized = system.factorize(params.backend, params.condition_threshold)?;
        let setup_time = begin.elapsed().as_millis();
        let mut calc_statistics = HashMap::new();
        calc_statistics.insert(
            "operator assembly and factorization, ms".to_string(),
            setup_time.to_string(),
        );
        calc_statistics.insert("backend".to_string(), factorized.backend().to_string());
        Ok(HeatSolver {
            params,
            operators,
            system,
            factorized,
            stability,
            current,
            history: StateHistory::new(),
            status: SolverStatus::Initialized,
            step: 0,
            calc_statistics,
        })
    }

    pub fn from_config(config: &HeatConfig) -> HeatResult<HeatSolver> {
        HeatSolver::new(config.validate()?)
    }

    fn record(&mut self, sink: Option<&mut (dyn StateSink + '_)>) -> HeatResult<()> {
        if self.params.retain_history {
            self.history.push(self.current.clone());
        }
        if let Some(sink) = sink {
            sink.consume(self.step, self.time(), &self.params.grid, &self.current)?;
        }
        Ok(())
    }

    /// Records the initial state, Initialized -> Stepping.
    pub fn start(&mut self, sink: Option<&mut (dyn StateSink + '_)>) -> HeatResult<()> {
        if self.status != SolverStatus::Initialized {
            return Err(HeatError::WrongStatus(self.status.to_string()));
        }
        self.record(sink)?;
        self.status = if self.params.num_steps == 0 {
            SolverStatus::Complete
        } else {
            SolverStatus::Stepping
        };
        Ok(())
    }

    /// Advances one time step: b = RHS T + source, LHS T' = b with the cached factorization.
    pub fn step(&mut self, sink: Option<&mut (dyn StateSink + '_)>) -> HeatResult<&DVector<f64>> {
        if self.status != SolverStatus::Stepping {
            return Err(HeatError::WrongStatus(self.status.to_string()));
        }
        let b = self.system.right_hand_vector(&self.current)?;
        let next = self.factorized.solve(&b)?;
        if next.iter().any(|v| !v.is_finite()) {
            error!("non-finite temperature after step {}", self.step + 1);
            return Err(HeatError::NonFiniteState {
                step: self.step + 1,
            });
        }
        self.current = next;
        self.step += 1;
        self.record(sink)?;
        let num_steps = self.params.num_steps;
        let interval = std::cmp::max(num_steps / 10, 1);
        if self.step % interval == 0 || self.step == num_steps {
            info!(
                "step {}/{} ({:.0}%), t = {:.4}, max T = {:.4}",
                self.step,
                num_steps,
                100.0 * self.step as f64 / num_steps as f64,
                self.time(),
                self.current.max()
            );
        }
        if self.step == num_steps {
            self.status = SolverStatus::Complete;
        }
        Ok(&self.current)
    }

    fn run(&mut self, mut sink: Option<&mut (dyn StateSink + '_)>) -> HeatResult<()> {
        let begin = Instant::now();
        self.start(sink.as_deref_mut())?;
        while self.status == SolverStatus::Stepping {
            self.step(sink.as_deref_mut())?;
        }
        if let Some(sink) = sink {
            sink.finish()?;
        }
        self.calc_statistics.insert(
            "time stepping, ms".to_string(),
            begin.elapsed().as_millis().to_string(),
        );
        self.calc_statistics();
        Ok(())
    }

    /// Runs all steps, keeping states according to `retain_history`.
    pub fn solve(&mut self) -> HeatResult<()> {
        self.run(None)
    }

    /// Runs all steps and streams every state (initial one included) into `sink`.
    pub fn solve_with_sink(&mut self, sink: &mut dyn StateSink) -> HeatResult<()> {
        self.run(Some(sink))
    }

    fn calc_statistics(&self) {
        let mut stats = self.calc_statistics.clone();
        stats.insert("number of cells".to_string(), self.params.grid.num_x().to_string());
        stats.insert("time steps".to_string(), self.step.to_string());
        stats.insert("stored states".to_string(), self.history.len().to_string());
        stats.insert(
            "stability ratio".to_string(),
            format!("{:.4}", self.stability.ratio),
        );
        stats.insert(
            "thermal energy".to_string(),
            format!("{:.6}", self.params.grid.thermal_energy(&self.current)),
        );
        let mut keys: Vec<&String> = stats.keys().collect();
        keys.sort();
        let mut builder = Builder::default();
        for key in keys {
            builder.push_record([key.clone(), stats[key].clone()]);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        info!("\n \n CALC STATISTICS \n \n {}", table.to_string());
    }

    pub fn status(&self) -> SolverStatus {
        self.status
    }

    /// index of the current state
    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn time(&self) -> f64 {
        self.step as f64 * self.params.dt
    }

    pub fn current_state(&self) -> &DVector<f64> {
        &self.current
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub fn grid(&self) -> &Grid {
        &self.params.grid
    }

    pub fn params(&self) -> &ValidatedParams {
        &self.params
    }

    pub fn operators(&self) -> &CompactOperators {
        &self.operators
    }

    pub fn system(&self) -> &CrankNicolsonSystem {
        &self.system
    }

    pub fn stability(&self) -> StabilityReport {
        self.stability
    }

    pub fn into_output(self) -> SimulationOutput {
        let grid = self.params.grid.clone();
        SimulationOutput {
            alpha: self.params.alpha,
            dt: self.params.dt,
            final_time: self.time(),
            min_temperature: self.current.min(),
            max_temperature: self.current.max(),
            thermal_energy: grid.thermal_energy(&self.current),
            grid,
            history: self.history,
            final_state: self.current,
            stability: self.stability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingSink {
        steps: Vec<usize>,
        finished: bool,
    }

    impl StateSink for CountingSink {
        fn consume(
            &mut self,
            step: usize,
            _time: f64,
            _grid: &Grid,
            _state: &DVector<f64>,
        ) -> HeatResult<()> {
            self.steps.push(step);
            Ok(())
        }
        fn finish(&mut self) -> HeatResult<()> {
            self.finished = true;
            Ok(())
        }
    }

    fn config(n: i64, total_time: f64) -> HeatConfig {
        HeatConfig {
            total_time,
            ..HeatConfig::new(n)
        }
    }

    #[test]
    fn test_initial_profile_format() {
        let solver = HeatSolver::from_config(&config(5, 0.01)).unwrap();
        assert_eq!(
            format_profile(solver.current_state()),
            "0.000000, 0.000000, 100.000000, 0.000000, 0.000000"
        );
        assert_eq!(format_profile(&DVector::from_vec(vec![1.0 / 3.0])), "0.333333");
    }

    #[test]
    fn test_status_transitions() {
        let mut solver = HeatSolver::from_config(&config(5, 0.035)).unwrap();
        assert_eq!(solver.status(), SolverStatus::Initialized);
        assert!(matches!(solver.step(None), Err(HeatError::WrongStatus(_))));
        solver.start(None).unwrap();
        assert_eq!(solver.status(), SolverStatus::Stepping);
        assert_eq!(solver.history().len(), 1);
        solver.step(None).unwrap();
        solver.step(None).unwrap();
        assert_eq!(solver.status(), SolverStatus::Stepping);
        solver.step(None).unwrap();
        assert_eq!(solver.status(), SolverStatus::Complete);
        assert_eq!(solver.history().len(), 4);
        assert!(matches!(solver.step(None), Err(HeatError::WrongStatus(_))));
        assert!(matches!(solver.start(None), Err(HeatError::WrongStatus(_))));
    }

    #[test]
    fn test_zero_steps() {
        let mut solver = HeatSolver::from_config(&config(5, 0.0)).unwrap();
        solver.solve().unwrap();
        assert_eq!(solver.status(), SolverStatus::Complete);
        assert_eq!(solver.history().len(), 1);
        assert_eq!(solver.time(), 0.0);
    }

    #[test]
    fn test_sink_sees_every_state() {
        let mut solver = HeatSolver::from_config(&config(7, 0.05)).unwrap();
        let mut sink = CountingSink {
            steps: Vec::new(),
            finished: false,
        };
        solver.solve_with_sink(&mut sink).unwrap();
        assert_eq!(sink.steps, vec![0, 1, 2, 3, 4, 5]);
        assert!(sink.finished);
    }

    #[test]
    fn test_history_not_retained() {
        let mut cfg = config(7, 0.05);
        cfg.retain_history = false;
        let mut solver = HeatSolver::from_config(&cfg).unwrap();
        solver.solve().unwrap();
        assert!(solver.history().is_empty());
        assert_eq!(solver.step_index(), 5);
        let output = solver.into_output();
        assert_eq!(output.final_state.len(), 7);
        assert!((output.final_time - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_history_matrix() {
        let mut solver = HeatSolver::from_config(&config(4, 0.02)).unwrap();
        solver.solve().unwrap();
        let m = solver.history().to_matrix();
        assert_eq!(m.shape(), (3, 4));
        assert_eq!(m.row(2).transpose(), *solver.current_state());
        assert_eq!(StateHistory::new().to_matrix().shape(), (0, 0));
    }

    #[test]
    fn test_configuration_error_before_allocation() {
        let err = HeatSolver::from_config(&HeatConfig::new(0)).err().unwrap();
        assert!(err.is_configuration_error());
    }
}
