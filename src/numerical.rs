/// 1D heat equation dT/dt = alpha d2T/dx2 on [0, 1]
/// Example#1
/// ```no_run
/// use RustedHeat::numerical::Heat1D::heat_config::HeatConfig;
/// use RustedHeat::numerical::Heat1D::heat_solver::HeatSolver;
/// let config = HeatConfig { total_time: 0.5, ..HeatConfig::new(49) };
/// let mut solver = HeatSolver::from_config(&config).unwrap();
/// solver.solve().unwrap();
/// println!("{}", solver.current_state());
/// ```
/// Example#2
/// ```no_run
/// // task file instead of code
/// use RustedHeat::numerical::Heat1D::heat_config::HeatConfig;
/// let task = "grid\n num_cells: 99\nphysics\n alpha: 0.05\ntime\n dt: 0.001\n total_time: 0.2";
/// let config = HeatConfig::from_task_str(task).unwrap();
/// ```
pub mod Heat1D;
