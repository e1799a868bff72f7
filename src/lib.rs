// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
//! Transient heat conduction in 1D: compact finite differences in space,
//! Crank-Nicolson in time, one LU factorization per run.
/// ```no_run
/// use RustedHeat::numerical::Heat1D::heat_config::HeatConfig;
/// use RustedHeat::numerical::Heat1D::compare::run_simulation;
/// // 99 cells, defaults: alpha = 0.01, dt = 0.01, total time 1.0, insulated walls
/// let config = HeatConfig::new(99);
/// let output = run_simulation(&config).unwrap();
/// println!("T_max at t = {}: {}", output.final_time, output.max_temperature);
/// ```
pub mod numerical;
pub mod Utils;
pub mod somelinalg;
