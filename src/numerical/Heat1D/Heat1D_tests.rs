#[cfg(test)]
mod tests {
    use crate::numerical::Heat1D::compact_operators::{AveragingStencil, BoundaryCondition};
    use crate::numerical::Heat1D::heat_config::HeatConfig;
    use crate::numerical::Heat1D::heat_errors::HeatError;
    use crate::numerical::Heat1D::heat_solver::{HeatSolver, SolverStatus};
    use crate::somelinalg::factorization::SolverBackend;
    use approx::{assert_relative_eq, relative_eq};
    use nalgebra::DVector;
    use strum::IntoEnumIterator;

    fn run(config: HeatConfig) -> HeatSolver {
        let mut solver = HeatSolver::from_config(&config).unwrap();
        solver.solve().unwrap();
        solver
    }

    #[test]
    fn test_scenario_single_step_five_cells() {
        let config = HeatConfig {
            alpha: 0.01,
            dt: 0.01,
            total_time: 0.01,
            ..HeatConfig::new(5)
        };
        let solver = run(config);
        assert_eq!(solver.status(), SolverStatus::Complete);
        let history = solver.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0).unwrap().as_slice(), &[0.0, 0.0, 100.0, 0.0, 0.0]);

        let system = solver.system();
        let t0 = history.get(0).unwrap();
        let expected = system
            .lhs
            .clone()
            .lu()
            .solve(&(&system.rhs * t0))
            .unwrap();
        let t1 = history.get(1).unwrap();
        for i in 0..5 {
            assert_relative_eq!(t1[i], expected[i], epsilon = 1e-10);
        }
        // heat spreads from the centre, the profile stays symmetric
        assert!(t1[2] < 100.0);
        assert!(t1[1] > 0.0);
        assert_relative_eq!(t1[1], t1[3], epsilon = 1e-10);
        assert_relative_eq!(t1[0], t1[4], epsilon = 1e-10);
    }

    #[test]
    fn test_scenario_single_cell() {
        let config = HeatConfig {
            total_time: 0.1,
            ..HeatConfig::new(1)
        };
        let solver = run(config);
        let ops = solver.operators();
        assert_eq!(ops.averaging.shape(), (1, 1));
        assert_relative_eq!(ops.averaging[(0, 0)], 1.0, epsilon = 1e-14);
        assert_eq!(ops.diffusion[(0, 0)], 0.0);
        assert_eq!(solver.history().len(), 11);
        for state in solver.history().iter() {
            assert_eq!(state.len(), 1);
            assert_relative_eq!(state[0], 100.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_scenario_zero_diffusivity() {
        let config = HeatConfig {
            alpha: 0.0,
            total_time: 0.1,
            ..HeatConfig::new(11)
        };
        let solver = run(config);
        assert_eq!(solver.system().lhs, solver.operators().averaging);
        assert_eq!(solver.system().rhs, solver.operators().averaging);
        let t0 = solver.history().get(0).unwrap().clone();
        for state in solver.history().iter() {
            for (a, b) in state.iter().zip(t0.iter()) {
                assert_relative_eq!(*a, *b, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_thermal_energy_is_conserved() {
        for backend in SolverBackend::iter() {
            for stencil in AveragingStencil::iter() {
                let config = HeatConfig {
                    backend,
                    stencil,
                    alpha: 0.05,
                    total_time: 0.5,
                    ..HeatConfig::new(40)
                };
                let solver = run(config);
                let grid = solver.grid();
                let e0 = grid.thermal_energy(solver.history().get(0).unwrap());
                assert!(e0 > 0.0);
                for state in solver.history().iter() {
                    let e = grid.thermal_energy(state);
                    assert!(
                        relative_eq!(e, e0, max_relative = 1e-10),
                        "{} / {}: energy {} vs {}",
                        backend,
                        stencil,
                        e,
                        e0
                    );
                }
            }
        }
    }

    #[test]
    fn test_relaxes_to_equilibrium_temperature() {
        let config = HeatConfig {
            alpha: 1.0,
            dt: 0.01,
            total_time: 3.0,
            ..HeatConfig::new(20)
        };
        let solver = run(config);
        let grid = solver.grid();
        let mean = grid.equilibrium_temperature(solver.history().get(0).unwrap());
        assert!(mean > 0.0 && mean < 100.0);
        for value in solver.current_state().iter() {
            assert_relative_eq!(*value, mean, epsilon = 1e-6);
        }
        assert!(solver.stability().exceeds_explicit_limit);
    }

    #[test]
    fn test_backends_agree() {
        let finals: Vec<DVector<f64>> = SolverBackend::iter()
            .map(|backend| {
                let config = HeatConfig {
                    backend,
                    total_time: 0.3,
                    ..HeatConfig::new(33)
                };
                run(config).current_state().clone()
            })
            .collect();
        for other in &finals[1..] {
            assert!((other - &finals[0]).amax() < 1e-10);
        }
    }

    #[test]
    fn test_fixed_walls_reach_linear_profile() {
        let config = HeatConfig {
            boundary: BoundaryCondition::fixed(0.0, 100.0).unwrap(),
            alpha: 1.0,
            dt: 0.01,
            total_time: 3.0,
            ..HeatConfig::new(19)
        };
        let solver = run(config);
        let grid = solver.grid();
        for (i, value) in solver.current_state().iter().enumerate() {
            assert_relative_eq!(*value, 100.0 * grid.position(i), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_large_ratio_is_advisory_only() {
        // dx = 0.01, ratio = 1
        let config = HeatConfig {
            total_time: 0.1,
            ..HeatConfig::new(99)
        };
        let solver = run(config);
        assert!(solver.stability().exceeds_explicit_limit);
        assert_relative_eq!(solver.stability().ratio, 1.0, epsilon = 1e-9);
        assert_eq!(solver.status(), SolverStatus::Complete);
        assert!(solver.current_state().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_runs_are_deterministic() {
        let config = HeatConfig {
            total_time: 0.2,
            ..HeatConfig::new(25)
        };
        let first = run(config.clone());
        let second = run(config);
        assert_eq!(first.operators(), second.operators());
        for (a, b) in first
            .current_state()
            .iter()
            .zip(second.current_state().iter())
        {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_diffusion_smooths_the_band() {
        let config = HeatConfig {
            total_time: 0.5,
            ..HeatConfig::new(49)
        };
        let solver = run(config);
        let history = solver.history();
        let first_max = history.get(0).unwrap().max();
        let last = history.last().unwrap();
        assert!(last.max() < first_max);
        // the band edges warm up the cold neighbourhood
        assert!(last[15] > 1.0);
        let output = solver.into_output();
        assert_relative_eq!(output.final_time, 0.5, epsilon = 1e-12);
        assert_eq!(output.max_temperature, output.final_state.max());
    }

    #[test]
    fn test_overflowing_parameters_fail_with_numerical_error() {
        // alpha * dt / 2 overflows, the operators are no longer finite
        let config = HeatConfig {
            alpha: 1e200,
            dt: 1e200,
            total_time: 1e200,
            ..HeatConfig::new(5)
        };
        let err = HeatSolver::from_config(&config).err().unwrap();
        assert!(matches!(err, HeatError::IllConditioned { .. }), "{}", err);

        for backend in SolverBackend::iter() {
            let config = HeatConfig {
                backend,
                condition_threshold: None,
                ..config.clone()
            };
            let err = match HeatSolver::from_config(&config) {
                Ok(mut solver) => solver.solve().err().unwrap(),
                Err(e) => e,
            };
            assert!(err.is_numerical_failure(), "{}: {}", backend, err);
        }
    }
}
