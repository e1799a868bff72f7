//! Independent runs for several diffusivities. Every run owns its grid, operators,
//! factorization and history, so the runs go through rayon without any sharing.
use crate::Utils::logger::{CsvStateSink, export_history};
use crate::numerical::Heat1D::heat_config::HeatConfig;
use crate::numerical::Heat1D::heat_errors::HeatResult;
use crate::numerical::Heat1D::heat_solver::{HeatSolver, SimulationOutput};
use log::info;
use rayon::prelude::*;
use tabled::{builder::Builder, settings::Style};

/// Runs one simulation and writes its csv files under `config.output_prefix`.
pub fn run_simulation(config: &HeatConfig) -> HeatResult<SimulationOutput> {
    let mut solver = HeatSolver::from_config(config)?;
    if solver.params().retain_history {
        solver.solve()?;
        export_history(
            &config.output_prefix,
            solver.grid(),
            solver.history(),
            config.dt,
        )?;
    } else {
        let mut sink = CsvStateSink::new(&config.output_prefix)?;
        solver.solve_with_sink(&mut sink)?;
    }
    Ok(solver.into_output())
}

/// `<prefix>_alpha_<alpha>`
pub fn alpha_prefix(prefix: &str, alpha: f64) -> String {
    format!("{}_alpha_{}", prefix, alpha)
}

/// Runs `base` once per diffusivity in parallel; results keep the order of `alphas`.
/// The first failing run aborts the comparison.
pub fn compare_diffusivities(
    base: &HeatConfig,
    alphas: &[f64],
) -> HeatResult<Vec<(f64, SimulationOutput)>> {
    info!("comparing {} diffusivities: {:?}", alphas.len(), alphas);
    alphas
        .par_iter()
        .map(|&alpha| {
            let config = HeatConfig {
                alpha,
                output_prefix: alpha_prefix(&base.output_prefix, alpha),
                ..base.clone()
            };
            run_simulation(&config).map(|output| (alpha, output))
        })
        .collect()
}

pub fn comparison_table(results: &[(f64, SimulationOutput)]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["alpha", "final time", "min T", "max T", "thermal energy", "ratio"]);
    for (alpha, output) in results {
        builder.push_record([
            alpha.to_string(),
            format!("{:.4}", output.final_time),
            format!("{:.4}", output.min_temperature),
            format!("{:.4}", output.max_temperature),
            format!("{:.6}", output.thermal_energy),
            format!("{:.4}", output.stability.ratio),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Utils::logger::all_timesteps_file_name;
    use crate::numerical::Heat1D::heat_errors::HeatError;

    #[test]
    fn test_alpha_prefix() {
        assert_eq!(alpha_prefix("results/temperature", 0.05), "results/temperature_alpha_0.05");
    }

    #[test]
    fn test_compare_diffusivities() {
        let dir = tempfile::tempdir().unwrap();
        let base = HeatConfig {
            total_time: 0.2,
            output_prefix: dir.path().join("cmp").to_str().unwrap().to_string(),
            ..HeatConfig::new(19)
        };
        let alphas = [0.001, 0.01, 0.1];
        let results = compare_diffusivities(&base, &alphas).unwrap();
        assert_eq!(results.len(), 3);
        for ((alpha, output), expected) in results.iter().zip(alphas.iter()) {
            assert_eq!(alpha, expected);
            assert_eq!(output.history.len(), 21);
            let file = all_timesteps_file_name(&alpha_prefix(&base.output_prefix, *alpha));
            assert!(std::path::Path::new(&file).exists());
        }
        // faster diffusion flattens the hot band more
        assert!(results[0].1.max_temperature > results[1].1.max_temperature);
        assert!(results[1].1.max_temperature > results[2].1.max_temperature);
        // same initial energy, insulated walls
        let e0 = results[0].1.thermal_energy;
        for (_, output) in &results {
            assert!((output.thermal_energy - e0).abs() < 1e-9 * e0);
        }
        let table = comparison_table(&results);
        assert!(table.contains("0.001"));
        assert!(table.contains("thermal energy"));
    }

    #[test]
    fn test_comparison_fails_on_bad_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let base = HeatConfig {
            total_time: 0.02,
            output_prefix: dir.path().join("bad").to_str().unwrap().to_string(),
            ..HeatConfig::new(5)
        };
        let err = compare_diffusivities(&base, &[0.01, -1.0]).unwrap_err();
        assert!(matches!(err, HeatError::InvalidParameter { name: "alpha", .. }));
    }
}
