#![allow(non_snake_case)]
use RustedHeat::Utils::log_setup::init_logger;
use RustedHeat::Utils::logger::timestamped_prefix;
use RustedHeat::Utils::plots::{plot_comparison, plot_profiles};
use RustedHeat::numerical::Heat1D::compact_operators::{AveragingStencil, BoundaryCondition};
use RustedHeat::numerical::Heat1D::compare::{
    compare_diffusivities, comparison_table, run_simulation,
};
use RustedHeat::numerical::Heat1D::heat_config::HeatConfig;
use RustedHeat::numerical::Heat1D::heat_errors::HeatResult;
use RustedHeat::somelinalg::factorization::SolverBackend;
use clap::Parser;
use log::{error, info, warn};
use simplelog::LevelFilter;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "heat1d")]
#[command(about = "1D transient heat conduction: compact finite differences + Crank-Nicolson")]
struct Args {
    /// Number of spatial cells (required unless the task file sets grid.num_cells)
    #[arg(allow_negative_numbers = true)]
    num_cells: Option<i64>,

    /// Thermal diffusivity [default: 0.01]
    #[arg(short, long)]
    alpha: Option<f64>,

    /// Time step [default: 0.01]
    #[arg(short, long)]
    dt: Option<f64>,

    /// Total simulation time [default: 1.0]
    #[arg(short = 'T', long = "time")]
    total_time: Option<f64>,

    /// Output file prefix [default: results/temperature]
    #[arg(short, long)]
    output: Option<String>,

    /// Task file with grid/physics/time/output/solver sections
    #[arg(long)]
    task: Option<PathBuf>,

    /// Linear solver: dense, banded or faer
    #[arg(long)]
    backend: Option<SolverBackend>,

    /// insulated or fixed:<left>,<right>
    #[arg(long)]
    boundary: Option<BoundaryCondition>,

    /// Averaging stencil: simpson or pade
    #[arg(long)]
    stencil: Option<AveragingStencil>,

    /// Stream states to disk instead of keeping them in memory
    #[arg(long)]
    no_history: bool,

    /// Write results into results/<YYYYmmddHHMM>/
    #[arg(long)]
    timestamped: bool,

    /// Plot temperature profiles into a png next to the csv files
    #[arg(long)]
    plot: bool,

    /// Run once per diffusivity, e.g. --compare 0.001,0.01,0.1
    #[arg(long, value_delimiter = ',')]
    compare: Vec<f64>,

    /// debug, info, warn, error or off
    #[arg(long)]
    loglevel: Option<String>,

    /// Also write the log into log_<date>.txt
    #[arg(long)]
    log_file: bool,
}

/// defaults < task file < command line
fn build_config(args: &Args) -> HeatResult<HeatConfig> {
    let mut config = match &args.task {
        Some(path) => HeatConfig::from_task_file(path)?,
        None => HeatConfig::default(),
    };
    if let Some(num_cells) = args.num_cells {
        config.num_x = Some(num_cells);
    }
    if let Some(alpha) = args.alpha {
        config.alpha = alpha;
    }
    if let Some(dt) = args.dt {
        config.dt = dt;
    }
    if let Some(total_time) = args.total_time {
        config.total_time = total_time;
    }
    if let Some(output) = &args.output {
        config.output_prefix = output.clone();
    }
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(boundary) = args.boundary {
        config.boundary = boundary;
    }
    if let Some(stencil) = args.stencil {
        config.stencil = stencil;
    }
    if args.no_history {
        config.retain_history = false;
    }
    config.timestamped |= args.timestamped;
    config.plot |= args.plot;
    if let Some(level) = &args.loglevel {
        config.loglevel = Some(level.clone());
    }
    Ok(config)
}

fn run(args: &Args, mut config: HeatConfig) -> HeatResult<()> {
    // fail fast, nothing is written for an invalid task
    config.validate()?;
    if config.timestamped {
        config.output_prefix = timestamped_prefix(&config.output_prefix);
    }
    if args.compare.is_empty() {
        let output = run_simulation(&config)?;
        info!(
            "t = {:.4}: min T = {:.4}, max T = {:.4}, thermal energy = {:.6}",
            output.final_time, output.min_temperature, output.max_temperature, output.thermal_energy
        );
        if config.plot {
            if output.history.is_empty() {
                warn!("history was not retained, profiles are not plotted");
            } else {
                let file = format!("{}_profiles.png", config.output_prefix);
                plot_profiles(&output.grid, &output.history, output.dt, &file)?;
            }
        }
    } else {
        let results = compare_diffusivities(&config, &args.compare)?;
        info!("\n \n DIFFUSIVITY COMPARISON \n \n {}", comparison_table(&results));
        if config.plot {
            let file = format!("{}_alpha_comparison.png", config.output_prefix);
            plot_comparison(&results, &file)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let level = match init_logger(config.loglevel.as_deref(), args.log_file) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    match run(&args, config) {
        Ok(()) => {
            info!("Simulation completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            if level == LevelFilter::Off {
                eprintln!("Error: {}", e);
            } else {
                error!("{}", e);
            }
            ExitCode::FAILURE
        }
    }
}
