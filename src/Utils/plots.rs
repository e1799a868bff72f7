use crate::numerical::Heat1D::grid::Grid;
use crate::numerical::Heat1D::heat_errors::{HeatError, HeatResult};
use crate::numerical::Heat1D::heat_solver::{SimulationOutput, StateHistory};
use log::info;
use plotters::prelude::*;

/// number of profiles drawn by `plot_profiles`
pub const PROFILE_SNAPSHOTS: usize = 10;

fn plot_error<E: std::fmt::Display>(e: E) -> HeatError {
    HeatError::Plot(e.to_string())
}

/// About `count` evenly spaced steps out of `len` stored states, first and last included.
pub fn snapshot_steps(len: usize, count: usize) -> Vec<usize> {
    if len == 0 || count == 0 {
        return Vec::new();
    }
    if len <= count {
        return (0..len).collect();
    }
    let last = len - 1;
    let mut steps: Vec<usize> = (0..count)
        .map(|k| (k as f64 * last as f64 / (count - 1).max(1) as f64).round() as usize)
        .collect();
    steps.dedup();
    steps
}

fn y_range<'a>(states: impl Iterator<Item = &'a nalgebra::DVector<f64>>) -> (f64, f64) {
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for state in states {
        y_min = y_min.min(state.min());
        y_max = y_max.max(state.max());
    }
    let pad = 0.05 * (y_max - y_min).max(1e-6);
    (y_min - pad, y_max + pad)
}

/// PNG with temperature profiles T(x) at several time levels.
pub fn plot_profiles(grid: &Grid, history: &StateHistory, dt: f64, filename: &str) -> HeatResult<()> {
    if history.is_empty() {
        return Err(HeatError::Plot("no states stored, nothing to plot".to_string()));
    }
    let steps = snapshot_steps(history.len(), PROFILE_SNAPSHOTS);
    let (y_min, y_max) = y_range(history.iter());
    let root_area = BitMapBackend::new(filename, (800, 600)).into_drawing_area();
    root_area.fill(&WHITE).map_err(plot_error)?;
    let mut chart = ChartBuilder::on(&root_area)
        .caption("Temperature profiles", ("sans-serif", 40))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..grid.length(), y_min..y_max)
        .map_err(plot_error)?;
    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("Temperature")
        .draw()
        .map_err(plot_error)?;
    let x = grid.positions();
    for (k, &step) in steps.iter().enumerate() {
        if let Some(state) = history.get(step) {
            let series: Vec<(f64, f64)> = x.iter().zip(state.iter()).map(|(&x, &y)| (x, y)).collect();
            chart
                .draw_series(LineSeries::new(series, &Palette99::pick(k)))
                .map_err(plot_error)?
                .label(format!("t = {:.3}", step as f64 * dt))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &Palette99::pick(k)));
        }
    }
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_error)?;
    root_area.present().map_err(plot_error)?;
    info!("profiles plotted into {}", filename);
    Ok(())
}

/// PNG with the final profile of every run of a diffusivity comparison.
pub fn plot_comparison(results: &[(f64, SimulationOutput)], filename: &str) -> HeatResult<()> {
    if results.is_empty() {
        return Err(HeatError::Plot("no runs to compare".to_string()));
    }
    let (y_min, y_max) = y_range(results.iter().map(|(_, output)| &output.final_state));
    let x_max = results
        .iter()
        .map(|(_, output)| output.grid.length())
        .fold(0.0, f64::max);
    let root_area = BitMapBackend::new(filename, (800, 600)).into_drawing_area();
    root_area.fill(&WHITE).map_err(plot_error)?;
    let mut chart = ChartBuilder::on(&root_area)
        .caption("Final temperature for different diffusivities", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..x_max, y_min..y_max)
        .map_err(plot_error)?;
    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("Temperature")
        .draw()
        .map_err(plot_error)?;
    for (k, (alpha, output)) in results.iter().enumerate() {
        let x = output.grid.positions();
        let series: Vec<(f64, f64)> = x
            .iter()
            .zip(output.final_state.iter())
            .map(|(&x, &y)| (x, y))
            .collect();
        chart
            .draw_series(LineSeries::new(series, &Palette99::pick(k)))
            .map_err(plot_error)?
            .label(format!("alpha = {:.3}, t = {:.3}", alpha, output.final_time))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &Palette99::pick(k)));
    }
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_error)?;
    root_area.present().map_err(plot_error)?;
    info!("comparison plotted into {}", filename);
    Ok(())
}
