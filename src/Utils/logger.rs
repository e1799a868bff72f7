//! Saving temperature fields into csv files.
//!
//! - `<prefix>_t_<step>.csv`: header `x,Temperature`, one row per cell
//! - `<prefix>_all_timesteps.csv`: header `t,x,Temperature`, one row per (step, cell),
//!   t = step * dt
use crate::numerical::Heat1D::grid::Grid;
use crate::numerical::Heat1D::heat_errors::HeatResult;
use crate::numerical::Heat1D::heat_solver::{StateHistory, StateSink};
use chrono::Local;
use csv::Writer;
use log::info;
use nalgebra::DVector;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub fn step_file_name(prefix: &str, step: usize) -> String {
    format!("{}_t_{}.csv", prefix, step)
}

pub fn all_timesteps_file_name(prefix: &str) -> String {
    format!("{}_all_timesteps.csv", prefix)
}

/// Creates the directory the prefix points into (`results/run` -> `results/`).
pub fn ensure_parent_dir(prefix: &str) -> HeatResult<()> {
    if let Some(parent) = Path::new(prefix).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// `results/<YYYYmmddHHMM>/<file name of prefix>`
pub fn timestamped_prefix(prefix: &str) -> String {
    let timestamp = Local::now().format("%Y%m%d%H%M").to_string();
    let name = Path::new(prefix)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "temperature".to_string());
    let path: PathBuf = ["results", timestamp.as_str(), name.as_str()].iter().collect();
    path.to_string_lossy().into_owned()
}

fn write_rows(writer: &mut Writer<File>, grid: &Grid, state: &DVector<f64>) -> HeatResult<()> {
    for (i, value) in state.iter().enumerate() {
        writer.write_record(&[grid.position(i).to_string(), value.to_string()])?;
    }
    Ok(())
}

pub fn save_step_csv(prefix: &str, step: usize, grid: &Grid, state: &DVector<f64>) -> HeatResult<()> {
    let mut writer = Writer::from_path(step_file_name(prefix, step))?;
    writer.write_record(["x", "Temperature"])?;
    write_rows(&mut writer, grid, state)?;
    writer.flush()?;
    Ok(())
}

pub fn save_all_timesteps_csv(
    prefix: &str,
    grid: &Grid,
    history: &StateHistory,
    dt: f64,
) -> HeatResult<()> {
    let mut writer = Writer::from_path(all_timesteps_file_name(prefix))?;
    writer.write_record(["t", "x", "Temperature"])?;
    for (step, state) in history.iter().enumerate() {
        let t = (step as f64 * dt).to_string();
        for (i, value) in state.iter().enumerate() {
            writer.write_record(&[t.clone(), grid.position(i).to_string(), value.to_string()])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Writes one file per stored state plus the combined file.
pub fn export_history(prefix: &str, grid: &Grid, history: &StateHistory, dt: f64) -> HeatResult<()> {
    ensure_parent_dir(prefix)?;
    for (step, state) in history.iter().enumerate() {
        save_step_csv(prefix, step, grid, state)?;
    }
    save_all_timesteps_csv(prefix, grid, history, dt)?;
    info!(
        "{} states written to {}",
        history.len(),
        all_timesteps_file_name(prefix)
    );
    Ok(())
}

/// Streams states into the same files as `export_history`, one state at a time.
pub struct CsvStateSink {
    prefix: String,
    all_timesteps: Writer<File>,
    written: usize,
}

impl CsvStateSink {
    pub fn new(prefix: &str) -> HeatResult<CsvStateSink> {
        ensure_parent_dir(prefix)?;
        let mut all_timesteps = Writer::from_path(all_timesteps_file_name(prefix))?;
        all_timesteps.write_record(["t", "x", "Temperature"])?;
        Ok(CsvStateSink {
            prefix: prefix.to_string(),
            all_timesteps,
            written: 0,
        })
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl StateSink for CsvStateSink {
    fn consume(
        &mut self,
        step: usize,
        time: f64,
        grid: &Grid,
        state: &DVector<f64>,
    ) -> HeatResult<()> {
        save_step_csv(&self.prefix, step, grid, state)?;
        let t = time.to_string();
        for (i, value) in state.iter().enumerate() {
            self.all_timesteps
                .write_record(&[t.clone(), grid.position(i).to_string(), value.to_string()])?;
        }
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> HeatResult<()> {
        self.all_timesteps.flush()?;
        info!(
            "{} states streamed to {}",
            self.written,
            all_timesteps_file_name(&self.prefix)
        );
        Ok(())
    }
}
