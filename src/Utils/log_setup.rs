use crate::numerical::Heat1D::heat_errors::{HeatError, HeatResult};
use chrono::Local;
use log::info;
use simplelog::*;
use std::fs::File;

/// Maps a level string to a filter; `None` means the default `info`.
pub fn parse_loglevel(loglevel: Option<&str>) -> HeatResult<LevelFilter> {
    let Some(level) = loglevel else {
        return Ok(LevelFilter::Info);
    };
    match level {
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off" | "none" => Ok(LevelFilter::Off),
        other => Err(HeatError::InvalidParameter {
            name: "loglevel",
            reason: format!("must be debug, info, warn, error or off, got `{}`", other),
        }),
    }
}

/// Terminal logger plus, with `log_file`, a copy of the log in `log_<date>.txt`.
/// A logger that is already installed (tests, repeated runs) is kept.
pub fn init_logger(loglevel: Option<&str>, log_file: bool) -> HeatResult<LevelFilter> {
    let log_option = parse_loglevel(loglevel)?;
    if log_option == LevelFilter::Off {
        return Ok(log_option);
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if log_file {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("log_{}.txt", date_and_time);
        loggers.push(WriteLogger::new(
            log_option,
            Config::default(),
            File::create(name)?,
        ));
    }
    if CombinedLogger::init(loggers).is_ok() {
        info!("logger started with level {}", log_option);
    }
    Ok(log_option)
}
