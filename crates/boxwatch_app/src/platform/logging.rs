//! Platform logging initialization for the dashboard.
//!
//! The terminal belongs to the UI, so logs go to `boxwatch.log` in the state
//! directory.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{CombinedLogger, Config, ConfigBuilder, SharedLogger, WriteLogger};

pub const LOG_FILENAME: &str = "boxwatch.log";

/// Initialize the global logger. Failure to create the file leaves logging disabled.
pub fn initialize(state_dir: &Path) {
    let level = LevelFilter::Info;
    let config = build_config();

    if let Some(file_logger) = create_file_logger(&state_dir.join(LOG_FILENAME), level, config) {
        let loggers: Vec<Box<dyn SharedLogger>> = vec![file_logger];
        let _ = CombinedLogger::init(loggers);
    }
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    log_path: &Path,
    level: LevelFilter,
    config: Config,
) -> Option<Box<WriteLogger<File>>> {
    match File::create(log_path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}
