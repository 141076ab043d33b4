//! Logging setup.
//!
//! Log lines go to the console and to `<exe_dir>/logs/pathofocr.log`, both
//! stamped with local wall-clock time. `RUST_LOG` overrides the level.

use anyhow::{anyhow, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::paths;

const TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Installs the global subscriber. Call once, before anything logs.
pub fn init(debug: bool) -> Result<()> {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,pathofocr={}", level)));

    let console = fmt::layer()
        .with_target(false)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()));

    // A missing log file is not fatal; console logging still works.
    let (file, file_error) = match open_log_file() {
        Ok(file) => {
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;

    if let Some(e) = file_error {
        tracing::warn!("File logging disabled: {:#}", e);
    }
    Ok(())
}

fn open_log_file() -> Result<File> {
    fs::create_dir_all(paths::get_logs_dir())?;
    Ok(OpenOptions::new()
        .create(true)
        .append(true)
        .open(paths::get_log_file())?)
}

/// Writes panics to stderr and the log file, even if logging never started.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();

        let line = format!(
            "[{}] [PANIC]{} {}\n",
            chrono::Local::now().format(TIME_FORMAT),
            location,
            msg
        );
        eprint!("{}", line);
        if let Ok(mut file) = open_log_file() {
            let _ = file.write_all(line.as_bytes());
        }
    }));
}
