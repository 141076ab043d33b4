//! PathOfOCR
//!
//! Watches a game window (or a fixed screen rectangle), reads its text with
//! Tesseract and raises an alert when a desired crafting outcome appears.

mod capture;
mod logging;
mod monitor;
mod ocr;
mod paths;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{error, info, warn};

use capture::{platform_window_enumerator, print_window_list, XcapCapturer};
use monitor::{
    install_interrupt_handler, platform_notifier, Collaborators, MonitorConfig, MonitorLoop,
    SystemClock,
};
use ocr::{locate_tesseract, TesseractRecognizer};

#[derive(Parser, Debug)]
#[command(version, about = "OCR screen monitor for crafting outcomes")]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Log OCR output and per-cycle details
    #[arg(short, long)]
    debug: bool,

    /// Print visible windows with their rectangles and exit
    #[arg(long)]
    list_windows: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::install_panic_hook();
    logging::init(cli.debug)?;

    let windows = platform_window_enumerator();

    if cli.list_windows {
        return print_window_list(windows.as_ref());
    }

    let config = match MonitorConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    for warning in config.warnings() {
        warn!("{}", warning);
    }

    info!("PathOfOCR v{} starting", env!("CARGO_PKG_VERSION"));
    match &config.monitor_region {
        Some(region) => info!("Monitoring fixed region: {}", region),
        None => info!("Monitoring window: \"{}\"", config.window_title_substring),
    }
    info!("Desired outcomes: {:?}", config.desired_outcomes);

    if config.monitor_region.is_none() && !windows.is_available() {
        warn!("Window lookup is not available here; set monitor_region in the config");
    }

    let tesseract = locate_tesseract(config.tesseract_cmd.as_deref());

    let stop = Arc::new(AtomicBool::new(false));
    if let Err(e) = install_interrupt_handler(stop.clone()) {
        warn!("Ctrl+C handling unavailable: {:#}", e);
    }

    let collaborators = Collaborators {
        windows,
        capturer: Box::new(XcapCapturer),
        recognizer: Box::new(TesseractRecognizer::new(tesseract)),
        notifier: platform_notifier(),
        clock: Box::new(SystemClock::new()),
    };

    MonitorLoop::new(config, collaborators, stop).run();

    info!("Exiting");
    Ok(())
}
