//! The monitoring loop and the pieces it sequences.
//!
//! This module provides:
//! - Validated configuration (`MonitorConfig`)
//! - Phrase matching over recognized text (`find_matches`)
//! - Cooldown-gated alerting (`AlertGate`) and alert delivery (`Notifier`)
//! - Periodic debug screenshots (`ScreenshotArchiver`)
//! - The loop itself with injectable clock (`MonitorLoop`)

pub mod alert;
pub mod archive;
pub mod clock;
pub mod config;
pub mod interrupt;
pub mod matcher;
pub mod notify;
pub mod runner;

#[cfg(test)]
pub mod testing;

pub use clock::SystemClock;
pub use config::MonitorConfig;
pub use interrupt::install_interrupt_handler;
pub use notify::platform_notifier;
pub use runner::{Collaborators, MonitorLoop};
