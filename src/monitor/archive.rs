//! Debug screenshot archiving.
//!
//! Saves a captured frame every `screenshot_interval` seconds, independent of
//! the poll cadence, and appends each saved path to a plain index file. All
//! failures are logged and swallowed.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use crate::capture::{Frame, Region};

/// Index of saved screenshots, one path per line.
pub const INDEX_FILE_NAME: &str = "saved_files.txt";

pub struct ScreenshotArchiver {
    interval: Duration,
    directory: PathBuf,
    /// Monotonic time of the last save attempt
    last_saved: Option<Duration>,
}

impl ScreenshotArchiver {
    pub fn new(interval: Duration, directory: PathBuf) -> Self {
        Self {
            interval,
            directory,
            last_saved: None,
        }
    }

    /// Creates the output directory. Failure is logged; saves will fail later.
    pub fn ensure_directory(&self) {
        if let Err(e) = fs::create_dir_all(&self.directory) {
            error!(
                "Failed to create screenshot directory {}: {}",
                self.directory.display(),
                e
            );
        }
    }

    /// `now` is monotonic time, so adjusting the system clock neither stalls
    /// the timer nor causes a burst of saves. Wall time only names the files.
    pub fn is_due(&self, now: Duration) -> bool {
        self.last_saved
            .map_or(true, |last| now.saturating_sub(last) >= self.interval)
    }

    /// Saves `frame` if the interval has elapsed. Returns the saved path.
    ///
    /// The timer restarts on every attempt, successful or not.
    pub fn maybe_archive(
        &mut self,
        frame: &Frame,
        region: Region,
        now: Duration,
        timestamp: DateTime<Local>,
    ) -> Option<PathBuf> {
        if !self.is_due(now) {
            return None;
        }
        self.last_saved = Some(now);

        match self.archive(frame, region, timestamp) {
            Ok(path) => Some(path),
            Err(e) => {
                error!("Failed to save screenshot: {:#}", e);
                None
            }
        }
    }

    fn archive(&self, frame: &Frame, region: Region, timestamp: DateTime<Local>) -> Result<PathBuf> {
        let path = self.directory.join(screenshot_file_name(region, timestamp));
        frame
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!("Saved screenshot: {}", path.display());
        println!("{}", path.display());

        if let Err(e) = append_to_index(&self.directory.join(INDEX_FILE_NAME), &path) {
            error!("Failed to write screenshot index: {:#}", e);
        }

        Ok(path)
    }
}

/// `screenshot_<YYYYmmdd_HHMMSS_mmm>_L<left>_T<top>_W<width>_H<height>.png`
pub fn screenshot_file_name(region: Region, timestamp: DateTime<Local>) -> String {
    format!(
        "screenshot_{}_L{}_T{}_W{}_H{}.png",
        timestamp.format("%Y%m%d_%H%M%S_%3f"),
        region.left,
        region.top,
        region.width,
        region.height
    )
}

/// Appends one path to the index file, creating it if needed.
fn append_to_index(index: &Path, saved: &Path) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(index)
        .context("Failed to open screenshot index for append")?;

    writeln!(file, "{}", saved.display()).context("Failed to append to screenshot index")?;
    Ok(())
}
