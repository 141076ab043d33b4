//! Monitor configuration.
//!
//! Loaded once from a JSON file at startup and validated in one place. Every
//! key has a default, so an empty object `{}` is a valid (if useless) config.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::capture::Region;

/// Largest accepted upscale factor.
pub const MAX_SCALE: u32 = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Immutable monitor settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Case-insensitive substring of the window title to watch
    #[serde(default = "default_window_title_substring")]
    pub window_title_substring: String,
    /// Fixed capture rectangle; overrides the window search when set
    #[serde(default)]
    pub monitor_region: Option<Region>,
    /// Phrases that trigger an alert, in reporting order
    #[serde(default)]
    pub desired_outcomes: Vec<String>,
    /// Seconds between cycles
    #[serde(default = "default_poll_interval")]
    pub poll_interval: f64,
    /// Tesseract language code(s), e.g. `eng` or `eng+deu`
    #[serde(default = "default_ocr_lang")]
    pub ocr_lang: String,
    /// Explicit path to the Tesseract binary
    #[serde(default)]
    pub tesseract_cmd: Option<PathBuf>,
    /// Extra Tesseract flags, whitespace separated
    #[serde(default = "default_tesseract_config")]
    pub tesseract_config: String,
    /// Upscale factor applied before OCR
    #[serde(default = "default_scale")]
    pub scale: u32,
    /// Minimum seconds between two dispatched alerts
    #[serde(default = "default_alert_cooldown")]
    pub alert_cooldown: f64,
    /// Seconds between debug screenshots; 0 disables them
    #[serde(default)]
    pub screenshot_interval: f64,
    /// Where debug screenshots and their index go
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,
}

fn default_window_title_substring() -> String {
    "Path of Exile".to_string()
}

fn default_poll_interval() -> f64 {
    0.8
}

fn default_ocr_lang() -> String {
    "eng".to_string()
}

fn default_tesseract_config() -> String {
    "--psm 6".to_string()
}

fn default_scale() -> u32 {
    2
}

fn default_alert_cooldown() -> f64 {
    1.0
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from("logs").join("screenshots")
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window_title_substring: default_window_title_substring(),
            monitor_region: None,
            desired_outcomes: Vec::new(),
            poll_interval: default_poll_interval(),
            ocr_lang: default_ocr_lang(),
            tesseract_cmd: None,
            tesseract_config: default_tesseract_config(),
            scale: default_scale(),
            alert_cooldown: default_alert_cooldown(),
            screenshot_interval: 0.0,
            screenshot_dir: default_screenshot_dir(),
        }
    }
}

impl MonitorConfig {
    /// Reads, parses and validates the config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: MonitorConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_seconds("poll_interval", self.poll_interval, false)?;
        check_seconds("alert_cooldown", self.alert_cooldown, true)?;
        check_seconds("screenshot_interval", self.screenshot_interval, true)?;

        if !(1..=MAX_SCALE).contains(&self.scale) {
            return Err(ConfigError::Invalid(format!(
                "scale must be between 1 and {}, got {}",
                MAX_SCALE, self.scale
            )));
        }

        if shlex::split(&self.tesseract_config).is_none() {
            return Err(ConfigError::Invalid(format!(
                "tesseract_config has unbalanced quotes: {}",
                self.tesseract_config
            )));
        }

        if let Some(position) = self
            .desired_outcomes
            .iter()
            .position(|outcome| outcome.trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "desired_outcomes[{}] is empty",
                position
            )));
        }

        if let Some(region) = &self.monitor_region {
            if !region.is_resolved() {
                return Err(ConfigError::Invalid(format!(
                    "monitor_region must have positive width and height, got {}",
                    region
                )));
            }
        }

        Ok(())
    }

    /// Non-fatal problems worth telling the user about at startup.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.desired_outcomes.is_empty() {
            warnings.push("desired_outcomes is empty; no alert will ever fire".to_string());
        }
        if self.monitor_region.is_none() && self.window_title_substring.is_empty() {
            warnings.push(
                "window_title_substring is empty; the first visible window will be captured"
                    .to_string(),
            );
        }
        warnings
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval)
    }

    pub fn alert_cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.alert_cooldown)
    }

    /// `None` when debug screenshots are disabled.
    pub fn screenshot_interval(&self) -> Option<Duration> {
        (self.screenshot_interval > 0.0).then(|| Duration::from_secs_f64(self.screenshot_interval))
    }
}

fn check_seconds(key: &str, value: f64, allow_zero: bool) -> Result<(), ConfigError> {
    let in_range = if allow_zero { value >= 0.0 } else { value > 0.0 };
    if !in_range || Duration::try_from_secs_f64(value).is_err() {
        let bound = if allow_zero { ">= 0" } else { "> 0" };
        return Err(ConfigError::Invalid(format!(
            "{} must be a finite number of seconds {}, got {}",
            key, bound, value
        )));
    }
    Ok(())
}
