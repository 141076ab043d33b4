use anyhow::{anyhow, Context, Result};
use image::GrayImage;
use std::path::Path;
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::error;

use super::setup::TesseractPaths;

pub trait TextRecognizer {
    /// Extracts text from a preprocessed image.
    ///
    /// Never fails: an engine failure is logged and yields an empty string,
    /// which callers treat the same as "no text found".
    fn recognize(&mut self, image: &GrayImage, language: &str, engine_config: &str) -> String;
}

/// Runs the Tesseract CLI on a temporary PNG and reads plain text from stdout.
///
/// The call is not bounded by a timeout; a hung engine blocks the caller.
pub struct TesseractRecognizer {
    paths: TesseractPaths,
}

impl TesseractRecognizer {
    pub fn new(paths: TesseractPaths) -> Self {
        Self { paths }
    }

    /// `engine_config` is split with shell quoting rules, so
    /// `-c tessedit_char_whitelist="ab c"` stays one value.
    fn build_command(&self, input: &Path, language: &str, engine_config: &str) -> Result<Command> {
        let config_args = shlex::split(engine_config)
            .ok_or_else(|| anyhow!("Unbalanced quotes in tesseract_config: {}", engine_config))?;

        let mut command = Command::new(&self.paths.executable);
        command.arg(input).arg("stdout");
        if let Some(tessdata) = &self.paths.tessdata {
            command.arg("--tessdata-dir").arg(tessdata);
        }
        command
            .arg("-l")
            .arg(language)
            .args(config_args);
        Ok(command)
    }

    fn run(&self, image: &GrayImage, language: &str, engine_config: &str) -> Result<String> {
        let temp_input = NamedTempFile::with_suffix(".png")?;
        image
            .save(temp_input.path())
            .context("Failed to write OCR input image")?;

        let output = self
            .build_command(temp_input.path(), language, engine_config)?
            .output()
            .with_context(|| format!("Failed to run {}", self.paths.executable.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract exited with {}: {}", output.status, stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&mut self, image: &GrayImage, language: &str, engine_config: &str) -> String {
        match self.run(image, language, engine_config) {
            Ok(text) => text,
            Err(e) => {
                error!("Tesseract OCR failed: {:#}", e);
                String::new()
            }
        }
    }
}
