use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

use crate::paths::get_tesseract_dir;

/// Where to find the Tesseract binary and, optionally, its language data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TesseractPaths {
    pub executable: PathBuf,
    /// Passed as `--tessdata-dir` when set; otherwise Tesseract uses its own default.
    pub tessdata: Option<PathBuf>,
}

const COMMON_WINDOWS_PATHS: [&str; 2] = [
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
];

fn executable_name() -> &'static str {
    if cfg!(windows) {
        "tesseract.exe"
    } else {
        "tesseract"
    }
}

/// Locates Tesseract once at startup.
///
/// Order: the configured `tesseract_cmd`, `tesseract` on PATH, the per-user
/// tesseract directory, then the usual Windows install locations. If nothing
/// is found a warning is logged and the bare name is used; recognition then
/// fails each cycle and is absorbed as empty text.
pub fn locate_tesseract(configured: Option<&Path>) -> TesseractPaths {
    let local_dir = get_tesseract_dir();
    let tessdata = find_tessdata_in(&local_dir);

    if let Some(cmd) = configured {
        if cmd.exists() {
            info!("Using tesseract binary: {}", cmd.display());
            return TesseractPaths {
                executable: cmd.to_path_buf(),
                tessdata,
            };
        }
        warn!("Configured tesseract_cmd does not exist: {}", cmd.display());
    }

    if responds_to_version("tesseract") {
        info!("Found tesseract on PATH");
        return TesseractPaths {
            executable: PathBuf::from("tesseract"),
            tessdata,
        };
    }

    let local_exe = local_dir.join(executable_name());
    if local_exe.exists() {
        info!("Found tesseract at: {}", local_exe.display());
        return TesseractPaths {
            executable: local_exe,
            tessdata,
        };
    }

    if cfg!(windows) {
        for path in &COMMON_WINDOWS_PATHS {
            let p = PathBuf::from(path);
            if p.exists() {
                info!("Found tesseract at: {}", p.display());
                return TesseractPaths {
                    executable: p,
                    tessdata,
                };
            }
        }
    }

    warn!(
        "Tesseract binary not found. OCR will fail until Tesseract is installed or tesseract_cmd is set in the config."
    );
    TesseractPaths {
        executable: configured
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(executable_name())),
        tessdata,
    }
}

fn responds_to_version(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Returns `<dir>/tessdata` if it holds at least one `.traineddata` file.
pub fn find_tessdata_in(dir: &Path) -> Option<PathBuf> {
    let tessdata = dir.join("tessdata");
    let has_models = std::fs::read_dir(&tessdata)
        .ok()?
        .flatten()
        .any(|entry| entry.path().extension().is_some_and(|ext| ext == "traineddata"));

    has_models.then_some(tessdata)
}
