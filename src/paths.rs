use std::path::PathBuf;
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the logs directory: `<exe_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_exe_dir().join("logs")
}

/// Returns the log file path: `<exe_dir>/logs/pathofocr.log`
pub fn get_log_file() -> PathBuf {
    get_logs_dir().join("pathofocr.log")
}

/// Returns the per-user Tesseract directory: `<data_local_dir>/pathofocr/tesseract/`
///
/// Falls back to `<exe_dir>/tesseract/` when the platform has no data dir.
pub fn get_tesseract_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("pathofocr"))
        .unwrap_or_else(|| get_exe_dir().clone())
        .join("tesseract")
}
