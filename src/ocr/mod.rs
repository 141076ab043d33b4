pub mod engine;
pub mod preprocess;
pub mod setup;

pub use engine::{TesseractRecognizer, TextRecognizer};
pub use preprocess::prepare_for_ocr;
pub use setup::{locate_tesseract, TesseractPaths};
