use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::capture::Frame;

/// Blur radius of the unsharp mask applied after upscaling.
const SHARPEN_SIGMA: f32 = 1.0;

/// Minimum brightness difference the unsharp mask reacts to.
const SHARPEN_THRESHOLD: i32 = 2;

/// Converts a captured frame into an image Tesseract reads reliably.
///
/// Grayscale, then a Lanczos upscale by exactly `scale` in both dimensions,
/// then an unsharp mask to restore glyph edges softened by the resample.
/// A `scale` of 0 is treated as 1.
pub fn prepare_for_ocr(frame: &Frame, scale: u32) -> GrayImage {
    let scale = scale.max(1);
    let gray = imageops::grayscale(frame);
    let (width, height) = gray.dimensions();

    let upscaled = if scale == 1 {
        gray
    } else {
        imageops::resize(
            &gray,
            width.saturating_mul(scale),
            height.saturating_mul(scale),
            FilterType::Lanczos3,
        )
    };

    imageops::unsharpen(&upscaled, SHARPEN_SIGMA, SHARPEN_THRESHOLD)
}
