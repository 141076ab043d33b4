//! Screen region capture using xcap.

use image::{ImageBuffer, Rgba};
use thiserror::Error;
use tracing::debug;

use super::region::Region;

/// Raw RGBA pixels for one captured region. Owned by a single cycle.
pub type Frame = ImageBuffer<Rgba<u8>, Vec<u8>>;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("invalid capture region ({0}): width and height must be positive")]
    InvalidRegion(Region),
    #[error("no display available: {0}")]
    NoDisplay(String),
    #[error("region ({region}) lies outside the monitor at ({monitor})")]
    OutOfBounds { region: Region, monitor: Region },
    #[error("screen capture failed: {0}")]
    Backend(String),
}

pub trait FrameCapturer {
    /// Grabs the pixels inside `region`.
    fn capture(&mut self, region: Region) -> Result<Frame, CaptureError>;
}

/// Captures through xcap.
///
/// Every call enumerates monitors afresh and drops them before returning, so
/// no capture resource outlives a cycle.
pub struct XcapCapturer;

impl FrameCapturer for XcapCapturer {
    fn capture(&mut self, region: Region) -> Result<Frame, CaptureError> {
        if !region.is_resolved() {
            return Err(CaptureError::InvalidRegion(region));
        }

        let monitors = xcap::Monitor::all().map_err(|e| CaptureError::NoDisplay(e.to_string()))?;
        let monitor = monitors
            .iter()
            .find(|m| monitor_rect(m).contains_point(region.left, region.top))
            .or(monitors.first())
            .ok_or_else(|| CaptureError::NoDisplay("no monitors found".to_string()))?;
        let monitor_area = monitor_rect(monitor);

        let raw = monitor
            .capture_image()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;
        let (screen_width, screen_height) = (raw.width(), raw.height());
        let screen = Frame::from_raw(screen_width, screen_height, raw.into_raw())
            .ok_or_else(|| CaptureError::Backend("monitor image buffer too small".to_string()))?;

        let (x, y, width, height) = clip_to_screen(
            region,
            (monitor_area.left, monitor_area.top),
            screen_width,
            screen_height,
        )
        .ok_or(CaptureError::OutOfBounds {
            region,
            monitor: monitor_area,
        })?;

        if (width as i64, height as i64) != (region.width as i64, region.height as i64) {
            debug!(
                "Region ({}) clipped to {}x{} at ({}, {}) on monitor ({})",
                region, width, height, x, y, monitor_area
            );
        }

        Ok(image::imageops::crop_imm(&screen, x, y, width, height).to_image())
    }
}

fn monitor_rect(monitor: &xcap::Monitor) -> Region {
    Region::new(
        monitor.x(),
        monitor.y(),
        i32::try_from(monitor.width()).unwrap_or(i32::MAX),
        i32::try_from(monitor.height()).unwrap_or(i32::MAX),
    )
}

impl Region {
    fn contains_point(&self, x: i32, y: i32) -> bool {
        let (x, y) = (x as i64, y as i64);
        x >= self.left as i64
            && y >= self.top as i64
            && x < self.left as i64 + self.width as i64
            && y < self.top as i64 + self.height as i64
    }
}

/// Translates `region` into pixel offsets inside a screen image whose
/// top-left corner sits at `origin`, clipped to the image bounds.
///
/// Returns `(x, y, width, height)`, or `None` if nothing of the region is on
/// this screen.
fn clip_to_screen(
    region: Region,
    origin: (i32, i32),
    screen_width: u32,
    screen_height: u32,
) -> Option<(u32, u32, u32, u32)> {
    let x0 = (region.left as i64 - origin.0 as i64).max(0);
    let y0 = (region.top as i64 - origin.1 as i64).max(0);
    let x1 = (region.left as i64 + region.width as i64 - origin.0 as i64).min(screen_width as i64);
    let y1 = (region.top as i64 + region.height as i64 - origin.1 as i64).min(screen_height as i64);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
}
