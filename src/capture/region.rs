//! Capture rectangle type and per-cycle region resolution.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use super::window::WindowEnumerator;

/// A rectangle in absolute screen pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Builds a region from a `left, top, right, bottom` rectangle.
    pub fn from_bounds(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(
            left,
            top,
            right.saturating_sub(left),
            bottom.saturating_sub(top),
        )
    }

    /// A region with zero or negative area is unresolved.
    pub fn is_resolved(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "left={} top={} width={} height={}",
            self.left, self.top, self.width, self.height
        )
    }
}

/// Decides which rectangle to capture on each cycle.
///
/// A fixed region always wins. Otherwise the first visible window (in OS
/// enumeration order) whose title contains the configured substring,
/// compared case-insensitively, supplies the rectangle. When several windows
/// match, which one comes first depends on the platform's enumeration order.
pub struct RegionResolver {
    fixed_region: Option<Region>,
    title_needle: String,
    enumerator: Box<dyn WindowEnumerator>,
}

impl RegionResolver {
    pub fn new(
        fixed_region: Option<Region>,
        window_title_substring: &str,
        enumerator: Box<dyn WindowEnumerator>,
    ) -> Self {
        Self {
            fixed_region,
            title_needle: window_title_substring.to_lowercase(),
            enumerator,
        }
    }

    /// Returns the region to capture, or `None` when nothing can be resolved.
    ///
    /// Never fails: enumeration errors are logged and reported as unresolved.
    pub fn resolve(&self) -> Option<Region> {
        if let Some(region) = self.fixed_region {
            return Some(region);
        }

        if !self.enumerator.is_available() {
            return None;
        }

        let windows = match self.enumerator.list_visible_windows() {
            Ok(windows) => windows,
            Err(e) => {
                warn!("Window enumeration failed: {:#}", e);
                return None;
            }
        };

        let window = windows
            .into_iter()
            .find(|w| w.title.to_lowercase().contains(&self.title_needle))?;

        if !window.rect.is_resolved() {
            debug!(
                "Window \"{}\" matched but has no visible area ({})",
                window.title, window.rect
            );
            return None;
        }

        debug!("Using window \"{}\" at {}", window.title, window.rect);
        Some(window.rect)
    }
}
