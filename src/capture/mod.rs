//! Screen-side collaborators of the monitor loop.
//!
//! This module provides:
//! - The capture rectangle and its per-cycle resolution (`RegionResolver`)
//! - Visible window enumeration (`WindowEnumerator`)
//! - Pixel capture of a rectangle (`FrameCapturer`)

pub mod region;
pub mod screenshot;
pub mod window;

pub use region::{Region, RegionResolver};
pub use screenshot::{CaptureError, Frame, FrameCapturer, XcapCapturer};
pub use window::{
    platform_window_enumerator, print_window_list, NoWindowEnumerator, WindowEnumerator,
    WindowInfo,
};
