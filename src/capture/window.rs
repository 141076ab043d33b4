//! Visible window enumeration.
//!
//! Window lookup is an optional platform capability. Windows uses
//! `EnumWindows`, other desktops go through xcap, and hosts where neither
//! works get [`NoWindowEnumerator`], which leaves only a fixed region usable.

use anyhow::Result;
use tracing::warn;

use super::region::Region;

/// A visible top-level window and its bounding rectangle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowInfo {
    pub title: String,
    pub rect: Region,
}

pub trait WindowEnumerator {
    /// Lists visible, titled top-level windows in OS enumeration order.
    fn list_visible_windows(&self) -> Result<Vec<WindowInfo>>;

    /// Whether this host can enumerate windows at all.
    fn is_available(&self) -> bool {
        true
    }
}

/// Fallback for hosts without window enumeration.
pub struct NoWindowEnumerator;

impl WindowEnumerator for NoWindowEnumerator {
    fn list_visible_windows(&self) -> Result<Vec<WindowInfo>> {
        Ok(Vec::new())
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Picks the window enumerator for this platform.
#[cfg(windows)]
pub fn platform_window_enumerator() -> Box<dyn WindowEnumerator> {
    Box::new(Win32WindowEnumerator)
}

/// Picks the window enumerator for this platform.
///
/// Probes xcap once; if the display server refuses, window search is disabled.
#[cfg(not(windows))]
pub fn platform_window_enumerator() -> Box<dyn WindowEnumerator> {
    match xcap::Window::all() {
        Ok(_) => Box::new(XcapWindowEnumerator),
        Err(e) => {
            warn!("Window enumeration unavailable ({}); only monitor_region can be used", e);
            Box::new(NoWindowEnumerator)
        }
    }
}

#[cfg(not(windows))]
pub struct XcapWindowEnumerator;

#[cfg(not(windows))]
impl WindowEnumerator for XcapWindowEnumerator {
    fn list_visible_windows(&self) -> Result<Vec<WindowInfo>> {
        use anyhow::Context;

        let windows = xcap::Window::all().context("Failed to enumerate windows")?;
        Ok(windows
            .into_iter()
            .filter(|w| !w.title().is_empty() && !w.is_minimized())
            .map(|w| WindowInfo {
                title: w.title().to_string(),
                rect: Region::new(
                    w.x(),
                    w.y(),
                    i32::try_from(w.width()).unwrap_or(i32::MAX),
                    i32::try_from(w.height()).unwrap_or(i32::MAX),
                ),
            })
            .collect())
    }
}

#[cfg(windows)]
pub struct Win32WindowEnumerator;

#[cfg(windows)]
impl WindowEnumerator for Win32WindowEnumerator {
    fn list_visible_windows(&self) -> Result<Vec<WindowInfo>> {
        use anyhow::Context;
        use std::ffi::OsString;
        use std::os::windows::ffi::OsStringExt;

        use windows::Win32::Foundation::{BOOL, HWND, LPARAM, RECT, TRUE};
        use windows::Win32::UI::WindowsAndMessaging::{
            EnumWindows, GetWindowRect, GetWindowTextLengthW, GetWindowTextW, IsWindowVisible,
        };

        unsafe extern "system" fn enum_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
            unsafe {
                let found = &mut *(lparam.0 as *mut Vec<WindowInfo>);

                if !IsWindowVisible(hwnd).as_bool() {
                    return TRUE;
                }

                // Untitled windows are never a match target
                let title_len = GetWindowTextLengthW(hwnd);
                if title_len <= 0 {
                    return TRUE;
                }
                let mut title_buf: Vec<u16> = vec![0; (title_len + 1) as usize];
                let copied = GetWindowTextW(hwnd, &mut title_buf).max(0) as usize;
                let title = OsString::from_wide(&title_buf[..copied.min(title_len as usize)])
                    .to_string_lossy()
                    .to_string();

                let mut rect = RECT::default();
                if GetWindowRect(hwnd, &mut rect).is_err() {
                    return TRUE;
                }

                found.push(WindowInfo {
                    title,
                    rect: Region::from_bounds(rect.left, rect.top, rect.right, rect.bottom),
                });
                TRUE
            }
        }

        let mut found: Vec<WindowInfo> = Vec::new();
        unsafe {
            EnumWindows(Some(enum_callback), LPARAM(&mut found as *mut _ as isize))
                .context("EnumWindows failed")?;
        }
        Ok(found)
    }
}

/// Prints every visible window with its rectangle, one per line.
pub fn print_window_list(enumerator: &dyn WindowEnumerator) -> Result<()> {
    if !enumerator.is_available() {
        warn!("Window enumeration is not available on this host");
        return Ok(());
    }

    for window in enumerator.list_visible_windows()? {
        println!("{:?} | {}", window.title, window.rect);
    }
    Ok(())
}
