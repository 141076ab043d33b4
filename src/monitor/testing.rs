//! Test doubles for the monitor's collaborators.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, TimeZone};
use image::{GrayImage, Rgba};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::clock::Clock;
use super::notify::Notifier;
use crate::capture::{CaptureError, Frame, FrameCapturer, Region, WindowEnumerator, WindowInfo};
use crate::ocr::TextRecognizer;

/// Clock whose `sleep` advances time instantly and is recorded.
#[derive(Clone, Default)]
pub struct FakeClock {
    now: Rc<Cell<Duration>>,
    sleeps: Rc<RefCell<Vec<Duration>>>,
    stop_after: Rc<RefCell<Option<(usize, Arc<AtomicBool>)>>>,
}

impl FakeClock {
    /// Raises `stop` once `sleeps` sleeps have happened.
    pub fn stop_after(&self, sleeps: usize, stop: Arc<AtomicBool>) {
        *self.stop_after.borrow_mut() = Some((sleeps, stop));
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn local_now(&self) -> DateTime<Local> {
        let elapsed = chrono::Duration::from_std(self.now.get())
            .unwrap_or_else(|_| chrono::Duration::zero());
        Local.timestamp_opt(1_700_000_000, 0).unwrap() + elapsed
    }

    fn sleep(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
        self.sleeps.borrow_mut().push(duration);

        if let Some((limit, stop)) = self.stop_after.borrow().as_ref() {
            if self.sleeps.borrow().len() >= *limit {
                stop.store(true, Ordering::SeqCst);
            }
        }
    }
}

/// Records delivered alerts. A failing notifier logs and delivers nothing.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    fail: bool,
    attempts: Rc<Cell<usize>>,
    sent: Rc<RefCell<Vec<(String, String)>>>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.borrow().len()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.attempts.set(self.attempts.get() + 1);
        if self.fail {
            tracing::error!("Popup unavailable; alert was \"{}\"", message);
            return;
        }
        self.sent
            .borrow_mut()
            .push((title.to_string(), message.to_string()));
    }
}

/// Returns queued texts in order, then empty strings.
#[derive(Clone, Default)]
pub struct ScriptedRecognizer {
    texts: Rc<RefCell<VecDeque<String>>>,
    calls: Rc<Cell<usize>>,
    last_size: Rc<Cell<(u32, u32)>>,
}

impl ScriptedRecognizer {
    pub fn new(texts: &[&str]) -> Self {
        let recognizer = Self::default();
        recognizer
            .texts
            .borrow_mut()
            .extend(texts.iter().map(|t| t.to_string()));
        recognizer
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn last_size(&self) -> (u32, u32) {
        self.last_size.get()
    }
}

impl TextRecognizer for ScriptedRecognizer {
    fn recognize(&mut self, image: &GrayImage, _language: &str, _engine_config: &str) -> String {
        self.calls.set(self.calls.get() + 1);
        self.last_size.set(image.dimensions());
        self.texts.borrow_mut().pop_front().unwrap_or_default()
    }
}

/// Produces a blank frame of the requested size, or always fails.
#[derive(Clone, Default)]
pub struct BlankCapturer {
    fail: bool,
    calls: Rc<Cell<usize>>,
}

impl BlankCapturer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl FrameCapturer for BlankCapturer {
    fn capture(&mut self, region: Region) -> Result<Frame, CaptureError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(CaptureError::Backend("permission denied".to_string()));
        }
        if !region.is_resolved() {
            return Err(CaptureError::InvalidRegion(region));
        }
        Ok(Frame::from_pixel(
            region.width as u32,
            region.height as u32,
            Rgba([255, 255, 255, 255]),
        ))
    }
}

pub struct StaticWindows(pub Vec<WindowInfo>);

impl WindowEnumerator for StaticWindows {
    fn list_visible_windows(&self) -> Result<Vec<WindowInfo>> {
        Ok(self.0.clone())
    }
}

pub struct BrokenWindows;

impl WindowEnumerator for BrokenWindows {
    fn list_visible_windows(&self) -> Result<Vec<WindowInfo>> {
        Err(anyhow!("display server went away"))
    }
}
