//! The monitor loop.
//!
//! Each cycle runs: resolve region → capture → (archive) → preprocess →
//! recognize → match → alert gate, then sleeps. Missing regions and capture
//! failures back off and retry; everything later in the cycle absorbs its own
//! failures. The stop flag is checked between cycles only.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::alert::{AlertDecision, AlertGate};
use super::archive::ScreenshotArchiver;
use super::clock::Clock;
use super::config::MonitorConfig;
use super::matcher::find_matches;
use super::notify::Notifier;
use crate::capture::{FrameCapturer, RegionResolver, WindowEnumerator};
use crate::ocr::{prepare_for_ocr, TextRecognizer};

/// Delay before retrying when no region could be resolved.
pub const UNRESOLVED_BACKOFF: Duration = Duration::from_secs(3);

/// Delay before retrying after a capture failure.
pub const CAPTURE_BACKOFF: Duration = Duration::from_secs(1);

/// What one cycle ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// No fixed region and no matching window
    RegionUnresolved,
    /// The capture API failed
    CaptureFailed,
    /// Text recognized (possibly empty), nothing desired in it
    NoMatch,
    /// Matches found and a notification went out
    Alerted(Vec<String>),
    /// Matches found inside the cooldown window
    Suppressed(Vec<String>),
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::RegionUnresolved => write!(f, "Region unresolved"),
            CycleOutcome::CaptureFailed => write!(f, "Capture failed"),
            CycleOutcome::NoMatch => write!(f, "No match"),
            CycleOutcome::Alerted(matches) => write!(f, "Alerted: {}", matches.join(", ")),
            CycleOutcome::Suppressed(matches) => write!(f, "Suppressed: {}", matches.join(", ")),
        }
    }
}

/// Platform capabilities the loop drives, injected so tests can fake them.
pub struct Collaborators {
    pub windows: Box<dyn WindowEnumerator>,
    pub capturer: Box<dyn FrameCapturer>,
    pub recognizer: Box<dyn TextRecognizer>,
    pub notifier: Box<dyn Notifier>,
    pub clock: Box<dyn Clock>,
}

pub struct MonitorLoop {
    config: MonitorConfig,
    resolver: RegionResolver,
    capturer: Box<dyn FrameCapturer>,
    recognizer: Box<dyn TextRecognizer>,
    notifier: Box<dyn Notifier>,
    clock: Box<dyn Clock>,
    alert_gate: AlertGate,
    archiver: Option<ScreenshotArchiver>,
    stop: Arc<AtomicBool>,
    cycles: u64,
}

impl MonitorLoop {
    /// Builds the loop. Creates the screenshot directory when archiving is on.
    pub fn new(config: MonitorConfig, collaborators: Collaborators, stop: Arc<AtomicBool>) -> Self {
        let resolver = RegionResolver::new(
            config.monitor_region,
            &config.window_title_substring,
            collaborators.windows,
        );
        let alert_gate = AlertGate::new(config.alert_cooldown());
        let archiver = config.screenshot_interval().map(|interval| {
            let archiver = ScreenshotArchiver::new(interval, config.screenshot_dir.clone());
            archiver.ensure_directory();
            archiver
        });

        Self {
            config,
            resolver,
            capturer: collaborators.capturer,
            recognizer: collaborators.recognizer,
            notifier: collaborators.notifier,
            clock: collaborators.clock,
            alert_gate,
            archiver,
            stop,
            cycles: 0,
        }
    }

    /// Number of cycles started so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Monotonic time of the last dispatched alert.
    pub fn last_alert(&self) -> Option<Duration> {
        self.alert_gate.last_alert()
    }

    /// Runs cycles until the stop flag is raised.
    pub fn run(&mut self) {
        info!(
            "Monitor running: poll every {:.2}s, alert cooldown {:.2}s",
            self.config.poll_interval, self.config.alert_cooldown
        );

        while !self.stop.load(Ordering::SeqCst) {
            let outcome = self.run_cycle();
            self.clock.sleep(self.delay_after(&outcome));
        }

        info!("Monitor stopped after {} cycles", self.cycles);
    }

    /// How long to sleep before the next cycle.
    pub fn delay_after(&self, outcome: &CycleOutcome) -> Duration {
        match outcome {
            CycleOutcome::RegionUnresolved => UNRESOLVED_BACKOFF,
            CycleOutcome::CaptureFailed => CAPTURE_BACKOFF,
            _ => self.config.poll_interval(),
        }
    }

    /// Runs one cycle without sleeping.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        self.cycles += 1;

        let Some(region) = self.resolver.resolve() else {
            warn!(
                "Could not find window or region. Make sure the game is running or set monitor_region in the config."
            );
            return CycleOutcome::RegionUnresolved;
        };

        let frame = match self.capturer.capture(region) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Capture failed: {}", e);
                return CycleOutcome::CaptureFailed;
            }
        };

        if let Some(archiver) = self.archiver.as_mut() {
            archiver.maybe_archive(&frame, region, self.clock.now(), self.clock.local_now());
        }

        let prepared = prepare_for_ocr(&frame, self.config.scale);
        drop(frame);

        let text = self.recognizer.recognize(
            &prepared,
            &self.config.ocr_lang,
            &self.config.tesseract_config,
        );
        debug!("OCR output:\n{}", text);

        let matches = find_matches(&text, &self.config.desired_outcomes);
        if matches.is_empty() {
            debug!("No desired text found");
            return CycleOutcome::NoMatch;
        }

        match self
            .alert_gate
            .submit(&matches, self.clock.now(), self.notifier.as_ref())
        {
            AlertDecision::Fired => CycleOutcome::Alerted(matches),
            AlertDecision::Suppressed => CycleOutcome::Suppressed(matches),
            AlertDecision::NoMatch => CycleOutcome::NoMatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{NoWindowEnumerator, Region, WindowInfo};
    use crate::monitor::archive::INDEX_FILE_NAME;
    use crate::monitor::testing::{
        BlankCapturer, BrokenWindows, FakeClock, RecordingNotifier, ScriptedRecognizer,
        StaticWindows,
    };
    use tempfile::tempdir;

    struct Harness {
        clock: FakeClock,
        capturer: BlankCapturer,
        recognizer: ScriptedRecognizer,
        notifier: RecordingNotifier,
        stop: Arc<AtomicBool>,
    }

    impl Harness {
        fn new(texts: &[&str]) -> Self {
            Self {
                clock: FakeClock::default(),
                capturer: BlankCapturer::default(),
                recognizer: ScriptedRecognizer::new(texts),
                notifier: RecordingNotifier::default(),
                stop: Arc::new(AtomicBool::new(false)),
            }
        }

        fn build(&self, config: MonitorConfig, windows: Box<dyn WindowEnumerator>) -> MonitorLoop {
            MonitorLoop::new(
                config,
                Collaborators {
                    windows,
                    capturer: Box::new(self.capturer.clone()),
                    recognizer: Box::new(self.recognizer.clone()),
                    notifier: Box::new(self.notifier.clone()),
                    clock: Box::new(self.clock.clone()),
                },
                self.stop.clone(),
            )
        }
    }

    fn fixed_config(desired: &[&str]) -> MonitorConfig {
        MonitorConfig {
            monitor_region: Some(Region::new(0, 0, 100, 50)),
            desired_outcomes: desired.iter().map(|s| s.to_string()).collect(),
            poll_interval: 0.1,
            alert_cooldown: 2.0,
            ..MonitorConfig::default()
        }
    }

    #[test]
    fn test_single_alert_over_five_cycles() {
        let harness = Harness::new(&[
            "18% increased critical strike chance",
            "18% Increased Critical Strike Chance",
            "INCREASED CRITICAL STRIKE",
            "+25 to maximum Life",
            "",
        ]);
        let mut monitor = harness.build(fixed_config(&["Increased Critical"]), Box::new(NoWindowEnumerator));

        let mut outcomes = Vec::new();
        for _ in 0..5 {
            let outcome = monitor.run_cycle();
            harness.clock.sleep(monitor.delay_after(&outcome));
            outcomes.push(outcome);
        }

        assert_eq!(
            outcomes,
            [
                CycleOutcome::Alerted(vec!["Increased Critical".to_string()]),
                CycleOutcome::Suppressed(vec!["Increased Critical".to_string()]),
                CycleOutcome::Suppressed(vec!["Increased Critical".to_string()]),
                CycleOutcome::NoMatch,
                CycleOutcome::NoMatch,
            ]
        );
        assert_eq!(harness.notifier.count(), 1);
        assert_eq!(
            harness.notifier.sent()[0].1,
            "Detected: Increased Critical"
        );
        assert_eq!(harness.recognizer.calls(), 5);
    }

    #[test]
    fn test_recognizer_sees_scaled_image() {
        let harness = Harness::new(&["nothing"]);
        let config = MonitorConfig {
            scale: 3,
            ..fixed_config(&["veiled"])
        };
        let mut monitor = harness.build(config, Box::new(NoWindowEnumerator));

        assert_eq!(monitor.run_cycle(), CycleOutcome::NoMatch);
        assert_eq!(harness.recognizer.last_size(), (300, 150));
    }

    #[test]
    fn test_unresolved_region_backs_off_without_capture() {
        let harness = Harness::new(&[]);
        let config = MonitorConfig {
            desired_outcomes: vec!["veiled".to_string()],
            ..MonitorConfig::default()
        };
        let mut monitor = harness.build(config, Box::new(BrokenWindows));

        let outcome = monitor.run_cycle();
        assert_eq!(outcome, CycleOutcome::RegionUnresolved);
        assert_eq!(monitor.delay_after(&outcome), UNRESOLVED_BACKOFF);
        assert_eq!(harness.capturer.calls(), 0);
    }

    #[test]
    fn test_window_region_is_captured() {
        let harness = Harness::new(&["Veiled Prefix"]);
        let windows = StaticWindows(vec![WindowInfo {
            title: "Path of Exile".to_string(),
            rect: Region::new(10, 10, 40, 20),
        }]);
        let config = MonitorConfig {
            desired_outcomes: vec!["veiled".to_string()],
            scale: 1,
            ..MonitorConfig::default()
        };
        let mut monitor = harness.build(config, Box::new(windows));

        assert_eq!(
            monitor.run_cycle(),
            CycleOutcome::Alerted(vec!["veiled".to_string()])
        );
        assert_eq!(harness.recognizer.last_size(), (40, 20));
    }

    #[test]
    fn test_capture_failure_backs_off_without_ocr() {
        let mut harness = Harness::new(&["veiled"]);
        harness.capturer = BlankCapturer::failing();
        let mut monitor = harness.build(fixed_config(&["veiled"]), Box::new(NoWindowEnumerator));

        let outcome = monitor.run_cycle();
        assert_eq!(outcome, CycleOutcome::CaptureFailed);
        assert_eq!(monitor.delay_after(&outcome), CAPTURE_BACKOFF);
        assert_eq!(harness.recognizer.calls(), 0);
    }

    #[test]
    fn test_empty_recognition_is_not_a_match() {
        let harness = Harness::new(&[""]);
        let mut monitor = harness.build(fixed_config(&["veiled"]), Box::new(NoWindowEnumerator));

        let outcome = monitor.run_cycle();
        assert_eq!(outcome, CycleOutcome::NoMatch);
        assert_eq!(monitor.delay_after(&outcome), Duration::from_millis(100));
    }

    #[test]
    fn test_run_stops_between_cycles() {
        let harness = Harness::new(&[]);
        harness.clock.stop_after(3, harness.stop.clone());
        let mut monitor = harness.build(fixed_config(&["veiled"]), Box::new(NoWindowEnumerator));

        monitor.run();

        assert_eq!(monitor.cycles(), 3);
        assert_eq!(harness.clock.sleeps(), vec![Duration::from_millis(100); 3]);
    }

    #[test]
    fn test_run_uses_backoff_delays() {
        let harness = Harness::new(&[]);
        harness.clock.stop_after(2, harness.stop.clone());
        let mut monitor = harness.build(MonitorConfig::default(), Box::new(NoWindowEnumerator));

        monitor.run();

        assert_eq!(harness.clock.sleeps(), vec![UNRESOLVED_BACKOFF; 2]);
    }

    #[test]
    fn test_run_returns_immediately_when_already_stopped() {
        let harness = Harness::new(&["veiled"]);
        harness.stop.store(true, Ordering::SeqCst);
        let mut monitor = harness.build(fixed_config(&["veiled"]), Box::new(NoWindowEnumerator));

        monitor.run();

        assert_eq!(monitor.cycles(), 0);
        assert_eq!(harness.notifier.count(), 0);
    }

    #[test]
    fn test_screenshots_follow_their_own_interval() {
        let dir = tempdir().unwrap();
        let harness = Harness::new(&[]);
        let config = MonitorConfig {
            screenshot_interval: 0.25,
            screenshot_dir: dir.path().join("shots"),
            ..fixed_config(&["veiled"])
        };
        let mut monitor = harness.build(config, Box::new(NoWindowEnumerator));

        // Saves at t=0.0, 0.3 and 0.6 across seven 0.1s cycles
        for _ in 0..7 {
            let outcome = monitor.run_cycle();
            harness.clock.sleep(monitor.delay_after(&outcome));
        }

        let index = std::fs::read_to_string(dir.path().join("shots").join(INDEX_FILE_NAME)).unwrap();
        assert_eq!(index.lines().count(), 3);
    }

    #[test]
    fn test_failed_delivery_still_starts_cooldown() {
        let mut harness = Harness::new(&["veiled", "veiled", "veiled", "veiled"]);
        harness.notifier = RecordingNotifier::failing();
        harness.clock.stop_after(4, harness.stop.clone());
        let mut monitor = harness.build(fixed_config(&["veiled"]), Box::new(NoWindowEnumerator));

        assert_eq!(
            monitor.run_cycle(),
            CycleOutcome::Alerted(vec!["veiled".to_string()])
        );
        assert_eq!(monitor.last_alert(), Some(Duration::ZERO));

        monitor.run();

        assert_eq!(monitor.cycles(), 5);
        assert_eq!(harness.recognizer.calls(), 5);
        assert_eq!(harness.notifier.attempts(), 1);
        assert_eq!(harness.notifier.count(), 0);
    }
}
