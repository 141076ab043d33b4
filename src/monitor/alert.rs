//! Cooldown-gated alerting.
//!
//! The gate is either cooled (the next match fires) or suppressing (a match
//! is dropped). The cooldown is global: a match on any phrase inside the
//! window is suppressed, whichever phrase fired last.

use std::time::Duration;
use tracing::{debug, info};

use super::notify::Notifier;

pub const ALERT_TITLE: &str = "PathOfOCR: Desired Craft";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertDecision {
    /// Nothing matched; state untouched
    NoMatch,
    /// A notification was dispatched
    Fired,
    /// Matched inside the cooldown window; dropped silently
    Suppressed,
}

pub struct AlertGate {
    cooldown: Duration,
    /// Monotonic time of the last dispatched alert; `None` means never
    last_alert: Option<Duration>,
}

impl AlertGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_alert: None,
        }
    }

    pub fn last_alert(&self) -> Option<Duration> {
        self.last_alert
    }

    /// True when a match at `now` would fire.
    pub fn is_cooled(&self, now: Duration) -> bool {
        match self.last_alert {
            None => true,
            Some(last) => now.saturating_sub(last) > self.cooldown,
        }
    }

    /// Feeds one cycle's matches through the gate, dispatching if cooled.
    pub fn submit(&mut self, matches: &[String], now: Duration, notifier: &dyn Notifier) -> AlertDecision {
        if matches.is_empty() {
            return AlertDecision::NoMatch;
        }

        let summary = matches.join(", ");
        if !self.is_cooled(now) {
            debug!("Match found but still in cooldown: {}", summary);
            return AlertDecision::Suppressed;
        }

        info!("Desired outcome detected: {}", summary);
        notifier.notify(ALERT_TITLE, &format!("Detected: {}", summary));
        self.last_alert = Some(now);
        AlertDecision::Fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::testing::RecordingNotifier;

    fn secs(value: f64) -> Duration {
        Duration::from_secs_f64(value)
    }

    fn matched(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cooldown_sequence() {
        let notifier = RecordingNotifier::default();
        let mut gate = AlertGate::new(secs(1.0));
        let veiled = matched(&["veiled"]);

        assert_eq!(gate.submit(&veiled, secs(0.0), &notifier), AlertDecision::Fired);
        assert_eq!(gate.last_alert(), Some(secs(0.0)));

        assert_eq!(gate.submit(&veiled, secs(0.5), &notifier), AlertDecision::Suppressed);
        assert_eq!(gate.last_alert(), Some(secs(0.0)));

        assert_eq!(gate.submit(&veiled, secs(1.2), &notifier), AlertDecision::Fired);
        assert_eq!(gate.last_alert(), Some(secs(1.2)));

        assert_eq!(notifier.count(), 2);
    }

    #[test]
    fn test_cooldown_is_global_across_phrases() {
        let notifier = RecordingNotifier::default();
        let mut gate = AlertGate::new(secs(2.0));

        gate.submit(&matched(&["phrase b"]), secs(10.0), &notifier);
        let decision = gate.submit(&matched(&["phrase a"]), secs(11.0), &notifier);

        assert_eq!(decision, AlertDecision::Suppressed);
        assert_eq!(notifier.count(), 1);
    }

    #[test]
    fn test_elapsed_equal_to_cooldown_is_still_suppressed() {
        let notifier = RecordingNotifier::default();
        let mut gate = AlertGate::new(secs(1.0));

        gate.submit(&matched(&["veiled"]), secs(3.0), &notifier);
        let decision = gate.submit(&matched(&["veiled"]), secs(4.0), &notifier);
        assert_eq!(decision, AlertDecision::Suppressed);
    }

    #[test]
    fn test_empty_matches_never_dispatch() {
        let notifier = RecordingNotifier::default();
        let mut gate = AlertGate::new(secs(1.0));

        assert_eq!(gate.submit(&[], secs(0.0), &notifier), AlertDecision::NoMatch);
        assert_eq!(gate.last_alert(), None);
        assert_eq!(notifier.count(), 0);
    }

    #[test]
    fn test_message_summarizes_all_matches() {
        let notifier = RecordingNotifier::default();
        let mut gate = AlertGate::new(secs(1.0));

        gate.submit(&matched(&["Increased Critical", "veiled"]), secs(0.0), &notifier);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ALERT_TITLE);
        assert_eq!(sent[0].1, "Detected: Increased Critical, veiled");
    }
}
