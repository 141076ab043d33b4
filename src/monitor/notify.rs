//! Alert delivery.
//!
//! A notifier must return promptly and must swallow its own failures; the
//! monitor loop never retries a missed alert.

use tracing::info;

pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

/// Writes the alert to the log. Used where no native popup exists.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) {
        info!("Notification: {} - {}", title, message);
    }
}

/// Shows a system-modal message box and beeps.
///
/// Delivery happens on a detached thread so the monitor keeps polling while
/// the box is open.
#[cfg(windows)]
pub struct MessageBoxNotifier;

#[cfg(windows)]
impl Notifier for MessageBoxNotifier {
    fn notify(&self, title: &str, message: &str) {
        use tracing::{error, warn};
        use windows::core::HSTRING;
        use windows::Win32::Foundation::HWND;
        use windows::Win32::System::Diagnostics::Debug::Beep;
        use windows::Win32::UI::WindowsAndMessaging::{
            MessageBoxW, MB_ICONINFORMATION, MB_OK, MB_SYSTEMMODAL,
        };

        info!("Notification: {} - {}", title, message);

        let title = HSTRING::from(title);
        let message = HSTRING::from(message);
        let spawned = std::thread::Builder::new()
            .name("alert-popup".to_string())
            .spawn(move || unsafe {
                if let Err(e) = Beep(750, 400) {
                    warn!("Beep failed: {}", e);
                }
                let result = MessageBoxW(
                    HWND::default(),
                    &message,
                    &title,
                    MB_OK | MB_ICONINFORMATION | MB_SYSTEMMODAL,
                );
                // Zero means the box never appeared
                if result.0 == 0 {
                    error!(
                        "MessageBox failed: {}; alert was \"{}\"",
                        windows::core::Error::from_win32(),
                        message
                    );
                }
            });

        if let Err(e) = spawned {
            error!("Failed to show alert popup: {}", e);
        }
    }
}

/// Picks the notifier for this platform.
pub fn platform_notifier() -> Box<dyn Notifier> {
    #[cfg(windows)]
    {
        Box::new(MessageBoxNotifier)
    }
    #[cfg(not(windows))]
    {
        Box::new(LogNotifier)
    }
}
