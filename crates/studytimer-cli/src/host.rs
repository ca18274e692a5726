//! Terminal implementations of the platform collaborators.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use studytimer_core::platform::{NoVibration, UnsupportedScreenLock};
use studytimer_core::{
    Config, DisplayFrame, DisplaySink, Notification, Notifier, Platform, PlatformError, ToneClip,
    TonePlayer,
};

const APP_NAME: &str = "Study Timer";
const BELL_INTERVAL: Duration = Duration::from_secs(2);

/// The collaborators `run` drives: desktop notifications, tones, and a
/// single status line on stdout.
pub fn terminal_platform(config: &Config) -> Platform {
    Platform {
        notifier: Box::new(DesktopNotifier::default()),
        tones: tone_player(config),
        screen_lock: Box::new(UnsupportedScreenLock),
        display: Box::new(TerminalDisplay),
        vibrator: Box::new(NoVibration),
    }
}

#[cfg(feature = "audio")]
fn tone_player(config: &Config) -> Box<dyn TonePlayer> {
    Box::new(crate::audio::SynthTones::new(&config.audio))
}

#[cfg(not(feature = "audio"))]
fn tone_player(_config: &Config) -> Box<dyn TonePlayer> {
    Box::new(BellTones::default())
}

// ── Notifications ────────────────────────────────────────────────────

/// Desktop notifications through the session's notification daemon.
#[derive(Default)]
pub struct DesktopNotifier {
    #[cfg(all(unix, not(target_os = "macos")))]
    shown: std::collections::HashMap<String, notify_rust::NotificationHandle>,
}

impl Notifier for DesktopNotifier {
    #[cfg(all(unix, not(target_os = "macos")))]
    fn notify(&mut self, notification: &Notification) -> Result<(), PlatformError> {
        use notify_rust::Urgency;

        let mut toast = notify_rust::Notification::new();
        toast
            .summary(&notification.title)
            .body(&notification.body)
            .appname(APP_NAME);
        if notification.tag == studytimer_core::events::STATUS_TAG {
            toast.urgency(Urgency::Low);
        } else {
            toast.urgency(Urgency::Critical);
        }
        // Same tag, same notification id: the daemon replaces it in place.
        if let Some(previous) = self.shown.get(&notification.tag) {
            toast.id(previous.id());
        }

        let handle = toast
            .show()
            .map_err(|e| PlatformError::failed("notification", e.to_string()))?;
        self.shown.insert(notification.tag.clone(), handle);
        Ok(())
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    fn notify(&mut self, notification: &Notification) -> Result<(), PlatformError> {
        notify_rust::Notification::new()
            .summary(&notification.title)
            .body(&notification.body)
            .appname(APP_NAME)
            .show()
            .map(|_| ())
            .map_err(|e| PlatformError::failed("notification", e.to_string()))
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    fn clear_all(&mut self) -> Result<(), PlatformError> {
        for (_, handle) in self.shown.drain() {
            handle.close();
        }
        Ok(())
    }
}

// ── Tones ────────────────────────────────────────────────────────────

/// Tones rendered as the terminal bell. The alarm rings every couple of
/// seconds on a background thread until stopped.
#[derive(Default)]
pub struct BellTones {
    ringing: Option<Arc<AtomicBool>>,
}

impl BellTones {
    fn bell() -> Result<(), PlatformError> {
        let mut err = std::io::stderr();
        err.write_all(b"\x07")
            .and_then(|()| err.flush())
            .map_err(|e| PlatformError::failed("audio", e.to_string()))
    }
}

impl TonePlayer for BellTones {
    fn play_once(&mut self, _clip: ToneClip) -> Result<(), PlatformError> {
        Self::bell()
    }

    fn play_looping(&mut self, _clip: ToneClip) -> Result<(), PlatformError> {
        self.stop()?;
        let ringing = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&ringing);
        thread::Builder::new()
            .name("alarm-bell".to_string())
            .spawn(move || {
                while flag.load(Ordering::SeqCst) {
                    if Self::bell().is_err() {
                        break;
                    }
                    thread::sleep(BELL_INTERVAL);
                }
            })
            .map_err(|e| PlatformError::failed("audio", e.to_string()))?;
        self.ringing = Some(ringing);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlatformError> {
        if let Some(ringing) = self.ringing.take() {
            ringing.store(false, Ordering::SeqCst);
        }
        Ok(())
    }
}

impl Drop for BellTones {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

// ── Display ──────────────────────────────────────────────────────────

/// Redraws one status line in place.
pub struct TerminalDisplay;

impl TerminalDisplay {
    pub fn line(frame: &DisplayFrame) -> String {
        let mut line = format!(
            "{}  {:<18} {}  studied {}",
            frame.remaining,
            frame.status,
            frame.cycle_label(),
            frame.studied
        );
        if frame.skip_available {
            line.push_str("  [s] skip");
        }
        line
    }
}

impl DisplaySink for TerminalDisplay {
    fn render(&mut self, frame: &DisplayFrame) {
        let mut out = std::io::stdout().lock();
        // \x1b[2K clears what a longer previous line left behind.
        let _ = write!(out, "\r\x1b[2K{}", Self::line(frame));
        let _ = out.flush();
    }
}
