//! Collaborators the timer talks to but does not own.
//!
//! Every call here is fire-and-forget from the state machine's point of
//! view: failures come back as [`PlatformError`] so the caller can log them,
//! and are never allowed to stop a phase transition.

mod noop;

pub use noop::{NoVibration, NoopDisplay, NoopNotifier, NoopTonePlayer, UnsupportedScreenLock};

use thiserror::Error;

use crate::display::DisplayFrame;
use crate::events::{Notification, ToneClip};

/// Failure reported by a collaborator.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The user or OS refused the request
    #[error("{capability} permission denied")]
    PermissionDenied { capability: &'static str },

    /// The backend failed while carrying out the request
    #[error("{capability} failed: {message}")]
    Failed {
        capability: &'static str,
        message: String,
    },
}

impl PlatformError {
    pub fn failed(capability: &'static str, message: impl Into<String>) -> Self {
        PlatformError::Failed {
            capability,
            message: message.into(),
        }
    }
}

/// Shows notifications. Notifications are always silent; tones are played
/// separately by the [`TonePlayer`].
pub trait Notifier {
    /// Ask for permission to notify. Returns whether notifications may be shown.
    fn request_permission(&mut self) -> bool {
        true // default: nothing to ask
    }

    /// Show `notification`, replacing any earlier one with the same tag.
    fn notify(&mut self, notification: &Notification) -> Result<(), PlatformError>;

    /// Dismiss everything this notifier has shown.
    fn clear_all(&mut self) -> Result<(), PlatformError> {
        Ok(()) // default no-op
    }
}

/// Plays the delay and alarm tones.
pub trait TonePlayer {
    fn play_once(&mut self, clip: ToneClip) -> Result<(), PlatformError>;

    fn play_looping(&mut self, clip: ToneClip) -> Result<(), PlatformError>;

    /// Stop whatever is playing. Stopping silence is not an error.
    fn stop(&mut self) -> Result<(), PlatformError>;
}

/// Buzzes the device alongside an alert.
pub trait Vibrator {
    /// Vibrate for the on/off durations in `pattern_ms`, starting with on.
    fn vibrate(&mut self, pattern_ms: &[u64]) -> Result<(), PlatformError>;
}

/// A held screen wake-lock.
pub trait WakeLock {
    fn release(self: Box<Self>) -> Result<(), PlatformError>;
}

/// Keeps the screen on while a session runs.
pub trait ScreenLock {
    /// Acquire a wake-lock. `Ok(None)` means the platform has no such thing,
    /// which is not an error.
    fn acquire(&mut self) -> Result<Option<Box<dyn WakeLock>>, PlatformError>;
}

/// Receives a fresh frame after every tick.
pub trait DisplaySink {
    fn render(&mut self, frame: &DisplayFrame);
}

/// The full set of collaborators a [`StudyTimer`](crate::StudyTimer) drives.
pub struct Platform {
    pub notifier: Box<dyn Notifier>,
    pub tones: Box<dyn TonePlayer>,
    pub screen_lock: Box<dyn ScreenLock>,
    pub display: Box<dyn DisplaySink>,
    pub vibrator: Box<dyn Vibrator>,
}

impl Platform {
    /// A platform where every capability is absent.
    pub fn headless() -> Self {
        Self {
            notifier: Box::new(NoopNotifier),
            tones: Box::new(NoopTonePlayer),
            screen_lock: Box::new(UnsupportedScreenLock),
            display: Box::new(NoopDisplay),
            vibrator: Box::new(NoVibration),
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::headless()
    }
}
