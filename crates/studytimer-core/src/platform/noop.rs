use super::{DisplaySink, Notifier, PlatformError, ScreenLock, TonePlayer, Vibrator, WakeLock};
use crate::display::DisplayFrame;
use crate::events::{Notification, ToneClip};

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&mut self, _notification: &Notification) -> Result<(), PlatformError> {
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTonePlayer;

impl TonePlayer for NoopTonePlayer {
    fn play_once(&mut self, _clip: ToneClip) -> Result<(), PlatformError> {
        Ok(())
    }

    fn play_looping(&mut self, _clip: ToneClip) -> Result<(), PlatformError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlatformError> {
        Ok(())
    }
}

/// Screen lock for platforms without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedScreenLock;

impl ScreenLock for UnsupportedScreenLock {
    fn acquire(&mut self) -> Result<Option<Box<dyn WakeLock>>, PlatformError> {
        Ok(None)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDisplay;

impl DisplaySink for NoopDisplay {
    fn render(&mut self, _frame: &DisplayFrame) {}
}

/// Vibrator for devices that cannot vibrate. Skips silently.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVibration;

impl Vibrator for NoVibration {
    fn vibrate(&mut self, _pattern_ms: &[u64]) -> Result<(), PlatformError> {
        Ok(())
    }
}
