//! Carrying out the effects a transition asks for.

use tracing::{debug, warn};

use crate::events::{Effect, STATUS_TAG};
use crate::platform::{Platform, PlatformError, ScreenLock, WakeLock};

/// On/off vibration pattern that accompanies an alert.
pub const ALERT_VIBRATION_MS: [u64; 5] = [200, 100, 200, 100, 200];

/// Which kinds of effect the user has allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectPolicy {
    pub notifications: bool,
    pub audio: bool,
}

impl Default for EffectPolicy {
    fn default() -> Self {
        Self {
            notifications: true,
            audio: true,
        }
    }
}

/// Execute `effects` in order against `platform`.
///
/// Failures are logged and skipped; one failing effect never prevents the
/// ones after it.
pub fn execute(effects: &[Effect], platform: &mut Platform, policy: EffectPolicy) {
    for effect in effects {
        let outcome = match effect {
            Effect::Notify(notification) => {
                if !policy.notifications {
                    continue;
                }
                // Alerts replace whatever was on screen and buzz; the status
                // line only replaces itself through its tag.
                let alert = notification.tag != STATUS_TAG;
                if alert {
                    report(platform.notifier.clear_all());
                }
                platform.notifier.notify(notification).and_then(|()| {
                    if alert {
                        platform.vibrator.vibrate(&ALERT_VIBRATION_MS)
                    } else {
                        Ok(())
                    }
                })
            }
            Effect::PlayOnce { clip } => {
                if !policy.audio {
                    continue;
                }
                platform.tones.play_once(*clip)
            }
            Effect::PlayLooping { clip } => {
                if !policy.audio {
                    continue;
                }
                platform.tones.play_looping(*clip)
            }
            Effect::StopTone => platform.tones.stop(),
        };
        report(outcome);
    }
}

/// Try to take a wake-lock. Unsupported platforms and failures both yield
/// `None`.
pub fn acquire_wake_lock(screen_lock: &mut dyn ScreenLock) -> Option<Box<dyn WakeLock>> {
    match screen_lock.acquire() {
        Ok(Some(lock)) => {
            debug!("wake lock acquired");
            Some(lock)
        }
        Ok(None) => {
            debug!("wake lock unsupported, skipping");
            None
        }
        Err(e) => {
            warn!(error = %e, "wake lock request failed");
            None
        }
    }
}

pub fn release_wake_lock(lock: Option<Box<dyn WakeLock>>) {
    if let Some(lock) = lock {
        report(lock.release());
    }
}

fn report(outcome: Result<(), PlatformError>) {
    if let Err(e) = outcome {
        warn!(error = %e, "side effect failed");
    }
}
