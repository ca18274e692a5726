use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::timer::PhaseState;

/// Tag of the long-lived "what am I doing now" notification.
pub const STATUS_TAG: &str = "study-timer-active";
/// Tag of the alert raised when a study period ends.
pub const BREAK_SOON_TAG: &str = "break-notification";
/// Tag of the alert raised when a break ends.
pub const STUDY_SOON_TAG: &str = "study-notification";

/// Audio cues. Which file or synth backs each clip is up to the tone player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneClip {
    /// Short one-shot cue played when a study period ends.
    Delay,
    /// Looping alarm played until the next study period begins.
    Alarm,
}

/// A notification to show. A later notification with the same tag
/// replaces an earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub tag: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            tag: tag.into(),
        }
    }

    pub fn break_soon() -> Self {
        Self::new(
            "Break Time Soon!",
            "Great deep work! 1 minute until break starts.",
            BREAK_SOON_TAG,
        )
    }

    pub fn study_soon() -> Self {
        Self::new(
            "Deep Work Time Soon!",
            "Break is over. 5 minute alarm before next deep work cycle.",
            STUDY_SOON_TAG,
        )
    }

    /// The persistent status notification for the phase `state` is in.
    pub fn phase_status(state: &PhaseState) -> Self {
        let end = local_clock(state.boundary_ms());
        let minutes = (state.phase_duration_ms + 30_000) / 60_000;
        if state.phase.is_studying() {
            Self::new(
                "Study Mode Active",
                format!("Studying until {end} ({minutes} min) - Cycle {}", state.cycle),
                STATUS_TAG,
            )
        } else {
            Self::new(
                "Break Time Active",
                format!("Break until {end} ({minutes} min)"),
                STATUS_TAG,
            )
        }
    }
}

/// A side effect requested by a phase transition. The engine only
/// produces these; the controller decides how to carry them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    Notify(Notification),
    PlayOnce { clip: ToneClip },
    PlayLooping { clip: ToneClip },
    StopTone,
}

/// `HH:MM` in the local time zone.
fn local_clock(epoch_ms: u64) -> String {
    match Local.timestamp_millis_opt(epoch_ms as i64).single() {
        Some(at) => at.format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}
