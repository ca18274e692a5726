//! What a display sink is given to draw, and the text formats it uses.

use serde::Serialize;

use crate::timer::{Phase, PhaseEngine};

/// Radius of the progress ring the stroke offset is computed for.
pub const RING_RADIUS: f64 = 90.0;

/// A snapshot of everything a host needs to draw the timer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayFrame {
    /// Remaining time as `MM:SS`.
    pub remaining: String,
    pub remaining_secs: u64,
    pub phase: Phase,
    pub status: &'static str,
    pub cycle: u32,
    /// In `[0, 1]`; 1.0 when the phase has just started.
    pub progress: f64,
    /// Dash offset for a progress ring of [`RING_RADIUS`].
    pub stroke_dash_offset: f64,
    pub studied_secs: u64,
    pub studied: String,
    /// Skipping is only possible during a delay.
    pub skip_available: bool,
    pub wake_lock_held: bool,
}

impl DisplayFrame {
    pub fn from_engine(engine: &PhaseEngine, now_ms: u64, wake_lock_held: bool) -> Self {
        let remaining_secs = engine.remaining_secs(now_ms);
        let studied_secs = engine.session_study_secs(now_ms);
        let phase = engine.phase();
        let progress = engine.progress(now_ms);
        Self {
            remaining: format_clock(remaining_secs),
            remaining_secs,
            phase,
            status: phase.status_label(),
            cycle: engine.cycle(),
            progress,
            stroke_dash_offset: stroke_dash_offset(progress, RING_RADIUS),
            studied_secs,
            studied: format_studied(studied_secs),
            skip_available: phase.is_delay(),
            wake_lock_held,
        }
    }

    pub fn cycle_label(&self) -> String {
        format!("Cycle {}", self.cycle)
    }
}

/// Maps `progress` linearly onto the dash offset of a ring of `radius`:
/// 0 when full, the whole circumference when empty.
pub fn stroke_dash_offset(progress: f64, radius: f64) -> f64 {
    let circumference = 2.0 * std::f64::consts::PI * radius;
    circumference * (1.0 - progress.clamp(0.0, 1.0))
}

/// `MM:SS`. Minutes keep counting past 99.
pub fn format_clock(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// `1h 2m 3s`, `2m 3s` or `3s`, dropping leading zero units.
pub fn format_studied(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// `1h 2m` or `2m`, for end-of-session summaries.
pub fn format_summary(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// `Xh Ym`, always with hours, for the daily total.
pub fn format_minutes(total_minutes: u64) -> String {
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}
