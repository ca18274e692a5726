//! Study time derived from the phase state.
//!
//! Nothing here is a running counter. The session total is recomputed from
//! the cycle number and the current phase on every call, so it stays right
//! after missed ticks.

use super::phase::{Phase, PhaseState};

/// Milliseconds studied in the session described by `state`, as of `now_ms`.
pub fn session_study_ms(state: &PhaseState, now_ms: u64) -> u64 {
    let completed = u64::from(state.cycle.saturating_sub(1));
    let base = completed.saturating_mul(state.study_duration_ms);

    let current = match state.phase {
        Phase::Studying => now_ms
            .saturating_sub(state.phase_start_ms)
            .min(state.phase_duration_ms),
        // Past the study part of this cycle: it counts in full.
        Phase::PostStudyDelay | Phase::OnBreak | Phase::PostBreakDelay => {
            state.study_duration_ms
        }
    };

    base.saturating_add(current)
}

/// Whole seconds studied, floored.
pub fn session_study_secs(state: &PhaseState, now_ms: u64) -> u64 {
    session_study_ms(state, now_ms) / 1000
}

/// Minutes credited to the daily total for a finished session.
///
/// Leftover seconds of 30 or more round up to a whole minute. The threshold
/// is a policy choice carried over as-is.
pub fn credited_minutes(study_secs: u64) -> u64 {
    study_secs / 60 + u64::from(study_secs % 60 >= 30)
}
