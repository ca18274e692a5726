//! Phase engine implementation.
//!
//! The phase engine is a wall-clock-based state machine. It never counts
//! down: every query and every transition is derived from the stored phase
//! start and duration plus the `now` the caller passes in. That is what
//! lets a session survive the host being suspended or restarted.
//!
//! ## State Transitions
//!
//! ```text
//! Studying -> PostStudyDelay -> OnBreak -> PostBreakDelay -> Studying (cycle + 1)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = PhaseEngine::start(25 * 60_000, 5 * 60_000, now_ms());
//! // On every tick, visibility change or resume:
//! let catch_up = engine.catch_up(now_ms());
//! for transition in catch_up.transitions {
//!     // persist transition.state, execute transition.effects
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::accumulator;
use super::phase::{Phase, PhaseState};
use crate::events::{Effect, Notification, ToneClip};

/// Upper bound on transitions applied by one catch-up pass. Guards against
/// zero-length phases spinning forever.
pub const MAX_CATCH_UP_STEPS: usize = 100;

/// How far past the boundary a skipped delay is pushed.
pub const SKIP_OVERSHOOT_MS: u64 = 1000;

/// One applied phase change, with the state it produced and the side
/// effects it asks for, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub state: PhaseState,
    pub effects: Vec<Effect>,
}

/// Result of a catch-up pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatchUp {
    pub transitions: Vec<Transition>,
    /// The pass stopped at [`MAX_CATCH_UP_STEPS`] with boundaries still pending.
    pub capped: bool,
}

impl CatchUp {
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

/// Compute the single transition due at `now_ms`, if any.
///
/// Pure: `state` is not touched and nothing is executed. The new phase
/// starts exactly at the old boundary, never at `now_ms`, so missed ticks
/// never introduce drift.
pub fn advance(state: &PhaseState, now_ms: u64) -> Option<Transition> {
    if !state.running || now_ms < state.boundary_ms() {
        return None;
    }

    let from = state.phase;
    let to = from.next();
    let mut next = state.clone();
    next.phase = to;
    next.phase_start_ms = state.boundary_ms();
    next.phase_duration_ms = state.duration_of(to);

    let mut effects = Vec::with_capacity(3);
    match to {
        Phase::PostStudyDelay => {
            effects.push(Effect::Notify(Notification::break_soon()));
            effects.push(Effect::PlayOnce {
                clip: ToneClip::Delay,
            });
        }
        Phase::OnBreak => {}
        Phase::PostBreakDelay => {
            effects.push(Effect::Notify(Notification::study_soon()));
            effects.push(Effect::PlayLooping {
                clip: ToneClip::Alarm,
            });
        }
        Phase::Studying => {
            next.cycle = next.cycle.saturating_add(1);
            effects.push(Effect::StopTone);
        }
    }
    effects.push(Effect::Notify(Notification::phase_status(&next)));

    Some(Transition {
        from,
        to,
        state: next,
        effects,
    })
}

/// Owner of the session's [`PhaseState`]. All mutation goes through here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseEngine {
    state: PhaseState,
}

impl PhaseEngine {
    /// Begin a new session with its first study period at `now_ms`.
    pub fn start(study_duration_ms: u64, break_duration_ms: u64, now_ms: u64) -> Self {
        Self {
            state: PhaseState::begin(study_duration_ms, break_duration_ms, now_ms),
        }
    }

    /// Rebuild an engine around a previously persisted state.
    pub fn from_state(state: PhaseState) -> Self {
        Self { state }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &PhaseState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn cycle(&self) -> u32 {
        self.state.cycle
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Milliseconds left in the current phase, never negative.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        let elapsed = now_ms.saturating_sub(self.state.phase_start_ms);
        self.state.phase_duration_ms.saturating_sub(elapsed)
    }

    /// Whole seconds left, rounded up so zero only shows at the boundary.
    pub fn remaining_secs(&self, now_ms: u64) -> u64 {
        self.remaining_ms(now_ms).div_ceil(1000)
    }

    /// 1.0 at phase start down to 0.0 at phase end.
    pub fn progress(&self, now_ms: u64) -> f64 {
        let total_secs = self.state.phase_duration_ms as f64 / 1000.0;
        if total_secs <= 0.0 {
            return 0.0;
        }
        (self.remaining_secs(now_ms) as f64 / total_secs).clamp(0.0, 1.0)
    }

    /// Seconds studied so far this session, derived from the state.
    pub fn session_study_secs(&self, now_ms: u64) -> u64 {
        accumulator::session_study_secs(&self.state, now_ms)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply every transition whose boundary lies at or before `now_ms`.
    ///
    /// Idempotent for a given `now_ms`: a second call with the same value
    /// returns no transitions.
    pub fn catch_up(&mut self, now_ms: u64) -> CatchUp {
        let mut result = CatchUp::default();

        while let Some(transition) = advance(&self.state, now_ms) {
            if result.transitions.len() >= MAX_CATCH_UP_STEPS {
                result.capped = true;
                break;
            }
            debug!(
                from = ?transition.from,
                to = ?transition.to,
                cycle = transition.state.cycle,
                "phase transition"
            );
            self.state = transition.state.clone();
            result.transitions.push(transition);
        }

        if result.capped {
            warn!(
                steps = MAX_CATCH_UP_STEPS,
                phase = ?self.state.phase,
                "catch-up stopped at iteration cap"
            );
        }

        if self.state.running {
            self.state.session_study_secs = accumulator::session_study_secs(&self.state, now_ms);
        }
        result
    }

    /// End the current delay early. Outside a delay this does nothing and
    /// returns `None`.
    pub fn skip(&mut self, now_ms: u64) -> Option<CatchUp> {
        if !self.state.running || !self.state.phase.is_delay() {
            return None;
        }
        self.state.phase_start_ms = now_ms
            .saturating_sub(self.state.phase_duration_ms)
            .saturating_sub(SKIP_OVERSHOOT_MS);
        debug!(phase = ?self.state.phase, "delay skipped");
        Some(self.catch_up(now_ms))
    }

    /// Mark the session as finished, freezing the study total at `now_ms`.
    pub fn stop(&mut self, now_ms: u64) -> &PhaseState {
        self.state.session_study_secs = accumulator::session_study_secs(&self.state, now_ms);
        self.state.running = false;
        &self.state
    }
}
