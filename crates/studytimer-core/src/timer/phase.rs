use serde::{Deserialize, Serialize};

/// Length of the cue between the end of a study period and the break.
pub const POST_STUDY_DELAY_MS: u64 = 60 * 1000;

/// Length of the alarm between the end of a break and the next study period.
pub const POST_BREAK_DELAY_MS: u64 = 5 * 60 * 1000;

/// The four mutually exclusive positions in a study cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Studying,
    PostStudyDelay,
    OnBreak,
    PostBreakDelay,
}

/// Which transitional delay a phase is, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayKind {
    PostStudy,
    PostBreak,
}

impl Phase {
    /// The phase that follows this one when its boundary is crossed.
    pub fn next(self) -> Phase {
        match self {
            Phase::Studying => Phase::PostStudyDelay,
            Phase::PostStudyDelay => Phase::OnBreak,
            Phase::OnBreak => Phase::PostBreakDelay,
            Phase::PostBreakDelay => Phase::Studying,
        }
    }

    pub fn is_delay(self) -> bool {
        self.delay_kind().is_some()
    }

    pub fn delay_kind(self) -> Option<DelayKind> {
        match self {
            Phase::PostStudyDelay => Some(DelayKind::PostStudy),
            Phase::PostBreakDelay => Some(DelayKind::PostBreak),
            Phase::Studying | Phase::OnBreak => None,
        }
    }

    /// True on the productive side of the cycle: the study period itself
    /// and the one-minute cue that follows it.
    pub fn is_studying(self) -> bool {
        matches!(self, Phase::Studying | Phase::PostStudyDelay)
    }

    /// Status label shown next to the countdown.
    pub fn status_label(self) -> &'static str {
        match self {
            Phase::Studying => "DEEP WORKING",
            Phase::OnBreak => "BREAK TIME",
            Phase::PostStudyDelay => "DELAY - BREAK SOON",
            Phase::PostBreakDelay => "ALARM - WAKE UP!",
        }
    }
}

/// Everything needed to resume a session after the host was suspended or
/// restarted. Times are wall-clock epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseState {
    pub running: bool,
    pub phase: Phase,
    pub cycle: u32,
    pub study_duration_ms: u64,
    pub break_duration_ms: u64,
    pub phase_start_ms: u64,
    pub phase_duration_ms: u64,
    pub session_start_ms: u64,
    /// Derived by the accumulator on every tick; never read back as truth.
    #[serde(default)]
    pub session_study_secs: u64,
}

impl PhaseState {
    /// A fresh session whose first study period begins at `now_ms`.
    pub fn begin(study_duration_ms: u64, break_duration_ms: u64, now_ms: u64) -> Self {
        Self {
            running: true,
            phase: Phase::Studying,
            cycle: 1,
            study_duration_ms,
            break_duration_ms,
            phase_start_ms: now_ms,
            phase_duration_ms: study_duration_ms,
            session_start_ms: now_ms,
            session_study_secs: 0,
        }
    }

    /// Instant at which the current phase ends and the next one begins.
    pub fn boundary_ms(&self) -> u64 {
        self.phase_start_ms.saturating_add(self.phase_duration_ms)
    }

    /// Configured length of `phase` for this session.
    pub fn duration_of(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Studying => self.study_duration_ms,
            Phase::PostStudyDelay => POST_STUDY_DELAY_MS,
            Phase::OnBreak => self.break_duration_ms,
            Phase::PostBreakDelay => POST_BREAK_DELAY_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_cycle_back_to_studying() {
        let mut phase = Phase::Studying;
        for _ in 0..4 {
            phase = phase.next();
        }
        assert_eq!(phase, Phase::Studying);
    }

    #[test]
    fn delay_kinds() {
        assert_eq!(Phase::PostStudyDelay.delay_kind(), Some(DelayKind::PostStudy));
        assert_eq!(Phase::PostBreakDelay.delay_kind(), Some(DelayKind::PostBreak));
        assert!(!Phase::Studying.is_delay());
        assert!(!Phase::OnBreak.is_delay());
    }

    #[test]
    fn studying_side_includes_post_study_cue() {
        assert!(Phase::Studying.is_studying());
        assert!(Phase::PostStudyDelay.is_studying());
        assert!(!Phase::OnBreak.is_studying());
        assert!(!Phase::PostBreakDelay.is_studying());
    }

    #[test]
    fn delay_durations_ignore_configuration() {
        let state = PhaseState::begin(1, 2, 0);
        assert_eq!(state.duration_of(Phase::PostStudyDelay), 60_000);
        assert_eq!(state.duration_of(Phase::PostBreakDelay), 300_000);
        assert_eq!(state.duration_of(Phase::Studying), 1);
        assert_eq!(state.duration_of(Phase::OnBreak), 2);
    }

    #[test]
    fn serialized_phase_is_snake_case() {
        let json = serde_json::to_string(&Phase::PostBreakDelay).unwrap();
        assert_eq!(json, "\"post_break_delay\"");
    }
}
