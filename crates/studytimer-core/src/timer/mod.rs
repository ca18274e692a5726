pub mod accumulator;
mod engine;
mod phase;

pub use engine::{
    advance, CatchUp, PhaseEngine, Transition, MAX_CATCH_UP_STEPS, SKIP_OVERSHOOT_MS,
};
pub use phase::{DelayKind, Phase, PhaseState, POST_BREAK_DELAY_MS, POST_STUDY_DELAY_MS};
