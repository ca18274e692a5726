//! Property tests for the phase engine.
//!
//! Covers the guarantees a host relies on when ticks arrive late, in
//! bursts, or not at all for hours.

use proptest::prelude::*;
use studytimer_core::timer::{POST_BREAK_DELAY_MS, POST_STUDY_DELAY_MS};
use studytimer_core::{MemoryStore, Phase, PhaseEngine, SessionStore};

const T0: u64 = 1_700_000_000_000;

proptest! {
    #[test]
    fn boundary_never_moves_backwards(
        study_min in 1u64..=120,
        break_min in 1u64..=60,
        steps in prop::collection::vec(0u64..=3_600_000, 1..40),
    ) {
        let mut engine = PhaseEngine::start(study_min * 60_000, break_min * 60_000, T0);
        let mut now = T0;
        let mut last_boundary = engine.state().boundary_ms();

        for step in steps {
            now += step;
            engine.catch_up(now);
            let boundary = engine.state().boundary_ms();
            prop_assert!(boundary >= last_boundary);
            last_boundary = boundary;
        }
    }

    #[test]
    fn caught_up_engine_is_never_behind(
        study_min in 1u64..=120,
        break_min in 1u64..=60,
        elapsed in 0u64..=24 * 3_600_000,
    ) {
        let mut engine = PhaseEngine::start(study_min * 60_000, break_min * 60_000, T0);
        let now = T0 + elapsed;
        let result = engine.catch_up(now);
        if !result.capped {
            prop_assert!(engine.state().boundary_ms() > now);
            prop_assert!(engine.state().phase_start_ms <= now);
        }
    }

    #[test]
    fn one_big_catch_up_matches_many_small_ones(
        study_min in 1u64..=60,
        break_min in 1u64..=30,
        // Shortest cycle is 8 minutes; stay under the iteration cap.
        elapsed in 0u64..=3 * 3_600_000,
    ) {
        let study = study_min * 60_000;
        let brk = break_min * 60_000;
        let mut jumped = PhaseEngine::start(study, brk, T0);
        let mut ticked = PhaseEngine::start(study, brk, T0);

        jumped.catch_up(T0 + elapsed);
        let mut now = T0;
        while now < T0 + elapsed {
            now = (now + 45_000).min(T0 + elapsed);
            ticked.catch_up(now);
        }

        prop_assert_eq!(jumped.state(), ticked.state());
    }

    #[test]
    fn resume_at_save_time_is_a_noop(
        elapsed in 0u64..=12 * 3_600_000,
    ) {
        let kv = MemoryStore::new();
        let store = SessionStore::new(&kv);
        let mut engine = PhaseEngine::start(25 * 60_000, 5 * 60_000, T0);
        engine.catch_up(T0 + elapsed);
        store.save(engine.state()).unwrap();

        let mut resumed = PhaseEngine::from_state(store.load().unwrap().unwrap());
        prop_assert!(resumed.catch_up(T0 + elapsed).is_empty());
    }
}

#[test]
fn cycle_only_increments_entering_study() {
    let study = 1_500_000;
    let brk = 300_000;
    let mut engine = PhaseEngine::start(study, brk, T0);
    let cycle_len = study + POST_STUDY_DELAY_MS + brk + POST_BREAK_DELAY_MS;
    let result = engine.catch_up(T0 + 3 * cycle_len);

    let mut cycle = 1;
    for t in &result.transitions {
        if t.to == Phase::Studying {
            assert_eq!(t.from, Phase::PostBreakDelay);
            assert_eq!(t.state.cycle, cycle + 1);
        } else {
            assert_eq!(t.state.cycle, cycle);
        }
        cycle = t.state.cycle;
    }
    assert_eq!(engine.cycle(), 4);
    assert_eq!(result.transitions.len(), 12);
}

#[test]
fn full_cycle_from_start_lands_in_cycle_two() {
    let mut engine = PhaseEngine::start(1_500_000, 300_000, T0);
    let result = engine.catch_up(T0 + 1_500_000 + 60_000 + 300_000 + 300_000 + 300_000);
    assert_eq!(result.transitions.len(), 4);
    assert!(!result.capped);
    assert_eq!(engine.phase(), Phase::Studying);
    assert_eq!(engine.cycle(), 2);
}
