//! # Invariant Property Tests
//!
//! Random operation sequences generated with proptest. For any sequence:
//! - every tube keeps a position-0 entry and unique positions
//! - seeded content never disappears from its tube (only reseeding
//!   replaces it)
//! - completions and points only grow
//! - the active tube is always 1, 2 or 3

use std::collections::HashSet;

use helix_core::{advance_by_skip, NullSink, ResilientScheduler, Tube, TubeNumber};
use helix_e2e_tests::{assert_tube_invariants, TestDataFactory};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    CompleteCurrent { perfect: bool },
    CompleteStray { thread: String, content: String },
    Cycle,
    Infinite(bool),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<bool>().prop_map(|perfect| Op::CompleteCurrent { perfect }),
        1 => ("(thread-T[1-4]-00[0-9]|tube-[0-3]|[a-z]{1,6})", "x[0-9]")
            .prop_map(|(thread, content)| Op::CompleteStray { thread, content }),
        3 => Just(Op::Cycle),
        1 => any::<bool>().prop_map(Op::Infinite),
    ]
}

fn apply(scheduler: &mut ResilientScheduler<NullSink>, op: &Op) {
    match op {
        Op::CompleteCurrent { perfect } => {
            let current = scheduler.current_stitch();
            let active = scheduler.state().active_tube_number;
            let score = if *perfect { 4 } else { 2 };
            scheduler.handle_stitch_completion(
                &TestDataFactory::thread_for(active),
                &current.content_id,
                score,
                4,
            );
        }
        Op::CompleteStray { thread, content } => {
            scheduler.handle_stitch_completion(thread, content, 1, 1);
        }
        Op::Cycle => {
            scheduler.cycle_tubes();
        }
        Op::Infinite(enabled) => scheduler.set_infinite_play_mode(*enabled),
    }
}

fn contents(tube: &Tube) -> HashSet<String> {
    tube.content_ids().into_iter().map(str::to_string).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_sequences_keep_invariants(
        per_tube in 1usize..8,
        ops in prop::collection::vec(op(), 0..120),
    ) {
        let mut scheduler =
            ResilientScheduler::new(Some(TestDataFactory::seeded_state(per_tube)), NullSink);
        let seeded: Vec<HashSet<String>> = TubeNumber::ALL
            .iter()
            .map(|n| contents(scheduler.tube(*n).unwrap()))
            .collect();

        let mut points = 0u64;
        let mut completions = 0usize;
        for op in &ops {
            apply(&mut scheduler, op);
            let state = scheduler.state();

            assert_tube_invariants(state);
            prop_assert!(TubeNumber::new(state.active_tube_number).is_some());
            prop_assert!(state.total_points >= points);
            let completed = matches!(op, Op::CompleteCurrent { .. } | Op::CompleteStray { .. });
            prop_assert_eq!(state.completed_stitches.len(), completions + completed as usize);
            points = state.total_points;
            completions = state.completed_stitches.len();
        }

        for (i, number) in TubeNumber::ALL.iter().enumerate() {
            let now = contents(scheduler.tube(*number).unwrap());
            prop_assert!(seeded[i].is_subset(&now), "tube {} lost content", number);
        }
    }

    #[test]
    fn prop_advance_moves_head_to_skip(
        len in 2u32..40,
        skip in 1u32..=100,
    ) {
        let mut tube = Tube::with_content("thread-T1-001", (0..len).map(|i| format!("s{}", i)));
        advance_by_skip(&mut tube, skip).unwrap();

        prop_assert_eq!(tube.entry_at(skip).map(|e| e.content_id.as_str()), Some("s0"));
        prop_assert_eq!(tube.current().map(|e| e.content_id.as_str()), Some("s1"));
        prop_assert_eq!(tube.len(), len as usize);
    }
}
