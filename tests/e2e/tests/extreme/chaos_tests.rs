//! # Chaos Tests
//!
//! Long deterministic sequences of mixed, partly nonsensical operations:
//! wrong threads, unknown content, reseeding mid-session, mode flips and
//! snapshot restores. Afterwards every tube must still be well-formed and
//! the counters must agree with the completion log.

use helix_core::{NullSink, ResilientScheduler, SchedulerState, TubeNumber};
use helix_e2e_tests::{assert_tube_invariants, TestDataFactory, TestStoreManager};
use proptest::prelude::Rng;
use proptest::test_runner::{RngAlgorithm, TestRng};

/// Reproducible generator for a seed
fn chaos_rng(seed: u64) -> TestRng {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&seed.to_le_bytes());
    TestRng::from_seed(RngAlgorithm::ChaCha, &bytes)
}

fn below(rng: &mut TestRng, n: u64) -> u64 {
    rng.next_u64() % n
}

const THREADS: [&str; 6] = [
    "thread-T1-001",
    "thread-T2-001",
    "thread-T3-001",
    "tube-2",
    "nonsense",
    "thread-T9-001",
];

fn chaos_step(scheduler: &mut ResilientScheduler<NullSink>, rng: &mut TestRng, step: usize) {
    match below(rng, 10) {
        0..=3 => {
            let current = scheduler.current_stitch();
            let active = scheduler.state().active_tube_number;
            let total = 1 + below(rng, 5) as u32;
            let score = if below(rng, 3) == 0 { total - 1 } else { total };
            scheduler.handle_stitch_completion(
                &TestDataFactory::thread_for(active),
                &current.content_id,
                score,
                total,
            );
        }
        4 => {
            let thread = THREADS[below(rng, THREADS.len() as u64) as usize];
            let content = format!("stray-{}", below(rng, 4));
            scheduler.handle_stitch_completion(thread, &content, 2, 2);
        }
        5..=6 => {
            scheduler.cycle_tubes();
        }
        7 => {
            let tube = 1 + below(rng, 3) as u8;
            let count = 1 + below(rng, 6) as usize;
            let ids = TestDataFactory::stitch_ids(&format!("reseed{}", step), count);
            scheduler
                .initialize_tube_with_content(tube, &TestDataFactory::thread_for(tube), ids)
                .unwrap();
        }
        8 => {
            let enabled = below(rng, 2) == 0;
            scheduler.set_infinite_play_mode(enabled);
        }
        _ => {
            // Round-trip the state through JSON as a host would
            let json = serde_json::to_string(scheduler.state()).unwrap();
            let state: SchedulerState = serde_json::from_str(&json).unwrap();
            scheduler.restore(state);
        }
    }
}

/// Test thousands of mixed operations never break the tube invariants.
#[test]
fn test_mixed_operations_keep_invariants() {
    for seed in [1u64, 7, 42, 2024] {
        let mut rng = chaos_rng(seed);
        let mut scheduler =
            ResilientScheduler::new(Some(TestDataFactory::seeded_state(5)), NullSink);

        for step in 0..2_000 {
            chaos_step(&mut scheduler, &mut rng, step);
            assert_tube_invariants(scheduler.state());
            assert!(TubeNumber::new(scheduler.state().active_tube_number).is_some());
        }

        let state = scheduler.state();
        let logged: u64 = state.completed_stitches.iter().map(|c| c.score as u64).sum();
        assert_eq!(state.total_points, logged, "seed {}", seed);
    }
}

/// Test counters never go backwards across a chaotic session.
#[test]
fn test_counters_are_monotonic() {
    let mut rng = chaos_rng(99);
    let mut scheduler = ResilientScheduler::new(None, NullSink);

    let mut last = (0u64, 0usize, 0u32);
    for step in 0..1_000 {
        chaos_step(&mut scheduler, &mut rng, step);
        let state = scheduler.state();
        let now = (state.total_points, state.completed_stitches.len(), state.cycle_count);
        assert!(now.0 >= last.0 && now.1 >= last.1 && now.2 >= last.2, "step {}", step);
        last = now;
    }
}

/// Test a chaotic session backed by SQLite leaves the stored snapshot equal
/// to the live one.
#[test]
fn test_chaos_with_sqlite_sink() {
    let db = TestStoreManager::new_temp();
    let mut scheduler = db.scheduler_for("chaos");
    let mut rng = chaos_rng(5);

    for step in 0..300 {
        match below(&mut rng, 3) {
            0 => {
                scheduler.cycle_tubes();
            }
            1 => {
                let current = scheduler.current_stitch();
                let active = scheduler.state().active_tube_number;
                scheduler.handle_stitch_completion(
                    &TestDataFactory::thread_for(active),
                    &current.content_id,
                    3,
                    3,
                );
            }
            _ => {
                let tube = 1 + below(&mut rng, 3) as u8;
                scheduler
                    .initialize_tube_with_content(
                        tube,
                        &TestDataFactory::thread_for(tube),
                        TestDataFactory::stitch_ids(&format!("s{}", step), 3),
                    )
                    .unwrap();
            }
        }
    }

    let saved = db.reload("chaos").unwrap();
    assert_eq!(&saved, scheduler.state());
    assert_tube_invariants(&saved);
}
