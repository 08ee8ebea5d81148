//! Test Fixtures
//!
//! Builders for scheduler snapshots:
//! - Seeded states with known content
//! - Damaged snapshots in the shapes hosts have been seen to store
//! - Content id batches

use helix_core::{PositionEntry, SchedulerState, Tube, TubeNumber};
use serde_json::{json, Value};

/// Factory for creating test data
pub struct TestDataFactory;

impl TestDataFactory {
    /// `count` content ids named `{prefix}-0`, `{prefix}-1`, ...
    pub fn stitch_ids(prefix: &str, count: usize) -> Vec<String> {
        (0..count).map(|i| format!("{}-{}", prefix, i)).collect()
    }

    /// Default thread id for a tube
    pub fn thread_for(tube: u8) -> String {
        format!("thread-T{}-001", tube)
    }

    /// State with every tube seeded with `per_tube` stitches
    pub fn seeded_state(per_tube: usize) -> SchedulerState {
        let mut state = SchedulerState::default();
        for number in TubeNumber::ALL {
            let ids = Self::stitch_ids(&format!("t{}", number), per_tube);
            *state.tube_mut(number) = Tube::with_content(Self::thread_for(number.get()), ids);
        }
        state
    }

    /// State whose tube 1 holds exactly the given ids and the rest are empty
    pub fn single_tube_state(ids: &[&str]) -> SchedulerState {
        let mut state = SchedulerState::default();
        *state.tube_mut(TubeNumber::ONE) =
            Tube::with_content(Self::thread_for(1), ids.iter().copied());
        state
    }

    /// Tube with entries only at the given sparse positions
    pub fn sparse_tube(thread_id: &str, entries: &[(u32, &str)]) -> Tube {
        let mut tube = Tube::new(thread_id);
        for (pos, id) in entries {
            tube.positions.insert(*pos, PositionEntry::new(*id));
        }
        tube
    }

    // ========================================================================
    // DAMAGED SNAPSHOTS
    // ========================================================================

    /// Snapshot JSON with an out-of-range active tube
    pub fn invalid_active_tube_json() -> Value {
        json!({
            "tubes": {
                "1": { "threadId": "thread-T1-001", "positions": { "0": { "contentId": "a" } } },
                "2": { "threadId": "thread-T2-001", "positions": { "0": { "contentId": "b" } } },
                "3": { "threadId": "thread-T3-001", "positions": { "0": { "contentId": "c" } } }
            },
            "activeTubeNumber": 7
        })
    }

    /// Snapshot JSON with tube 2 missing and tube 3 emptied
    pub fn missing_tubes_json() -> Value {
        json!({
            "tubes": {
                "1": { "threadId": "thread-T1-001", "positions": { "0": { "contentId": "a" } } },
                "3": { "threadId": "", "positions": {} }
            },
            "activeTubeNumber": 2,
            "cycleCount": 4
        })
    }

    /// Snapshot JSON whose tube 1 has no position 0
    pub fn headless_tube_json() -> Value {
        json!({
            "tubes": {
                "1": {
                    "threadId": "thread-T1-001",
                    "positions": {
                        "4": { "contentId": "late", "skipNumber": 10 },
                        "2": { "contentId": "early", "skipNumber": 5 }
                    }
                }
            },
            "activeTubeNumber": 1
        })
    }

    /// Bare minimum: an empty object
    pub fn empty_snapshot_json() -> Value {
        json!({})
    }

    /// Decode a fixture into a state
    pub fn state_from(value: Value) -> SchedulerState {
        serde_json::from_value(value).expect("fixture is a valid snapshot shape")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stitch_ids() {
        assert_eq!(TestDataFactory::stitch_ids("s", 3), vec!["s-0", "s-1", "s-2"]);
    }

    #[test]
    fn test_seeded_state_layout() {
        let state = TestDataFactory::seeded_state(4);
        let tube = state.tube(TubeNumber::TWO).unwrap();
        assert_eq!(tube.thread_id, "thread-T2-001");
        assert_eq!(tube.content_ids(), vec!["t2-0", "t2-1", "t2-2", "t2-3"]);
    }

    #[test]
    fn test_damaged_fixtures_decode() {
        let state = TestDataFactory::state_from(TestDataFactory::headless_tube_json());
        assert!(state.tube(TubeNumber::ONE).unwrap().current().is_none());

        let state = TestDataFactory::state_from(TestDataFactory::empty_snapshot_json());
        assert_eq!(state.active_tube_number, 1);
    }
}
