//! Tube invariant checks shared by every suite

use std::collections::HashSet;

use helix_core::{SchedulerState, Tube, TubeNumber, MAX_SKIP_NUMBER};

/// `(position, content_id)` pairs in ascending position order
pub fn tube_layout(tube: &Tube) -> Vec<(u32, String)> {
    tube.ordered()
        .map(|(pos, entry)| (pos, entry.content_id.clone()))
        .collect()
}

/// Panic with a description if any tube breaks an invariant.
///
/// - every tube 1..=3 exists and has a position-0 entry
/// - every tube has a thread id
/// - no content id sits on two positions of the same tube
/// - skip numbers stay within 1..=100
pub fn assert_tube_invariants(state: &SchedulerState) {
    for number in TubeNumber::ALL {
        let tube = state
            .tube(number)
            .unwrap_or_else(|| panic!("tube {} is missing", number));

        assert!(
            tube.current().is_some(),
            "tube {} has no position-0 entry: {:?}",
            number,
            tube_layout(tube)
        );
        assert!(!tube.thread_id.is_empty(), "tube {} has no thread id", number);

        let mut seen = HashSet::new();
        for (pos, entry) in tube.ordered() {
            assert!(
                seen.insert(entry.content_id.as_str()),
                "tube {} holds {} twice (again at position {}): {:?}",
                number,
                entry.content_id,
                pos,
                tube_layout(tube)
            );
        }

        for (pos, entry) in tube.ordered() {
            assert!(
                (1..=MAX_SKIP_NUMBER).contains(&entry.skip_number),
                "tube {} position {} has skip {}",
                number,
                pos,
                entry.skip_number
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestDataFactory;

    #[test]
    fn test_seeded_state_passes() {
        assert_tube_invariants(&TestDataFactory::seeded_state(3));
    }

    #[test]
    #[should_panic(expected = "holds A twice")]
    fn test_repeated_content_is_caught() {
        let mut state = TestDataFactory::seeded_state(1);
        *state.tube_mut(TubeNumber::ONE) =
            TestDataFactory::sparse_tube("thread-T1-001", &[(0, "A"), (3, "A")]);
        assert_tube_invariants(&state);
    }
}
