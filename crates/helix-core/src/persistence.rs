//! Persistence hook
//!
//! The scheduler never performs I/O itself. After every mutation it hands
//! the state to a [`StateSink`] and returns immediately; durability and
//! ordering belong to whatever the sink writes to.

use crate::state::SchedulerState;

/// Receives a snapshot after every mutating scheduler operation
pub trait StateSink {
    /// Persist (or enqueue) the snapshot. Must not block on slow storage.
    fn save(&self, state: &SchedulerState);
}

impl<F> StateSink for F
where
    F: Fn(&SchedulerState),
{
    fn save(&self, state: &SchedulerState) {
        self(state)
    }
}

/// Sink that discards every snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl StateSink for NullSink {
    fn save(&self, _state: &SchedulerState) {}
}
