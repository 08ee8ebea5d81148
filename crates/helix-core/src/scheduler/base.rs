//! Base Scheduler
//!
//! Round-robin tube cycling and the "advance by skip" reordering that models
//! spaced repetition: a unit passed perfectly is pushed `skip_number` slots
//! back in its tube while the units in front of that slot move up by one.
//!
//! The base layer is strict. It assumes tubes are well-formed and reports
//! anything else as `None`; [`ResilientScheduler`](super::ResilientScheduler)
//! layers the repairs on top.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulerError};
use crate::persistence::StateSink;
use crate::state::{CompletedStitch, SchedulerState};
use crate::tube::{PositionEntry, Tube, TubeNumber};

// ============================================================================
// REORDERING
// ============================================================================

/// Where the new position-0 entry came from after an advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Successor {
    /// The entry at position 1 moved up
    Next,
    /// Position 1 was empty; the entry at this (lowest occupied) position moved up
    GapPromoted(u32),
    /// The tube held nothing else; the head stayed at position 0
    SoleEntry,
}

/// What a perfect pass does with the head entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnPerfect {
    /// Reorder with [`advance_by_skip`]
    Advance,
    /// Leave the entry at position 0 (infinite play on a single-entry tube)
    StayInPlace,
}

/// Push the position-0 entry back by `skip` slots.
///
/// 1. The successor (position 1, or the lowest occupied position when 1 is a
///    gap) becomes the new position 0. A tube with no other entry keeps its
///    head at position 0 and nothing else happens.
/// 2. Entries at positions `2..=skip` move forward by one. The entry sitting
///    on `skip` itself is part of this pass, so nothing is overwritten.
/// 3. Entries beyond `skip` keep their positions.
/// 4. The old head lands on `skip`.
///
/// A skip of 0 is treated as 1. Returns `None` (tube untouched) when there
/// is no position-0 entry.
pub fn advance_by_skip(tube: &mut Tube, skip: u32) -> Option<Successor> {
    let head = tube.positions.remove(&0)?;
    let skip = skip.max(1);

    let (successor, outcome) = match tube.positions.pop_first() {
        Some((1, entry)) => (entry, Successor::Next),
        Some((pos, entry)) => (entry, Successor::GapPromoted(pos)),
        None => {
            // Sole entry stays at the front; content ids stay unique per tube
            tube.positions.insert(0, head);
            return Some(Successor::SoleEntry);
        }
    };

    // Ascending order: each target slot was vacated by the successor or by
    // the previous move. With a skip of 1 there is nothing to shift.
    if skip >= 2 {
        let to_shift: Vec<u32> = tube.positions.range(2..=skip).map(|(pos, _)| *pos).collect();
        for pos in to_shift {
            if let Some(entry) = tube.positions.remove(&pos) {
                tube.positions.insert(pos - 1, entry);
            }
        }
    }

    tube.positions.insert(0, successor);
    let displaced = tube.positions.insert(skip, head);
    debug_assert!(displaced.is_none(), "slot {skip} should be free after shifting");

    Some(outcome)
}

// ============================================================================
// TUBE SCHEDULER
// ============================================================================

/// Strict tube scheduler: owns the state and the persistence hook
pub struct TubeScheduler<S: StateSink> {
    state: SchedulerState,
    sink: S,
    config: SchedulerConfig,
}

impl<S: StateSink> TubeScheduler<S> {
    /// Wrap an existing state
    pub fn new(state: SchedulerState, sink: S, config: SchedulerConfig) -> Self {
        Self {
            state,
            sink,
            config,
        }
    }

    /// Read-only snapshot
    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut SchedulerState {
        &mut self.state
    }

    /// Give up the scheduler and keep the state
    pub fn into_state(self) -> SchedulerState {
        self.state
    }

    /// Active configuration
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Hand the current state to the sink
    pub fn persist(&self) {
        self.sink.save(&self.state);
    }

    /// Position-0 entry of the active tube
    pub fn current_stitch(&self) -> Option<&PositionEntry> {
        let active = self.state.active_tube()?;
        self.state.tube(active)?.current()
    }

    /// Move to the next tube without persisting.
    ///
    /// A damaged active tube number is reset to 1 (no rotation, no cycle
    /// counted).
    pub(crate) fn rotate(&mut self) -> TubeNumber {
        let next = match self.state.active_tube() {
            Some(current) => {
                let next = current.next();
                if next == TubeNumber::ONE {
                    self.state.cycle_count += 1;
                    debug!(cycle_count = self.state.cycle_count, "Completed tube cycle");
                }
                next
            }
            None => {
                warn!(
                    "Active tube number {} is invalid, resetting to tube 1",
                    self.state.active_tube_number
                );
                TubeNumber::ONE
            }
        };
        self.state.active_tube_number = next.get();
        next
    }

    /// Advance the active tube 1 -> 2 -> 3 -> 1 and return its current stitch
    pub fn cycle_tubes(&mut self) -> Option<PositionEntry> {
        let active = self.rotate();
        debug!(tube = active.get(), "Cycled to tube");
        self.persist();
        self.current_stitch().cloned()
    }

    /// Append to the completion log and add the score to the running total
    pub fn record_completion(
        &mut self,
        thread_id: &str,
        content_id: &str,
        score: u32,
        total_questions: u32,
    ) {
        self.state.completed_stitches.push(CompletedStitch {
            content_id: content_id.to_string(),
            thread_id: thread_id.to_string(),
            score,
            total_questions,
            timestamp: Utc::now(),
        });
        self.state.total_points += u64::from(score);
    }

    /// Apply a score to the head of `tube`.
    ///
    /// Perfect: both ladders climb, the entry is marked completed, and it is
    /// moved by its skip number as it stood before the climb. Imperfect: the
    /// skip number resets and nothing moves.
    pub(crate) fn score_head(
        &mut self,
        tube: TubeNumber,
        score: u32,
        total_questions: u32,
        on_perfect: OnPerfect,
    ) -> bool {
        let Some(queue) = self.state.tubes.get_mut(&tube.get()) else {
            return false;
        };
        let Some(head) = queue.current_mut() else {
            return false;
        };

        if score != total_questions {
            debug!(
                content_id = %head.content_id,
                score,
                total_questions,
                "Imperfect pass, resetting skip number"
            );
            head.demote();
            return true;
        }

        let distance = head.skip_number;
        head.promote();

        match on_perfect {
            OnPerfect::StayInPlace => {
                debug!(content_id = %head.content_id, "Single-entry tube, entry stays at position 0");
            }
            OnPerfect::Advance => match advance_by_skip(queue, distance) {
                Some(Successor::SoleEntry) => {
                    warn!(tube = tube.get(), "No successor in tube, head entry stays at position 0");
                }
                Some(Successor::GapPromoted(from)) => {
                    warn!(tube = tube.get(), from, "Position 1 empty, promoted next occupied position");
                }
                Some(Successor::Next) | None => {}
            },
        }
        true
    }

    /// Advance the head of `tube` by its own skip number
    pub fn advance_stitch_in_tube(&mut self, tube: TubeNumber) -> Option<Successor> {
        let queue = self.state.tubes.get_mut(&tube.get())?;
        let skip = queue.current()?.skip_number;
        let outcome = advance_by_skip(queue, skip);
        self.persist();
        outcome
    }

    /// Completion without any recovery.
    ///
    /// Returns `None` and leaves the state untouched when no tube carries
    /// `thread_id` or its head is not `content_id`.
    pub fn handle_stitch_completion(
        &mut self,
        thread_id: &str,
        content_id: &str,
        score: u32,
        total_questions: u32,
    ) -> Option<PositionEntry> {
        let Some(tube) = self.state.tube_for_thread(thread_id) else {
            warn!("No tube carries thread {}", thread_id);
            return None;
        };
        let head_matches = self
            .state
            .tube(tube)
            .and_then(Tube::current)
            .is_some_and(|e| e.content_id == content_id);
        if !head_matches {
            warn!("Content {} is not at position 0 of tube {}", content_id, tube);
            return None;
        }

        self.record_completion(thread_id, content_id, score, total_questions);
        self.score_head(tube, score, total_questions, OnPerfect::Advance);
        self.persist();
        self.current_stitch().cloned()
    }

    /// Replace a tube's positions with `content_ids` at 0, 1, 2, ...
    ///
    /// Fails without touching the state when `content_ids` is empty.
    pub fn initialize_tube_with_content<I, T>(
        &mut self,
        tube: TubeNumber,
        thread_id: &str,
        content_ids: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let skip = self.config.default_skip_number;
        let mut seeded = Tube::with_content(thread_id, content_ids);
        if seeded.is_empty() {
            return Err(SchedulerError::EmptyContent { tube });
        }
        for entry in seeded.positions.values_mut() {
            entry.skip_number = skip;
        }

        info!(
            tube = tube.get(),
            thread_id,
            entries = seeded.len(),
            "Initialized tube with content"
        );
        self.state.tubes.insert(tube.get(), seeded);
        self.persist();
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
