//! Resilient Scheduler
//!
//! Wraps [`TubeScheduler`] with the guarantees callers rely on:
//!
//! - **Non-empty tubes**: every tube has a thread id and a position-0 entry
//!   before it is read. Empty tubes get a deterministic placeholder.
//! - **Thread recovery**: completions for unknown threads are routed by the
//!   tube number embedded in the id, or to the active tube.
//! - **Content recovery**: a completed unit that is not at position 0 is
//!   brought there (found elsewhere in the tube, or synthesized).
//! - **Infinite play**: single-entry tubes keep their only entry at
//!   position 0 without running the reorder.
//!
//! None of these surface as errors. The only failure is seeding a tube with
//! no content.

use tracing::{debug, warn};

use super::base::{OnPerfect, TubeScheduler};
use super::recovery::tube_number_from_thread_id;
use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulerError};
use crate::persistence::StateSink;
use crate::state::{SchedulerState, SessionStats};
use crate::tube::{PositionEntry, Tube, TubeNumber};

/// Scheduler that repairs damaged state instead of failing
pub struct ResilientScheduler<S: StateSink> {
    base: TubeScheduler<S>,
}

impl<S: StateSink> ResilientScheduler<S> {
    /// Create from a persisted snapshot, or a fresh state when `None`
    pub fn new(initial_state: Option<SchedulerState>, sink: S) -> Self {
        Self::with_config(initial_state, sink, SchedulerConfig::default())
    }

    /// Create with explicit configuration
    pub fn with_config(
        initial_state: Option<SchedulerState>,
        sink: S,
        config: SchedulerConfig,
    ) -> Self {
        let state = initial_state.unwrap_or_else(|| SchedulerState {
            infinite_play_mode: config.infinite_play_default,
            ..SchedulerState::default()
        });

        let mut scheduler = Self {
            base: TubeScheduler::new(state, sink, config),
        };
        if scheduler.ensure_all_tubes() {
            scheduler.base.persist();
        }
        scheduler
    }

    /// Read-only snapshot for external persistence
    pub fn state(&self) -> &SchedulerState {
        self.base.state()
    }

    /// Give up the scheduler and keep the state
    pub fn into_state(self) -> SchedulerState {
        self.base.into_state()
    }

    /// Active configuration
    pub fn config(&self) -> &SchedulerConfig {
        self.base.config()
    }

    /// Tube by number (always present after construction)
    pub fn tube(&self, number: TubeNumber) -> Option<&Tube> {
        self.base.state().tube(number)
    }

    /// Summary of the completion log
    pub fn stats(&self) -> SessionStats {
        self.base.state().stats()
    }

    /// Toggle infinite play mode
    pub fn set_infinite_play_mode(&mut self, enabled: bool) {
        self.base.state_mut().infinite_play_mode = enabled;
        self.base.persist();
    }

    /// Replace the whole state and repair it
    pub fn restore(&mut self, state: SchedulerState) {
        *self.base.state_mut() = state;
        self.ensure_all_tubes();
        self.base.persist();
    }

    // ========================================================================
    // PUBLIC OPERATIONS
    // ========================================================================

    /// Advance to the next tube and return its current stitch
    pub fn cycle_tubes(&mut self) -> PositionEntry {
        let active = if self.base.state().active_tube().is_some() {
            self.base.rotate()
        } else {
            self.ensure_active_tube()
        };
        debug!(tube = active.get(), "Cycled to tube");

        self.ensure_tube(active);
        self.base.persist();
        self.head_of(active)
    }

    /// Record a finished unit and reschedule it
    pub fn handle_stitch_completion(
        &mut self,
        thread_id: &str,
        content_id: &str,
        score: u32,
        total_questions: u32,
    ) -> PositionEntry {
        self.ensure_all_tubes();

        let target = self.resolve_thread(thread_id);
        self.bring_to_front(target, content_id);
        self.base
            .record_completion(thread_id, content_id, score, total_questions);

        let single_entry = self.tube(target).is_some_and(|t| t.len() == 1);
        let on_perfect = if self.base.state().infinite_play_mode && single_entry {
            OnPerfect::StayInPlace
        } else {
            OnPerfect::Advance
        };
        self.base
            .score_head(target, score, total_questions, on_perfect);

        self.base.persist();
        self.current_stitch()
    }

    /// Seed a tube with content ids at positions 0, 1, 2, ...
    pub fn initialize_tube_with_content<I, T>(
        &mut self,
        tube_number: u8,
        thread_id: &str,
        content_ids: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tube = TubeNumber::new(tube_number).ok_or(SchedulerError::InvalidTube(tube_number))?;
        self.base
            .initialize_tube_with_content(tube, thread_id, content_ids)
    }

    /// Position-0 entry of the active tube
    pub fn current_stitch(&mut self) -> PositionEntry {
        let mut repaired = false;
        let active = match self.base.state().active_tube() {
            Some(active) => active,
            None => {
                repaired = true;
                self.ensure_active_tube()
            }
        };
        repaired |= self.ensure_tube(active);
        if repaired {
            self.base.persist();
        }
        self.head_of(active)
    }

    // ========================================================================
    // REPAIRS
    // ========================================================================

    fn ensure_active_tube(&mut self) -> TubeNumber {
        if let Some(active) = self.base.state().active_tube() {
            return active;
        }
        warn!(
            "Active tube number {} is invalid, resetting to tube 1",
            self.base.state().active_tube_number
        );
        self.base.state_mut().active_tube_number = TubeNumber::ONE.get();
        TubeNumber::ONE
    }

    fn ensure_all_tubes(&mut self) -> bool {
        TubeNumber::ALL
            .into_iter()
            .fold(false, |repaired, tube| self.ensure_tube(tube) | repaired)
    }

    /// Guarantee a thread id and a position-0 entry. Returns true on repair.
    fn ensure_tube(&mut self, number: TubeNumber) -> bool {
        let placeholder = self.config().placeholder_content_id(number.get());
        let skip = self.config().default_skip_number;
        let needs_thread = self
            .base
            .state()
            .tube(number)
            .is_none_or(|t| t.thread_id.is_empty());
        let thread_id = needs_thread.then(|| self.unused_thread_id(number));

        let tube = self.base.state_mut().tube_mut(number);
        let mut repaired = false;

        if let Some(thread_id) = thread_id {
            warn!(tube = number.get(), thread_id = %thread_id, "Synthesized missing thread id");
            tube.thread_id = thread_id;
            repaired = true;
        }

        if tube.is_empty() {
            tube.positions.insert(0, PositionEntry::with_skip(placeholder, skip));
            warn!(tube = number.get(), "Tube was empty, inserted placeholder entry");
            repaired = true;
        } else if tube.repair_head() {
            warn!(tube = number.get(), "Position 0 was missing, promoted lowest entry");
            repaired = true;
        }

        repaired
    }

    /// `thread-T{n}-001`, or the first higher sequence number no tube carries
    fn unused_thread_id(&self, number: TubeNumber) -> String {
        let state = self.base.state();
        (1u32..)
            .map(|seq| format!("thread-T{}-{:03}", number, seq))
            .find(|id| !state.tubes.values().any(|t| t.thread_id == *id))
            .unwrap_or_default()
    }

    /// Tube that should receive a completion for `thread_id`
    fn resolve_thread(&mut self, thread_id: &str) -> TubeNumber {
        if let Some(tube) = self.base.state().tube_for_thread(thread_id) {
            return tube;
        }

        if let Some(tube) = tube_number_from_thread_id(thread_id, self.config().thread_prefixes.as_slice()) {
            warn!(
                "Thread {} not found, re-associating tube {} from its id",
                thread_id, tube
            );
            self.base.state_mut().tube_mut(tube).thread_id = thread_id.to_string();
            return tube;
        }

        let active = self.ensure_active_tube();
        warn!(
            "Thread {} not found and carries no tube number, using active tube {}",
            thread_id, active
        );
        active
    }

    /// Make `content_id` the position-0 entry of `tube`
    fn bring_to_front(&mut self, tube: TubeNumber, content_id: &str) {
        let skip = self.config().default_skip_number;
        let queue = self.base.state_mut().tube_mut(tube);

        match queue.find_position(content_id) {
            Some(0) => {}
            Some(pos) => {
                warn!(
                    "Content {} found at position {} of tube {}, moving to front",
                    content_id, pos, tube
                );
                queue.swap(0, pos);
            }
            None => {
                warn!(
                    "Content {} not in tube {}, synthesizing position-0 entry",
                    content_id, tube
                );
                queue.insert_front(PositionEntry::with_skip(content_id, skip));
            }
        }
    }

    /// Position-0 entry of a tube that `ensure_tube` has already repaired
    fn head_of(&self, tube: TubeNumber) -> PositionEntry {
        self.tube(tube)
            .and_then(Tube::current)
            .cloned()
            .unwrap_or_else(|| {
                PositionEntry::with_skip(
                    self.config().placeholder_content_id(tube.get()),
                    self.config().default_skip_number,
                )
            })
    }
}

// ============================================================================
// TESTS
// ============================================================================
