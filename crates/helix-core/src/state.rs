//! Scheduler State - the aggregate root
//!
//! Everything a learner session needs to resume: the three tubes, which one
//! is active, rotation count, and the append-only completion log.
//!
//! The snapshot is plain nested records so it serializes to the same JSON
//! shape hosts already store (`tubes`, `activeTubeNumber`, `cycleCount`,
//! `completedStitches`, `totalPoints`, `infinitePlayMode`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tube::{Tube, TubeNumber};

// ============================================================================
// COMPLETION LOG
// ============================================================================

/// One completion event, kept for statistics only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedStitch {
    /// Unit the learner finished
    pub content_id: String,
    /// Thread the caller reported it under
    pub thread_id: String,
    /// Correct answers
    pub score: u32,
    /// Questions asked
    pub total_questions: u32,
    /// When the completion was recorded
    pub timestamp: DateTime<Utc>,
}

impl CompletedStitch {
    /// Every question answered correctly
    #[inline]
    pub fn is_perfect(&self) -> bool {
        self.score == self.total_questions
    }
}

// ============================================================================
// SCHEDULER STATE
// ============================================================================

/// Full scheduler snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerState {
    /// Tube number -> tube
    #[serde(default)]
    pub tubes: BTreeMap<u8, Tube>,
    /// Tube currently presented; stored raw so damaged values can be repaired
    #[serde(default = "default_active_tube")]
    pub active_tube_number: u8,
    /// Completed 1 -> 2 -> 3 -> 1 rotations
    #[serde(default)]
    pub cycle_count: u32,
    /// Append-only completion log
    #[serde(default)]
    pub completed_stitches: Vec<CompletedStitch>,
    /// Running sum of scores
    #[serde(default)]
    pub total_points: u64,
    /// Keep single-entry tubes cycling on their only entry
    #[serde(default)]
    pub infinite_play_mode: bool,
}

fn default_active_tube() -> u8 {
    TubeNumber::ONE.get()
}

impl Default for SchedulerState {
    fn default() -> Self {
        let tubes = TubeNumber::ALL
            .iter()
            .map(|n| (n.get(), Tube::default()))
            .collect();
        Self {
            tubes,
            active_tube_number: default_active_tube(),
            cycle_count: 0,
            completed_stitches: Vec::new(),
            total_points: 0,
            infinite_play_mode: false,
        }
    }
}

impl SchedulerState {
    /// Active tube, if the stored number is valid
    pub fn active_tube(&self) -> Option<TubeNumber> {
        TubeNumber::new(self.active_tube_number)
    }

    /// Tube by number
    pub fn tube(&self, number: TubeNumber) -> Option<&Tube> {
        self.tubes.get(&number.get())
    }

    /// Mutable tube by number, created empty if missing
    pub fn tube_mut(&mut self, number: TubeNumber) -> &mut Tube {
        self.tubes.entry(number.get()).or_default()
    }

    /// Tube currently carrying `thread_id`
    pub fn tube_for_thread(&self, thread_id: &str) -> Option<TubeNumber> {
        TubeNumber::ALL
            .into_iter()
            .find(|n| self.tube(*n).is_some_and(|t| t.thread_id == thread_id))
    }

    /// Summary of the completion log
    pub fn stats(&self) -> SessionStats {
        let completed_count = self.completed_stitches.len();
        let perfect_count = self
            .completed_stitches
            .iter()
            .filter(|c| c.is_perfect())
            .count();
        let (correct, asked) = self
            .completed_stitches
            .iter()
            .fold((0u64, 0u64), |(c, a), s| {
                (c + s.score as u64, a + s.total_questions as u64)
            });
        let accuracy = if asked > 0 {
            correct as f64 / asked as f64
        } else {
            0.0
        };

        SessionStats {
            total_points: self.total_points,
            completed_count,
            perfect_count,
            cycle_count: self.cycle_count,
            accuracy,
        }
    }
}

// ============================================================================
// SESSION STATS
// ============================================================================

/// Aggregate view of a session, derived from the completion log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Sum of all scores
    pub total_points: u64,
    /// Number of completion events
    pub completed_count: usize,
    /// Completions with every question correct
    pub perfect_count: usize,
    /// Full tube rotations
    pub cycle_count: u32,
    /// Correct answers / questions asked (0.0 when nothing was asked)
    pub accuracy: f64,
}
