//! # Helix Core
//!
//! Triple-Helix spaced repetition scheduler. Decides which content unit a
//! learner sees next by tracking the *positions* of known content ids in
//! three parallel queues ("tubes") and rotating between them.
//!
//! - **Tube Store**: sparse position maps, skip ladder (1 → 3 → 5 → 10 → 25 → 100),
//!   distractor ladder (L1 → L2 → L3)
//! - **Base Scheduler**: round-robin cycling and advance-by-skip reordering
//! - **Resilient Scheduler**: guaranteed non-empty tubes, thread/content
//!   recovery, infinite play on single-entry tubes
//! - **Snapshot Store**: SQLite persistence behind the [`StateSink`] hook
//!
//! ## Quick Start
//!
//! ```rust
//! use helix_core::{NullSink, ResilientScheduler};
//!
//! let mut scheduler = ResilientScheduler::new(None, NullSink);
//! scheduler
//!     .initialize_tube_with_content(1, "thread-T1-001", ["A", "B", "C"])
//!     .unwrap();
//!
//! // A perfect pass pushes A back by its skip number (3)
//! let next = scheduler.handle_stitch_completion("thread-T1-001", "A", 20, 20);
//! assert_eq!(next.content_id, "B");
//!
//! // Move on to tube 2
//! let stitch = scheduler.cycle_tubes();
//! assert_eq!(scheduler.state().active_tube_number, 2);
//! # let _ = stitch;
//! ```
//!
//! ## Feature Flags
//!
//! - `bundled-sqlite` (default): compile SQLite into the snapshot store

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod config;
pub mod error;
pub mod persistence;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod tube;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use config::{SchedulerConfig, DEFAULT_THREAD_PREFIXES};
pub use error::SchedulerError;
pub use persistence::{NullSink, StateSink};
pub use scheduler::{
    advance_by_skip, tube_number_from_thread_id, OnPerfect, ResilientScheduler, Successor,
    TubeScheduler,
};
pub use state::{CompletedStitch, SchedulerState, SessionStats};
pub use storage::{LearnerSummary, SnapshotStore, SqliteSink, StorageError};
pub use tube::{
    next_skip, DistractorLevel, PositionEntry, Tube, TubeNumber, DEFAULT_SKIP_NUMBER,
    MAX_SKIP_NUMBER, SKIP_LADDER,
};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        DistractorLevel, NullSink, PositionEntry, ResilientScheduler, SchedulerConfig,
        SchedulerError, SchedulerState, SnapshotStore, SqliteSink, StateSink, StorageError,
        TubeNumber,
    };
}
