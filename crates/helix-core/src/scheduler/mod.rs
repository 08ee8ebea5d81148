//! Triple-Helix Scheduler
//!
//! Two layers over the tube store:
//! - `base`: round-robin cycling and the advance-by-skip reordering
//! - `resilient`: non-empty-tube guarantee, thread/content recovery and
//!   infinite play on single-entry tubes
//!
//! Schedulers are plain owned values. Hosts that serve many learners keep
//! one instance per learner and serialize access to each.

mod base;
mod recovery;
mod resilient;

pub use base::{advance_by_skip, OnPerfect, Successor, TubeScheduler};
pub use recovery::tube_number_from_thread_id;
pub use resilient::ResilientScheduler;
