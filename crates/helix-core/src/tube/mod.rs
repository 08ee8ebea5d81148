//! Tube Store
//!
//! Data model for the three parallel content queues:
//! - Validated tube numbering and rotation
//! - Sparse position maps (gaps allowed, position 0 mandatory)
//! - Per-entry skip and distractor ladders

mod entry;
mod number;
mod queue;

pub use entry::{
    next_skip, DistractorLevel, PositionEntry, DEFAULT_SKIP_NUMBER, MAX_SKIP_NUMBER,
    RESET_SKIP_NUMBER, SKIP_LADDER,
};
pub use number::TubeNumber;
pub use queue::Tube;
