//! Scheduler error types
//!
//! Almost every anomaly the scheduler meets is repaired in place; these are
//! the cases that have to be surfaced to the caller instead.

use crate::tube::TubeNumber;

/// Scheduler error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// Seeding was attempted with no content ids
    #[error("Cannot initialize tube {tube} with an empty content list")]
    EmptyContent {
        /// Tube that was being seeded
        tube: TubeNumber,
    },
    /// A tube number outside 1..=3 was supplied
    #[error("Invalid tube number: {0} (expected 1, 2 or 3)")]
    InvalidTube(u8),
}

/// Scheduler result type
pub type Result<T> = std::result::Result<T, SchedulerError>;
