//! Storage Module
//!
//! SQLite-based snapshot store with:
//! - Versioned schema migrations
//! - One JSON snapshot per learner
//! - A [`StateSink`](crate::StateSink) adapter for the scheduler

mod migrations;
mod sqlite;

pub use migrations::MIGRATIONS;
pub use sqlite::{LearnerSummary, Result, SnapshotStore, SqliteSink, StorageError};
