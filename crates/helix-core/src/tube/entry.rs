//! Position Entry - one scheduled content reference
//!
//! Each entry carries the spacing metadata for a single learning unit:
//! - how far back it is pushed after a perfect pass (skip number)
//! - how hard its wrong-answer alternatives are (distractor level)

use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Skip progression applied on every perfect pass
pub const SKIP_LADDER: [u32; 6] = [1, 3, 5, 10, 25, 100];

/// Highest skip number an entry can reach
pub const MAX_SKIP_NUMBER: u32 = 100;

/// Skip number given to freshly seeded or synthesized entries
pub const DEFAULT_SKIP_NUMBER: u32 = 3;

/// Skip number an entry falls back to after an imperfect pass
pub const RESET_SKIP_NUMBER: u32 = 1;

/// Next rung of the skip ladder.
///
/// Returns the smallest rung strictly above `current`, saturating at
/// [`MAX_SKIP_NUMBER`]. Off-ladder values (only seen in damaged snapshots)
/// climb to the rung above them; zero counts as the first rung.
pub fn next_skip(current: u32) -> u32 {
    let current = current.max(RESET_SKIP_NUMBER);
    SKIP_LADDER
        .iter()
        .copied()
        .find(|rung| *rung > current)
        .unwrap_or(MAX_SKIP_NUMBER)
}

// ============================================================================
// DISTRACTOR LEVEL
// ============================================================================

/// Difficulty tier of the wrong-answer options shown with a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum DistractorLevel {
    /// Easiest alternatives
    #[default]
    L1,
    /// Moderate alternatives
    L2,
    /// Hardest alternatives
    L3,
}

impl DistractorLevel {
    /// Next tier up, saturating at L3
    pub fn advance(self) -> Self {
        match self {
            DistractorLevel::L1 => DistractorLevel::L2,
            DistractorLevel::L2 | DistractorLevel::L3 => DistractorLevel::L3,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DistractorLevel::L1 => "L1",
            DistractorLevel::L2 => "L2",
            DistractorLevel::L3 => "L3",
        }
    }
}

impl std::fmt::Display for DistractorLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// POSITION ENTRY
// ============================================================================

/// Scheduling metadata for one content unit inside a tube
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionEntry {
    /// Opaque identifier of the learning unit
    pub content_id: String,
    /// Distance the entry is pushed back after a perfect pass
    #[serde(default = "default_skip_number")]
    pub skip_number: u32,
    /// Difficulty of the wrong-answer alternatives
    #[serde(default)]
    pub distractor_level: DistractorLevel,
    /// Set once the entry has been pushed back after a perfect pass
    #[serde(default)]
    pub completed: bool,
}

fn default_skip_number() -> u32 {
    DEFAULT_SKIP_NUMBER
}

impl PositionEntry {
    /// Fresh entry with the default skip number and L1 distractors
    pub fn new(content_id: impl Into<String>) -> Self {
        Self::with_skip(content_id, DEFAULT_SKIP_NUMBER)
    }

    /// Fresh entry with an explicit skip number
    pub fn with_skip(content_id: impl Into<String>, skip_number: u32) -> Self {
        Self {
            content_id: content_id.into(),
            skip_number,
            distractor_level: DistractorLevel::L1,
            completed: false,
        }
    }

    /// Apply a perfect pass: climb both ladders and mark completed
    pub fn promote(&mut self) {
        self.skip_number = next_skip(self.skip_number);
        self.distractor_level = self.distractor_level.advance();
        self.completed = true;
    }

    /// Apply an imperfect pass: the skip number starts over
    pub fn demote(&mut self) {
        self.skip_number = RESET_SKIP_NUMBER;
    }
}

// ============================================================================
// TESTS
// ============================================================================
