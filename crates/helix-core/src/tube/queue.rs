//! Tube - a sparse, ordered queue of content entries
//!
//! Positions are integer keys; gaps are allowed and expected once entries
//! start being pushed back by their skip numbers. Position 0 is the entry
//! currently presented to the learner.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::PositionEntry;

/// One of the three parallel content queues
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tube {
    /// Content lineage currently occupying this tube
    #[serde(default)]
    pub thread_id: String,
    /// Sparse position -> entry map
    #[serde(default)]
    pub positions: BTreeMap<u32, PositionEntry>,
}

impl Tube {
    /// Empty tube for a thread
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            positions: BTreeMap::new(),
        }
    }

    /// Tube with consecutive positions 0..n, one per content id
    pub fn with_content<I, S>(thread_id: impl Into<String>, content_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let positions = content_ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| (i as u32, PositionEntry::new(id)))
            .collect();
        Self {
            thread_id: thread_id.into(),
            positions,
        }
    }

    /// Entry at position 0
    #[inline]
    pub fn current(&self) -> Option<&PositionEntry> {
        self.positions.get(&0)
    }

    /// Mutable entry at position 0
    #[inline]
    pub fn current_mut(&mut self) -> Option<&mut PositionEntry> {
        self.positions.get_mut(&0)
    }

    /// Entry at an arbitrary position
    pub fn entry_at(&self, position: u32) -> Option<&PositionEntry> {
        self.positions.get(&position)
    }

    /// Lowest position holding `content_id`
    pub fn find_position(&self, content_id: &str) -> Option<u32> {
        self.positions
            .iter()
            .find(|(_, entry)| entry.content_id == content_id)
            .map(|(pos, _)| *pos)
    }

    /// Highest occupied position
    pub fn max_position(&self) -> Option<u32> {
        self.positions.keys().next_back().copied()
    }

    /// Number of occupied positions
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when no position is occupied
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Entries in ascending position order
    pub fn ordered(&self) -> impl Iterator<Item = (u32, &PositionEntry)> {
        self.positions.iter().map(|(pos, entry)| (*pos, entry))
    }

    /// Insert at position 0.
    ///
    /// Only the contiguous run starting at 0 moves back by one; entries
    /// after the first gap keep their positions.
    pub fn insert_front(&mut self, entry: PositionEntry) {
        let mut gap = 0u32;
        while self.positions.contains_key(&gap) {
            gap += 1;
        }
        for pos in (0..gap).rev() {
            if let Some(moved) = self.positions.remove(&pos) {
                self.positions.insert(pos + 1, moved);
            }
        }
        self.positions.insert(0, entry);
    }

    /// Exchange the entries at two positions (either may be empty)
    pub fn swap(&mut self, a: u32, b: u32) {
        if a == b {
            return;
        }
        let first = self.positions.remove(&a);
        let second = self.positions.remove(&b);
        if let Some(entry) = first {
            self.positions.insert(b, entry);
        }
        if let Some(entry) = second {
            self.positions.insert(a, entry);
        }
    }

    /// Move the lowest-keyed entry into an empty position 0.
    ///
    /// Returns true when a repair happened.
    pub fn repair_head(&mut self) -> bool {
        if self.positions.contains_key(&0) {
            return false;
        }
        match self.positions.pop_first() {
            Some((_, entry)) => {
                self.positions.insert(0, entry);
                true
            }
            None => false,
        }
    }

    /// Content ids in position order
    pub fn content_ids(&self) -> Vec<&str> {
        self.positions
            .values()
            .map(|entry| entry.content_id.as_str())
            .collect()
    }
}
