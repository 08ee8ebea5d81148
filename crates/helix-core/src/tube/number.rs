//! Tube numbering
//!
//! There are exactly three tubes, numbered 1 to 3, visited round-robin.

use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// A validated tube number (1, 2 or 3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TubeNumber(u8);

impl TubeNumber {
    /// Tube 1
    pub const ONE: TubeNumber = TubeNumber(1);
    /// Tube 2
    pub const TWO: TubeNumber = TubeNumber(2);
    /// Tube 3
    pub const THREE: TubeNumber = TubeNumber(3);

    /// All tubes in rotation order
    pub const ALL: [TubeNumber; 3] = [TubeNumber::ONE, TubeNumber::TWO, TubeNumber::THREE];

    /// Validate a raw tube number
    pub fn new(raw: u8) -> Option<Self> {
        (1..=3).contains(&raw).then_some(TubeNumber(raw))
    }

    /// Raw value
    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Next tube in the 1 -> 2 -> 3 -> 1 rotation
    pub fn next(self) -> Self {
        match self.0 {
            1 => TubeNumber::TWO,
            2 => TubeNumber::THREE,
            _ => TubeNumber::ONE,
        }
    }
}

impl TryFrom<u8> for TubeNumber {
    type Error = SchedulerError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        TubeNumber::new(raw).ok_or(SchedulerError::InvalidTube(raw))
    }
}

impl From<TubeNumber> for u8 {
    fn from(tube: TubeNumber) -> u8 {
        tube.0
    }
}

impl std::fmt::Display for TubeNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
