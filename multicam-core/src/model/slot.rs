use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of camera slots in the reference deployment.
pub const DEFAULT_SLOT_COUNT: u8 = 4;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("slot number must be positive, got {0}")]
pub struct SlotNumberError(pub u8);

/// Which physical camera a source endpoint represents. Stable for the
/// lifetime of that source's participation, 1-based.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(try_from = "u8", into = "u8")]
pub struct SlotNumber(u8);

impl SlotNumber {
    pub fn new(n: u8) -> Result<Self, SlotNumberError> {
        if n == 0 {
            return Err(SlotNumberError(n));
        }
        Ok(Self(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for SlotNumber {
    type Error = SlotNumberError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<SlotNumber> for u8 {
    fn from(slot: SlotNumber) -> u8 {
        slot.0
    }
}

impl fmt::Display for SlotNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
