//! Range-checked motor slot index.
//!
//! Every state-table access goes through [`MotorIndex`], which can only be built from a
//! value below [`NUM_MOTORS`]. Raw indices arriving on the wire stay plain `u32` until they
//! pass through [`MotorIndex::new`].

use crate::consts::NUM_MOTORS;
use thiserror::Error;

/// Returned when a raw value does not name one of the [`NUM_MOTORS`] slots.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("motor index {0} is out of range (0..15)")]
pub struct InvalidMotorIndex(pub u32);

/// Index of one of the fixed motor slots, always in `0..NUM_MOTORS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MotorIndex(u8);

impl MotorIndex {
    /// The first slot.
    pub const FIRST: Self = Self(0);

    /// The last slot.
    pub const LAST: Self = Self(NUM_MOTORS as u8 - 1);

    /// Checks `raw` against the slot count.
    ///
    /// # Returns
    /// - `Some(index)` when `raw < NUM_MOTORS`
    /// - `None` otherwise
    pub const fn new(raw: u32) -> Option<Self> {
        if raw < NUM_MOTORS as u32 {
            Some(Self(raw as u8))
        } else {
            None
        }
    }

    /// The slot as an array subscript.
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// The slot as it is written into a record's `motor_id` field.
    pub const fn as_u32(self) -> u32 {
        self.0 as u32
    }

    /// Iterates over every slot in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..NUM_MOTORS as u8).map(Self)
    }
}

impl TryFrom<u32> for MotorIndex {
    type Error = InvalidMotorIndex;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or(InvalidMotorIndex(raw))
    }
}

impl From<MotorIndex> for usize {
    fn from(index: MotorIndex) -> Self {
        index.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_every_slot() {
        for raw in 0..NUM_MOTORS as u32 {
            let index = MotorIndex::new(raw).unwrap();
            assert_eq!(index.as_u32(), raw);
            assert_eq!(index.get(), raw as usize);
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(MotorIndex::new(15), None);
        assert_eq!(MotorIndex::new(u32::MAX), None);
        assert_eq!(MotorIndex::try_from(42), Err(InvalidMotorIndex(42)));
    }

    #[test]
    fn test_all_covers_table() {
        assert_eq!(MotorIndex::all().count(), NUM_MOTORS);
        assert_eq!(MotorIndex::all().next(), Some(MotorIndex::FIRST));
        assert_eq!(MotorIndex::all().last(), Some(MotorIndex::LAST));
    }
}
