//! The shared per-motor state table.
//!
//! Two fixed arrays of [`NUM_MOTORS`] slots, one per record type. On every node one of them
//! is *owned* (written only by the receive drain) and the other is *local* (written by the
//! application, read by the transmit side). Both live for the whole program and start
//! zeroed.
//!
//! ## Consistency
//!
//! Every write and every read copies a whole slot inside a critical section. A reader that
//! races the receive interrupt therefore sees either the old or the new record, never a
//! mix of the two. The critical section covers one record copy (at most 40 bytes), and the
//! frame itself is fetched from the hardware before it is entered.

use crate::consts::NUM_MOTORS;
use crate::motor::MotorIndex;
use crate::pdo::{CommandRecord, Pdo, TelemetryRecord};
use core::array;
use core::cell::RefCell;
use core::fmt;
use critical_section::{CriticalSection, Mutex};

/// One table entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot<T> {
    /// Last record written to this slot.
    pub record: T,
    /// How many times the slot has been written. Wraps at `u32::MAX`.
    pub updates: u32,
}

/// A fixed array of slots for one record type.
pub struct Slots<T> {
    slots: Mutex<RefCell<[Slot<T>; NUM_MOTORS]>>,
}

impl<T: Pdo> Slots<T> {
    /// All slots zeroed, with no updates.
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(RefCell::new(
                [Slot {
                    record: T::ZERO,
                    updates: 0,
                }; NUM_MOTORS],
            )),
        }
    }

    /// Overwrites one slot and bumps its update count.
    pub(crate) fn store(&self, cs: CriticalSection<'_>, index: MotorIndex, record: T) {
        let mut slots = self.slots.borrow(cs).borrow_mut();
        let slot = &mut slots[index.get()];
        slot.record = record;
        slot.updates = slot.updates.wrapping_add(1);
    }

    /// Copy of one slot, including its update count.
    pub fn slot(&self, index: MotorIndex) -> Slot<T> {
        critical_section::with(|cs| self.slots.borrow(cs).borrow()[index.get()])
    }

    /// Copy of the record in one slot.
    pub fn get(&self, index: MotorIndex) -> T {
        self.slot(index).record
    }

    /// Copy of every record, taken in a single critical section.
    pub fn snapshot(&self) -> [T; NUM_MOTORS] {
        critical_section::with(|cs| {
            let slots = self.slots.borrow(cs).borrow();
            array::from_fn(|i| slots[i].record)
        })
    }
}

impl<T: Pdo> Default for Slots<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Pdo + fmt::Debug> fmt::Debug for Slots<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.snapshot().iter()).finish()
    }
}

/// Both per-motor arrays of a node.
#[derive(Debug, Default)]
pub struct StateTable {
    /// Motor status, one slot per motor.
    pub telemetry: Slots<TelemetryRecord>,
    /// Motor goals, one slot per motor.
    pub command: Slots<CommandRecord>,
}

impl StateTable {
    /// Both arrays zeroed.
    pub const fn new() -> Self {
        Self {
            telemetry: Slots::new(),
            command: Slots::new(),
        }
    }
}
