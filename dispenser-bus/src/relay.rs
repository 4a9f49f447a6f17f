//! pass-through relay between the host line and the dispenser lines
//!
//! In normal operation every level change on the host input is copied to
//! the shared dispenser output, and level changes on the input line
//! holding the selected slot are copied back to the host. While enumeration is
//! active the dispenser inputs are measured instead of mirrored.
//!
//! All handlers are O(1) and never wait.

use core::cell::{Cell, RefCell};
use critical_section::{CriticalSection, Mutex};
use embedded_hal::digital::v2::OutputPin;

use crate::config::MAX_SLOTS;
use crate::slots::{DispenserSlot, SlotTable};
use crate::time::Ticks;

/// What a handler did with a level change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// Level equals the last one seen on this line.
    Unchanged,
    /// Copied to the output.
    Mirrored(bool),
    /// Not for the host, or the relay is not mirroring.
    Discarded,
    /// Rising edge during enumeration, pulse measurement started.
    Marked,
    /// Falling edge ended a pulse long enough to count as a response.
    Qualified,
    /// Falling edge of a pulse too short, or without a rising edge.
    Rejected,
}

pub struct Relay {
    enumeration_mode: Mutex<Cell<bool>>,
    host_level: Mutex<Cell<bool>>,
    line_levels: Mutex<Cell<u16>>,
    slots: Mutex<RefCell<SlotTable>>,
    min_pulse: u32,
}

fn drive<P: OutputPin>(pin: &mut P, level: bool) {
    if level {
        pin.set_high().ok();
    } else {
        pin.set_low().ok();
    }
}

impl Relay {
    pub const fn new(min_pulse: u32) -> Relay {
        Relay {
            enumeration_mode: Mutex::new(Cell::new(false)),
            host_level: Mutex::new(Cell::new(false)),
            line_levels: Mutex::new(Cell::new(0)),
            slots: Mutex::new(RefCell::new(SlotTable::new())),
            min_pulse,
        }
    }

    pub fn enumeration_mode(&self, cs: CriticalSection) -> bool {
        self.enumeration_mode.borrow(cs).get()
    }

    pub fn set_enumeration_mode(&self, cs: CriticalSection, active: bool) {
        self.enumeration_mode.borrow(cs).set(active);
    }

    /// Level change on the host input.
    pub fn host_edge<P: OutputPin>(
        &self,
        cs: CriticalSection,
        level: bool,
        dispenser_tx: &mut P,
    ) -> Edge {
        let last = self.host_level.borrow(cs);
        if last.get() == level {
            return Edge::Unchanged;
        }
        last.set(level);
        if self.enumeration_mode(cs) {
            // the byte transmitter owns the dispenser line
            return Edge::Discarded;
        }
        drive(dispenser_tx, level);
        Edge::Mirrored(level)
    }

    /// Level change on input `line`.
    pub fn dispenser_edge<P: OutputPin>(
        &self,
        cs: CriticalSection,
        line: usize,
        level: bool,
        now: Ticks,
        active_slot: u8,
        host_tx: &mut P,
    ) -> Edge {
        if line >= MAX_SLOTS {
            return Edge::Discarded;
        }
        let levels = self.line_levels.borrow(cs);
        let bit = 1u16 << line;
        if ((levels.get() & bit) != 0) == level {
            return Edge::Unchanged;
        }
        levels.set(levels.get() ^ bit);

        if self.enumeration_mode(cs) {
            let mut table = self.slots.borrow_ref_mut(cs);
            let entry = match table.get_mut(line) {
                Some(entry) => entry,
                None => return Edge::Discarded,
            };
            if level {
                entry.rising_edge(now, self.min_pulse);
                Edge::Marked
            } else if entry.falling_edge(now) {
                Edge::Qualified
            } else {
                Edge::Rejected
            }
        } else if self.slots.borrow_ref(cs).slot_of_line(line) == Some(active_slot) {
            drive(host_tx, level);
            Edge::Mirrored(level)
        } else {
            Edge::Discarded
        }
    }

    /// Fresh slot table for a new scan.
    pub fn reset_slots(&self, cs: CriticalSection) {
        self.slots.borrow(cs).replace(SlotTable::new());
    }

    pub fn with_slots<R>(&self, f: impl FnOnce(&mut SlotTable) -> R) -> R {
        critical_section::with(|cs| f(&mut self.slots.borrow_ref_mut(cs)))
    }

    /// State of input `line`.
    pub fn line(&self, line: usize) -> Option<DispenserSlot> {
        critical_section::with(|cs| self.slots.borrow_ref(cs).get(line).copied())
    }
}
