//! per-line enumeration state
//!
//! The master has one input line per dispenser position. A line that
//! answers during a scan is given the next free slot index, so slots are
//! numbered 0..N-1 in discovery order whichever lines are wired. The slot
//! index is the identity handed to the dispenser at the end of a scan and
//! the number the host selects it by.

use crate::config::MAX_SLOTS;
use crate::time::{Deadline, Ticks};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispenserSlot {
    /// Input line on the master.
    pub line: u8,
    /// Slot handed out in the current scan, `None` until the line answers.
    pub slot_index: Option<u8>,
    /// Candidate address this line first answered to in the current scan.
    pub discovered_address: Option<u8>,
    /// A qualifying pulse was seen since the flag was last cleared.
    pub pending_response: bool,
    /// Tick from which a falling edge qualifies the pulse begun by the
    /// last rising edge.
    pub rising_edge_mark: Option<Deadline>,
}

impl DispenserSlot {
    pub const fn new(line: u8) -> DispenserSlot {
        DispenserSlot {
            line,
            slot_index: None,
            discovered_address: None,
            pending_response: false,
            rising_edge_mark: None,
        }
    }

    pub fn rising_edge(&mut self, now: Ticks, min_pulse: u32) {
        self.rising_edge_mark = Some(Deadline::after(now, min_pulse));
    }

    /// Returns true when the pulse just ended was long enough.
    pub fn falling_edge(&mut self, now: Ticks) -> bool {
        match self.rising_edge_mark.take() {
            Some(mark) if mark.reached(now) => {
                self.pending_response = true;
                true
            }
            _ => false,
        }
    }
}

/// Lines newly claimed by one candidate address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Claim {
    pub lines: u16,
}

impl Claim {
    pub fn count(&self) -> u8 {
        self.lines.count_ones() as u8
    }

    /// More than one line answered the same address.
    pub fn is_collision(&self) -> bool {
        self.count() > 1
    }
}

pub struct SlotTable {
    lines: [DispenserSlot; MAX_SLOTS],
}

impl SlotTable {
    pub const fn new() -> SlotTable {
        let mut lines = [DispenserSlot::new(0); MAX_SLOTS];
        let mut i = 0;
        while i < MAX_SLOTS {
            lines[i] = DispenserSlot::new(i as u8);
            i += 1;
        }
        SlotTable { lines }
    }

    pub fn get(&self, line: usize) -> Option<&DispenserSlot> {
        self.lines.get(line)
    }

    pub fn get_mut(&mut self, line: usize) -> Option<&mut DispenserSlot> {
        self.lines.get_mut(line)
    }

    /// Entry of the line holding `slot`.
    pub fn by_slot(&self, slot: u8) -> Option<&DispenserSlot> {
        self.lines.iter().find(|l| l.slot_index == Some(slot))
    }

    /// Slot handed to `line`, if any.
    pub fn slot_of_line(&self, line: usize) -> Option<u8> {
        self.get(line).and_then(|l| l.slot_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DispenserSlot> + '_ {
        self.lines.iter()
    }

    pub fn clear_pending(&mut self) {
        for line in self.lines.iter_mut() {
            line.pending_response = false;
        }
    }

    /// Record `address` on every line with a pending response that has
    /// not claimed an address yet, handing out the next slot indices in
    /// line order. Earlier claims are left alone.
    pub fn claim_pending(&mut self, address: u8) -> Claim {
        let mut claim = Claim::default();
        let mut next = self.discovered_count();
        for line in self.lines.iter_mut() {
            if line.pending_response && line.discovered_address.is_none() {
                line.discovered_address = Some(address);
                line.slot_index = Some(next);
                next += 1;
                claim.lines |= 1 << line.line;
            }
        }
        claim
    }

    pub fn discovered_count(&self) -> u8 {
        self.lines
            .iter()
            .filter(|l| l.slot_index.is_some())
            .count() as u8
    }

    /// `(address, slot_index)` pairs in slot order.
    pub fn assignments(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        (0..self.discovered_count()).filter_map(move |slot| {
            self.by_slot(slot)
                .and_then(|l| l.discovered_address)
                .map(|address| (address, slot))
        })
    }
}
