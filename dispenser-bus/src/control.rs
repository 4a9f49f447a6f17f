//! one byte control plane
//!
//! The host writes single bytes to the master over the side channel:
//! a slot index selects the dispenser heard on the host line, the
//! sentinel asks for a full bus reset. Nothing is sent back.

use core::cell::Cell;
use critical_section::{CriticalSection, Mutex};

use crate::config::SENTINEL;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlCommand {
    Select(u8),
    Reset,
    Ignored(u8),
}

pub struct ControlPlane {
    active_slot: Mutex<Cell<u8>>,
    reset_requested: Mutex<Cell<bool>>,
    device_count: Mutex<Cell<u8>>,
}

impl ControlPlane {
    pub const fn new() -> ControlPlane {
        ControlPlane {
            active_slot: Mutex::new(Cell::new(0)),
            reset_requested: Mutex::new(Cell::new(false)),
            device_count: Mutex::new(Cell::new(0)),
        }
    }

    /// Decode one received byte.
    pub fn receive(&self, cs: CriticalSection, byte: u8) -> ControlCommand {
        if byte == SENTINEL {
            self.reset_requested.borrow(cs).set(true);
            ControlCommand::Reset
        } else if byte < self.device_count.borrow(cs).get() {
            self.active_slot.borrow(cs).set(byte);
            ControlCommand::Select(byte)
        } else {
            ControlCommand::Ignored(byte)
        }
    }

    pub fn active_slot(&self, cs: CriticalSection) -> u8 {
        self.active_slot.borrow(cs).get()
    }

    pub fn device_count(&self, cs: CriticalSection) -> u8 {
        self.device_count.borrow(cs).get()
    }

    /// Fix the number of selectable slots for this session. The
    /// selection falls back to slot 0.
    pub fn latch_device_count(&self, cs: CriticalSection, count: u8) {
        self.device_count.borrow(cs).set(count);
        self.active_slot.borrow(cs).set(0);
    }

    pub fn reset_requested(&self, cs: CriticalSection) -> bool {
        self.reset_requested.borrow(cs).get()
    }

    /// Read and clear the reset request in one step.
    pub fn take_reset_request(&self, cs: CriticalSection) -> bool {
        self.reset_requested.borrow(cs).replace(false)
    }
}
