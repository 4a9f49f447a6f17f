//! monotonic tick counter driven by the timer overflow interrupt
//!
//! The counter is the only clock on the master. It is written from the
//! timer interrupt alone, every other context reads it inside a critical
//! section so the four bytes are seen together.

use core::cell::Cell;
use critical_section::{CriticalSection, Mutex};

use crate::config::TICK_US;
use crate::hal::BusHal;

/// A reading of the tick counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticks(pub u32);

impl Ticks {
    /// Ticks from `earlier` up to `self`, across a wrap of the counter.
    pub fn since(self, earlier: Ticks) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }
}

/// A tick value to wait for.
///
/// Comparison is done on the wrapped difference, so a deadline stays
/// correct across counter overflow as long as it lies less than 2^31
/// ticks away.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deadline(u32);

impl Deadline {
    pub fn after(now: Ticks, ticks: u32) -> Deadline {
        Deadline(now.0.wrapping_add(ticks))
    }

    pub fn reached(self, now: Ticks) -> bool {
        now.0.wrapping_sub(self.0) as i32 >= 0
    }
}

/// Number of ticks covering at least `ms` milliseconds.
pub fn ms_to_ticks(ms: u32) -> u32 {
    let us = ms as u64 * 1000;
    ((us + TICK_US as u64 - 1) / TICK_US as u64) as u32
}

pub struct TimeBase {
    ticks: Mutex<Cell<u32>>,
    sync_enabled: Mutex<Cell<bool>>,
    sync_level: Mutex<Cell<bool>>,
}

impl TimeBase {
    pub const fn new() -> TimeBase {
        TimeBase {
            ticks: Mutex::new(Cell::new(0)),
            sync_enabled: Mutex::new(Cell::new(false)),
            sync_level: Mutex::new(Cell::new(false)),
        }
    }

    /// Called once per timer period. Returns the new level of the sync
    /// line when it has to be toggled.
    pub fn on_tick(&self, cs: CriticalSection) -> Option<bool> {
        let ticks = self.ticks.borrow(cs);
        ticks.set(ticks.get().wrapping_add(1));
        if self.sync_enabled.borrow(cs).get() {
            let level = self.sync_level.borrow(cs);
            level.set(!level.get());
            Some(level.get())
        } else {
            None
        }
    }

    pub fn now_cs(&self, cs: CriticalSection) -> Ticks {
        Ticks(self.ticks.borrow(cs).get())
    }

    pub fn now(&self) -> Ticks {
        critical_section::with(|cs| self.now_cs(cs))
    }

    pub fn set_sync_enabled(&self, cs: CriticalSection, enabled: bool) {
        self.sync_enabled.borrow(cs).set(enabled);
    }

    pub fn sync_enabled(&self, cs: CriticalSection) -> bool {
        self.sync_enabled.borrow(cs).get()
    }

    /// Block the foreground until `deadline`, handing each idle turn to
    /// the hal. Interrupts keep running, nothing else does.
    pub fn wait_until<H: BusHal>(&self, deadline: Deadline, hal: &mut H) {
        while !deadline.reached(self.now()) {
            hal.idle();
        }
    }

    /// Block for at least `ticks` whole periods. The current period is
    /// partly gone already, hence the extra tick.
    pub fn wait_ticks<H: BusHal>(&self, ticks: u32, hal: &mut H) {
        let deadline = Deadline::after(self.now(), ticks.wrapping_add(1));
        self.wait_until(deadline, hal);
    }

    pub fn wait_ms<H: BusHal>(&self, ms: u32, hal: &mut H) {
        self.wait_ticks(ms_to_ticks(ms), hal);
    }
}
