//! all state shared between interrupt handlers and the foreground
//!
//! One `Controller` lives in a static on the target. The interrupt entry
//! points below each take their own critical section, which on AVR is
//! free since handlers already run with interrupts off.

use embedded_hal::digital::v2::OutputPin;

use crate::config::RESET_DURATION;
use crate::control::{ControlCommand, ControlPlane};
use crate::relay::{Edge, Relay};
use crate::slots::DispenserSlot;
use crate::time::TimeBase;

pub struct Controller {
    time: TimeBase,
    relay: Relay,
    control: ControlPlane,
}

impl Controller {
    pub const fn new() -> Controller {
        Controller::with_min_pulse(RESET_DURATION)
    }

    /// Controller whose response filter needs pulses of `ticks` ticks.
    pub const fn with_min_pulse(ticks: u32) -> Controller {
        Controller {
            time: TimeBase::new(),
            relay: Relay::new(ticks),
            control: ControlPlane::new(),
        }
    }

    pub fn time(&self) -> &TimeBase {
        &self.time
    }

    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    //==========================================================
    // interrupt entry points

    /// Timer overflow. Returns the level to put on the sync line, if any.
    pub fn timer_tick(&self) -> Option<bool> {
        critical_section::with(|cs| self.time.on_tick(cs))
    }

    /// Pin change on the host input.
    pub fn host_edge<P: OutputPin>(&self, level: bool, dispenser_tx: &mut P) -> Edge {
        critical_section::with(|cs| self.relay.host_edge(cs, level, dispenser_tx))
    }

    /// Pin change on dispenser input `line`.
    pub fn dispenser_edge<P: OutputPin>(&self, line: usize, level: bool, host_tx: &mut P) -> Edge {
        critical_section::with(|cs| {
            let now = self.time.now_cs(cs);
            let active = self.control.active_slot(cs);
            self.relay.dispenser_edge(cs, line, level, now, active, host_tx)
        })
    }

    /// Byte received on the control channel.
    pub fn control_byte(&self, byte: u8) -> ControlCommand {
        critical_section::with(|cs| self.control.receive(cs, byte))
    }

    //==========================================================
    // foreground

    /// Back to the pre-enumeration state: no sync, nothing selectable,
    /// fresh slot table.
    pub fn begin_session(&self) {
        critical_section::with(|cs| {
            self.time.set_sync_enabled(cs, false);
            self.control.latch_device_count(cs, 0);
            self.relay.reset_slots(cs);
        });
    }

    /// Latch the device count and start the sync pulse, together.
    pub fn go_operational(&self, device_count: u8) {
        critical_section::with(|cs| {
            self.control.latch_device_count(cs, device_count);
            self.time.set_sync_enabled(cs, true);
        });
    }

    pub fn reset_requested(&self) -> bool {
        critical_section::with(|cs| self.control.reset_requested(cs))
    }

    pub fn take_reset_request(&self) -> bool {
        critical_section::with(|cs| self.control.take_reset_request(cs))
    }

    pub fn enumeration_active(&self) -> bool {
        critical_section::with(|cs| self.relay.enumeration_mode(cs))
    }

    pub fn device_count(&self) -> u8 {
        critical_section::with(|cs| self.control.device_count(cs))
    }

    pub fn active_slot(&self) -> u8 {
        critical_section::with(|cs| self.control.active_slot(cs))
    }

    pub fn sync_enabled(&self) -> bool {
        critical_section::with(|cs| self.time.sync_enabled(cs))
    }

    /// State of the line holding `slot` in the current session.
    pub fn slot(&self, slot: u8) -> Option<DispenserSlot> {
        self.relay.with_slots(|t| t.by_slot(slot).copied())
    }
}
