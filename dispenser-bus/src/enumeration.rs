//! address discovery on the dispenser bus
//!
//! Every candidate address 0..=254 is broadcast as one byte. A dispenser
//! that owns the address answers with a pulse on its own input line,
//! which the relay (switched to capture mode) qualifies by width. Each
//! line that answers takes the next slot index, so slots run 0..N-1 in
//! ascending address order. After the scan the master broadcasts
//!
//! ```text
//! 255 (address, slot) (address, slot) ... 255
//! ```
//!
//! so that each dispenser learns its slot index.

use crate::config::{ENUMERATION_SETTLE_MS, FRAME_GAP_MS, LAST_CANDIDATE, MAX_SLOTS, SENTINEL};
use crate::controller::Controller;
use crate::event::Event;
use crate::hal::BusHal;
use crate::relay::Relay;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnumerationReport {
    pub device_count: u8,
    /// Mask of input lines that shared their address with another line.
    pub collisions: u16,
    /// Address of each slot, by slot index.
    pub addresses: [Option<u8>; MAX_SLOTS],
    /// Input line of each slot, by slot index.
    pub lines: [Option<u8>; MAX_SLOTS],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnumerationOutcome {
    Complete(EnumerationReport),
    /// A reset was requested mid-scan, nothing was assigned.
    Aborted,
}

// Capture mode for the lifetime of the guard, cleared again on every way out.
struct CaptureMode<'a> {
    relay: &'a Relay,
}

impl<'a> CaptureMode<'a> {
    fn enter(relay: &'a Relay) -> CaptureMode<'a> {
        critical_section::with(|cs| relay.set_enumeration_mode(cs, true));
        CaptureMode { relay }
    }
}

impl<'a> Drop for CaptureMode<'a> {
    fn drop(&mut self) {
        critical_section::with(|cs| self.relay.set_enumeration_mode(cs, false));
    }
}

/// One full scan and assignment pass.
pub fn run<H: BusHal>(controller: &Controller, hal: &mut H) -> EnumerationOutcome {
    hal.enter_serial_mode();
    let _capture = CaptureMode::enter(controller.relay());
    let outcome = scan_and_assign(controller, hal);
    hal.restore_idle();
    outcome
}

fn scan_and_assign<H: BusHal>(controller: &Controller, hal: &mut H) -> EnumerationOutcome {
    let relay = controller.relay();
    let time = controller.time();

    critical_section::with(|cs| relay.reset_slots(cs));

    let mut collisions = 0u16;
    for address in 0..=LAST_CANDIDATE {
        relay.with_slots(|t| t.clear_pending());
        hal.transmit(address);
        time.wait_ms(ENUMERATION_SETTLE_MS, hal);

        let claim = relay.with_slots(|t| t.claim_pending(address));
        for line in 0..MAX_SLOTS {
            if claim.lines & (1 << line) == 0 {
                continue;
            }
            if let Some(slot) = relay.line(line).and_then(|l| l.slot_index) {
                hal.log(Event::Discovered {
                    line: line as u8,
                    slot,
                    address,
                });
            }
        }
        if claim.is_collision() {
            collisions |= claim.lines;
            hal.log(Event::Collision {
                address,
                lines: claim.lines,
            });
        }

        if controller.reset_requested() {
            hal.log(Event::ScanAborted { address });
            return EnumerationOutcome::Aborted;
        }
    }

    let mut report = EnumerationReport {
        device_count: 0,
        collisions,
        addresses: [None; MAX_SLOTS],
        lines: [None; MAX_SLOTS],
    };
    relay.with_slots(|t| {
        report.device_count = t.discovered_count();
        for entry in t.iter() {
            if let (Some(slot), Some(address)) = (entry.slot_index, entry.discovered_address) {
                report.addresses[slot as usize] = Some(address);
                report.lines[slot as usize] = Some(entry.line);
            }
        }
    });

    time.wait_ms(FRAME_GAP_MS, hal);
    hal.transmit(SENTINEL);
    time.wait_ms(FRAME_GAP_MS, hal);

    for (slot, address) in report.addresses.iter().enumerate() {
        if let Some(address) = *address {
            hal.transmit(address);
            hal.transmit(slot as u8);
        }
    }

    time.wait_ms(FRAME_GAP_MS, hal);
    hal.transmit(SENTINEL);
    time.wait_ms(FRAME_GAP_MS, hal);

    hal.log(Event::Assigned {
        devices: report.device_count,
    });
    EnumerationOutcome::Complete(report)
}
