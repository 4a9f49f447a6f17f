#![allow(dead_code)]

use std::convert::Infallible;

use dispenser_bus::config::{RESET_DURATION, SENTINEL};
use dispenser_bus::{BusHal, Controller, Event, Indication, Ticks};
use embedded_hal::digital::v2::OutputPin;

#[derive(Default)]
pub struct Pin {
    pub writes: Vec<bool>,
}

impl OutputPin for Pin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.writes.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.writes.push(true);
        Ok(())
    }
}

/// A dispenser wired to input line `line` that answers `addresses` with
/// a pulse `hold_ticks` long, once `silent_scans` scans have gone by.
pub struct SimDispenser {
    pub line: usize,
    pub addresses: Vec<u8>,
    pub hold_ticks: u32,
    pub silent_scans: usize,
}

impl SimDispenser {
    pub fn new(line: usize, address: u8) -> SimDispenser {
        SimDispenser {
            line,
            addresses: vec![address],
            hold_ticks: RESET_DURATION + 1,
            silent_scans: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WirePhase {
    Scan,
    Assign(Option<u8>),
    Done,
}

/// Bus, dispensers and interrupt sources around one `Controller`. Every
/// idle turn is one timer period.
pub struct SimBus<'a> {
    pub controller: &'a Controller,
    pub dispensers: Vec<SimDispenser>,
    pub wire: Vec<u8>,
    pub assignments: Vec<(u8, u8)>,
    pub events: Vec<Event>,
    pub indications: Vec<Indication>,
    pub reset_trace: Vec<(Ticks, bool)>,
    pub sync_trace: Vec<bool>,
    pub host_tx: Pin,
    pub dispenser_tx: Pin,
    pub serial_mode: bool,
    /// Host sends the sentinel on the control channel once the wire
    /// carries this many bytes.
    pub reset_at_wire_len: Option<usize>,
    /// Host sends the sentinel after this many operational ticks.
    pub reset_after_operational: Option<u32>,
    phase: WirePhase,
    scans: usize,
    scheduled: Vec<(Ticks, usize, bool)>,
    operational_ticks: u32,
    ticks_left: u32,
}

impl<'a> SimBus<'a> {
    pub fn new(controller: &'a Controller, dispensers: Vec<SimDispenser>) -> SimBus<'a> {
        SimBus {
            controller,
            dispensers,
            wire: Vec::new(),
            assignments: Vec::new(),
            events: Vec::new(),
            indications: Vec::new(),
            reset_trace: Vec::new(),
            sync_trace: Vec::new(),
            host_tx: Pin::default(),
            dispenser_tx: Pin::default(),
            serial_mode: false,
            reset_at_wire_len: None,
            reset_after_operational: Some(10),
            phase: WirePhase::Scan,
            scans: 0,
            scheduled: Vec::new(),
            operational_ticks: 0,
            ticks_left: 100_000,
        }
    }

    fn deliver_due(&mut self) {
        let now = self.controller.time().now();
        let mut i = 0;
        while i < self.scheduled.len() {
            let (at, line, level) = self.scheduled[i];
            if now.since(at) as i32 >= 0 {
                self.scheduled.remove(i);
                self.controller.dispenser_edge(line, level, &mut self.host_tx);
            } else {
                i += 1;
            }
        }
    }

    fn answer(&mut self, byte: u8) {
        let now = self.controller.time().now();
        let scans = self.scans;
        let lines: Vec<(usize, u32)> = self
            .dispensers
            .iter()
            .filter(|d| scans > d.silent_scans && d.addresses.contains(&byte))
            .map(|d| (d.line, d.hold_ticks))
            .collect();
        for (line, hold) in lines {
            self.controller.dispenser_edge(line, true, &mut self.host_tx);
            self.scheduled
                .push((Ticks(now.0.wrapping_add(hold)), line, false));
        }
        self.deliver_due();
    }

    pub fn count_resets(&self) -> usize {
        self.reset_trace.iter().filter(|&&(_, level)| level).count()
    }

    pub fn scan_section(&self) -> &[u8] {
        let end = self
            .wire
            .iter()
            .position(|&b| b == SENTINEL)
            .unwrap_or(self.wire.len());
        &self.wire[..end]
    }
}

impl<'a> BusHal for SimBus<'a> {
    fn set_reset(&mut self, asserted: bool) {
        self.reset_trace.push((self.controller.time().now(), asserted));
    }

    fn enter_serial_mode(&mut self) {
        self.serial_mode = true;
        self.phase = WirePhase::Scan;
        self.scans += 1;
    }

    fn transmit(&mut self, byte: u8) {
        assert!(self.serial_mode, "byte {} sent outside serial mode", byte);
        self.wire.push(byte);
        self.phase = match (self.phase, byte) {
            (WirePhase::Scan, SENTINEL) => WirePhase::Assign(None),
            (WirePhase::Scan, address) => {
                self.answer(address);
                WirePhase::Scan
            }
            (WirePhase::Assign(_), SENTINEL) => WirePhase::Done,
            (WirePhase::Assign(None), address) => WirePhase::Assign(Some(address)),
            (WirePhase::Assign(Some(address)), slot) => {
                self.assignments.push((address, slot));
                WirePhase::Assign(None)
            }
            (WirePhase::Done, _) => WirePhase::Done,
        };
        if self.reset_at_wire_len == Some(self.wire.len()) {
            self.controller.control_byte(SENTINEL);
        }
    }

    fn restore_idle(&mut self) {
        self.serial_mode = false;
        self.dispenser_tx.set_high().ok();
        self.host_tx.set_high().ok();
    }

    fn idle(&mut self) {
        assert!(self.ticks_left > 0, "simulation ran out of ticks");
        self.ticks_left -= 1;

        if let Some(level) = self.controller.timer_tick() {
            self.sync_trace.push(level);
        }
        self.deliver_due();

        if self.controller.sync_enabled() {
            self.operational_ticks += 1;
            if self.reset_after_operational == Some(self.operational_ticks) {
                self.controller.control_byte(SENTINEL);
            }
        } else {
            self.operational_ticks = 0;
        }
    }

    fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    fn indicate(&mut self, indication: Indication) {
        self.indications.push(indication);
    }
}
