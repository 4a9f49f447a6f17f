//! pins owned by the pin change handlers

use core::ops::DerefMut;
use avr_device::interrupt;
use bus_master_board::prelude::*;
use bus_master_board::hal as hal;
use hal::port::mode::{Input, Floating, Output};

use crate::{CONTROLLER, RELAYPINSHANDLE};

pub struct RelayPins {
    host_rx: hal::port::portb::PB0<Input<Floating>>,
    host_tx: hal::port::portb::PB1<Output>,
    dispenser_tx: hal::port::portd::PD2<Output>,
    dispenser0_rx: hal::port::portd::PD3<Input<Floating>>,
    dispenser1_rx: hal::port::portd::PD4<Input<Floating>>,
}

impl RelayPins {
    pub fn new(host_rx: hal::port::portb::PB0<Input<Floating>>,
	       host_tx: hal::port::portb::PB1<Output>,
	       dispenser_tx: hal::port::portd::PD2<Output>,
	       dispenser0_rx: hal::port::portd::PD3<Input<Floating>>,
	       dispenser1_rx: hal::port::portd::PD4<Input<Floating>>) -> RelayPins {
	RelayPins {
	    host_rx,
	    host_tx,
	    dispenser_tx,
	    dispenser0_rx,
	    dispenser1_rx,
	}
    }

    /// PCINT0: the host line changed
    pub fn host_changed(&mut self, _cs: &interrupt::CriticalSection) {
	let level = self.host_rx.is_high().void_unwrap();
	CONTROLLER.host_edge(level, &mut self.dispenser_tx);
    }

    /// PCINT2: one or more dispenser lines changed, the controller
    /// sorts out which
    pub fn dispensers_changed(&mut self, _cs: &interrupt::CriticalSection) {
	let levels = [
	    self.dispenser0_rx.is_high().void_unwrap(),
	    self.dispenser1_rx.is_high().void_unwrap(),
	];
	for (line, &level) in levels.iter().enumerate() {
	    CONTROLLER.dispenser_edge(line, level, &mut self.host_tx);
	}
    }

    /// serial idle level on both outputs
    pub fn idle_high(&mut self, _cs: &interrupt::CriticalSection) {
	self.dispenser_tx.set_high().void_unwrap();
	self.host_tx.set_high().void_unwrap();
    }

    pub fn drive_dispenser_tx(&mut self, level: bool, _cs: &interrupt::CriticalSection) {
	if level {
	    self.dispenser_tx.set_high().void_unwrap();
	} else {
	    self.dispenser_tx.set_low().void_unwrap();
	}
    }
}

/// Run `f` on the relay pins, if they have been handed over yet.
pub fn with_relay_pins<F>(f: F)
where
    F: FnOnce(&mut RelayPins, &interrupt::CriticalSection),
{
    interrupt::free(|cs| {
	if let Some(ref mut rp) = RELAYPINSHANDLE.borrow(cs).borrow_mut().deref_mut() {
	    f(rp, cs);
	}
    });
}
