//! firmware for the dispenser bus master
//! Discovers the dispensers sharing the bus, gives each a slot, then
//! relays the host's serial line to all of them while only the selected
//! dispenser is echoed back.  The host selects a dispenser or resets the
//! bus over TWI.

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]

#[cfg(not(debug_assertions))]
extern crate panic_halt;

use avr_device::interrupt;
use core::ops::DerefMut;
use core::cell::RefCell;

#[cfg(debug_assertions)]
use ufmt;

use bus_master_board::prelude::*;
use bus_master_board::hal as hal;
use bus_master_board::{DISPENSER_RX_PCINT, HOST_RX_PCINT, RELAY_PCIE};
#[cfg(debug_assertions)]
use hal::port::mode::Floating;

use dispenser_bus::{Controller, Supervisor};

//==========================================================

mod critical;

#[cfg(debug_assertions)]
mod utility;

mod board;
use crate::board::Board;

mod soft_serial;

//==========================================================
// Bus state, shared by every handler and the foreground

static CONTROLLER: Controller = Controller::new();

//==========================================================

mod relay_pins;
use crate::relay_pins::{with_relay_pins, RelayPins};

static RELAYPINSHANDLE: interrupt::Mutex<RefCell<Option<RelayPins>>> =
    interrupt::Mutex::new(RefCell::new(None));

//==========================================================

mod tick;
use crate::tick::TickState;

static TICKSTATEHANDLE: interrupt::Mutex<RefCell<Option<TickState>>> =
    interrupt::Mutex::new(RefCell::new(None));

//==========================================================

mod twi;
use crate::twi::TwiState;

static TWISTATEHANDLE: interrupt::Mutex<RefCell<Option<TwiState>>> =
    interrupt::Mutex::new(RefCell::new(None));

//==========================================================

#[hal::entry]
fn main() -> ! {
    let dp = bus_master_board::Peripherals::take().unwrap();

    let mut pins = bus_master_board::Pins::new(dp.PORTB, dp.PORTC, dp.PORTD);

    // LED, output
    let led = pins.led.into_output(&mut pins.ddr);

    // RESET, output, dispensers run while low
    let mut reset = pins.reset.into_output(&mut pins.ddr);
    reset.set_low().void_unwrap();

    // SYNC, output, driven by the tick once operational
    let sync = pins.sync.into_output(&mut pins.ddr);

    // serial lines idle high
    let mut host_tx = pins.host_tx.into_output(&mut pins.ddr);
    host_tx.set_high().void_unwrap();
    let mut dispenser_tx = pins.disp_tx.into_output(&mut pins.ddr);
    dispenser_tx.set_high().void_unwrap();

    let mut relay_pins = RelayPins::new(
	pins.host_rx,
	host_tx,
	dispenser_tx,
	pins.disp0_rx,
	pins.disp1_rx,
    );

    let mut tick_state = TickState::new(dp.TC1, sync);
    let mut twi_state = TwiState::new(dp.TWI, pins.sda, pins.scl);

    // setup serial
    #[cfg(debug_assertions)]
    let mut serial = bus_master_board::Serial::<Floating>::new(
	dp.USART0,
	pins.rx,
	pins.tx.into_output(&mut pins.ddr),
	57600.into_baudrate(),
    );

    // pin change interrupts on the host line and both dispenser lines
    let exint = dp.EXINT;
    exint.pcmsk0.write(|w| unsafe { w.bits(HOST_RX_PCINT) });
    exint.pcmsk2.write(|w| unsafe {
	w.bits(DISPENSER_RX_PCINT[0] | DISPENSER_RX_PCINT[1])
    });

    interrupt::free(|cs| {
	// the relay compares against the last level it saw, so give it
	// the idle levels before the first pin change
	relay_pins.host_changed(cs);
	relay_pins.dispensers_changed(cs);
	// transfer to static variable
	RELAYPINSHANDLE.borrow(cs).replace(Some(relay_pins));

	tick_state.initialize(cs);
	TICKSTATEHANDLE.borrow(cs).replace(Some(tick_state));

	twi_state.initialize(cs);
	TWISTATEHANDLE.borrow(cs).replace(Some(twi_state));

	exint.pcicr.write(|w| unsafe { w.bits(RELAY_PCIE) });
    });

    // enable interrupts
    unsafe {
	interrupt::enable();
    }

    #[cfg(debug_assertions)]
    ufmt::uwriteln!(&mut serial, "\r\nDispenser master start\r").void_unwrap();
    #[cfg(debug_assertions)]
    utility::send_setup(&mut serial);

    #[cfg(debug_assertions)]
    let mut board = Board::new(dp.CPU, reset, led, serial);
    #[cfg(not(debug_assertions))]
    let mut board = Board::new(dp.CPU, reset, led);

    // the bus is reset and enumerated again every time the host asks
    Supervisor::new(&CONTROLLER).run(&mut board)
}

//==========================================================

// interrupt handler for Timer1 overflow, the bus tick
#[interrupt(atmega328p)]
fn TIMER1_OVF() {
    // create unneeded interrupt context for static functions
    // unneeded because we are in interrupt and can't be interrupted
    // again in avr
    interrupt::free(move |cs| {
	let sync = CONTROLLER.timer_tick();
	if let Some(ref mut ts) = TICKSTATEHANDLE.borrow(cs).borrow_mut().deref_mut() {
	    ts.timer1_overflow(sync, cs);
	}
    });
}

//==========================================================

// interrupt handler for pin change on the host line
#[interrupt(atmega328p)]
fn PCINT0() {
    with_relay_pins(|rp, cs| rp.host_changed(cs));
}

//==========================================================

// interrupt handler for pin change on the dispenser lines
#[interrupt(atmega328p)]
fn PCINT2() {
    with_relay_pins(|rp, cs| rp.dispensers_changed(cs));
}

//==========================================================

// interrupt handler for TWI, control bytes from the host
#[interrupt(atmega328p)]
fn TWI() {
    interrupt::free(move |cs| {
	if let Some(ref mut ts) = TWISTATEHANDLE.borrow(cs).borrow_mut().deref_mut() {
	    if let Some(byte) = ts.twi_interrupt(cs) {
		CONTROLLER.control_byte(byte);
	    }
	}
    });
}
