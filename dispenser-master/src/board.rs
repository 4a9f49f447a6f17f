//! the bus master board as seen by the foreground protocol

use bus_master_board::prelude::*;
use bus_master_board::hal as hal;
#[cfg(debug_assertions)]
use hal::port::mode::Floating;
use hal::port::mode::Output;
use embedded_hal::serial::Write;

use dispenser_bus::{BusHal, Event, Indication};

use crate::relay_pins::with_relay_pins;
use crate::soft_serial::SoftSerialTx;

const FLASH_COUNT: u8 = 5;
const FAST_FLASH_MS: u16 = 50;
const SLOW_FLASH_MS: u16 = 250;

pub struct Board {
    cpu: bus_master_board::pac::CPU,
    reset: hal::port::portd::PD6<Output>,
    led: hal::port::portb::PB5<Output>,
    tx: SoftSerialTx,
    #[cfg(debug_assertions)]
    serial: bus_master_board::Serial<Floating>,
}

impl Board {
    pub fn new(cpu: bus_master_board::pac::CPU,
	       reset: hal::port::portd::PD6<Output>,
	       led: hal::port::portb::PB5<Output>,
	       #[cfg(debug_assertions)]
	       serial: bus_master_board::Serial<Floating>) -> Board {
	// idle sleep keeps timer, pin change and TWI interrupts running
	cpu.smcr.write(|w| w.sm().idle());
	Board {
	    cpu,
	    reset,
	    led,
	    tx: SoftSerialTx,
	    #[cfg(debug_assertions)]
	    serial,
	}
    }

    fn flash_led(&mut self, period_ms: u16) {
	for _ in 0..FLASH_COUNT {
	    self.led.set_high().void_unwrap();
	    bus_master_board::delay_ms(period_ms);
	    self.led.set_low().void_unwrap();
	    bus_master_board::delay_ms(period_ms);
	}
    }
}

impl BusHal for Board {
    fn set_reset(&mut self, asserted: bool) {
	if asserted {
	    self.reset.set_high().void_unwrap();
	} else {
	    self.reset.set_low().void_unwrap();
	}
    }

    fn enter_serial_mode(&mut self) {
	with_relay_pins(|rp, cs| rp.drive_dispenser_tx(true, cs));
    }

    fn transmit(&mut self, byte: u8) {
	nb::block!(self.tx.write(byte)).ok();
    }

    fn restore_idle(&mut self) {
	with_relay_pins(|rp, cs| rp.idle_high(cs));
    }

    fn idle(&mut self) {
	// any interrupt wakes us, the next tick at the latest
	self.cpu.smcr.modify(|_, w| w.se().set_bit());
	avr_device::asm::sleep();
	self.cpu.smcr.modify(|_, w| w.se().clear_bit());
    }

    fn log(&mut self, event: Event) {
	#[cfg(debug_assertions)]
	ufmt::uwriteln!(&mut self.serial, "{}\r", event).void_unwrap();
	#[cfg(not(debug_assertions))]
	let _ = event;
    }

    fn indicate(&mut self, indication: Indication) {
	match indication {
	    Indication::SessionStart => self.flash_led(FAST_FLASH_MS),
	    Indication::NoDispensers => {
		self.flash_led(SLOW_FLASH_MS);
		self.flash_led(SLOW_FLASH_MS);
	    }
	}
    }
}

