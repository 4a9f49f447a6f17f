//! TWI (I2C) slave receiver carrying the host's control bytes

use avr_device::interrupt;
use bus_master_board::hal as hal;
use hal::port::mode::{Input, Floating};
use dispenser_bus::config::TWI_SLAVE_ADDRESS;

// TWCR bits
const TWINT: u8 = 1 << 7;
const TWEA: u8 = 1 << 6;
const TWSTO: u8 = 1 << 4;
const TWEN: u8 = 1 << 2;
const TWIE: u8 = 1 << 0;

// TWSR status, prescaler bits masked off
const TW_STATUS_MASK: u8 = 0xF8;
const TW_SR_DATA_ACK: u8 = 0x80;
const TW_BUS_ERROR: u8 = 0x00;

pub struct TwiState {
    twi: avr_device::atmega328p::TWI,
    _sda: hal::port::portc::PC4<Input<Floating>>,
    _scl: hal::port::portc::PC5<Input<Floating>>,
}

impl TwiState {

    pub fn new(twidev: avr_device::atmega328p::TWI,
	       sdapin: hal::port::portc::PC4<Input<Floating>>,
	       sclpin: hal::port::portc::PC5<Input<Floating>>) -> TwiState {
	TwiState {
	    twi: twidev,
	    _sda: sdapin,
	    _scl: sclpin,
	}
    }

    pub fn initialize(&mut self, _cs: &interrupt::CriticalSection) {
	unsafe {
	    self.twi.twar.write(|w| w.bits(TWI_SLAVE_ADDRESS << 1));
	    self.twi.twdr.write(|w| w.bits(0));
	    self.twi.twcr.write(|w| w.bits(TWEN | TWIE | TWEA));
	}
    }

    /// Service one TWI interrupt.  Returns the data byte if this
    /// interrupt carried one addressed to us.
    pub fn twi_interrupt(&mut self, _cs: &interrupt::CriticalSection) -> Option<u8> {
	let status = self.twi.twsr.read().bits() & TW_STATUS_MASK;
	let recvd = match status {
	    TW_SR_DATA_ACK => Some(self.twi.twdr.read().bits()),
	    _ => None,
	};
	// a bus error only clears with a STOP
	let stop = if status == TW_BUS_ERROR { TWSTO } else { 0 };
	unsafe {
	    self.twi.twcr.write(|w| w.bits(TWINT | TWEA | TWEN | TWIE | stop));
	}
	recvd
    }
}

// required to allow static state
unsafe impl Sync for TwiState {}
