//! register dumps for the debug serial port
//! These functions are only used in debug builds

use bus_master_board::prelude::*;
use bus_master_board::hal as hal;
use hal::port::mode::Floating;

// memory mapped addresses of the registers set up at bring-up
pub const TCCR1B: u8 = 0x81;
pub const TIMSK1: u8 = 0x6F;
pub const PCICR: u8 = 0x68;
pub const PCMSK0: u8 = 0x6B;
pub const PCMSK2: u8 = 0x6D;
pub const TWAR: u8 = 0xBA;
pub const TWCR: u8 = 0xBC;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

pub fn send_hex_byte(serial: &mut bus_master_board::Serial<Floating>, b: u8) {
    let hi = HEX_DIGITS[(b >> 4) as usize] as char;
    let lo = HEX_DIGITS[(b & 0xF) as usize] as char;
    ufmt::uwrite!(serial, "{}{}", hi, lo).void_unwrap();
}

pub fn send_reg(serial: &mut bus_master_board::Serial<Floating>, name: &str, addr: u8) {
    let b = unsafe { core::ptr::read_volatile(addr as *const u8) };
    ufmt::uwrite!(serial, "{}:", name).void_unwrap();
    send_hex_byte(serial, b);
    ufmt::uwriteln!(serial, "\r").void_unwrap();
}

/// the peripheral setup the relay and control channel depend on
pub fn send_setup(serial: &mut bus_master_board::Serial<Floating>) {
    send_reg(serial, "tccr1b", TCCR1B);
    send_reg(serial, "timsk1", TIMSK1);
    send_reg(serial, "pcicr", PCICR);
    send_reg(serial, "pcmsk0", PCMSK0);
    send_reg(serial, "pcmsk2", PCMSK2);
    send_reg(serial, "twar", TWAR);
    send_reg(serial, "twcr", TWCR);
}
