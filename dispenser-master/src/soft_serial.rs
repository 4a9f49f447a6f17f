//! bit-banged 8N1 transmitter on the shared dispenser line
//!
//! Used only while enumerating; the relay owns the line the rest of the time.
//! USART0 stays free for the debug port.

use core::convert::Infallible;

use crate::relay_pins::with_relay_pins;

pub const DISPENSER_BAUD: u32 = 9600;
const BIT_TIME_US: u16 = (1_000_000 / DISPENSER_BAUD) as u16;

pub struct SoftSerialTx;

impl SoftSerialTx {
    fn send_bit(level: bool) {
	with_relay_pins(|rp, cs| rp.drive_dispenser_tx(level, cs));
	bus_master_board::delay_us(BIT_TIME_US);
    }
}

impl embedded_hal::serial::Write<u8> for SoftSerialTx {
    type Error = Infallible;

    /// Blocks for the whole frame, never returns `WouldBlock`.
    fn write(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
	// start bit, LSB first, stop bit
	Self::send_bit(false);
	for bit in 0..8 {
	    Self::send_bit(byte & (1 << bit) != 0);
	}
	Self::send_bit(true);
	Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
	Ok(())
    }
}
