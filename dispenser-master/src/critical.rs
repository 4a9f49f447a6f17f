//! `critical-section` implementation for the ATmega328P
//!
//! The bus core guards its shared state with `critical_section::with`.  Here that means
//! masking interrupts and putting the I bit of SREG back the way it was, so the same
//! code runs from the foreground and from inside an interrupt handler.

use avr_device::{atmega328p::CPU, interrupt};

// global interrupt enable bit of SREG
const SREG_I: u8 = 1 << 7;

struct AvrCriticalSection;
critical_section::set_impl!(AvrCriticalSection);

unsafe impl critical_section::Impl for AvrCriticalSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
	let sreg = (*CPU::ptr()).sreg.read().bits();
	interrupt::disable();
	sreg & SREG_I != 0
    }

    unsafe fn release(was_enabled: critical_section::RawRestoreState) {
	if was_enabled {
	    interrupt::enable();
	}
    }
}
