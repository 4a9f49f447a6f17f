//! Timer1 bus tick and the sync output

use avr_device::interrupt;
use bus_master_board::prelude::*;
use bus_master_board::hal as hal;
use bus_master_board::TIMER1_RELOAD;
use hal::port::mode::Output;

pub struct TickState {
    timer: avr_device::atmega328p::TC1,
    sync: hal::port::portd::PD7<Output>,
}

impl TickState {
    pub fn new(timer1: avr_device::atmega328p::TC1,
	       syncpin: hal::port::portd::PD7<Output>) -> TickState {
	TickState {
	    timer: timer1,
	    sync: syncpin,
	}
    }

    /// CK/1024, preloaded so the overflow comes every 1.024ms
    pub fn initialize(&mut self, _cs: &interrupt::CriticalSection) {
	self.sync.set_low().void_unwrap();
	self.timer.tccr1b.write(|w| w.cs1().prescale_1024());
	self.reload();
	self.timer.timsk1.write(|w| w.toie1().set_bit());
    }

    fn reload(&mut self) {
	self.timer.tcnt1.write(|w| unsafe { w.bits(TIMER1_RELOAD) });
    }

    /// `sync` is what the controller wants on the sync line this tick,
    /// `None` while the sync pulse is off
    pub fn timer1_overflow(&mut self, sync: Option<bool>, _cs: &interrupt::CriticalSection) {
	match sync {
	    Some(true) => self.sync.set_high().void_unwrap(),
	    Some(false) => self.sync.set_low().void_unwrap(),
	    None => (),
	}
	self.reload();
    }
}

// required to allow static state
unsafe impl Sync for TickState {}
