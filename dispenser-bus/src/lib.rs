//! Timing, relay and enumeration core of the dispenser bus master.
//!
//! The master sits between a host and up to fifteen dispensers that share
//! one serial line and one reset line. It discovers which dispensers are
//! present, gives each a slot index, then relays the host's bitstream to
//! all of them while only the selected dispenser is echoed back.
//!
//! This crate holds everything that does not touch a register. The
//! firmware owns the pins and interrupts and calls into the
//! [`Controller`](controller::Controller) from its interrupt handlers,
//! and implements [`BusHal`](hal::BusHal) for the foreground protocol
//! run by the [`Supervisor`](session::Supervisor).

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod control;
pub mod controller;
pub mod enumeration;
pub mod event;
pub mod hal;
pub mod relay;
pub mod reset;
pub mod session;
pub mod slots;
pub mod time;

pub use crate::control::ControlCommand;
pub use crate::controller::Controller;
pub use crate::enumeration::{EnumerationOutcome, EnumerationReport};
pub use crate::event::{Event, Indication};
pub use crate::hal::BusHal;
pub use crate::relay::Edge;
pub use crate::session::{SessionEnd, Supervisor};
pub use crate::time::{Deadline, Ticks, TimeBase};

#[cfg(test)]
mod test_support {
    use core::convert::Infallible;
    use embedded_hal::digital::v2::OutputPin;

    use crate::controller::Controller;
    use crate::event::Event;
    use crate::hal::BusHal;
    use crate::time::{Ticks, TimeBase};

    #[derive(Default)]
    pub struct RecordingPin {
        pub writes: Vec<bool>,
    }

    impl OutputPin for RecordingPin {
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

    /// Advances the time base by one tick per idle turn, nothing else.
    pub struct TickingHal<'a> {
        pub time: &'a TimeBase,
        pub controller: Option<&'a Controller>,
        pub idles: u32,
        pub reset_trace: Vec<(Ticks, bool)>,
        pub wire: Vec<u8>,
        pub mode_trace: Vec<&'static str>,
        pub events: Vec<Event>,
        pub capture_seen: bool,
    }

    impl<'a> TickingHal<'a> {
        pub fn new(time: &'a TimeBase) -> TickingHal<'a> {
            TickingHal {
                time,
                controller: None,
                idles: 0,
                reset_trace: Vec::new(),
                wire: Vec::new(),
                mode_trace: Vec::new(),
                events: Vec::new(),
                capture_seen: false,
            }
        }
    }

    impl<'a> BusHal for TickingHal<'a> {
        fn set_reset(&mut self, asserted: bool) {
            self.reset_trace.push((self.time.now(), asserted));
        }

        fn enter_serial_mode(&mut self) {
            self.mode_trace.push("serial");
        }

        fn transmit(&mut self, byte: u8) {
            if let Some(controller) = self.controller {
                self.capture_seen |= controller.enumeration_active();
            }
            self.wire.push(byte);
        }

        fn restore_idle(&mut self) {
            self.mode_trace.push("idle");
        }

        fn idle(&mut self) {
            self.idles += 1;
            critical_section::with(|cs| {
                self.time.on_tick(cs);
            });
        }

        fn log(&mut self, event: Event) {
            self.events.push(event);
        }
    }
}
