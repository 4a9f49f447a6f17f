//! Board Support Crate for the dispenser bus master board.
//!
//! This crate provides abstractions for interfacing with the hardware of the bus master.  It
//! re-exports functionality from the underlying HAL in ways that make more sense for this
//! particular board.  The pins are named by what they are wired to (host link, dispenser
//! lines, reset and sync outputs) instead of the MCU names.
//!
//! The board runs an ATmega328P from an 8MHz resonator.  Boards fitted with a 16MHz crystal
//! are built with the `clock-16mhz` feature, which changes the delay and serial clock as well
//! as the timer reload used for the 1.024ms bus tick.
//!
//! # Getting Started
//! A rough skeleton for an application looks like this:
//!
//! ```no_run
//! #![no_std]
//! #![no_main]
//!
//! use bus_master_board::prelude::*;
//!
//! #[bus_master_board::entry]
//! fn main() -> ! {
//!     let dp = bus_master_board::Peripherals::take().unwrap();
//!     let mut pins = bus_master_board::Pins::new(dp.PORTB, dp.PORTC, dp.PORTD);
//!
//!     let mut led = pins.led.into_output(&mut pins.ddr);
//!     loop {
//!         led.toggle().void_unwrap();
//!         bus_master_board::delay_ms(500);
//!     }
//! }
//! ```

#![no_std]

// Expose hal & pac crates
pub use atmega328p_hal as hal;
pub use crate::hal::pac;

/// See [`avr_device::entry`](https://docs.rs/avr-device/latest/avr_device/attr.entry.html).
pub use crate::hal::entry;

pub use crate::pac::Peripherals;

mod pins;
pub use crate::pins::*;

pub mod prelude {
    pub use crate::hal::prelude::*;
    pub use crate::hal::usart::BaudrateArduinoExt as _;
}

/// Core clock of the board
#[cfg(not(feature = "clock-16mhz"))]
pub type Clock = hal::clock::MHz8;
/// Core clock of the board
#[cfg(feature = "clock-16mhz")]
pub type Clock = hal::clock::MHz16;

/// TCNT1 reload value giving an overflow every 1.024ms with the CK/1024 prescaler
#[cfg(not(feature = "clock-16mhz"))]
pub const TIMER1_RELOAD: u16 = 0xFFF7;
/// TCNT1 reload value giving an overflow every 1.024ms with the CK/1024 prescaler
#[cfg(feature = "clock-16mhz")]
pub const TIMER1_RELOAD: u16 = 0xFFEF;

#[cfg(debug_assertions)]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    use prelude::*;

    // the firmware owns USART0 in debug builds; it is already configured
    let mut serial: Serial<hal::port::mode::Floating> =
        unsafe { core::mem::MaybeUninit::uninit().assume_init() };

    ufmt::uwriteln!(&mut serial, "Firmware panic!\r").void_unwrap();

    if let Some(loc) = info.location() {
        ufmt::uwriteln!(
            &mut serial,
            "  At {}:{}:{}\r",
            loc.file(),
            loc.line(),
            loc.column(),
        )
        .void_unwrap();
    }

    loop {}
}

/// Busy-Delay
///
/// **Note**: For just delaying, using [`bus_master_board::delay_ms()`][delay_ms] or
/// [`bus_master_board::delay_us()`][delay_us] is probably the better choice.  This type is more
/// useful when an `embedded-hal` driver needs a delay implementation.
///
/// [delay_ms]: fn.delay_ms.html
/// [delay_us]: fn.delay_us.html
pub type Delay = hal::delay::Delay<Clock>;

/// Wait (busy spin) for `ms` milliseconds
pub fn delay_ms(ms: u16) {
    use prelude::*;

    Delay::new().delay_ms(ms)
}

/// Wait (busy spin) for `us` microseconds
pub fn delay_us(us: u16) {
    use prelude::*;

    Delay::new().delay_us(us)
}

/// Debug serial (UART) interface on pins `RX` and `TX`
///
/// Only used for diagnostics; the host and dispenser links are the
/// bit-level relay pins, not the USART.
///
/// ```no_run
/// let dp = bus_master_board::Peripherals::take().unwrap();
///
/// let mut pins = bus_master_board::Pins::new(dp.PORTB, dp.PORTC, dp.PORTD);
///
/// let mut serial = bus_master_board::Serial::new(
///     dp.USART0,
///     pins.rx,
///     pins.tx.into_output(&mut pins.ddr),
///     57600.into_baudrate(),
/// );
///
/// ufmt::uwriteln!(&mut serial, "bus master up\r").void_unwrap();
/// ```
pub type Serial<IMODE> = hal::usart::Usart0<Clock, IMODE>;
