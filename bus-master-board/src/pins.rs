use crate::hal::port::PortExt;

/// PCMSK0 bit of the host receive line
pub const HOST_RX_PCINT: u8 = 1 << 0;
/// PCMSK2 bits of the dispenser receive lines, in line order
pub const DISPENSER_RX_PCINT: [u8; 2] = [1 << 3, 1 << 4];
/// PCICR bits enabling the pin change groups of the host and dispenser lines
pub const RELAY_PCIE: u8 = (1 << 0) | (1 << 2);

avr_hal_generic::impl_board_pins! {
    #[port_defs]
    use crate::hal::port;

    /// Generic DDR that works for all ports
    pub struct DDR {
        portb: crate::pac::PORTB,
        portc: crate::pac::PORTC,
        portd: crate::pac::PORTD,
    }

    /// Reexport of the bus master's pins, with the names of what they drive
    ///
    /// Not pin-compatible with earlier master boards, which had the reset line
    /// on PD2 and the shared dispenser line on PD1 (USART TXD). Here PD0/PD1 carry
    /// the debug port, `DISP_TX` is bit-banged on PD2 and `RESET` moved to PD6.
    pub struct Pins {
        /// `HOST_RX`
        ///
        /// * bitstream from the host, relayed to the dispensers
        /// * PCINT0 (pin change interrupt 0)
        pub host_rx: portb::pb0::PB0,
        /// `HOST_TX`
        ///
        /// * echo of the selected dispenser back to the host
        pub host_tx: portb::pb1::PB1,
        /// `LED`
        ///
        pub led: portb::pb5::PB5,

        /// `SDA`
        ///
        /// * control channel from the host, 2-wire serial bus data line
        pub sda: portc::pc4::PC4,
        /// `SCL`
        ///
        /// * control channel from the host, 2-wire serial bus clock line
        pub scl: portc::pc5::PC5,

        /// `RX`
        ///
        /// * debug serial input
        pub rx: portd::pd0::PD0,
        /// `TX`
        ///
        /// * debug serial output
        pub tx: portd::pd1::PD1,
        /// `DISP_TX`
        ///
        /// * shared line to every dispenser
        pub disp_tx: portd::pd2::PD2,
        /// `DISP0_RX`
        ///
        /// * dispenser input line 0
        /// * PCINT19 (pin change interrupt 19)
        pub disp0_rx: portd::pd3::PD3,
        /// `DISP1_RX`
        ///
        /// * dispenser input line 1
        /// * PCINT20 (pin change interrupt 20)
        pub disp1_rx: portd::pd4::PD4,
        /// `RESET`
        ///
        /// * shared reset line, active high
        pub reset: portd::pd6::PD6,
        /// `SYNC`
        ///
        /// * square wave toggled every tick while relaying
        pub sync: portd::pd7::PD7,
    }
}
