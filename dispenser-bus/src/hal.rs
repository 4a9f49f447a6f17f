/// What the foreground protocol needs from the board.
///
/// The interrupt side (edges, timer, control bytes) does not go through
/// this trait; the firmware feeds those straight into the `Controller`.
pub trait BusHal {
    /// Drive the shared reset line, high while `asserted`.
    fn set_reset(&mut self, asserted: bool);

    /// Hand the shared dispenser line to the byte transmitter.
    fn enter_serial_mode(&mut self);

    /// Send one byte to every dispenser. Returns once the stop bit is out.
    fn transmit(&mut self, byte: u8);

    /// Give the line back to the relay, with the dispenser and host
    /// outputs driven to their idle high level.
    fn restore_idle(&mut self);

    /// One turn of a cooperative wait. Typically sleeps until the next
    /// interrupt.
    fn idle(&mut self);

    /// Diagnostic output, dropped by default.
    fn log(&mut self, _event: crate::event::Event) {}

    /// Visible indication for the operator (LEDs), none by default.
    fn indicate(&mut self, _indication: crate::event::Indication) {}
}
