//! reset pulse on the shared dispenser reset line

use crate::config::{RESET_DURATION, STARTUP_SETTLE_MS};
use crate::hal::BusHal;
use crate::time::{ms_to_ticks, TimeBase};

pub struct ResetSequencer {
    pulse_ticks: u32,
    settle_ticks: u32,
}

impl ResetSequencer {
    pub fn new() -> ResetSequencer {
        ResetSequencer {
            pulse_ticks: 2 * RESET_DURATION,
            settle_ticks: ms_to_ticks(STARTUP_SETTLE_MS),
        }
    }

    pub fn pulse_ticks(&self) -> u32 {
        self.pulse_ticks
    }

    /// Pulse the reset line, then wait for the dispensers to boot. Leaves
    /// the line low.
    pub fn run<H: BusHal>(&self, time: &TimeBase, hal: &mut H) {
        hal.set_reset(true);
        time.wait_ticks(self.pulse_ticks, hal);
        hal.set_reset(false);
        time.wait_ticks(self.settle_ticks, hal);
    }
}

impl Default for ResetSequencer {
    fn default() -> Self {
        ResetSequencer::new()
    }
}
