//! Build-time constants for the dispenser bus.
//!
//! Nothing here is configurable at runtime. The clock dependent timer
//! reload value lives in the board crate, everything below is expressed
//! in ticks or milliseconds of the time base.

/// Number of dispenser slots the master can address.
pub const MAX_SLOTS: usize = 15;

/// Minimum width, in ticks, of a pulse that counts as a response during
/// enumeration. The reset pulse is twice as long.
pub const RESET_DURATION: u32 = 1;

/// Reserved byte. Terminates a section on the dispenser bus and requests
/// a bus reset on the control channel.
pub const SENTINEL: u8 = 255;

/// Last address probed by a scan, candidates run from 0 up to this.
pub const LAST_CANDIDATE: u8 = SENTINEL - 1;

/// Length of one tick: 1024 prescaler, 8 counts at 8MHz or 16 at 16MHz.
pub const TICK_US: u32 = 1024;

/// Wait after each candidate address for responses to come in.
pub const ENUMERATION_SETTLE_MS: u32 = 3;

/// Quiet gap around the sentinels of the assignment section.
pub const FRAME_GAP_MS: u32 = 5;

/// Time given to the dispensers to boot after a reset pulse.
pub const STARTUP_SETTLE_MS: u32 = 1000;

/// Scans run per session while no dispenser answers.
pub const MAX_SCAN_ATTEMPTS: u8 = 3;

/// Foreground poll period while waiting for a reset request.
pub const POLL_INTERVAL_MS: u32 = 1;

/// 7-bit address of the master on the control channel.
pub const TWI_SLAVE_ADDRESS: u8 = 0x04;
