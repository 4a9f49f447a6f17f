//! diagnostic events raised by the foreground protocol

use ufmt::{uDisplay, uWrite, uwrite, Formatter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    SessionStart,
    ResetPulse,
    ScanStart { attempt: u8 },
    Discovered { line: u8, slot: u8, address: u8 },
    Collision { address: u8, lines: u16 },
    NoDispensers { attempt: u8 },
    ScanAborted { address: u8 },
    Assigned { devices: u8 },
    Operational { devices: u8 },
    ResetRequested,
}

/// Blink patterns shown on the board LED.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indication {
    SessionStart,
    NoDispensers,
}

impl uDisplay for Event {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match *self {
            Event::SessionStart => f.write_str("session start"),
            Event::ResetPulse => f.write_str("reset pulse"),
            Event::ScanStart { attempt } => uwrite!(f, "scan {}", attempt),
            Event::Discovered {
                line,
                slot,
                address,
            } => uwrite!(f, "line {} answers {}, slot {}", line, address, slot),
            Event::Collision { address, lines } => {
                uwrite!(f, "collision on {} lines {}", address, lines)
            }
            Event::NoDispensers { attempt } => uwrite!(f, "no dispensers, scan {}", attempt),
            Event::ScanAborted { address } => uwrite!(f, "scan aborted at {}", address),
            Event::Assigned { devices } => uwrite!(f, "assigned {}", devices),
            Event::Operational { devices } => uwrite!(f, "operational, {} dispensers", devices),
            Event::ResetRequested => f.write_str("reset requested"),
        }
    }
}
