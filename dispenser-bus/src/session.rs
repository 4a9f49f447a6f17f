//! foreground driver: reset, enumerate, relay until the host asks for a reset

use crate::config::{MAX_SCAN_ATTEMPTS, POLL_INTERVAL_MS};
use crate::controller::Controller;
use crate::enumeration::{self, EnumerationOutcome, EnumerationReport};
use crate::event::{Event, Indication};
use crate::hal::BusHal;
use crate::reset::ResetSequencer;

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// Reset requested while relaying.
    ResetRequested,
    /// Reset requested during a scan, which was cut short.
    ResetDuringEnumeration,
}

pub struct Supervisor<'a> {
    controller: &'a Controller,
    reset: ResetSequencer,
    last_report: Option<EnumerationReport>,
}

impl<'a> Supervisor<'a> {
    pub fn new(controller: &'a Controller) -> Supervisor<'a> {
        Supervisor {
            controller,
            reset: ResetSequencer::new(),
            last_report: None,
        }
    }

    /// Report of the last scan that ran to completion.
    pub fn last_report(&self) -> Option<&EnumerationReport> {
        self.last_report.as_ref()
    }

    pub fn run<H: BusHal>(&mut self, hal: &mut H) -> ! {
        loop {
            self.run_session(hal);
        }
    }

    /// One session. Returns once the reset request that ended it has been
    /// consumed.
    pub fn run_session<H: BusHal>(&mut self, hal: &mut H) -> SessionEnd {
        let controller = self.controller;
        let time = controller.time();

        hal.indicate(Indication::SessionStart);
        hal.log(Event::SessionStart);
        controller.begin_session();

        let mut attempt = 1;
        let report = loop {
            hal.log(Event::ResetPulse);
            self.reset.run(time, hal);

            hal.log(Event::ScanStart { attempt });
            match enumeration::run(controller, hal) {
                EnumerationOutcome::Aborted => {
                    controller.take_reset_request();
                    hal.log(Event::ResetRequested);
                    return SessionEnd::ResetDuringEnumeration;
                }
                EnumerationOutcome::Complete(report) => {
                    if report.device_count > 0 || attempt >= MAX_SCAN_ATTEMPTS {
                        break report;
                    }
                }
            }
            hal.log(Event::NoDispensers { attempt });
            hal.indicate(Indication::NoDispensers);
            attempt += 1;
        };

        if report.device_count == 0 {
            hal.log(Event::NoDispensers { attempt });
        }
        self.last_report = Some(report);
        controller.go_operational(report.device_count);
        hal.log(Event::Operational {
            devices: report.device_count,
        });

        while !controller.take_reset_request() {
            time.wait_ms(POLL_INTERVAL_MS, hal);
        }
        hal.log(Event::ResetRequested);
        SessionEnd::ResetRequested
    }
}
