mod common;

use common::{SimBus, SimDispenser};
use dispenser_bus::config::SENTINEL;
use dispenser_bus::enumeration::{self, EnumerationOutcome, EnumerationReport};
use dispenser_bus::{Controller, Event};

fn complete(outcome: EnumerationOutcome) -> EnumerationReport {
    match outcome {
        EnumerationOutcome::Complete(report) => report,
        EnumerationOutcome::Aborted => panic!("scan aborted"),
    }
}

#[test]
fn three_dispensers_get_slots_in_address_order() {
    let controller = Controller::new();
    let mut bus = SimBus::new(
        &controller,
        vec![
            SimDispenser::new(0, 7),
            SimDispenser::new(1, 42),
            SimDispenser::new(2, 200),
        ],
    );

    let report = complete(enumeration::run(&controller, &mut bus));

    assert_eq!(report.device_count, 3);
    assert_eq!(report.collisions, 0);
    assert_eq!(&report.addresses[..4], &[Some(7), Some(42), Some(200), None]);

    let candidates: Vec<u8> = (0..=254).collect();
    assert_eq!(bus.scan_section(), &candidates[..]);
    assert_eq!(
        &bus.wire[255..],
        &[SENTINEL, 7, 0, 42, 1, 200, 2, SENTINEL]
    );
    assert_eq!(bus.assignments, vec![(7, 0), (42, 1), (200, 2)]);

    let discovered: Vec<Event> = bus
        .events
        .iter()
        .cloned()
        .filter(|e| match e {
            Event::Discovered { .. } => true,
            _ => false,
        })
        .collect();
    assert_eq!(
        discovered,
        vec![
            Event::Discovered { line: 0, slot: 0, address: 7 },
            Event::Discovered { line: 1, slot: 1, address: 42 },
            Event::Discovered { line: 2, slot: 2, address: 200 },
        ]
    );
    assert_eq!(controller.slot(1).unwrap().discovered_address, Some(42));
}

#[test]
fn relay_is_back_in_charge_after_scan() {
    let controller = Controller::new();
    let mut bus = SimBus::new(&controller, vec![SimDispenser::new(0, 3)]);

    complete(enumeration::run(&controller, &mut bus));

    assert!(!controller.enumeration_active());
    assert!(!bus.serial_mode);
    assert_eq!(bus.dispenser_tx.writes.last(), Some(&true));
    assert_eq!(bus.host_tx.writes.last(), Some(&true));
}

#[test]
fn short_pulses_do_not_count() {
    let controller = Controller::with_min_pulse(3);
    let mut short = SimDispenser::new(0, 10);
    short.hold_ticks = 2;
    let mut long = SimDispenser::new(1, 11);
    long.hold_ticks = 3;
    let mut bus = SimBus::new(&controller, vec![short, long]);

    let report = complete(enumeration::run(&controller, &mut bus));

    assert_eq!(report.device_count, 1);
    assert_eq!(report.addresses[0], Some(11));
    assert_eq!(report.lines[0], Some(1));
    assert_eq!(report.addresses[1], None);
    assert_eq!(&bus.wire[255..], &[SENTINEL, 11, 0, SENTINEL]);
}

#[test]
fn glitch_without_width_is_filtered() {
    let controller = Controller::new();
    let mut glitch = SimDispenser::new(4, 99);
    glitch.hold_ticks = 0;
    let mut bus = SimBus::new(&controller, vec![glitch]);

    let report = complete(enumeration::run(&controller, &mut bus));

    assert_eq!(report.device_count, 0);
    assert_eq!(&bus.wire[255..], &[SENTINEL, SENTINEL]);
}

#[test]
fn shared_address_is_assigned_to_both_slots_and_reported() {
    let controller = Controller::new();
    let mut bus = SimBus::new(
        &controller,
        vec![SimDispenser::new(0, 42), SimDispenser::new(1, 42)],
    );

    let report = complete(enumeration::run(&controller, &mut bus));

    assert_eq!(report.device_count, 2);
    assert_eq!(report.collisions, 0b11);
    assert_eq!(&bus.wire[255..], &[SENTINEL, 42, 0, 42, 1, SENTINEL]);
    assert!(bus.events.contains(&Event::Collision {
        address: 42,
        lines: 0b11
    }));
}

#[test]
fn a_slot_keeps_its_first_address() {
    let controller = Controller::new();
    let mut greedy = SimDispenser::new(0, 7);
    greedy.addresses.push(9);
    let mut bus = SimBus::new(&controller, vec![greedy, SimDispenser::new(1, 9)]);

    let report = complete(enumeration::run(&controller, &mut bus));

    assert_eq!(report.device_count, 2);
    assert_eq!(report.collisions, 0);
    assert_eq!(&bus.wire[255..], &[SENTINEL, 7, 0, 9, 1, SENTINEL]);
}

#[test]
fn sparse_lines_get_consecutive_slots() {
    let controller = Controller::new();
    let mut bus = SimBus::new(
        &controller,
        vec![SimDispenser::new(3, 100), SimDispenser::new(14, 5)],
    );

    let report = complete(enumeration::run(&controller, &mut bus));

    assert_eq!(report.device_count, 2);
    assert_eq!(bus.assignments, vec![(5, 0), (100, 1)]);
    assert_eq!(&report.lines[..3], &[Some(14), Some(3), None]);
    assert!(bus.events.contains(&Event::Discovered {
        line: 14,
        slot: 0,
        address: 5
    }));
    assert_eq!(controller.slot(1).map(|s| s.line), Some(3));
    assert!(controller.slot(2).is_none());
}

#[test]
fn reset_request_cuts_the_scan_short() {
    let controller = Controller::new();
    let mut bus = SimBus::new(&controller, Vec::new());
    bus.reset_at_wire_len = Some(2);

    assert_eq!(
        enumeration::run(&controller, &mut bus),
        EnumerationOutcome::Aborted
    );
    assert_eq!(bus.wire, vec![0, 1]);
    assert!(!controller.enumeration_active());
    assert!(controller.reset_requested());
    assert!(bus.dispenser_tx.writes.iter().all(|&level| level));
}
