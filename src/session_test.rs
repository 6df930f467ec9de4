#![allow(clippy::float_cmp)]

use super::*;

fn states(devices: &[&str]) -> StateMap {
    let mut states = StateMap::new();
    for dev in devices {
        states.insert(format!("number.{dev}_distance"), "5");
        states.insert(format!("number.{dev}_installation_angle"), "10");
    }
    states
}

fn config(device: &str) -> CardConfig {
    CardConfig { device_id: device.to_owned(), debug: false }
}

// =============================================================
// Device choice
// =============================================================

#[test]
fn first_dump_picks_first_device() {
    let mut session = Session::default();
    let update = session.set_states(states(&["hall", "attic"])).expect("device found");
    assert!(update.device_changed);
    assert_eq!(update.snapshot.pose.range_m, 5.0);
    assert_eq!(session.device(), Some("attic"));
    assert_eq!(session.devices(), ["attic", "hall"]);
}

#[test]
fn configured_device_wins() {
    let mut session = Session::new(config("hall"));
    session.set_states(states(&["hall", "attic"]));
    assert_eq!(session.device(), Some("hall"));
}

#[test]
fn later_dumps_keep_device() {
    let mut session = Session::default();
    session.set_states(states(&["attic"]));
    let update = session.set_states(states(&["attic"])).expect("still there");
    assert!(!update.device_changed);
}

#[test]
fn no_devices_means_no_update() {
    let mut session = Session::default();
    assert_eq!(session.set_states(StateMap::new()), None);
    assert_eq!(session.device(), None);
    assert_eq!(session.snapshot(), None);
}

// =============================================================
// Config and manual selection
// =============================================================

#[test]
fn config_change_to_other_device_updates() {
    let mut session = Session::default();
    session.set_states(states(&["attic", "hall"]));
    let update = session.set_config(config("hall")).expect("device switched");
    assert!(update.device_changed);
    assert_eq!(session.device(), Some("hall"));
}

#[test]
fn config_change_without_device_change_is_quiet() {
    let mut session = Session::default();
    session.set_states(states(&["attic"]));
    assert_eq!(session.set_config(CardConfig { device_id: String::new(), debug: true }), None);
    assert!(session.config().debug);
}

#[test]
fn select_device_switches_and_ignores_unknown() {
    let mut session = Session::default();
    session.set_states(states(&["attic", "hall"]));
    assert!(session.select_device("hall").is_some());
    assert_eq!(session.device(), Some("hall"));

    // Unknown ids fall back to the first discovered device.
    let update = session.select_device("garage").expect("fell back");
    assert_eq!(session.device(), Some("attic"));
    assert!(update.device_changed);
}
