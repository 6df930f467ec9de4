#![allow(clippy::float_cmp)]

use super::*;

fn zone_states(dev: &str, slot: u8, coords: [&str; 4], enable: &str) -> Vec<(String, String)> {
    let prefix = format!("number.{dev}_zone_{slot}");
    let mut out: Vec<(String, String)> = ["x_begin", "x_end", "y_begin", "y_end"]
        .iter()
        .zip(coords)
        .map(|(suffix, v)| (format!("{prefix}_{suffix}"), v.to_owned()))
        .collect();
    out.push((format!("switch.{dev}_zone_{slot}_enable"), enable.to_owned()));
    out
}

// =============================================================
// Pose
// =============================================================

#[test]
fn pose_defaults_when_absent() {
    let pose = read_pose(&StateMap::new(), "ep1");
    assert_eq!(pose, Pose { angle_deg: 0.0, range_m: 6.0 });
}

#[test]
fn pose_reads_and_clamps() {
    let states: StateMap =
        [("number.ep1_installation_angle", "60"), ("number.ep1_distance", "4.5")].into_iter().collect();
    assert_eq!(read_pose(&states, "ep1"), Pose { angle_deg: 45.0, range_m: 4.5 });
}

#[test]
fn unavailable_range_falls_back() {
    let states: StateMap = [("number.ep1_distance", "unavailable")].into_iter().collect();
    assert_eq!(read_pose(&states, "ep1").range_m, 6.0);
}

// =============================================================
// Zones
// =============================================================

#[test]
fn reads_complete_zones_in_slot_order() {
    let mut pairs = zone_states("ep1", 2, ["2.5", "3.5", "1", "2"], "off");
    pairs.extend(zone_states("ep1", 1, ["1", "2", "1", "2"], "on"));
    pairs.push(("binary_sensor.ep1_zone_1_in_zone".to_owned(), "on".to_owned()));
    let states: StateMap = pairs.into_iter().collect();

    let zones = read_zones(&states, "ep1");
    assert_eq!(zones.len(), 2);
    assert_eq!(zones[0].id, ZoneSlot::One);
    assert!(zones[0].enabled && zones[0].occupied);
    assert_eq!(zones[1].id, ZoneSlot::Two);
    assert!(!zones[1].enabled && !zones[1].occupied);
    assert_eq!(zones[1].start, Point::new(2.5, 1.0));
    assert_eq!(zones[1].end, Point::new(3.5, 2.0));
}

#[test]
fn zone_with_missing_coordinate_is_skipped() {
    let states: StateMap = zone_states("ep1", 3, ["1", "2", "unknown", "2"], "on").into_iter().collect();
    assert!(read_zones(&states, "ep1").is_empty());
}

#[test]
fn other_devices_are_ignored() {
    let states: StateMap = zone_states("ep2", 1, ["1", "2", "1", "2"], "on").into_iter().collect();
    assert!(read_snapshot(&states, "ep1").zones.is_empty());
}

// =============================================================
// Targets
// =============================================================

#[test]
fn target_direct_position() {
    let states: StateMap =
        [("sensor.ep1_target_1_x", "1.5"), ("sensor.ep1_target_1_y", "2.5")].into_iter().collect();
    let targets = read_targets(&states, "ep1");
    assert_eq!(targets, vec![Target { id: 1, x: 1.5, y: 2.5, intensity: None }]);
}

#[test]
fn target_derived_from_distance_and_angle() {
    let states: StateMap = [
        ("sensor.ep1_target_2_x", "unavailable"),
        ("sensor.ep1_target_2_distance", "2"),
        ("sensor.ep1_target_2_angle", "90"),
    ]
    .into_iter()
    .collect();
    let targets = read_targets(&states, "ep1");
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].id, 2);
    assert!(targets[0].x.abs() < 1e-9);
    assert!((targets[0].y - 2.0).abs() < 1e-9);
}

#[test]
fn target_without_position_is_dropped() {
    let states: StateMap =
        [("sensor.ep1_target_1_distance", "2"), ("sensor.ep1_target_1_speed", "0.3")].into_iter().collect();
    assert!(read_targets(&states, "ep1").is_empty());
}

#[test]
fn snapshot_bundles_everything() {
    let mut pairs = zone_states("ep1", 4, ["0", "1", "0", "1"], "on");
    pairs.push(("number.ep1_distance".to_owned(), "8".to_owned()));
    pairs.push(("sensor.ep1_target_3_x".to_owned(), "1".to_owned()));
    pairs.push(("sensor.ep1_target_3_y".to_owned(), "1".to_owned()));
    let states: StateMap = pairs.into_iter().collect();
    let snapshot = read_snapshot(&states, "ep1");
    assert_eq!(snapshot.pose.range_m, 8.0);
    assert_eq!(snapshot.zones.len(), 1);
    assert_eq!(snapshot.targets.len(), 1);
}
