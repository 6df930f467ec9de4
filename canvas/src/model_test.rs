#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::transform::Point;
use crate::zone::ZoneSlot;

// =============================================================
// Helpers
// =============================================================

fn zone(slot: ZoneSlot, x0: f64, y0: f64, x1: f64, y1: f64) -> Zone {
    Zone::new(slot, Point::new(x0, y0), Point::new(x1, y1))
}

fn target(id: u32, x: f64, y: f64) -> Target {
    Target { id, x, y, intensity: None }
}

fn external(angle: f64, range: f64, zones: Vec<Zone>, targets: Vec<Target>) -> ExternalSnapshot {
    ExternalSnapshot { pose: Pose { angle_deg: angle, range_m: range }, zones, targets }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn recorder(model: &mut Model) -> Rc<RefCell<Vec<ChangeKind>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    model.on_change(move |kind| sink.borrow_mut().push(kind));
    log
}

// =============================================================
// Pose
// =============================================================

#[test]
fn pose_default_is_zero_degrees_six_metres() {
    assert_eq!(Pose::default(), Pose { angle_deg: 0.0, range_m: 6.0 });
}

#[test]
fn pose_clamped_limits_both_scalars() {
    let p = Pose { angle_deg: 70.0, range_m: 0.1 }.clamped();
    assert_eq!(p, Pose { angle_deg: 45.0, range_m: 0.5 });
    let p = Pose { angle_deg: -90.0, range_m: 12.0 }.clamped();
    assert_eq!(p, Pose { angle_deg: -45.0, range_m: 8.0 });
}

#[test]
fn pose_clamped_replaces_non_finite_values() {
    let p = Pose { angle_deg: f64::NAN, range_m: f64::INFINITY }.clamped();
    assert_eq!(p, Pose::default());
}

#[test]
fn pose_update_constructors() {
    assert_eq!(PoseUpdate::angle(5.0), PoseUpdate { angle_deg: Some(5.0), range_m: None });
    assert_eq!(PoseUpdate::range(3.0), PoseUpdate { angle_deg: None, range_m: Some(3.0) });
    let from: PoseUpdate = Pose { angle_deg: 1.0, range_m: 2.0 }.into();
    assert_eq!(from, PoseUpdate { angle_deg: Some(1.0), range_m: Some(2.0) });
}

// =============================================================
// Mutations
// =============================================================

#[test]
fn update_zones_replaces_and_dirties() {
    let mut model = Model::new();
    let log = recorder(&mut model);
    model.update_zones(vec![zone(ZoneSlot::One, 0.0, 0.0, 1.0, 1.0)]);
    model.update_zones(vec![zone(ZoneSlot::Two, 0.0, 0.0, 1.0, 1.0)]);
    assert!(model.zones().get(ZoneSlot::One).is_none());
    assert!(model.zones().get(ZoneSlot::Two).is_some());
    assert!(model.has_dirty_changes());
    assert_eq!(*log.borrow(), vec![ChangeKind::Zones, ChangeKind::Zones]);
}

#[test]
fn update_zones_does_not_clamp() {
    let mut model = Model::new();
    model.update_zones(vec![zone(ZoneSlot::One, 2.0, 2.0, -1.0, 0.0)]);
    let z = model.zones().get(ZoneSlot::One).copied();
    assert_eq!(z.map(|z| z.start), Some(Point::new(2.0, 2.0)));
}

#[test]
fn update_targets_never_dirties() {
    let mut model = Model::new();
    let log = recorder(&mut model);
    model.update_targets(vec![target(1, 1.0, 2.0)]);
    assert_eq!(model.targets().len(), 1);
    assert!(!model.has_dirty_changes());
    assert_eq!(*log.borrow(), vec![ChangeKind::Targets]);
}

#[test]
fn local_preview_is_silent() {
    let mut model = Model::new();
    let log = recorder(&mut model);
    model.apply_local_preview(PoseUpdate::angle(30.0));
    assert!(approx(model.pose().angle_deg, 30.0));
    assert!(!model.has_dirty_changes());
    assert!(log.borrow().is_empty());
}

#[test]
fn local_preview_clamps() {
    let mut model = Model::new();
    model.apply_local_preview(PoseUpdate::range(20.0));
    assert!(approx(model.pose().range_m, 8.0));
}

#[test]
fn commit_pose_notifies_and_dirties() {
    let mut model = Model::new();
    let log = recorder(&mut model);
    model.commit_pose(PoseUpdate { angle_deg: Some(-60.0), range_m: Some(4.0) });
    assert!(approx(model.pose().angle_deg, -45.0));
    assert!(approx(model.pose().range_m, 4.0));
    assert!(model.has_dirty_changes());
    assert_eq!(*log.borrow(), vec![ChangeKind::Transform]);
}

#[test]
fn off_change_stops_notifications() {
    let mut model = Model::new();
    let log = Rc::new(RefCell::new(0_u32));
    let sink = Rc::clone(&log);
    let id = model.on_change(move |_| *sink.borrow_mut() += 1);
    model.update_targets(Vec::new());
    model.off_change(id);
    model.update_targets(Vec::new());
    assert_eq!(*log.borrow(), 1);
}

#[test]
fn listener_sees_completed_mutation() {
    let mut model = Model::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    model.on_change(move |kind| sink.borrow_mut().push(kind));
    model.commit_pose(PoseUpdate::range(2.0));
    assert_eq!(seen.borrow().len(), 1);
    assert!(approx(model.transform().max_range, 2.0));
}

// =============================================================
// Edit gate
// =============================================================

#[test]
fn snapshot_applies_when_idle() {
    let mut model = Model::new();
    let log = recorder(&mut model);
    let outcome = model.accept_external_snapshot(external(
        10.0,
        5.0,
        vec![zone(ZoneSlot::One, 1.0, 1.0, 2.0, 2.0)],
        vec![target(1, 1.0, 1.0)],
    ));
    assert_eq!(outcome, SnapshotOutcome::Applied);
    assert!(approx(model.pose().angle_deg, 10.0));
    assert!(approx(model.pose().range_m, 5.0));
    assert_eq!(model.zones().len(), 1);
    assert_eq!(model.targets().len(), 1);
    assert!(!model.has_dirty_changes());
    assert_eq!(*log.borrow(), vec![ChangeKind::Transform, ChangeKind::Zones, ChangeKind::Targets]);
}

#[test]
fn snapshot_clamps_host_pose() {
    let mut model = Model::new();
    model.accept_external_snapshot(external(80.0, 9.0, Vec::new(), Vec::new()));
    assert!(approx(model.pose().angle_deg, 45.0));
    assert!(approx(model.pose().range_m, 8.0));
}

#[test]
fn snapshot_gated_while_editing_updates_only_targets() {
    let mut model = Model::new();
    model.update_zones(vec![zone(ZoneSlot::One, 1.0, 1.0, 2.0, 2.0)]);
    model.commit_edit();
    model.begin_edit();
    let before = model.export_snapshot();

    let outcome = model.accept_external_snapshot(external(
        20.0,
        3.0,
        vec![zone(ZoneSlot::Two, 0.0, 0.0, 1.0, 1.0)],
        vec![target(7, 2.0, 2.0)],
    ));

    assert_eq!(outcome, SnapshotOutcome::TargetsOnly);
    assert_eq!(model.export_snapshot(), before);
    assert_eq!(model.targets(), &[target(7, 2.0, 2.0)]);
}

#[test]
fn snapshot_gated_while_dirty() {
    let mut model = Model::new();
    model.update_zones(vec![zone(ZoneSlot::One, 1.0, 1.0, 2.0, 2.0)]);
    assert!(!model.is_editing());
    let outcome = model.accept_external_snapshot(external(0.0, 6.0, Vec::new(), Vec::new()));
    assert_eq!(outcome, SnapshotOutcome::TargetsOnly);
    assert!(model.zones().get(ZoneSlot::One).is_some());
}

#[test]
fn gated_snapshot_still_becomes_baseline() {
    let mut model = Model::new();
    model.begin_edit();
    let snap = external(5.0, 4.0, vec![zone(ZoneSlot::Three, 0.0, 0.0, 1.0, 1.0)], Vec::new());
    model.accept_external_snapshot(snap.clone());
    assert_eq!(model.host_baseline(), Some(&snap));
}

#[test]
fn dirty_then_commit_then_snapshot_applies() {
    let mut model = Model::new();
    model.update_zones(vec![zone(ZoneSlot::One, 1.0, 1.0, 2.0, 2.0)]);
    assert!(model.has_dirty_changes());
    model.commit_edit();
    assert!(!model.has_dirty_changes());
    assert!(!model.is_editing());
    let outcome = model.accept_external_snapshot(external(0.0, 6.0, Vec::new(), Vec::new()));
    assert_eq!(outcome, SnapshotOutcome::Applied);
    assert!(model.zones().is_empty());
}

#[test]
fn discard_restores_last_host_snapshot() {
    let mut model = Model::new();
    let host = external(0.0, 6.0, vec![zone(ZoneSlot::One, 1.0, 1.0, 2.0, 2.0)], Vec::new());
    model.accept_external_snapshot(host);
    model.begin_edit();
    model.update_zones(vec![zone(ZoneSlot::One, 3.0, 3.0, 4.0, 4.0)]);
    model.commit_pose(PoseUpdate::angle(30.0));

    model.discard_edit();

    assert!(!model.is_editing());
    assert!(!model.has_dirty_changes());
    assert!(approx(model.pose().angle_deg, 0.0));
    assert_eq!(model.zones().get(ZoneSlot::One).map(|z| z.start), Some(Point::new(1.0, 1.0)));
}

#[test]
fn discard_without_baseline_just_ends_session() {
    let mut model = Model::new();
    model.begin_edit();
    model.update_zones(vec![zone(ZoneSlot::One, 3.0, 3.0, 4.0, 4.0)]);
    model.discard_edit();
    assert!(!model.is_editing());
    assert!(!model.has_dirty_changes());
    assert_eq!(model.zones().len(), 1);
}

#[test]
fn commit_and_discard_are_idempotent() {
    let mut model = Model::new();
    model.commit_edit();
    model.commit_edit();
    model.discard_edit();
    model.discard_edit();
    assert!(!model.is_editing());
    assert!(!model.has_dirty_changes());
}

// =============================================================
// Export
// =============================================================

#[test]
fn export_snapshot_has_no_targets() {
    let mut model = Model::new();
    model.update_targets(vec![target(1, 1.0, 1.0)]);
    model.update_zones(vec![zone(ZoneSlot::Two, 0.0, 0.0, 1.0, 1.0)]);
    let snap = model.export_snapshot();
    assert_eq!(snap.zones.len(), 1);
    let json = serde_json::to_value(&snap).unwrap();
    assert!(json.get("targets").is_none());
}

#[test]
fn external_snapshot_targets_default_empty() {
    let snap: ExternalSnapshot =
        serde_json::from_str(r#"{"pose":{"angle_deg":0.0,"range_m":6.0},"zones":[]}"#).unwrap();
    assert!(snap.targets.is_empty());
    assert_eq!(snap.to_snapshot(), Snapshot { pose: Pose::default(), zones: Vec::new() });
}
