#![allow(clippy::float_cmp)]

use super::*;
use crate::input::Mode;
use crate::surface::recording::{Op, RecordingSurface};
use crate::transform::Transform;
use crate::zone::ZoneSlot;

// =============================================================
// Helpers
// =============================================================

fn zone(slot: ZoneSlot, x0: f64, y0: f64, x1: f64, y1: f64) -> Zone {
    Zone::new(slot, Point::new(x0, y0), Point::new(x1, y1))
}

fn ui(mode: Mode, selected: Option<ZoneSlot>) -> UiState {
    let mut ui = UiState::default();
    if mode == Mode::Edit {
        ui.enter_edit();
    }
    ui.selected = selected;
    ui
}

fn render(ui: &UiState, zones: &[Zone], targets: &[Target]) -> RecordingSurface {
    let layout = Layout::compute(400.0, 400.0, &Transform::default(), ui.mode, ui.selected.is_some());
    let surface = RecordingSurface::default();
    let scene = Scene { layout: &layout, zones, targets, ui, dpr: 2.0 };
    let Ok(()) = draw(&surface, &scene);
    surface
}

fn arcs_with_radius(s: &RecordingSurface, radius: f64) -> usize {
    s.count(|op| matches!(op, Op::Arc(_, _, r) if *r == radius))
}

// =============================================================
// Layer order
// =============================================================

#[test]
fn frame_starts_with_dpr_transform_and_clear() {
    let s = render(&UiState::default(), &[], &[]);
    let ops = s.ops.borrow();
    assert_eq!(ops[0], Op::SetTransform(2.0));
    assert_eq!(ops[1], Op::ClearRect(400.0, 400.0));
}

#[test]
fn room_box_drawn_before_zones_and_targets() {
    let zones = [zone(ZoneSlot::One, 1.0, 1.0, 2.0, 2.0)];
    let targets = [Target { id: 3, x: 2.0, y: 3.0, intensity: None }];
    let s = render(&UiState::default(), &zones, &targets);

    let room = s.position(|op| *op == Op::StrokeRect(47.0, 20.0, 306.0, 306.0));
    let zone_label = s.position(|op| matches!(op, Op::FillText(t, _, _) if t == "Z1"));
    let target_label = s.position(|op| matches!(op, Op::FillText(t, _, _) if t == "T3"));
    assert!(room.is_some());
    assert!(room < zone_label);
    assert!(zone_label < target_label);
}

#[test]
fn toolbar_labels_come_last() {
    let s = render(&UiState::default(), &[zone(ZoneSlot::One, 1.0, 1.0, 2.0, 2.0)], &[]);
    let texts = s.texts();
    assert_eq!(texts[texts.len() - 2..], ["add".to_owned(), "edit".to_owned()]);
}

// =============================================================
// Zones
// =============================================================

#[test]
fn zone_rect_uses_room_frame() {
    let s = render(&UiState::default(), &[zone(ZoneSlot::Two, 2.0, 1.0, 1.0, 2.0)], &[]);
    // Normalized (1,1)-(2,2) at 51 px per metre from (47, 20).
    assert!(s.position(|op| *op == Op::FillRect(98.0, 71.0, 51.0, 51.0)).is_some());
    assert!(s.position(|op| *op == Op::FillStyle("rgba(25,135,84,0.15)".to_owned())).is_some());
}

#[test]
fn disabled_zone_is_not_drawn() {
    let mut z = zone(ZoneSlot::One, 1.0, 1.0, 2.0, 2.0);
    z.enabled = false;
    let s = render(&UiState::default(), &[z], &[]);
    assert!(!s.texts().contains(&"Z1".to_owned()));
}

#[test]
fn occupied_zone_glows_with_stronger_fill() {
    let mut z = zone(ZoneSlot::One, 1.0, 1.0, 2.0, 2.0);
    z.occupied = true;
    let s = render(&UiState::default(), &[z], &[]);
    assert!(s.position(|op| *op == Op::Shadow("rgba(220,53,69,0.9)".to_owned(), 12.0)).is_some());
    assert!(s.position(|op| *op == Op::FillStyle("rgba(220,53,69,0.45)".to_owned())).is_some());
}

#[test]
fn selected_zone_in_edit_mode_shows_nine_handles() {
    let zones = [zone(ZoneSlot::One, 1.0, 1.0, 2.0, 2.0)];
    let s = render(&ui(Mode::Edit, Some(ZoneSlot::One)), &zones, &[]);
    assert_eq!(arcs_with_radius(&s, 5.0), 8);
    assert_eq!(arcs_with_radius(&s, 6.0), 1);
    assert!(s.position(|op| *op == Op::StrokeStyle("#0d6efd".to_owned())).is_some());
}

#[test]
fn selection_without_edit_mode_draws_no_handles() {
    let zones = [zone(ZoneSlot::One, 1.0, 1.0, 2.0, 2.0)];
    let s = render(&ui(Mode::View, Some(ZoneSlot::One)), &zones, &[]);
    assert_eq!(arcs_with_radius(&s, 5.0), 0);
}

#[test]
fn highlighted_zone_gets_border_in_view_mode() {
    let zones = [zone(ZoneSlot::Three, 1.0, 1.0, 2.0, 2.0)];
    let mut state = UiState::default();
    state.highlighted = Some(ZoneSlot::Three);
    let s = render(&state, &zones, &[]);
    assert!(s.position(|op| *op == Op::StrokeStyle("#0d6efd".to_owned())).is_some());
    assert_eq!(arcs_with_radius(&s, 5.0), 0);
}

// =============================================================
// Targets
// =============================================================

#[test]
fn target_alpha_scales_with_intensity() {
    let targets = [Target { id: 1, x: 1.0, y: 1.0, intensity: Some(0.05) }];
    let s = render(&UiState::default(), &[], &targets);
    // Intensity is floored at 0.2.
    assert!(s.position(|op| *op == Op::FillStyle("rgba(200,10,10,0.1)".to_owned())).is_some());
    assert!(s.position(|op| *op == Op::Arc(98.0, 71.0, 5.0)).is_some());
}

// =============================================================
// Pose controls
// =============================================================

#[test]
fn pose_handles_only_in_edit_mode() {
    let view = render(&UiState::default(), &[], &[]);
    assert_eq!(arcs_with_radius(&view, 8.0), 0);
    let edit = render(&ui(Mode::Edit, None), &[], &[]);
    assert_eq!(arcs_with_radius(&edit, 8.0), 2);
    assert!(edit.texts().contains(&"8m".to_owned()));
    assert!(edit.texts().contains(&"6m".to_owned()));
}

#[test]
fn hidden_range_ruler_is_not_drawn() {
    let mut state = ui(Mode::Edit, None);
    state.show_range_handle = false;
    let s = render(&state, &[], &[]);
    assert_eq!(arcs_with_radius(&s, 8.0), 1);
    assert!(!s.texts().contains(&"8m".to_owned()));
}

#[test]
fn save_restore_balanced() {
    let zones = [zone(ZoneSlot::One, 1.0, 1.0, 2.0, 2.0)];
    let s = render(&ui(Mode::Edit, Some(ZoneSlot::One)), &zones, &[]);
    assert_eq!(s.count(|op| *op == Op::Save), s.count(|op| *op == Op::Restore));
}
