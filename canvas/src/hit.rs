//! Hit-testing a canvas point against toolbar, pose handles and zones.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{POSE_HANDLE_RADIUS_PX, ZONE_HANDLE_RADIUS_PX};
use crate::input::UiState;
use crate::layout::Layout;
use crate::toolbar::ToolbarButton;
use crate::transform::Point;
use crate::zone::{Zone, ZoneSlot};

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    /// Which edges this anchor drags, as `(left, top, right, bottom)`.
    #[must_use]
    pub fn edges(self) -> (bool, bool, bool, bool) {
        match self {
            Self::N => (false, true, false, false),
            Self::Ne => (false, true, true, false),
            Self::E => (false, false, true, false),
            Self::Se => (false, false, true, true),
            Self::S => (false, false, false, true),
            Self::Sw => (true, false, false, true),
            Self::W => (true, false, false, false),
            Self::Nw => (true, true, false, false),
        }
    }
}

/// Which part of a zone a drag acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneHandle {
    Resize(ResizeAnchor),
    /// Centre handle or zone body.
    Move,
}

/// What the pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Button(ToolbarButton),
    AngleHandle,
    RangeHandle,
    Zone { slot: ZoneSlot, handle: ZoneHandle },
}

fn within(p: Point, center: Point, radius: f64) -> bool {
    p.distance(center) <= radius
}

/// Resolve `pt` by priority: toolbar, then (edit mode only) angle handle,
/// range handle, zone handles in slot order, zone bodies in slot order.
///
/// `zones` should already carry the in-flight preview; disabled zones are
/// never hit.
#[must_use]
pub fn hit_test<'a>(
    pt: Point,
    layout: &Layout,
    ui: &UiState,
    zones: impl IntoIterator<Item = &'a Zone> + Clone,
) -> Option<HitPart> {
    if let Some(rect) = layout.buttons.iter().find(|r| r.contains(pt)) {
        return Some(HitPart::Button(rect.button));
    }
    if !ui.is_editing() {
        return None;
    }
    if ui.show_angle_handle && within(pt, layout.angle_handle, POSE_HANDLE_RADIUS_PX) {
        return Some(HitPart::AngleHandle);
    }
    if ui.show_range_handle && within(pt, layout.range_handle, POSE_HANDLE_RADIUS_PX) {
        return Some(HitPart::RangeHandle);
    }

    for zone in zones.clone().into_iter().filter(|z| z.enabled) {
        for (handle, room_pt) in zone.handle_points() {
            if within(pt, layout.room_to_canvas(room_pt), ZONE_HANDLE_RADIUS_PX) {
                return Some(HitPart::Zone { slot: zone.id, handle });
            }
        }
    }

    let room_pt = layout.canvas_to_room(pt);
    zones
        .into_iter()
        .find(|z| z.enabled && z.contains(room_pt))
        .map(|z| HitPart::Zone { slot: z.id, handle: ZoneHandle::Move })
}
