//! Per-draw geometry derived from the viewport size and the current pose.
//!
//! A [`Layout`] is recomputed for every frame and every pointer event, so
//! hit-testing always sees the same positions the renderer last drew.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use crate::consts::{ANGLE_LIMIT_DEG, HANDLE_PADDING_PX, RANGE_MAX_M, RANGE_MIN_M, ROOM_MARGIN_FRACTION, ROOM_WIDTH_SCALE};
use crate::input::Mode;
use crate::toolbar::{ButtonRect, layout_buttons};
use crate::transform::{Point, Room, Transform};

/// Square room placed in a `width × height` viewport.
///
/// The room takes 85% of the margin-reduced shorter side, centred
/// horizontally and one margin down from the top; the rest of the height
/// holds the toolbar.
#[must_use]
pub fn room_for_viewport(width: f64, height: f64) -> Room {
    let base = width.min(height);
    let margin = base * ROOM_MARGIN_FRACTION;
    let size = (base - 2.0 * margin) * ROOM_WIDTH_SCALE;
    Room { x: (width - size) * 0.5, y: margin, size }
}

/// Installation angle for a pointer at canvas `x`: the room's half-width
/// maps linearly onto ±45°.
#[must_use]
pub fn angle_from_pointer(room: Room, px: f64) -> f64 {
    let half = room.size * 0.5;
    if half <= 0.0 {
        return 0.0;
    }
    let t = ((px - room.center_x()) / half).clamp(-1.0, 1.0);
    t * ANGLE_LIMIT_DEG
}

/// Detection range for a pointer at canvas `y` on the ruler: the room's
/// height maps onto `[0, 8]` m, top is far.
#[must_use]
pub fn range_from_pointer(room: Room, py: f64) -> f64 {
    if room.size <= 0.0 {
        return RANGE_MAX_M;
    }
    let t = 1.0 - (py - room.y) / room.size;
    (t * RANGE_MAX_M).clamp(RANGE_MIN_M, RANGE_MAX_M)
}

/// Everything positional the renderer and hit-tester share for one frame.
#[derive(Debug, Clone)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub room: Room,
    /// Pose transform fitted to `room`.
    pub transform: Transform,
    pub angle_handle: Point,
    pub range_handle: Point,
    pub buttons: Vec<ButtonRect>,
}

impl Layout {
    #[must_use]
    pub fn compute(width: f64, height: f64, pose: &Transform, mode: Mode, has_selection: bool) -> Self {
        let room = room_for_viewport(width, height);
        let transform = pose.fitted(room);
        let angle_handle = Point::new(transform.origin.x, room.y - HANDLE_PADDING_PX);
        let t = (transform.max_range / RANGE_MAX_M).clamp(0.0, 1.0);
        let range_handle = Point::new(room.x + room.size + HANDLE_PADDING_PX, room.y + (1.0 - t) * room.size);
        Self {
            width,
            height,
            room,
            transform,
            angle_handle,
            range_handle,
            buttons: layout_buttons(room, mode, has_selection),
        }
    }

    /// Pixels per metre, shared by the fan and the room grid.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.transform.scale
    }

    #[must_use]
    pub fn room_to_canvas(&self, room_pt: Point) -> Point {
        self.room.to_canvas(room_pt, self.scale())
    }

    #[must_use]
    pub fn canvas_to_room(&self, canvas_pt: Point) -> Point {
        self.room.to_room(canvas_pt, self.scale())
    }

    /// X of the vertical range ruler.
    #[must_use]
    pub fn ruler_x(&self) -> f64 {
        self.range_handle.x
    }
}
