//! Coordinate mapping between sensor space, room space and the screen.
//!
//! Two frames meet on the canvas. The rotating *sensor frame* is used for
//! the detection fan and its range rings: it is anchored at the sensor on
//! the top wall of the room and turns with the installation angle. The
//! *room frame* is the one the device reports zones and targets in:
//! metres from the top-left corner of the square room, `+y` away from the
//! sensor wall. Both share the same pixels-per-metre scale.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use std::f64::consts::FRAC_PI_4;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_RANGE_M;

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The square room on screen: top-left corner and side, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Room {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

impl Room {
    /// Horizontal centre of the room in CSS pixels.
    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.x + self.size * 0.5
    }

    /// Room metres to canvas pixels.
    #[must_use]
    pub fn to_canvas(&self, room_pt: Point, scale: f64) -> Point {
        Point { x: self.x + room_pt.x * scale, y: self.y + room_pt.y * scale }
    }

    /// Canvas pixels to room metres.
    #[must_use]
    pub fn to_room(&self, canvas_pt: Point, scale: f64) -> Point {
        Point { x: (canvas_pt.x - self.x) / scale, y: (canvas_pt.y - self.y) / scale }
    }
}

/// Affine map between the rotating sensor frame (metres) and screen pixels.
///
/// `origin` is the sensor position in CSS pixels, `scale` is pixels per
/// metre, `theta` is the installation angle in radians and `max_range` is
/// the detection range in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub origin: Point,
    pub scale: f64,
    pub theta: f64,
    pub max_range: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self { origin: Point::default(), scale: 1.0, theta: 0.0, max_range: DEFAULT_RANGE_M }
    }
}

impl Transform {
    /// Sensor-frame metres to screen pixels: rotate, scale, translate, with screen `y` flipped.
    #[must_use]
    pub fn to_canvas(&self, world: Point) -> Point {
        let (sin_t, cos_t) = self.theta.sin_cos();
        let rx = world.x * cos_t + world.y * sin_t;
        let ry = -world.x * sin_t + world.y * cos_t;
        Point { x: self.origin.x + rx * self.scale, y: self.origin.y - ry * self.scale }
    }

    /// Screen pixels to sensor-frame metres. Exact inverse of [`Transform::to_canvas`].
    #[must_use]
    pub fn to_world(&self, screen: Point) -> Point {
        let rel_x = (screen.x - self.origin.x) / self.scale;
        let rel_y = (self.origin.y - screen.y) / self.scale;
        let (sin_t, cos_t) = (-self.theta).sin_cos();
        Point { x: rel_x * cos_t + rel_y * sin_t, y: -rel_x * sin_t + rel_y * cos_t }
    }

    /// Set the installation angle from degrees.
    pub fn set_angle_deg(&mut self, deg: f64) {
        self.theta = deg.to_radians();
    }

    /// Installation angle in degrees.
    #[must_use]
    pub fn angle_deg(&self) -> f64 {
        self.theta.to_degrees()
    }

    pub fn set_max_range(&mut self, metres: f64) {
        self.max_range = metres;
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    pub fn set_scale(&mut self, px_per_metre: f64) {
        self.scale = px_per_metre;
    }

    /// Copy of this transform with origin and scale derived from `room`.
    ///
    /// The origin slides along the top edge in proportion to `theta / 45°`
    /// so the fan stays visually centred whatever the mounting angle.
    #[must_use]
    pub fn fitted(&self, room: Room) -> Self {
        let half = room.size * 0.5;
        let slide = (self.theta / FRAC_PI_4) * half;
        let mut fitted = *self;
        fitted.set_origin(Point::new(room.center_x() + slide, room.y));
        fitted.set_scale(if self.max_range > 0.0 { room.size / self.max_range } else { 1.0 });
        fitted
    }
}
