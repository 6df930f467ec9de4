//! Shared numeric constants for the canvas crate.

use std::f64::consts::FRAC_PI_4;

// ── Pose ────────────────────────────────────────────────────────

/// Largest mounting angle either side of straight ahead, in degrees.
pub const ANGLE_LIMIT_DEG: f64 = 45.0;

/// Shortest configurable detection range, in metres.
pub const RANGE_MIN_M: f64 = 0.5;

/// Longest configurable detection range, in metres. Also the span of the range ruler.
pub const RANGE_MAX_M: f64 = 8.0;

/// Range used when the host has not reported one.
pub const DEFAULT_RANGE_M: f64 = 6.0;

/// Half-width of the detection fan (±45°).
pub const FAN_HALF_ANGLE: f64 = FRAC_PI_4;

// ── Zones ───────────────────────────────────────────────────────

/// Number of zone slots the sensor supports.
pub const MAX_ZONES: usize = 4;

/// Smallest allowed zone span on either axis, in metres.
pub const MIN_ZONE_SPAN_M: f64 = 0.05;

/// Side of a newly added zone as a fraction of the current range.
pub const NEW_ZONE_FRACTION: f64 = 0.30;

/// Floor for the side of a newly added zone, in metres.
pub const NEW_ZONE_MIN_SIDE_M: f64 = 0.2;

// ── Layout ──────────────────────────────────────────────────────

/// Outer margin as a fraction of the shorter viewport side.
pub const ROOM_MARGIN_FRACTION: f64 = 0.05;

/// Share of the margin-reduced square given to the room (the rest is toolbar space).
pub const ROOM_WIDTH_SCALE: f64 = 0.85;

/// Gap between the room edge and the pose handles, in CSS pixels.
pub const HANDLE_PADDING_PX: f64 = 12.0;

/// Toolbar tile side, in CSS pixels.
pub const BUTTON_SIZE_PX: f64 = 52.0;

/// Gap between toolbar tiles and between the room and the toolbar.
pub const BUTTON_GAP_PX: f64 = 18.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Hit radius around the angle and range handles.
pub const POSE_HANDLE_RADIUS_PX: f64 = 12.0;

/// Hit radius around each of the nine zone handles.
pub const ZONE_HANDLE_RADIUS_PX: f64 = 10.0;

// ── Lifecycle ───────────────────────────────────────────────────

/// Viewport sides below this are treated as "not laid out yet".
pub const MIN_VIEWPORT_PX: f64 = 50.0;

/// Consecutive identical size observations needed before the first draw.
pub const STABLE_SIZE_OBSERVATIONS: u32 = 3;
