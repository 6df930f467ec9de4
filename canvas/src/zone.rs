//! Zone data: slots, rectangles, targets, and the in-memory zone store.
//!
//! Zones and targets live in the room frame the sensor reports: metres from
//! the top-left corner of the square room, `+y` pointing away from the wall
//! the sensor is mounted on. Every geometric mutation goes through
//! [`Zone::clamped`] so a stored zone is always normalized, inside
//! `[0, bound]` and at least [`MIN_ZONE_SPAN_M`] on each axis.

#[cfg(test)]
#[path = "zone_test.rs"]
mod zone_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_ZONES, MIN_ZONE_SPAN_M, NEW_ZONE_FRACTION, NEW_ZONE_MIN_SIDE_M};
use crate::hit::{ResizeAnchor, ZoneHandle};
use crate::transform::Point;

/// One of the four zone slots the sensor exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ZoneSlot {
    One,
    Two,
    Three,
    Four,
}

impl ZoneSlot {
    /// All slots in id order.
    pub const ALL: [ZoneSlot; MAX_ZONES] = [Self::One, Self::Two, Self::Three, Self::Four];

    /// Numeric id as used in entity names (`zone_1` .. `zone_4`).
    #[must_use]
    pub fn id(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }

    /// Colour entry for this slot.
    #[must_use]
    pub fn palette(self) -> &'static ZonePalette {
        &PALETTE[self as usize]
    }
}

impl TryFrom<u8> for ZoneSlot {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_id(id).ok_or_else(|| format!("zone id {id} out of range 1..={MAX_ZONES}"))
    }
}

impl From<ZoneSlot> for u8 {
    fn from(slot: ZoneSlot) -> Self {
        slot.id()
    }
}

impl std::fmt::Display for ZoneSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Z{}", self.id())
    }
}

// ── Palette ─────────────────────────────────────────────────────

/// Fill and stroke colours for one zone slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZonePalette {
    pub rgb: (u8, u8, u8),
    pub fill_alpha: f64,
    pub stroke_alpha: f64,
}

/// Fill alpha used for every slot while a target is inside the zone.
pub const OCCUPIED_FILL_ALPHA: f64 = 0.45;

/// Ordered by slot: red, green, blue, yellow.
const PALETTE: [ZonePalette; MAX_ZONES] = [
    ZonePalette { rgb: (220, 53, 69), fill_alpha: 0.15, stroke_alpha: 0.9 },
    ZonePalette { rgb: (25, 135, 84), fill_alpha: 0.15, stroke_alpha: 0.9 },
    ZonePalette { rgb: (13, 110, 253), fill_alpha: 0.15, stroke_alpha: 0.9 },
    ZonePalette { rgb: (255, 193, 7), fill_alpha: 0.22, stroke_alpha: 0.95 },
];

impl ZonePalette {
    /// CSS fill colour, stronger when the zone is occupied.
    #[must_use]
    pub fn fill(&self, occupied: bool) -> String {
        self.rgba(if occupied { OCCUPIED_FILL_ALPHA } else { self.fill_alpha })
    }

    #[must_use]
    pub fn stroke(&self) -> String {
        self.rgba(self.stroke_alpha)
    }

    #[must_use]
    pub fn rgba(&self, alpha: f64) -> String {
        let (r, g, b) = self.rgb;
        format!("rgba({r},{g},{b},{alpha})")
    }
}

// ── Zone ────────────────────────────────────────────────────────

/// A rectangular detection zone in room metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneSlot,
    pub enabled: bool,
    /// Set from host state only; never edited locally.
    #[serde(default)]
    pub occupied: bool,
    pub start: Point,
    pub end: Point,
}

/// Round to millimetre precision.
#[must_use]
pub fn round_mm(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

impl Zone {
    #[must_use]
    pub fn new(id: ZoneSlot, start: Point, end: Point) -> Self {
        Self { id, enabled: true, occupied: false, start, end }
    }

    /// Default square for a freshly added zone: `0.3 · bound` per side
    /// (never below 0.2 m), centred in the room and rounded to millimetres.
    #[must_use]
    pub fn centered(id: ZoneSlot, bound: f64) -> Self {
        let side = (bound * NEW_ZONE_FRACTION).clamp(NEW_ZONE_MIN_SIDE_M, NEW_ZONE_MIN_SIDE_M.max(bound));
        let half = side * 0.5;
        let mid = bound * 0.5;
        let zone = Self::new(
            id,
            Point::new(round_mm(mid - half), round_mm(mid - half)),
            Point::new(round_mm(mid + half), round_mm(mid + half)),
        );
        zone.clamped(bound)
    }

    /// Copy with `start` as the top-left and `end` as the bottom-right corner.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut z = *self;
        z.start = Point::new(self.start.x.min(self.end.x), self.start.y.min(self.end.y));
        z.end = Point::new(self.start.x.max(self.end.x), self.start.y.max(self.end.y));
        z
    }

    /// Normalized copy pulled into `[0, bound]` on both axes with the minimum span enforced.
    #[must_use]
    pub fn clamped(&self, bound: f64) -> Self {
        let bound = bound.max(MIN_ZONE_SPAN_M);
        let n = self.normalized();
        let (sx, ex) = clamp_axis(n.start.x, n.end.x, bound);
        let (sy, ey) = clamp_axis(n.start.y, n.end.y, bound);
        Self { start: Point::new(sx, sy), end: Point::new(ex, ey), ..n }
    }

    /// A zone with zero width or zero height counts as unused.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_degenerate(&self) -> bool {
        self.start.x == self.end.x || self.start.y == self.end.y
    }

    /// Enabled and non-degenerate: the slot is taken.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && !self.is_degenerate()
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        (self.end.x - self.start.x).abs()
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        (self.end.y - self.start.y).abs()
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.start.x + self.end.x) * 0.5, (self.start.y + self.end.y) * 0.5)
    }

    /// Whether a room-space point lies inside the zone (edges inclusive).
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        let n = self.normalized();
        p.x >= n.start.x && p.x <= n.end.x && p.y >= n.start.y && p.y <= n.end.y
    }

    /// Translate by `delta`, keeping the size and staying inside `[0, bound]`.
    #[must_use]
    pub fn moved(&self, delta: Point, bound: f64) -> Self {
        let n = self.normalized();
        let w = n.width().min(bound);
        let h = n.height().min(bound);
        let x = (n.start.x + delta.x).clamp(0.0, (bound - w).max(0.0));
        let y = (n.start.y + delta.y).clamp(0.0, (bound - h).max(0.0));
        Self { start: Point::new(x, y), end: Point::new(x + w, y + h), ..n }.clamped(bound)
    }

    /// Shift the edges that `anchor` owns by `delta`, then clamp.
    #[must_use]
    pub fn resized(&self, anchor: ResizeAnchor, delta: Point, bound: f64) -> Self {
        let mut z = self.normalized();
        let (left, top, right, bottom) = anchor.edges();
        if left {
            z.start.x += delta.x;
        }
        if right {
            z.end.x += delta.x;
        }
        if top {
            z.start.y += delta.y;
        }
        if bottom {
            z.end.y += delta.y;
        }
        z.clamped(bound)
    }

    /// Apply a drag on `handle` measured from the drag start.
    #[must_use]
    pub fn dragged(&self, handle: ZoneHandle, delta: Point, bound: f64) -> Self {
        match handle {
            ZoneHandle::Move => self.moved(delta, bound),
            ZoneHandle::Resize(anchor) => self.resized(anchor, delta, bound),
        }
    }

    /// Canvas-independent handle positions in room metres, in hit-test order.
    #[must_use]
    pub fn handle_points(&self) -> [(ZoneHandle, Point); 9] {
        let n = self.normalized();
        let c = n.center();
        let (x0, y0, x1, y1) = (n.start.x, n.start.y, n.end.x, n.end.y);
        [
            (ZoneHandle::Resize(ResizeAnchor::Nw), Point::new(x0, y0)),
            (ZoneHandle::Resize(ResizeAnchor::Ne), Point::new(x1, y0)),
            (ZoneHandle::Resize(ResizeAnchor::Se), Point::new(x1, y1)),
            (ZoneHandle::Resize(ResizeAnchor::Sw), Point::new(x0, y1)),
            (ZoneHandle::Resize(ResizeAnchor::N), Point::new(c.x, y0)),
            (ZoneHandle::Resize(ResizeAnchor::E), Point::new(x1, c.y)),
            (ZoneHandle::Resize(ResizeAnchor::S), Point::new(c.x, y1)),
            (ZoneHandle::Resize(ResizeAnchor::W), Point::new(x0, c.y)),
            (ZoneHandle::Move, c),
        ]
    }
}

/// Clamp one normalized axis into `[0, bound]` and widen it to the minimum span.
fn clamp_axis(start: f64, end: f64, bound: f64) -> (f64, f64) {
    let mut s = start.clamp(0.0, bound);
    let mut e = end.clamp(0.0, bound);
    if e - s < MIN_ZONE_SPAN_M {
        e = s + MIN_ZONE_SPAN_M;
        if e > bound {
            e = bound;
            s = bound - MIN_ZONE_SPAN_M;
        }
    }
    (s, e)
}

// ── Targets ─────────────────────────────────────────────────────

/// A detected target in room metres. Display-only, replaced on every refresh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
}

impl Target {
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

// ── Store ───────────────────────────────────────────────────────

/// In-memory store of zones keyed by slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneStore {
    zones: BTreeMap<ZoneSlot, Zone>,
}

impl ZoneStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the zone in its slot.
    pub fn insert(&mut self, zone: Zone) {
        self.zones.insert(zone.id, zone);
    }

    pub fn remove(&mut self, slot: ZoneSlot) -> Option<Zone> {
        self.zones.remove(&slot)
    }

    #[must_use]
    pub fn get(&self, slot: ZoneSlot) -> Option<&Zone> {
        self.zones.get(&slot)
    }

    /// Replace every zone. Later duplicates of a slot win.
    pub fn load(&mut self, zones: impl IntoIterator<Item = Zone>) {
        self.zones.clear();
        for zone in zones {
            self.zones.insert(zone.id, zone);
        }
    }

    /// Zones in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Zone> {
        self.zones.values().copied().collect()
    }

    /// Smallest slot not held by an active zone.
    #[must_use]
    pub fn next_free_slot(&self) -> Option<ZoneSlot> {
        ZoneSlot::ALL
            .into_iter()
            .find(|slot| !self.zones.get(slot).is_some_and(Zone::is_active))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
