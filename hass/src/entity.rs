//! Entity id naming: `<domain>.<device>_<field>`.

use radar_canvas::zone::ZoneSlot;

#[cfg(test)]
#[path = "entity_test.rs"]
mod entity_test;

/// Number of target slots the sensor reports.
pub const MAX_TARGETS: u32 = 3;

/// One of the four numeric coordinates stored per zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneCoord {
    XBegin,
    XEnd,
    YBegin,
    YEnd,
}

impl ZoneCoord {
    /// Write order used for saves and clears.
    pub const ALL: [ZoneCoord; 4] = [Self::XBegin, Self::XEnd, Self::YBegin, Self::YEnd];

    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::XBegin => "x_begin",
            Self::XEnd => "x_end",
            Self::YBegin => "y_begin",
            Self::YEnd => "y_end",
        }
    }
}

/// A per-target sensor field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetField {
    X,
    Y,
    Distance,
    /// Reported in degrees.
    Angle,
    Speed,
}

impl TargetField {
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Distance => "distance",
            Self::Angle => "angle",
            Self::Speed => "speed",
        }
    }
}

/// `number.<dev>_installation_angle`
#[must_use]
pub fn installation_angle(device: &str) -> String {
    format!("number.{device}_installation_angle")
}

/// `number.<dev>_distance`; also the discovery key.
#[must_use]
pub fn distance(device: &str) -> String {
    format!("number.{device}_distance")
}

#[must_use]
pub fn zone_coord(device: &str, slot: ZoneSlot, coord: ZoneCoord) -> String {
    format!("number.{device}_zone_{}_{}", slot.id(), coord.suffix())
}

#[must_use]
pub fn zone_enable(device: &str, slot: ZoneSlot) -> String {
    format!("switch.{device}_zone_{}_enable", slot.id())
}

#[must_use]
pub fn zone_occupancy(device: &str, slot: ZoneSlot) -> String {
    format!("binary_sensor.{device}_zone_{}_in_zone", slot.id())
}

#[must_use]
pub fn target_field(device: &str, target: u32, field: TargetField) -> String {
    format!("sensor.{device}_target_{target}_{}", field.suffix())
}
