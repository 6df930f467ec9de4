//! Assemble a model snapshot from the host state store.
//!
//! Missing or unusable values never fail the read: a pose field falls back
//! to its default, a zone with any coordinate absent is skipped, and a
//! target without a usable position is dropped.

use radar_canvas::model::{ExternalSnapshot, Pose};
use radar_canvas::transform::Point;
use radar_canvas::zone::{Target, Zone, ZoneSlot};

use crate::entity::{self, MAX_TARGETS, TargetField, ZoneCoord};
use crate::states::StateMap;

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

/// Read pose, zones and targets for `device`.
#[must_use]
pub fn read_snapshot(states: &StateMap, device: &str) -> ExternalSnapshot {
    ExternalSnapshot {
        pose: read_pose(states, device),
        zones: read_zones(states, device),
        targets: read_targets(states, device),
    }
}

/// Installation angle and range, clamped, with defaults for absent values.
#[must_use]
pub fn read_pose(states: &StateMap, device: &str) -> Pose {
    let defaults = Pose::default();
    Pose {
        angle_deg: states.number(&entity::installation_angle(device)).unwrap_or(defaults.angle_deg),
        range_m: states.number(&entity::distance(device)).unwrap_or(defaults.range_m),
    }
    .clamped()
}

/// Zones in slot order. A slot with any coordinate absent is left out.
#[must_use]
pub fn read_zones(states: &StateMap, device: &str) -> Vec<Zone> {
    ZoneSlot::ALL.into_iter().filter_map(|slot| read_zone(states, device, slot)).collect()
}

fn read_zone(states: &StateMap, device: &str, slot: ZoneSlot) -> Option<Zone> {
    let coord = |c: ZoneCoord| states.number(&entity::zone_coord(device, slot, c));
    let (Some(x0), Some(x1), Some(y0), Some(y1)) =
        (coord(ZoneCoord::XBegin), coord(ZoneCoord::XEnd), coord(ZoneCoord::YBegin), coord(ZoneCoord::YEnd))
    else {
        log::debug!("{device}: zone {} skipped, coordinates incomplete", slot.id());
        return None;
    };
    Some(Zone {
        id: slot,
        enabled: states.is_on(&entity::zone_enable(device, slot)),
        occupied: states.is_on(&entity::zone_occupancy(device, slot)),
        start: Point::new(x0, y0),
        end: Point::new(x1, y1),
    })
}

/// Targets with a usable position. Direct x/y wins; otherwise the position
/// is derived from distance and angle (degrees).
#[must_use]
pub fn read_targets(states: &StateMap, device: &str) -> Vec<Target> {
    (1..=MAX_TARGETS).filter_map(|n| read_target(states, device, n)).collect()
}

fn read_target(states: &StateMap, device: &str, n: u32) -> Option<Target> {
    let field = |f: TargetField| states.number(&entity::target_field(device, n, f));
    let (x, y) = match (field(TargetField::X), field(TargetField::Y)) {
        (Some(x), Some(y)) => (x, y),
        _ => {
            let d = field(TargetField::Distance)?;
            let a = field(TargetField::Angle)?.to_radians();
            (d * a.cos(), d * a.sin())
        }
    };
    Some(Target { id: n, x, y, intensity: None })
}
