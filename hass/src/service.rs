//! Service calls that persist edits on the host.
//!
//! Planning is pure: each `plan_*` function turns an edit into an ordered
//! list of [`ServiceCall`]s. Delivery goes through a [`ServiceSink`], which
//! is fire-and-forget.

use std::fmt;

use radar_canvas::engine::SaveRequest;
use radar_canvas::model::Pose;
use radar_canvas::zone::{Zone, ZoneSlot, round_mm};
use serde::Serialize;
use serde_json::{Value, json};

use crate::entity::{self, ZoneCoord};

#[cfg(test)]
#[path = "service_test.rs"]
mod service_test;

/// Values closer than this are the same once rounded to millimetres.
const SAME_VALUE_EPSILON: f64 = 5e-4;

/// One host service invocation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ServiceCall {
    pub domain: &'static str,
    pub service: &'static str,
    pub entity_id: String,
    /// Set for `number.set_value`; rounded to 3 decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl ServiceCall {
    /// `number.set_value` with the value rounded to 3 decimals.
    #[must_use]
    pub fn set_value(entity_id: String, value: f64) -> Self {
        Self { domain: "number", service: "set_value", entity_id, value: Some(round_mm(value)) }
    }

    /// `switch.turn_on` or `switch.turn_off`.
    #[must_use]
    pub fn switch(entity_id: String, on: bool) -> Self {
        let service = if on { "turn_on" } else { "turn_off" };
        Self { domain: "switch", service, entity_id, value: None }
    }

    /// The service data object: `{entity_id, value?}`.
    #[must_use]
    pub fn data(&self) -> Value {
        match self.value {
            Some(value) => json!({ "entity_id": self.entity_id, "value": value }),
            None => json!({ "entity_id": self.entity_id }),
        }
    }
}

impl fmt::Display for ServiceCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} {}", self.domain, self.service, self.entity_id)?;
        if let Some(value) = self.value {
            write!(f, " = {value:.3}")?;
        }
        Ok(())
    }
}

// ── Sinks ───────────────────────────────────────────────────────

/// Where service calls go.
pub trait ServiceSink {
    fn call_service(&mut self, call: ServiceCall);
}

/// Drops every call. Used until the host binds a handler.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ServiceSink for NullSink {
    fn call_service(&mut self, call: ServiceCall) {
        log::debug!("no service handler bound; dropped {call}");
    }
}

/// Records calls in order.
impl ServiceSink for Vec<ServiceCall> {
    fn call_service(&mut self, call: ServiceCall) {
        self.push(call);
    }
}

/// Send every call to `sink`, in order.
pub fn dispatch<S: ServiceSink + ?Sized>(sink: &mut S, calls: impl IntoIterator<Item = ServiceCall>) {
    for call in calls {
        sink.call_service(call);
    }
}

// ── Plans ───────────────────────────────────────────────────────

/// Writes for a save: changed pose scalars, then changed zones, then
/// clears for deleted slots.
///
/// Without a host baseline everything in the snapshot is written.
#[must_use]
pub fn plan_save(device: &str, request: &SaveRequest) -> Vec<ServiceCall> {
    let baseline = request.baseline.as_ref();
    let pose = request.snapshot.pose;
    let mut calls = Vec::new();

    if baseline.is_none_or(|b| !same_value(b.pose.angle_deg, pose.angle_deg)) {
        calls.push(ServiceCall::set_value(entity::installation_angle(device), pose.angle_deg));
    }
    if baseline.is_none_or(|b| !same_value(b.pose.range_m, pose.range_m)) {
        calls.push(ServiceCall::set_value(entity::distance(device), pose.range_m));
    }

    for zone in &request.snapshot.zones {
        let before = baseline.and_then(|b| b.zones.iter().find(|z| z.id == zone.id));
        if before.is_some_and(|b| same_zone(b, zone)) {
            continue;
        }
        calls.extend(plan_zone(device, zone));
    }

    for slot in &request.cleared {
        calls.extend(plan_clear_zone(device, *slot));
    }

    log::debug!("{device}: save planned {} service calls", calls.len());
    calls
}

/// Immediate pose push after an angle or range drag.
#[must_use]
pub fn plan_pose(device: &str, pose: Pose) -> Vec<ServiceCall> {
    let pose = pose.clamped();
    vec![
        ServiceCall::set_value(entity::installation_angle(device), pose.angle_deg),
        ServiceCall::set_value(entity::distance(device), pose.range_m),
    ]
}

/// Four coordinate writes (normalized) and the enable switch.
#[must_use]
pub fn plan_zone(device: &str, zone: &Zone) -> Vec<ServiceCall> {
    let z = zone.normalized();
    let mut calls: Vec<ServiceCall> = ZoneCoord::ALL
        .into_iter()
        .map(|c| ServiceCall::set_value(entity::zone_coord(device, z.id, c), coord_of(&z, c)))
        .collect();
    calls.push(ServiceCall::switch(entity::zone_enable(device, z.id), z.enabled));
    calls
}

/// Disable a slot and zero its coordinates.
#[must_use]
pub fn plan_clear_zone(device: &str, slot: ZoneSlot) -> Vec<ServiceCall> {
    let mut calls = vec![ServiceCall::switch(entity::zone_enable(device, slot), false)];
    calls.extend(ZoneCoord::ALL.into_iter().map(|c| ServiceCall::set_value(entity::zone_coord(device, slot, c), 0.0)));
    calls
}

/// Flip a zone's enable switch.
#[must_use]
pub fn plan_toggle_zone(device: &str, slot: ZoneSlot) -> ServiceCall {
    ServiceCall { domain: "switch", service: "toggle", entity_id: entity::zone_enable(device, slot), value: None }
}

fn coord_of(zone: &Zone, coord: ZoneCoord) -> f64 {
    match coord {
        ZoneCoord::XBegin => zone.start.x,
        ZoneCoord::XEnd => zone.end.x,
        ZoneCoord::YBegin => zone.start.y,
        ZoneCoord::YEnd => zone.end.y,
    }
}

fn same_value(a: f64, b: f64) -> bool {
    (a - b).abs() < SAME_VALUE_EPSILON
}

fn same_zone(a: &Zone, b: &Zone) -> bool {
    let (a, b) = (a.normalized(), b.normalized());
    a.enabled == b.enabled && ZoneCoord::ALL.into_iter().all(|c| same_value(coord_of(&a, c), coord_of(&b, c)))
}
