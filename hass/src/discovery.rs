//! Find configurable sensors in the state store.

use crate::states::StateMap;

#[cfg(test)]
#[path = "discovery_test.rs"]
mod discovery_test;

/// Device ids that expose a `number.<dev>_distance` entity, sorted and unique.
#[must_use]
pub fn discover_devices(states: &StateMap) -> Vec<String> {
    let mut devices: Vec<String> = states
        .ids()
        .filter_map(|id| id.strip_prefix("number.")?.strip_suffix("_distance"))
        .filter(|dev| !dev.is_empty())
        .map(str::to_owned)
        .collect();
    devices.sort();
    devices.dedup();
    devices
}

/// The device to show: the configured one if it exists, else the first
/// discovered. An empty `configured` means auto-select.
#[must_use]
pub fn pick_device<'a>(configured: &str, devices: &'a [String]) -> Option<&'a str> {
    if !configured.is_empty() {
        if let Some(found) = devices.iter().find(|d| *d == configured) {
            return Some(found.as_str());
        }
        log::warn!("configured device {configured:?} not found; using the first discovered device");
    }
    devices.first().map(String::as_str)
}
