//! What the card remembers about the host between `hass` updates.

use hass_bridge::{CardConfig, StateMap, discover_devices, pick_device, read_snapshot};
use radar_canvas::model::ExternalSnapshot;

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

/// A snapshot to feed the engine after a host update.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub snapshot: ExternalSnapshot,
    /// The card now shows a different device; local edits belong to the old one.
    pub device_changed: bool,
}

#[derive(Debug, Default)]
pub struct Session {
    config: CardConfig,
    states: StateMap,
    devices: Vec<String>,
    device: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new(config: CardConfig) -> Self {
        Self { config, ..Self::default() }
    }

    /// Store a fresh state dump and re-read the shown device.
    pub fn set_states(&mut self, states: StateMap) -> Option<Update> {
        self.states = states;
        self.devices = discover_devices(&self.states);
        self.refresh()
    }

    /// Replace the configuration. Returns an update only when the shown device changed.
    pub fn set_config(&mut self, config: CardConfig) -> Option<Update> {
        self.config = config;
        self.refresh().filter(|u| u.device_changed)
    }

    /// Show `device` instead of the configured one.
    pub fn select_device(&mut self, device: &str) -> Option<Update> {
        device.clone_into(&mut self.config.device_id);
        self.refresh().filter(|u| u.device_changed)
    }

    /// The shown device's snapshot from the last state dump.
    #[must_use]
    pub fn snapshot(&self) -> Option<ExternalSnapshot> {
        self.device.as_deref().map(|device| read_snapshot(&self.states, device))
    }

    #[must_use]
    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    #[must_use]
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    #[must_use]
    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    fn refresh(&mut self) -> Option<Update> {
        let picked = pick_device(self.config.device().unwrap_or(""), &self.devices).map(ToOwned::to_owned);
        let device_changed = picked != self.device;
        if device_changed {
            log::info!("showing device {picked:?}");
        }
        self.device = picked;
        self.snapshot().map(|snapshot| Update { snapshot, device_changed })
    }
}
