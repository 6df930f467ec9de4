//! Card configuration as set in the dashboard editor.

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::BridgeError;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardConfig {
    /// Device to show. Empty means the first discovered device.
    #[serde(default)]
    pub device_id: String,
    /// Verbose console logging.
    #[serde(default)]
    pub debug: bool,
}

impl CardConfig {
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if the text is not a config object.
    pub fn from_json(text: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(text).map_err(BridgeError::Config)
    }

    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if the value is not a config object.
    pub fn from_value(value: Value) -> Result<Self, BridgeError> {
        serde_json::from_value(value).map_err(BridgeError::Config)
    }

    /// The configured device, if one was set.
    #[must_use]
    pub fn device(&self) -> Option<&str> {
        let id = self.device_id.trim();
        (!id.is_empty()).then_some(id)
    }

    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        if self.debug { LevelFilter::Debug } else { LevelFilter::Warn }
    }
}
