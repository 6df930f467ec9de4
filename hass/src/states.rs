//! The host's flat entity state store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::BridgeError;

#[cfg(test)]
#[path = "states_test.rs"]
mod states_test;

/// One entity as the host reports it. Fields other than these are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// Raw state string, e.g. `"1.250"`, `"on"`, `"unavailable"`.
    pub state: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub attributes: Value,
}

impl EntityState {
    #[must_use]
    pub fn new(state: impl Into<String>) -> Self {
        Self { state: state.into(), attributes: Value::Null }
    }
}

#[derive(Deserialize)]
struct ListedEntity {
    entity_id: String,
    #[serde(flatten)]
    state: EntityState,
}

/// Entity id → state, as in the host's `states` object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateMap(BTreeMap<String, EntityState>);

impl StateMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse host states: either an object of entity id → `{state, ...}`
    /// (the frontend's `states`) or an array of `{entity_id, state, ...}`
    /// (the REST `/api/states` response).
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::States`] if the text is neither shape.
    pub fn from_json(text: &str) -> Result<Self, BridgeError> {
        let value: Value = serde_json::from_str(text).map_err(BridgeError::States)?;
        Self::from_value(value)
    }

    /// Same as [`StateMap::from_json`] for an already-parsed value.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::States`] if the value is neither shape.
    pub fn from_value(value: Value) -> Result<Self, BridgeError> {
        if value.is_array() {
            let listed: Vec<ListedEntity> = serde_json::from_value(value).map_err(BridgeError::States)?;
            return Ok(Self(listed.into_iter().map(|e| (e.entity_id, e.state)).collect()));
        }
        serde_json::from_value(value).map_err(BridgeError::States)
    }

    pub fn insert(&mut self, entity_id: impl Into<String>, state: impl Into<String>) {
        self.0.insert(entity_id.into(), EntityState::new(state));
    }

    #[must_use]
    pub fn get(&self, entity_id: &str) -> Option<&EntityState> {
        self.0.get(entity_id)
    }

    /// Numeric value of an entity. `unknown`, `unavailable`, empty, and
    /// non-finite states count as absent.
    #[must_use]
    pub fn number(&self, entity_id: &str) -> Option<f64> {
        let raw = self.get(entity_id)?.state.trim();
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => None,
        }
    }

    /// Whether a switch or binary sensor is `on`. Anything else is off.
    #[must_use]
    pub fn is_on(&self, entity_id: &str) -> bool {
        self.get(entity_id).is_some_and(|e| e.state == "on")
    }

    /// Entity ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StateMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (id, state) in iter {
            map.insert(id, state);
        }
        map
    }
}
