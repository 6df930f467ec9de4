//! Host adapter between the radar canvas model and a Home Assistant style
//! entity store.
//!
//! Reading turns the flat `<domain>.<device>_<field>` state map into an
//! [`radar_canvas::model::ExternalSnapshot`]. Writing turns a save or a pose
//! drag into an ordered list of service calls. Neither direction talks to
//! the host directly; the card binding and the `zonectl` CLI supply the
//! state map and a [`service::ServiceSink`].

pub mod config;
pub mod discovery;
pub mod entity;
pub mod service;
pub mod snapshot;
pub mod states;

pub use config::CardConfig;
pub use discovery::{discover_devices, pick_device};
pub use service::{NullSink, ServiceCall, ServiceSink, plan_pose, plan_save};
pub use snapshot::read_snapshot;
pub use states::StateMap;

/// Error returned when host-supplied JSON cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The entity state dump is not an object of entity id → state.
    #[error("invalid host state map: {0}")]
    States(#[source] serde_json::Error),
    /// The card configuration does not match [`CardConfig`].
    #[error("invalid card config: {0}")]
    Config(#[source] serde_json::Error),
}
