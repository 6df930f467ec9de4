//! Geometry, state and rendering engine for the radar zone card.
//!
//! This crate is compiled to WebAssembly and runs inside the dashboard page.
//! It owns the pose transform, the zone model with its edit gate, the
//! pointer state machine and the canvas renderer. The host binding only
//! feeds it snapshots, sizes and pointer events, and carries the resulting
//! [`engine::Action`]s to the home automation host.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`model`] | Pose, zones, targets and the edit/dirty gate |
//! | [`zone`] | Zone slots, palette, geometry helpers and the zone store |
//! | [`transform`] | Sensor-to-canvas transform and the room frame |
//! | [`layout`] | Per-frame geometry: room, handles, toolbar |
//! | [`toolbar`] | Toolbar buttons and their visibility rules |
//! | [`hit`] | Hit-testing by priority |
//! | [`input`] | View/edit mode and the gesture state |
//! | [`render`] | Scene drawing onto a [`surface::Surface`] |
//! | [`surface`] | Drawing primitives trait |
//! | [`frame`] | Redraw coalescing and the sizing lifecycle |
//! | [`consts`] | Shared numeric constants |

pub mod consts;
pub mod engine;
pub mod frame;
pub mod hit;
pub mod input;
pub mod layout;
pub mod model;
pub mod render;
pub mod surface;
pub mod toolbar;
pub mod transform;
pub mod zone;
