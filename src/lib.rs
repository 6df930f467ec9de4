//! WebAssembly binding for the radar zone card.
//!
//! [`ZoneCard`] owns one canvas. The host page forwards `hass` state dumps,
//! size changes and pointer events to it; the card reads the shown device
//! through `hass-bridge`, runs the `radar-canvas` engine and hands service
//! calls back to a JavaScript handler.
//!
//! | Module    | Role                                                  |
//! |-----------|-------------------------------------------------------|
//! | `card`    | `#[wasm_bindgen]` entry points and action dispatch    |
//! | `session` | Config, last state dump and the chosen device         |
//! | `frame`   | `requestAnimationFrame` scheduling                    |
//! | `host`    | JS service handler and JSON value bridging            |
//! | `outbox`  | Service calls sent after the state borrow is released |
//! | `logging` | Console logger and panic hook                         |

mod card;
mod frame;
mod host;
mod logging;
pub mod outbox;
pub mod session;

pub use card::ZoneCard;
pub use outbox::Outbox;
pub use session::{Session, Update};

use hass_bridge::BridgeError;
use wasm_bindgen::JsValue;


/// Error surfaced to the host page as a thrown `Error`.
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("canvas setup failed: {0}")]
    Canvas(String),
    #[error("javascript value rejected: {0}")]
    Js(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error("no radar device is selected")]
    NoDevice,
    #[error("zone must be 1-4, got {0}")]
    UnknownZone(u8),
}

impl From<CardError> for JsValue {
    fn from(err: CardError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
