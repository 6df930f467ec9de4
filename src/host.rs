//! Calls out to the host page.

use hass_bridge::{ServiceCall, ServiceSink};
use serde_json::Value;
use wasm_bindgen::JsValue;

use crate::CardError;

/// Forwards service calls to a JS function `(domain, service, data) => void`,
/// usually a thin wrapper around `hass.callService`.
pub struct JsServiceSink {
    handler: js_sys::Function,
}

impl JsServiceSink {
    #[must_use]
    pub fn new(handler: js_sys::Function) -> Self {
        Self { handler }
    }
}

impl ServiceSink for JsServiceSink {
    fn call_service(&mut self, call: ServiceCall) {
        let data = match json_to_js(&call.data()) {
            Ok(data) => data,
            Err(err) => {
                log::error!("service {call} not sent: {err}");
                return;
            }
        };
        log::debug!("calling service {call}");
        let domain = JsValue::from_str(call.domain);
        let service = JsValue::from_str(call.service);
        if let Err(err) = self.handler.call3(&JsValue::NULL, &domain, &service, &data) {
            log::error!("service {call} failed: {err:?}");
        }
    }
}

/// Read a JS value as JSON via `JSON.stringify`. `undefined` and `null` become `null`.
pub fn js_to_json(value: &JsValue) -> Result<Value, CardError> {
    if value.is_undefined() || value.is_null() {
        return Ok(Value::Null);
    }
    let text = js_sys::JSON::stringify(value).map_err(|err| CardError::Js(format!("{err:?}")))?;
    Ok(serde_json::from_str(&String::from(text))?)
}

pub fn json_to_js(value: &Value) -> Result<JsValue, CardError> {
    js_sys::JSON::parse(&value.to_string()).map_err(|err| CardError::Js(format!("{err:?}")))
}
