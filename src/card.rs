//! The `#[wasm_bindgen]` surface the host page drives.

use std::cell::RefCell;
use std::rc::Rc;

use hass_bridge::service::plan_toggle_zone;
use hass_bridge::{CardConfig, ServiceCall, StateMap, plan_pose, plan_save};
use radar_canvas::engine::{Action, Engine};
use radar_canvas::input::{Mode, PointerId};
use radar_canvas::transform::Point;
use radar_canvas::zone::ZoneSlot;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, PointerEvent};

use crate::host::{JsServiceSink, js_to_json, json_to_js};
use crate::outbox::Outbox;
use crate::session::{Session, Update};
use crate::{CardError, frame, logging};

/// Everything behind the card's shared handle.
pub(crate) struct CardState {
    pub(crate) engine: Engine,
    canvas: HtmlCanvasElement,
    session: Session,
}

impl CardState {
    fn apply_update(&mut self, update: Update) {
        if update.device_changed && self.engine.core.model.is_editing() {
            log::info!("device changed mid-edit; local edits dropped");
            self.engine.core.discard();
        }
        self.engine.accept_external_snapshot(update.snapshot);
    }

    /// Carry out engine actions. Returns the service calls to send once the borrow is released.
    fn handle(&mut self, actions: Vec<Action>) -> Vec<ServiceCall> {
        let mut calls = Vec::new();
        for action in actions {
            match action {
                Action::CapturePointer(id) => {
                    if let Err(err) = self.canvas.set_pointer_capture(id.0) {
                        log::debug!("pointer capture failed for {id:?}: {err:?}");
                    }
                }
                Action::ReleasePointer(id) => {
                    if self.canvas.has_pointer_capture(id.0) {
                        if let Err(err) = self.canvas.release_pointer_capture(id.0) {
                            log::debug!("pointer release failed for {id:?}: {err:?}");
                        }
                    }
                }
                Action::PoseCommitted(pose) => match self.session.device() {
                    Some(device) => calls.extend(plan_pose(device, pose)),
                    None => log::warn!("pose change not sent: no device selected"),
                },
                Action::Save(request) => match self.session.device() {
                    Some(device) => {
                        let planned = plan_save(device, &request);
                        log::info!("saving {device}: {} service calls", planned.len());
                        calls.extend(planned);
                    }
                    None => log::warn!("save not sent: no device selected"),
                },
                Action::ReloadRequested => {
                    if let Some(snapshot) = self.session.snapshot() {
                        self.engine.accept_external_snapshot(snapshot);
                    }
                }
            }
        }
        calls
    }

    /// Pointer position in CSS pixels relative to the canvas.
    fn local_point(&self, event: &PointerEvent) -> Point {
        let rect = self.canvas.get_bounding_client_rect();
        Point::new(f64::from(event.client_x()) - rect.left(), f64::from(event.client_y()) - rect.top())
    }
}

/// One radar zone card bound to a canvas element.
#[wasm_bindgen]
pub struct ZoneCard {
    state: Rc<RefCell<CardState>>,
    outbox: Outbox,
}

#[wasm_bindgen]
impl ZoneCard {
    /// Bind to `canvas`. `config` is the card's dashboard config object.
    ///
    /// # Errors
    ///
    /// Throws if the config is malformed or the canvas has no 2D context.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config: JsValue) -> Result<ZoneCard, JsValue> {
        let config = read_config(&config)?;
        logging::init(config.log_level());
        let engine = Engine::new(canvas.clone()).map_err(|err| CardError::Canvas(format!("{err:?}")))?;
        log::debug!("card created with {config:?}");
        let state = CardState { engine, canvas, session: Session::new(config) };
        Ok(Self { state: Rc::new(RefCell::new(state)), outbox: Outbox::new() })
    }

    /// # Errors
    ///
    /// Throws if the config is malformed.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&self, config: JsValue) -> Result<(), JsValue> {
        let config = read_config(&config)?;
        log::set_max_level(config.log_level());
        self.mutate(|card| {
            if let Some(update) = card.session.set_config(config) {
                card.apply_update(update);
            }
            Vec::new()
        });
        Ok(())
    }

    /// Feed the host's entity states (`hass.states` or a REST state list).
    ///
    /// # Errors
    ///
    /// Throws if the value is not a state map.
    #[wasm_bindgen(js_name = setStates)]
    pub fn set_states(&self, states: JsValue) -> Result<(), JsValue> {
        let states = StateMap::from_value(js_to_json(&states)?).map_err(CardError::from)?;
        self.mutate(|card| {
            if let Some(update) = card.session.set_states(states) {
                card.apply_update(update);
            }
            Vec::new()
        });
        Ok(())
    }

    #[wasm_bindgen(js_name = setDevice)]
    pub fn set_device(&self, device: &str) {
        self.mutate(|card| {
            if let Some(update) = card.session.select_device(device) {
                card.apply_update(update);
            }
            Vec::new()
        });
    }

    /// Devices found in the last state dump.
    #[must_use]
    pub fn devices(&self) -> js_sys::Array {
        self.state.borrow().session.devices().iter().map(|d| JsValue::from_str(d)).collect()
    }

    #[must_use]
    pub fn device(&self) -> Option<String> {
        self.state.borrow().session.device().map(ToOwned::to_owned)
    }

    /// Hand service calls to `handler(domain, service, data)`.
    #[wasm_bindgen(js_name = setServiceHandler)]
    pub fn set_service_handler(&self, handler: js_sys::Function) {
        self.outbox.set_sink(Box::new(JsServiceSink::new(handler)));
    }

    /// Report the canvas's CSS size and device pixel ratio. Returns whether the card can draw.
    pub fn resize(&self, width: f64, height: f64, dpr: f64) -> bool {
        let ready = self.state.borrow_mut().engine.set_viewport(width, height, dpr);
        frame::schedule(&self.state);
        ready
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&self, event: &PointerEvent) {
        self.pointer(event, |engine, id, pt| engine.on_pointer_down(id, pt));
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, event: &PointerEvent) {
        self.pointer(event, |engine, id, pt| engine.on_pointer_move(id, pt));
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&self, event: &PointerEvent) {
        self.pointer(event, |engine, id, _| engine.on_pointer_up(id));
    }

    #[wasm_bindgen(js_name = pointerCancel)]
    pub fn pointer_cancel(&self, event: &PointerEvent) {
        self.pointer(event, |engine, id, _| engine.on_pointer_cancel(id));
    }

    /// Highlight a zone from outside the canvas, e.g. a hovered list row. `undefined` clears it.
    #[wasm_bindgen(js_name = highlightZone)]
    pub fn highlight_zone(&self, zone: Option<u8>) {
        let slot = zone.and_then(ZoneSlot::from_id);
        self.mutate(|card| {
            card.engine.select_zone(slot);
            Vec::new()
        });
    }

    /// Flip a zone's enable switch on the host.
    ///
    /// # Errors
    ///
    /// Throws for ids outside 1-4 or when no device is selected.
    #[wasm_bindgen(js_name = toggleZone)]
    pub fn toggle_zone(&self, zone: u8) -> Result<(), JsValue> {
        let slot = ZoneSlot::from_id(zone).ok_or(CardError::UnknownZone(zone))?;
        let call = {
            let card = self.state.borrow();
            plan_toggle_zone(card.session.device().ok_or(CardError::NoDevice)?, slot)
        };
        self.outbox.send([call]);
        Ok(())
    }

    /// Zones for a zone list next to the canvas, unsaved edits included:
    /// `[{id, enabled, occupied, start: {x, y}, end: {x, y}}]`.
    ///
    /// # Errors
    ///
    /// Throws if the zones cannot be converted to a JS value.
    pub fn zones(&self) -> Result<JsValue, JsValue> {
        let json = self.state.borrow().engine.core.zones_json().map_err(CardError::from)?;
        Ok(json_to_js(&json)?)
    }

    /// `"view"` or `"edit"`.
    #[must_use]
    pub fn mode(&self) -> String {
        match self.state.borrow().engine.mode() {
            Mode::View => "view".to_owned(),
            Mode::Edit => "edit".to_owned(),
        }
    }

    #[wasm_bindgen(js_name = isDirty)]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state.borrow().engine.core.model.has_dirty_changes()
    }

    /// Draw immediately instead of waiting for the next animation frame.
    pub fn render(&self) -> bool {
        self.state.borrow_mut().engine.render()
    }
}

impl ZoneCard {
    /// Run `f` under the state borrow, then send its service calls and schedule a frame.
    ///
    /// The host's service handler may call back into the card, so it only runs
    /// after the borrow is released.
    fn mutate(&self, f: impl FnOnce(&mut CardState) -> Vec<ServiceCall>) {
        let calls = f(&mut self.state.borrow_mut());
        self.outbox.send(calls);
        frame::schedule(&self.state);
    }

    fn pointer(&self, event: &PointerEvent, f: impl FnOnce(&mut Engine, PointerId, Point) -> Vec<Action>) {
        self.mutate(|card| {
            let pt = card.local_point(event);
            let actions = f(&mut card.engine, PointerId(event.pointer_id()), pt);
            if !actions.is_empty() {
                event.prevent_default();
            }
            card.handle(actions)
        });
    }
}

fn read_config(value: &JsValue) -> Result<CardConfig, CardError> {
    match js_to_json(value)? {
        serde_json::Value::Null => Ok(CardConfig::default()),
        json => Ok(CardConfig::from_value(json)?),
    }
}
