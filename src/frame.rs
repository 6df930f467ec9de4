//! `requestAnimationFrame` scheduling for the card.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::card::CardState;

/// Schedule one animation frame if the engine asked for a redraw since the last one.
///
/// Call after every entry point, once the state borrow is released. Each frame
/// schedules again if it asked for another, which keeps a sizing canvas
/// re-measuring until it is ready.
pub(crate) fn schedule(state: &Rc<RefCell<CardState>>) {
    let frames = {
        let Ok(card) = state.try_borrow() else {
            return;
        };
        if !card.engine.take_frame_schedule() {
            return;
        }
        card.engine.core.frames.clone()
    };

    let Some(window) = web_sys::window() else {
        render_now(state);
        return;
    };

    let holder: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let holder_for_cb = Rc::clone(&holder);
    let state_for_cb = Rc::clone(state);
    let frames_for_cb = frames.clone();
    let cb = Closure::wrap(Box::new(move |_ts: f64| {
        let rendered = match state_for_cb.try_borrow_mut() {
            Ok(mut card) => {
                card.engine.render();
                true
            }
            Err(_) => false,
        };
        if rendered {
            schedule(&state_for_cb);
        } else {
            frames_for_cb.cancel();
            log::warn!("card busy at frame time; frame dropped");
        }
        holder_for_cb.borrow_mut().take();
    }) as Box<dyn FnMut(f64)>);

    match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
        Ok(_) => {
            *holder.borrow_mut() = Some(cb);
        }
        Err(err) => {
            log::warn!("requestAnimationFrame failed: {err:?}; drawing now");
            frames.cancel();
            render_now(state);
        }
    }
}

fn render_now(state: &Rc<RefCell<CardState>>) {
    if let Ok(mut card) = state.try_borrow_mut() {
        card.engine.render();
    }
}
