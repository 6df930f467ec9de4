//! Redraw coalescing and the deferred-initialization lifecycle.
//!
//! Neither type touches the browser. The card binding owns the actual
//! `requestAnimationFrame` call and asks [`FrameRequest::take_schedule`]
//! whether one is needed after every entry point.

#[cfg(test)]
#[path = "frame_test.rs"]
mod frame_test;

use std::cell::Cell;
use std::rc::Rc;

use crate::consts::{MIN_VIEWPORT_PX, STABLE_SIZE_OBSERVATIONS};

/// Shared "a frame is pending" flag.
///
/// Any number of [`FrameRequest::request`] calls between two frames yield a
/// single schedule. Clones share state, so a model listener can hold one.
#[derive(Debug, Clone, Default)]
pub struct FrameRequest {
    pending: Rc<Cell<bool>>,
    needs_schedule: Rc<Cell<bool>>,
}

impl FrameRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a redraw. Returns `true` only for the request that made a frame pending.
    pub fn request(&self) -> bool {
        if self.pending.get() {
            return false;
        }
        self.pending.set(true);
        self.needs_schedule.set(true);
        true
    }

    /// Whether the caller still has to schedule the pending frame. Clears the flag.
    #[must_use]
    pub fn take_schedule(&self) -> bool {
        self.needs_schedule.replace(false)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Start of a frame callback. Returns whether a frame was pending.
    pub fn begin_frame(&self) -> bool {
        self.pending.replace(false)
    }

    /// Scheduling failed; forget the request so the next one retries.
    pub fn cancel(&self) {
        self.pending.set(false);
        self.needs_schedule.set(false);
    }
}

/// Deferred-initialization state of the canvas.
///
/// The host lays the card out lazily, so the first measurements are often
/// zero or still changing. Drawing starts only once the size has been seen
/// unchanged [`STABLE_SIZE_OBSERVATIONS`] times in a row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Sizing {
        last: Option<(f64, f64)>,
        stable: u32,
    },
    Ready {
        width: f64,
        height: f64,
    },
}

impl Lifecycle {
    /// Feed one size measurement, in CSS pixels.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn observe_size(self, width: f64, height: f64) -> Self {
        if !(width >= MIN_VIEWPORT_PX && height >= MIN_VIEWPORT_PX) {
            return Self::Sizing { last: None, stable: 0 };
        }
        match self {
            Self::Ready { .. } => Self::Ready { width, height },
            Self::Sizing { last: Some(prev), stable } if prev == (width, height) => {
                let stable = stable + 1;
                if stable >= STABLE_SIZE_OBSERVATIONS {
                    Self::Ready { width, height }
                } else {
                    Self::Sizing { last: Some(prev), stable }
                }
            }
            Self::Uninitialized | Self::Sizing { .. } => Self::Sizing { last: Some((width, height)), stable: 1 },
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Drawable size, once ready.
    #[must_use]
    pub fn size(&self) -> Option<(f64, f64)> {
        match *self {
            Self::Ready { width, height } => Some((width, height)),
            _ => None,
        }
    }
}
