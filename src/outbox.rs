//! Service calls planned under the card borrow and sent after it is released.

use std::cell::RefCell;
use std::collections::VecDeque;

use hass_bridge::{NullSink, ServiceCall, ServiceSink};

#[cfg(test)]
#[path = "outbox_test.rs"]
mod outbox_test;

/// Ordered queue in front of the host's service sink.
///
/// The sink may call back into the card, and through it into [`Outbox::send`].
/// Calls queued from inside a running send are delivered by that outer send,
/// in order, after the current call returns.
pub struct Outbox {
    sink: RefCell<Box<dyn ServiceSink>>,
    queue: RefCell<VecDeque<ServiceCall>>,
}

impl Default for Outbox {
    fn default() -> Self {
        Self { sink: RefCell::new(Box::new(NullSink)), queue: RefCell::new(VecDeque::new()) }
    }
}

impl Outbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the sink. Ignored while the current sink is running.
    pub fn set_sink(&self, sink: Box<dyn ServiceSink>) {
        match self.sink.try_borrow_mut() {
            Ok(mut current) => *current = sink,
            Err(_) => log::warn!("service handler replaced from inside a service call; keeping the old one"),
        }
    }

    /// Queue `calls` and deliver everything pending.
    pub fn send(&self, calls: impl IntoIterator<Item = ServiceCall>) {
        self.queue.borrow_mut().extend(calls);
        let Ok(mut sink) = self.sink.try_borrow_mut() else {
            return;
        };
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(call) = next else {
                break;
            };
            sink.call_service(call);
        }
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}
