//! Lifecycle event delivery.
//!
//! Subscribers are invoked synchronously, in subscription order, on the
//! same context as the tick that produced the event. A panicking subscriber
//! is contained so the remaining subscribers still run.

use log::warn;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::models::Message;

/// Callback receiving a lifecycle message and an optional text parameter
/// (typically the SSID involved).
pub type EventCallback = Box<dyn FnMut(Message, Option<&str>)>;

/// Ordered list of event subscribers.
#[derive(Default)]
pub struct Notifier {
    subscribers: Vec<EventCallback>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a subscriber. No dedup; delivery follows insertion order.
    pub fn subscribe(&mut self, callback: EventCallback) {
        self.subscribers.push(callback);
    }

    /// Delivers a message to every subscriber in order.
    ///
    /// Each invocation is isolated: a panic in one subscriber is caught and
    /// logged, and delivery continues with the next.
    pub fn emit(&mut self, message: Message, param: Option<&str>) {
        for (idx, callback) in self.subscribers.iter_mut().enumerate() {
            let outcome = catch_unwind(AssertUnwindSafe(|| callback(message, param)));
            if outcome.is_err() {
                warn!("Event subscriber #{idx} panicked on \"{message}\"");
            }
        }
    }

    /// Drops all subscribers.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
