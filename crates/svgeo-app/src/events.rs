//! Viewer event bus: string-keyed subscriptions with JSON payloads.
//!
//! Handlers take direct references through explicit registration; there is
//! no process-wide instance registry.

use serde_json::Value;

/// Ticket returned by [`EventBus::subscribe`], used to unsubscribe.
pub type HandlerId = u64;

type Callback = Box<dyn FnMut(&Value)>;

struct Handler {
    id: HandlerId,
    event: String,
    callback: Callback,
}

/// Dispatches named events to registered handlers, in subscription order.
#[derive(Default)]
pub struct EventBus {
    next_id: HandlerId,
    handlers: Vec<Handler>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, event: &str, callback: impl FnMut(&Value) + 'static) -> HandlerId {
        self.next_id += 1;
        self.handlers.push(Handler {
            id: self.next_id,
            event: event.to_string(),
            callback: Box::new(callback),
        });
        self.next_id
    }

    /// Remove a handler; returns false when the id is unknown.
    pub fn unsubscribe(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|h| h.id != id);
        self.handlers.len() != before
    }

    pub fn emit(&mut self, event: &str, payload: Value) {
        for handler in self.handlers.iter_mut().filter(|h| h.event == event) {
            (handler.callback)(&payload);
        }
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_reaches_matching_handlers() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = seen.clone();
        bus.subscribe("zoom", move |payload| {
            sink.borrow_mut().push(payload.clone());
        });
        bus.subscribe("pan", |_| panic!("wrong event"));

        bus.emit("zoom", json!({"zoom": 1.1}));
        assert_eq!(seen.borrow().as_slice(), [json!({"zoom": 1.1})]);
    }

    #[test]
    fn test_unsubscribe() {
        let seen = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let sink = seen.clone();
        let id = bus.subscribe("reset", move |_| {
            *sink.borrow_mut() += 1;
        });

        bus.emit("reset", Value::Null);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit("reset", Value::Null);
        assert_eq!(*seen.borrow(), 1);
    }
}
