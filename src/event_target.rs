//! `EventTarget` — an in-process [`EventSource`] keyed by event name.
//!
//! Snapshot-on-dispatch semantics:
//!   - A listener attached *during* dispatch is NOT called until the next dispatch.
//!   - A listener detached *during* dispatch is skipped if it has not been
//!     reached yet.
//!
//! The internal `RefCell` is never borrowed while a callback runs, so callbacks
//! may attach, detach and dispatch freely.

use std::cell::{Cell, RefCell};

use crate::{Event, EventSource, Listener, ListenerError, ListenerKey};

struct Slot {
    key: ListenerKey,
    event_name: String,
    listener: Listener,
}

/// Delivers named events to attached listeners in attach order.
pub struct EventTarget {
    slots: RefCell<Vec<Slot>>,
    next_key: Cell<u64>,
}

impl EventTarget {
    /// Create a target with no listeners.
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
            next_key: Cell::new(1),
        }
    }

    /// Dispatch an occurrence of `event_name` to every listener attached for it.
    pub fn dispatch(&self, event_name: &str) {
        self.dispatch_event(&Event::new(event_name));
    }

    /// Dispatch `event` to every listener attached for `event.name()`.
    pub fn dispatch_event(&self, event: &Event) {
        let snapshot: Vec<(ListenerKey, Listener)> = self
            .slots
            .borrow()
            .iter()
            .filter(|slot| slot.event_name == event.name())
            .map(|slot| (slot.key, Listener::clone(&slot.listener)))
            .collect();

        for (key, listener) in snapshot {
            if self.is_attached(key) {
                listener(event);
            }
        }
    }

    /// Number of listeners currently attached for `event_name`.
    pub fn listener_count(&self, event_name: &str) -> usize {
        self.slots
            .borrow()
            .iter()
            .filter(|slot| slot.event_name == event_name)
            .count()
    }

    /// Number of listeners attached across all event names.
    pub fn total_listeners(&self) -> usize {
        self.slots.borrow().len()
    }

    fn is_attached(&self, key: ListenerKey) -> bool {
        self.slots.borrow().iter().any(|slot| slot.key == key)
    }
}

impl Default for EventTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for EventTarget {
    fn attach(&self, event_name: &str, listener: Listener) -> Result<ListenerKey, ListenerError> {
        if event_name.is_empty() {
            return Err(ListenerError::InvalidEventName {
                event_name: event_name.to_string(),
            });
        }

        let key = ListenerKey::new(self.next_key.get());
        self.next_key.set(key.get() + 1);
        self.slots.borrow_mut().push(Slot {
            key,
            event_name: event_name.to_string(),
            listener,
        });
        Ok(key)
    }

    fn detach(&self, key: ListenerKey) {
        self.slots.borrow_mut().retain(|slot| slot.key != key);
    }
}
