//! The capability a registry needs from anything it listens on.
//!
//! An [`EventSource`] accepts a callback for a named event and hands back an
//! opaque [`ListenerKey`] that later detaches exactly that callback. Nothing
//! else about the source is assumed: DOM-like targets, timers, fd readiness
//! and test doubles all fit behind the same two methods.

use std::fmt;
use std::rc::Rc;

use crate::ListenerError;

/// Closure type for event callbacks.
///
/// Callbacks are reference counted so the same callback can be attached to
/// several sources and later identified with `Rc::ptr_eq`.
pub type Listener = Rc<dyn Fn(&Event)>;

/// An occurrence delivered to listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    name: String,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The event name this occurrence was dispatched under.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Opaque removal handle returned by [`EventSource::attach`].
///
/// Only meaningful to the source that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerKey(u64);

impl ListenerKey {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Something that can deliver named events to callbacks.
pub trait EventSource {
    /// Begin delivering occurrences of `event_name` to `listener`.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] when the source refuses the binding, for
    /// example because it does not recognise `event_name`.
    fn attach(&self, event_name: &str, listener: Listener) -> Result<ListenerKey, ListenerError>;

    /// Stop delivery for `key`.
    ///
    /// Must be idempotent: unknown or already detached keys are ignored.
    fn detach(&self, key: ListenerKey);
}
