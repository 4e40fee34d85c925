//! Tracks every listener it attaches so they can be torn down deterministically.
//!
//! A [`ListenerRegistry`] attaches callbacks to [`EventSource`]s and remembers
//! the removal handle of each binding. Bindings can then be removed by
//! (source, event name) pair, all at once, or by releasing the registry, after
//! which it ignores every further mutation.
//!
//! # Examples
//!
//! ```
//! use listener_registry::{EventTarget, ListenerRegistry};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let target = Rc::new(EventTarget::new());
//! let registry = ListenerRegistry::new();
//! let hits = Rc::new(Cell::new(0));
//!
//! let hits_clone = Rc::clone(&hits);
//! registry
//!     .listen(&target, "play", move |_| hits_clone.set(hits_clone.get() + 1))
//!     .unwrap();
//!
//! target.dispatch("play");
//! registry.unlisten(&target, "play");
//! target.dispatch("play");
//!
//! assert_eq!(hits.get(), 1);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use crate::{Event, EventSource, Listener, ListenerError, ListenerEvent, ListenerKey};

/// Type alias for the user-supplied tracing callback.
pub type TraceCallback = dyn Fn(&ListenerEvent) + 'static;

// -------------------------------------------------------------------------------------------------
// Registrations
// -------------------------------------------------------------------------------------------------

/// Non-owning view of a source, erased so sources of any type share one collection.
trait SourceRef {
    /// Allocation address of the source. Stays reserved while the weak handle lives.
    fn address(&self) -> *const ();

    /// Detach `key` if the source is still alive.
    fn detach(&self, key: ListenerKey);
}

impl<S: EventSource + ?Sized> SourceRef for Weak<S> {
    fn address(&self) -> *const () {
        self.as_ptr() as *const ()
    }

    fn detach(&self, key: ListenerKey) {
        if let Some(source) = self.upgrade() {
            source.detach(key);
        }
    }
}

fn address_of<S: ?Sized>(source: &Rc<S>) -> *const () {
    Rc::as_ptr(source) as *const ()
}

struct Registration {
    id: u64,
    source: Box<dyn SourceRef>,
    event_name: String,
    /// The caller's callback, kept for identity matching.
    listener: Listener,
    key: ListenerKey,
    once: bool,
    /// Cleared when the binding is removed; the delivered wrapper checks it.
    active: Rc<Cell<bool>>,
}

impl Registration {
    fn matches(&self, address: *const (), event_name: &str) -> bool {
        self.source.address() == address && self.event_name == event_name
    }
}

/// Deactivate the whole batch before detaching any of it, so a source that
/// dispatches from inside `detach` cannot reach a binding later in the batch.
fn detach_all(removed: &[Registration]) {
    for registration in removed {
        registration.active.set(false);
    }
    for registration in removed {
        registration.source.detach(registration.key);
    }
}

struct Inner {
    registrations: Vec<Registration>,
    released: bool,
    next_id: u64,
    trace: Option<Rc<TraceCallback>>,
}

impl Inner {
    /// Remove and return every registration matching `pred`.
    fn take_where(&mut self, pred: impl Fn(&Registration) -> bool) -> Vec<Registration> {
        let (removed, kept) = std::mem::take(&mut self.registrations)
            .into_iter()
            .partition(|registration| pred(registration));
        self.registrations = kept;
        removed
    }
}

/// Invoke the trace callback, if any, without holding the borrow.
fn emit_event(inner: &RefCell<Inner>, event: ListenerEvent) {
    let callback = inner.borrow().trace.clone();
    if let Some(callback) = callback {
        callback(&event);
    }
}

// -------------------------------------------------------------------------------------------------
// Registry
// -------------------------------------------------------------------------------------------------

/// Owns the bookkeeping for every binding it creates.
///
/// The registry never keeps a source alive: each registration holds only a weak
/// handle, and detaching from a source that has since been dropped is a no-op.
///
/// Single-threaded by construction. Callbacks may call back into the registry;
/// no internal borrow is held while a source or callback runs.
///
/// Dropping the registry releases it.
pub struct ListenerRegistry {
    inner: Rc<RefCell<Inner>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                registrations: Vec::new(),
                released: false,
                next_id: 1,
                trace: None,
            })),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Tracing
    // ---------------------------------------------------------------------------------------------

    /// Set a callback invoked for every registry operation.
    ///
    /// The callback may call back into the registry.
    pub fn set_trace_callback(&self, callback: impl Fn(&ListenerEvent) + 'static) {
        self.inner.borrow_mut().trace = Some(Rc::new(callback));
    }

    /// Clear the tracing callback.
    pub fn clear_trace_callback(&self) {
        self.inner.borrow_mut().trace = None;
    }

    fn emit_event(&self, event: ListenerEvent) {
        emit_event(&self.inner, event);
    }

    fn ignored(&self, operation: &'static str) {
        debug!(operation, "listener registry released, ignoring call");
        self.emit_event(ListenerEvent::Ignored { operation });
    }

    // ---------------------------------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------------------------------

    /// Attach `callback` to `source` for every future `event_name` occurrence.
    ///
    /// Repeated calls, even with the same callback, create independent bindings.
    /// Does nothing once the registry is released.
    ///
    /// # Errors
    ///
    /// Propagates the source's refusal to attach. No registration is kept.
    pub fn listen<S>(
        &self,
        source: &Rc<S>,
        event_name: &str,
        callback: impl Fn(&Event) + 'static,
    ) -> Result<(), ListenerError>
    where
        S: EventSource + ?Sized + 'static,
    {
        self.register(source, event_name, Rc::new(callback), false)
    }

    /// Like [`listen`](Self::listen), for a shared [`Listener`] that can later
    /// be passed to [`unlisten_listener`](Self::unlisten_listener).
    pub fn listen_with<S>(
        &self,
        source: &Rc<S>,
        event_name: &str,
        listener: Listener,
    ) -> Result<(), ListenerError>
    where
        S: EventSource + ?Sized + 'static,
    {
        self.register(source, event_name, listener, false)
    }

    /// Attach `callback` to `source` for the next `event_name` occurrence only.
    ///
    /// Before the callback runs, the binding removes its own bookkeeping entry
    /// and detaches from the source. Other bindings on the same pair are
    /// unaffected.
    ///
    /// # Errors
    ///
    /// Propagates the source's refusal to attach. No registration is kept.
    pub fn listen_once<S>(
        &self,
        source: &Rc<S>,
        event_name: &str,
        callback: impl Fn(&Event) + 'static,
    ) -> Result<(), ListenerError>
    where
        S: EventSource + ?Sized + 'static,
    {
        self.register(source, event_name, Rc::new(callback), true)
    }

    /// Like [`listen_once`](Self::listen_once), for a shared [`Listener`].
    pub fn listen_once_with<S>(
        &self,
        source: &Rc<S>,
        event_name: &str,
        listener: Listener,
    ) -> Result<(), ListenerError>
    where
        S: EventSource + ?Sized + 'static,
    {
        self.register(source, event_name, listener, true)
    }

    fn register<S>(
        &self,
        source: &Rc<S>,
        event_name: &str,
        listener: Listener,
        once: bool,
    ) -> Result<(), ListenerError>
    where
        S: EventSource + ?Sized + 'static,
    {
        let id = {
            let mut inner = self.inner.borrow_mut();
            if inner.released {
                None
            } else {
                inner.next_id += 1;
                Some(inner.next_id - 1)
            }
        };
        let Some(id) = id else {
            self.ignored(if once { "listen_once" } else { "listen" });
            return Ok(());
        };

        let active = Rc::new(Cell::new(true));
        let delivered = self.delivered_listener(id, event_name, &listener, &active, once);

        let key = source.attach(event_name, delivered).map_err(|err| {
            warn!(event_name, once, error = %err, "event source rejected listener");
            err
        })?;

        let mut inner = self.inner.borrow_mut();
        // The source may have fired a once binding synchronously, or a callback
        // may have released the registry, while attach was running.
        if inner.released || !active.get() {
            drop(inner);
            active.set(false);
            source.detach(key);
            return Ok(());
        }

        inner.registrations.push(Registration {
            id,
            source: Box::new(Rc::downgrade(source)),
            event_name: event_name.to_string(),
            listener,
            key,
            once,
            active,
        });
        let tracked = inner.registrations.len();
        drop(inner);

        debug!(event_name, once, tracked, "listener attached");
        self.emit_event(ListenerEvent::Listen {
            event_name: event_name.to_string(),
            once,
        });
        Ok(())
    }

    /// Build the callback actually handed to the source.
    ///
    /// It refuses to run once its registration is gone, and for one-shot
    /// bindings it clears its own registration before calling through.
    fn delivered_listener(
        &self,
        id: u64,
        event_name: &str,
        listener: &Listener,
        active: &Rc<Cell<bool>>,
        once: bool,
    ) -> Listener {
        let callback = Listener::clone(listener);
        let active = Rc::clone(active);

        if !once {
            return Rc::new(move |event: &Event| {
                if active.get() {
                    callback(event);
                }
            });
        }

        let shared: Weak<RefCell<Inner>> = Rc::downgrade(&self.inner);
        let event_name = event_name.to_string();
        Rc::new(move |event: &Event| {
            if !active.replace(false) {
                return;
            }

            if let Some(inner) = shared.upgrade() {
                let removed = inner
                    .borrow_mut()
                    .take_where(|registration| registration.id == id);
                detach_all(&removed);
                trace!(event_name = %event_name, "one-shot listener fired");
                emit_event(
                    &inner,
                    ListenerEvent::OnceFired {
                        event_name: event_name.clone(),
                    },
                );
            }

            callback(event);
        })
    }

    // ---------------------------------------------------------------------------------------------
    // Teardown
    // ---------------------------------------------------------------------------------------------

    /// Detach every binding on `source` for `event_name`, once or not.
    ///
    /// Bindings for other sources or other event names are untouched. A no-op
    /// when nothing matches or the source has already been dropped.
    pub fn unlisten<S>(&self, source: &Rc<S>, event_name: &str)
    where
        S: EventSource + ?Sized,
    {
        let address = address_of(source);
        self.remove_matching("unlisten", event_name, |registration| {
            registration.matches(address, event_name)
        });
    }

    /// Detach only the bindings on `source` for `event_name` whose callback is
    /// `listener`.
    pub fn unlisten_listener<S>(&self, source: &Rc<S>, event_name: &str, listener: &Listener)
    where
        S: EventSource + ?Sized,
    {
        let address = address_of(source);
        self.remove_matching("unlisten_listener", event_name, |registration| {
            registration.matches(address, event_name)
                && Rc::ptr_eq(&registration.listener, listener)
        });
    }

    fn remove_matching(
        &self,
        operation: &'static str,
        event_name: &str,
        pred: impl Fn(&Registration) -> bool,
    ) {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            if inner.released {
                None
            } else {
                Some(inner.take_where(pred))
            }
        };
        let Some(removed) = removed else {
            self.ignored(operation);
            return;
        };

        detach_all(&removed);

        debug!(event_name, removed = removed.len(), "listeners removed");
        self.emit_event(ListenerEvent::Unlisten {
            event_name: event_name.to_string(),
            removed: removed.len(),
        });
    }

    /// Detach every tracked binding. The registry stays usable.
    pub fn remove_all(&self) {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            if inner.released {
                None
            } else {
                Some(std::mem::take(&mut inner.registrations))
            }
        };
        let Some(removed) = removed else {
            self.ignored("remove_all");
            return;
        };

        detach_all(&removed);

        debug!(removed = removed.len(), "all listeners removed");
        self.emit_event(ListenerEvent::RemoveAll {
            removed: removed.len(),
        });
    }

    /// Detach every tracked binding and make the registry permanently inert.
    ///
    /// Safe to call any number of times.
    pub fn release(&self) {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            if inner.released {
                None
            } else {
                inner.released = true;
                Some(std::mem::take(&mut inner.registrations))
            }
        };
        let Some(removed) = removed else {
            self.ignored("release");
            return;
        };

        detach_all(&removed);

        debug!(removed = removed.len(), "listener registry released");
        self.emit_event(ListenerEvent::Release {
            removed: removed.len(),
        });
    }

    // ---------------------------------------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------------------------------------

    /// Number of tracked registrations.
    pub fn len(&self) -> usize {
        self.inner.borrow().registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_released(&self) -> bool {
        self.inner.borrow().released
    }

    /// Number of tracked one-shot registrations that have not fired yet.
    pub fn pending_once(&self) -> usize {
        self.inner
            .borrow()
            .registrations
            .iter()
            .filter(|registration| registration.once)
            .count()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ListenerRegistry {
    fn drop(&mut self) {
        let released = self
            .inner
            .try_borrow()
            .map(|inner| inner.released)
            .unwrap_or(true);
        if !released {
            self.release();
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
