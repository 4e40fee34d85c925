//! # Listener Registry
//!
//! Deterministic lifecycle management for event listeners.
//!
//! A [`ListenerRegistry`] attaches callbacks to any [`EventSource`], tracks the
//! removal handle of every binding it creates, and tears them down on demand:
//! per (source, event name) pair, all at once, or by releasing the registry.
//! Sources are never kept alive by the registry.
//!
//! ## Quick Start
//!
//! ```rust
//! use listener_registry::{EventTarget, ListenerRegistry};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let video = Rc::new(EventTarget::new());
//! let registry = ListenerRegistry::new();
//! let plays = Rc::new(Cell::new(0));
//!
//! let plays_clone = Rc::clone(&plays);
//! registry
//!     .listen_once(&video, "play", move |_| plays_clone.set(plays_clone.get() + 1))
//!     .unwrap();
//!
//! video.dispatch("play");
//! video.dispatch("play");
//! assert_eq!(plays.get(), 1);
//!
//! registry.release();
//! assert!(registry.is_released());
//! ```
//!
//! ## Features
//!
//! - **Tracked teardown**: `unlisten`, `remove_all` and `release` detach exactly what was attached
//! - **One-shot bindings**: `listen_once` removes its own bookkeeping before the callback runs
//! - **Weak sources**: dropping a source never faults later teardown
//! - **Tracing support**: structured `tracing` logs plus an optional per-registry trace callback
//!
//! ## Main Items
//!
//! - [`ListenerRegistry`] - The registry itself
//! - [`EventSource`] - The capability a source must provide
//! - [`EventTarget`] - An in-process event source
//! - [`wait_for_ready_state`] - Run a callback once a media source reaches a readiness level

mod event_source;
mod event_target;
mod listener_error;
mod listener_event;
mod listener_registry;
mod ready_state;

pub use event_source::{Event, EventSource, Listener, ListenerKey};
pub use event_target::EventTarget;
pub use listener_error::ListenerError;
pub use listener_event::ListenerEvent;
pub use listener_registry::{ListenerRegistry, TraceCallback};
pub use ready_state::{
    ready_state_event_name, wait_for_ready_state, ReadyState, ReadyStateSource,
};
