//! Waiting for a media source to reach a data readiness level.
//!
//! Readiness levels are ordered. Each level above [`ReadyState::Nothing`] has a
//! canonical event that the source dispatches when it reaches that level; the
//! mapping is built once on first use and shared afterwards.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::LazyLock;

use tracing::debug;

use crate::{EventSource, ListenerError, ListenerRegistry};

/// How much of a media resource's data is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ReadyState {
    Nothing = 0,
    Metadata = 1,
    CurrentData = 2,
    FutureData = 3,
    EnoughData = 4,
}

impl ReadyState {
    /// Map a raw numeric level, as reported by media elements, to a `ReadyState`.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(ReadyState::Nothing),
            1 => Some(ReadyState::Metadata),
            2 => Some(ReadyState::CurrentData),
            3 => Some(ReadyState::FutureData),
            4 => Some(ReadyState::EnoughData),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReadyState::Nothing => "HAVE_NOTHING",
            ReadyState::Metadata => "HAVE_METADATA",
            ReadyState::CurrentData => "HAVE_CURRENT_DATA",
            ReadyState::FutureData => "HAVE_FUTURE_DATA",
            ReadyState::EnoughData => "HAVE_ENOUGH_DATA",
        };
        f.write_str(name)
    }
}

/// An event source that also reports its current readiness level.
pub trait ReadyStateSource: EventSource {
    fn ready_state(&self) -> ReadyState;
}

static READY_STATE_EVENTS: LazyLock<HashMap<ReadyState, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        (ReadyState::Metadata, "loadedmetadata"),
        (ReadyState::CurrentData, "loadeddata"),
        (ReadyState::FutureData, "canplay"),
        (ReadyState::EnoughData, "canplaythrough"),
    ])
});

/// The event dispatched when a source reaches `state`.
///
/// `None` for [`ReadyState::Nothing`], which every source satisfies.
pub fn ready_state_event_name(state: ReadyState) -> Option<&'static str> {
    READY_STATE_EVENTS.get(&state).copied()
}

/// Call `callback` once `source` has reached `target`.
///
/// If `target` is [`ReadyState::Nothing`] or already satisfied, `callback` runs
/// before this returns and nothing is registered. Otherwise a one-shot listener
/// for the level's event is placed in `registry`, so releasing the registry
/// cancels the wait.
///
/// # Errors
///
/// Propagates the source's refusal to attach the one-shot listener.
pub fn wait_for_ready_state<S>(
    source: &Rc<S>,
    target: ReadyState,
    registry: &ListenerRegistry,
    callback: impl FnOnce() + 'static,
) -> Result<(), ListenerError>
where
    S: ReadyStateSource + ?Sized + 'static,
{
    let current = source.ready_state();
    let event_name = match ready_state_event_name(target) {
        Some(event_name) if current < target => event_name,
        _ => {
            debug!(%current, %target, "ready state already reached");
            callback();
            return Ok(());
        }
    };

    debug!(%current, %target, event_name, "waiting for ready state");
    let callback = Cell::new(Some(callback));
    registry.listen_once(source, event_name, move |_| {
        if let Some(callback) = callback.take() {
            callback();
        }
    })
}
