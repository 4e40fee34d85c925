use thiserror::Error;

/// Failures reported by an [`EventSource`](crate::EventSource) when a listener
/// cannot be attached.
///
/// Stale targets (detaching something already gone) and calls on a released
/// registry are never errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    #[error("Invalid event name: {event_name:?}")]
    InvalidEventName { event_name: String },

    #[error("Source rejected listener for {event_name:?}: {reason}")]
    Rejected { event_name: String, reason: String },
}

impl ListenerError {
    /// The event name the failed attach was made for.
    pub fn event_name(&self) -> &str {
        match self {
            ListenerError::InvalidEventName { event_name }
            | ListenerError::Rejected { event_name, .. } => event_name,
        }
    }
}
