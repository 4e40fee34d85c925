/// Events emitted by a [`ListenerRegistry`](crate::ListenerRegistry) during operations.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use listener_registry::ListenerEvent;
///
/// let event = ListenerEvent::Listen { event_name: "play".to_string(), once: false };
/// assert_eq!(event.to_string(), "listen { event_name: play, once: false }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEvent {
    /// A callback was attached and is now tracked.
    Listen {
        event_name: String,
        /// Whether the binding removes itself after its first invocation.
        once: bool,
    },

    /// Registrations for a (source, event name) pair were removed.
    Unlisten {
        event_name: String,
        /// How many tracked registrations were detached.
        removed: usize,
    },

    /// A one-shot binding fired and removed itself.
    OnceFired { event_name: String },

    /// Every registration was removed.
    RemoveAll { removed: usize },

    /// The registry was released.
    Release { removed: usize },

    /// A mutating call was made after release and did nothing.
    Ignored { operation: &'static str },
}

impl std::fmt::Display for ListenerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerEvent::Listen { event_name, once } => {
                write!(f, "listen {{ event_name: {event_name}, once: {once} }}")
            }
            ListenerEvent::Unlisten {
                event_name,
                removed,
            } => {
                write!(
                    f,
                    "unlisten {{ event_name: {event_name}, removed: {removed} }}"
                )
            }
            ListenerEvent::OnceFired { event_name } => {
                write!(f, "once fired {{ event_name: {event_name} }}")
            }
            ListenerEvent::RemoveAll { removed } => {
                write!(f, "remove all {{ removed: {removed} }}")
            }
            ListenerEvent::Release { removed } => {
                write!(f, "release {{ removed: {removed} }}")
            }
            ListenerEvent::Ignored { operation } => {
                write!(f, "ignored {{ operation: {operation} }}")
            }
        }
    }
}
