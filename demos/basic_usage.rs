//! Basic usage example for listener-registry.
//!
//! Demonstrates:
//! - Persistent and one-shot listeners on in-process event targets
//! - Selective teardown with `unlisten`
//! - Waiting for a media readiness level
//! - Releasing the registry
//!
//! Run with: `cargo run --example basic_usage`

use listener_registry::{
    ready_state_event_name, wait_for_ready_state, EventSource, EventTarget, Listener,
    ListenerError, ListenerKey, ListenerRegistry, ReadyState, ReadyStateSource,
};
use std::cell::Cell;
use std::rc::Rc;

/// A toy media element that reports its readiness level.
struct Video {
    events: EventTarget,
    state: Cell<ReadyState>,
}

impl Video {
    fn load_until(&self, state: ReadyState) {
        while self.state.get() < state {
            let Some(next) = ReadyState::from_level(self.state.get().level() + 1) else {
                break;
            };
            self.state.set(next);
            if let Some(event_name) = ready_state_event_name(next) {
                println!("   video -> {next} ({event_name})");
                self.events.dispatch(event_name);
            }
        }
    }
}

impl EventSource for Video {
    fn attach(&self, event_name: &str, listener: Listener) -> Result<ListenerKey, ListenerError> {
        self.events.attach(event_name, listener)
    }

    fn detach(&self, key: ListenerKey) {
        self.events.detach(key)
    }
}

impl ReadyStateSource for Video {
    fn ready_state(&self) -> ReadyState {
        self.state.get()
    }
}

fn main() -> Result<(), ListenerError> {
    println!("=== listener-registry: Basic Usage ===\n");

    let registry = ListenerRegistry::new();
    registry.set_trace_callback(|event| println!("   [trace] {event}"));

    // -------------------------------------------------------------------------
    // 1. Persistent and one-shot listeners
    // -------------------------------------------------------------------------
    println!("1. Listening on a button...");

    let button = Rc::new(EventTarget::new());
    registry.listen(&button, "click", |event| println!("   clicked ({event})"))?;
    registry.listen_once(&button, "click", |_| println!("   first click only"))?;

    button.dispatch("click");
    button.dispatch("click");

    // -------------------------------------------------------------------------
    // 2. Selective teardown
    // -------------------------------------------------------------------------
    println!("\n2. Unlistening...");

    registry.unlisten(&button, "click");
    button.dispatch("click");
    println!("   tracked registrations: {}", registry.len());

    // -------------------------------------------------------------------------
    // 3. Waiting for a readiness level
    // -------------------------------------------------------------------------
    println!("\n3. Waiting for the video to be playable...");

    let video = Rc::new(Video {
        events: EventTarget::new(),
        state: Cell::new(ReadyState::Nothing),
    });
    wait_for_ready_state(&video, ReadyState::FutureData, &registry, || {
        println!("   video can play")
    })?;
    video.load_until(ReadyState::EnoughData);

    // -------------------------------------------------------------------------
    // 4. Release
    // -------------------------------------------------------------------------
    println!("\n4. Releasing...");

    registry.listen(&button, "click", |_| println!("   never printed"))?;
    registry.release();
    button.dispatch("click");
    registry.listen(&button, "click", |_| println!("   never printed"))?;

    println!("\n=== Done ===");
    Ok(())
}
