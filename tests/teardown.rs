//! Integration tests for `unlisten`, `unlisten_listener`, `remove_all` and `release`.

use listener_registry::{
    Event, EventSource, EventTarget, Listener, ListenerError, ListenerKey, ListenerRegistry,
};
use std::cell::Cell;
use std::rc::{Rc, Weak};

fn counter() -> (Rc<Cell<usize>>, Listener) {
    let count = Rc::new(Cell::new(0));
    let count_clone = Rc::clone(&count);
    let listener: Listener = Rc::new(move |_: &Event| count_clone.set(count_clone.get() + 1));
    (count, listener)
}

// -------------------------------------------------------------------------------------------------
// unlisten
// -------------------------------------------------------------------------------------------------

#[test]
fn test_unlisten_stops_listening() {
    let target = Rc::new(EventTarget::new());
    let registry = ListenerRegistry::new();
    let (count, f) = counter();

    registry.listen_with(&target, "eventtype1", f).unwrap();
    registry.unlisten(&target, "eventtype1");
    target.dispatch("eventtype1");

    assert_eq!(count.get(), 0);
    assert!(registry.is_empty());
}

#[test]
fn test_unlisten_removes_every_callback_for_the_pair() {
    let target = Rc::new(EventTarget::new());
    let registry = ListenerRegistry::new();
    let (a, f) = counter();
    let (b, g) = counter();
    let (c, h) = counter();

    registry.listen_with(&target, "x", f).unwrap();
    registry.listen_with(&target, "x", g).unwrap();
    registry.listen_once_with(&target, "x", h).unwrap();
    registry.unlisten(&target, "x");
    target.dispatch("x");

    assert_eq!((a.get(), b.get(), c.get()), (0, 0, 0));
    assert_eq!(target.listener_count("x"), 0);
}

#[test]
fn test_unlisten_ignores_other_targets() {
    let target1 = Rc::new(EventTarget::new());
    let target2 = Rc::new(EventTarget::new());
    let registry = ListenerRegistry::new();
    let (one, f) = counter();
    let (two, g) = counter();

    registry.listen_with(&target1, "eventtype1", f).unwrap();
    registry.listen_with(&target2, "eventtype1", g).unwrap();
    registry.unlisten(&target2, "eventtype1");

    target1.dispatch("eventtype1");
    target2.dispatch("eventtype1");

    assert_eq!(one.get(), 1);
    assert_eq!(two.get(), 0);
}

#[test]
fn test_unlisten_ignores_other_events() {
    let target = Rc::new(EventTarget::new());
    let registry = ListenerRegistry::new();
    let (one, f) = counter();
    let (two, g) = counter();

    registry.listen_with(&target, "eventtype1", f).unwrap();
    registry.listen_with(&target, "eventtype2", g).unwrap();
    registry.unlisten(&target, "eventtype1");

    target.dispatch("eventtype1");
    target.dispatch("eventtype2");

    assert_eq!(one.get(), 0);
    assert_eq!(two.get(), 1);
}

#[test]
fn test_unlisten_twice_is_safe() {
    let target = Rc::new(EventTarget::new());
    let registry = ListenerRegistry::new();
    let (_, f) = counter();

    registry.listen_with(&target, "x", f).unwrap();
    registry.unlisten(&target, "x");
    registry.unlisten(&target, "x");

    assert!(registry.is_empty());
}

#[test]
fn test_unlisten_listener_keeps_other_callbacks() {
    let target = Rc::new(EventTarget::new());
    let registry = ListenerRegistry::new();
    let (a, f) = counter();
    let (b, g) = counter();

    registry
        .listen_with(&target, "x", Listener::clone(&f))
        .unwrap();
    registry.listen_with(&target, "x", g).unwrap();
    registry.unlisten_listener(&target, "x", &f);

    target.dispatch("x");

    assert_eq!(a.get(), 0);
    assert_eq!(b.get(), 1);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_unlisten_from_inside_callback() {
    let target = Rc::new(EventTarget::new());
    let registry = Rc::new(ListenerRegistry::new());
    let (count, g) = counter();

    let registry_clone = Rc::clone(&registry);
    let target_clone = Rc::clone(&target);
    registry
        .listen(&target, "x", move |_| registry_clone.unlisten(&target_clone, "x"))
        .unwrap();
    registry.listen_with(&target, "x", g).unwrap();

    target.dispatch("x");

    assert_eq!(count.get(), 0);
    assert!(registry.is_empty());
}

// -------------------------------------------------------------------------------------------------
// remove_all
// -------------------------------------------------------------------------------------------------

#[test]
fn test_remove_all_stops_multiple_events() {
    let target = Rc::new(EventTarget::new());
    let registry = ListenerRegistry::new();
    let (one, f) = counter();
    let (two, g) = counter();

    registry.listen_with(&target, "eventtype1", f).unwrap();
    registry.listen_with(&target, "eventtype2", g).unwrap();
    registry.remove_all();

    target.dispatch("eventtype1");
    target.dispatch("eventtype2");

    assert_eq!(one.get(), 0);
    assert_eq!(two.get(), 0);
    assert_eq!(target.total_listeners(), 0);
}

#[test]
fn test_remove_all_stops_multiple_listeners_across_sources() {
    let a = Rc::new(EventTarget::new());
    let b = Rc::new(EventTarget::new());
    let registry = ListenerRegistry::new();
    let (count, f) = counter();

    registry.listen_with(&a, "x", Listener::clone(&f)).unwrap();
    registry.listen_with(&a, "x", Listener::clone(&f)).unwrap();
    registry.listen_once_with(&b, "y", f).unwrap();
    registry.remove_all();

    a.dispatch("x");
    b.dispatch("y");

    assert_eq!(count.get(), 0);
}

#[test]
fn test_registry_usable_after_remove_all() {
    let target = Rc::new(EventTarget::new());
    let registry = ListenerRegistry::new();
    let (count, f) = counter();

    registry.remove_all();
    registry.listen_with(&target, "x", f).unwrap();
    target.dispatch("x");

    assert!(!registry.is_released());
    assert_eq!(count.get(), 1);
}

// -------------------------------------------------------------------------------------------------
// release
// -------------------------------------------------------------------------------------------------

#[test]
fn test_release_detaches_everything() {
    let target = Rc::new(EventTarget::new());
    let registry = ListenerRegistry::new();
    let (count, f) = counter();

    registry.listen_with(&target, "x", Listener::clone(&f)).unwrap();
    registry.listen_once_with(&target, "y", f).unwrap();
    registry.release();

    target.dispatch("x");
    target.dispatch("y");

    assert_eq!(count.get(), 0);
    assert!(registry.is_released());
    assert!(registry.is_empty());
}

#[test]
fn test_calls_after_release_are_noops() {
    let target = Rc::new(EventTarget::new());
    let registry = ListenerRegistry::new();
    let (count, f) = counter();

    registry.release();

    assert_eq!(registry.listen_with(&target, "x", Listener::clone(&f)), Ok(()));
    assert_eq!(registry.listen_once_with(&target, "x", f), Ok(()));
    registry.unlisten(&target, "x");
    registry.remove_all();
    registry.release();

    target.dispatch("x");

    assert_eq!(count.get(), 0);
    assert!(registry.is_empty());
    assert_eq!(target.total_listeners(), 0);
}

#[test]
fn test_rejected_name_after_release_is_still_a_noop() {
    let target = Rc::new(EventTarget::new());
    let registry = ListenerRegistry::new();
    let (_, f) = counter();

    registry.release();

    assert_eq!(registry.listen_with(&target, "", f), Ok(()));
}

#[test]
fn test_release_from_inside_callback() {
    let target = Rc::new(EventTarget::new());
    let registry = Rc::new(ListenerRegistry::new());
    let (count, g) = counter();

    let registry_clone = Rc::clone(&registry);
    registry
        .listen(&target, "x", move |_| registry_clone.release())
        .unwrap();
    registry.listen_with(&target, "x", g).unwrap();

    target.dispatch("x");
    target.dispatch("x");

    assert_eq!(count.get(), 0);
    assert!(registry.is_released());
}

// -------------------------------------------------------------------------------------------------
// Source lifetime
// -------------------------------------------------------------------------------------------------

#[test]
fn test_registry_does_not_keep_sources_alive() {
    let target = Rc::new(EventTarget::new());
    let registry = ListenerRegistry::new();
    let (_, f) = counter();

    registry.listen_with(&target, "x", f).unwrap();

    assert_eq!(Rc::strong_count(&target), 1);
}

#[test]
fn test_teardown_after_sources_destroyed() {
    let registry = ListenerRegistry::new();
    let (_, f) = counter();

    for _ in 0..3 {
        let target = Rc::new(EventTarget::new());
        registry
            .listen_with(&target, "x", Listener::clone(&f))
            .unwrap();
    }

    assert_eq!(registry.len(), 3);
    registry.remove_all();
    registry.release();
    registry.release();
    assert!(registry.is_empty());
}

#[test]
fn test_new_source_is_not_confused_with_destroyed_one() {
    let registry = ListenerRegistry::new();
    let (_, f) = counter();

    let old = Rc::new(EventTarget::new());
    registry.listen_with(&old, "x", Listener::clone(&f)).unwrap();
    drop(old);

    let fresh = Rc::new(EventTarget::new());
    registry.unlisten(&fresh, "x");

    assert_eq!(registry.len(), 1);
}

#[test]
fn test_trait_object_sources() {
    let target = Rc::new(EventTarget::new());
    let source: Rc<dyn EventSource> = target.clone();
    let registry = ListenerRegistry::new();
    let (count, f) = counter();

    registry.listen_with(&source, "x", f).unwrap();
    target.dispatch("x");
    registry.unlisten(&source, "x");
    target.dispatch("x");

    assert_eq!(count.get(), 1);
}

// -------------------------------------------------------------------------------------------------
// Re-entrant sources
// -------------------------------------------------------------------------------------------------

/// A source that dispatches `echo` every time a listener is detached.
struct EchoOnDetach {
    events: EventTarget,
    echo: &'static str,
}

impl EventSource for EchoOnDetach {
    fn attach(&self, event_name: &str, listener: Listener) -> Result<ListenerKey, ListenerError> {
        self.events.attach(event_name, listener)
    }

    fn detach(&self, key: ListenerKey) {
        self.events.detach(key);
        self.events.dispatch(self.echo);
    }
}

fn echo_on_detach(echo: &'static str) -> Rc<EchoOnDetach> {
    Rc::new(EchoOnDetach {
        events: EventTarget::new(),
        echo,
    })
}

#[test]
fn test_remove_all_blocks_callbacks_dispatched_from_detach() {
    let source = echo_on_detach("x");
    let registry = ListenerRegistry::new();
    let (a, f) = counter();
    let (b, g) = counter();

    registry.listen_with(&source, "y", f).unwrap();
    registry.listen_with(&source, "x", g).unwrap();
    registry.remove_all();

    assert_eq!(a.get(), 0);
    assert_eq!(b.get(), 0);
    assert_eq!(source.events.total_listeners(), 0);
}

#[test]
fn test_release_blocks_callbacks_dispatched_from_detach() {
    let source = echo_on_detach("x");
    let registry = ListenerRegistry::new();
    let (count, f) = counter();

    registry.listen_with(&source, "y", Listener::clone(&f)).unwrap();
    registry.listen_once_with(&source, "x", f).unwrap();
    registry.release();

    assert_eq!(count.get(), 0);
    assert_eq!(source.events.total_listeners(), 0);
}

#[test]
fn test_unlisten_blocks_callbacks_dispatched_from_detach() {
    let source = echo_on_detach("x");
    let registry = ListenerRegistry::new();
    let (count, f) = counter();

    registry.listen_with(&source, "x", Listener::clone(&f)).unwrap();
    registry.listen_with(&source, "x", f).unwrap();
    registry.unlisten(&source, "x");

    assert_eq!(count.get(), 0);
    assert!(registry.is_empty());
}

/// A source whose `attach` releases the registry that is attaching to it.
struct ReleaseOnAttach {
    events: EventTarget,
    registry: Weak<ListenerRegistry>,
}

impl EventSource for ReleaseOnAttach {
    fn attach(&self, event_name: &str, listener: Listener) -> Result<ListenerKey, ListenerError> {
        let key = self.events.attach(event_name, listener)?;
        if let Some(registry) = self.registry.upgrade() {
            registry.release();
        }
        Ok(key)
    }

    fn detach(&self, key: ListenerKey) {
        self.events.detach(key)
    }
}

#[test]
fn test_release_during_attach_leaves_nothing_attached() {
    let registry = Rc::new(ListenerRegistry::new());
    let source = Rc::new(ReleaseOnAttach {
        events: EventTarget::new(),
        registry: Rc::downgrade(&registry),
    });
    let (count, f) = counter();

    assert_eq!(registry.listen_with(&source, "x", f), Ok(()));

    assert!(registry.is_released());
    assert!(registry.is_empty());
    assert_eq!(source.events.total_listeners(), 0);

    source.events.dispatch("x");
    assert_eq!(count.get(), 0);
}
