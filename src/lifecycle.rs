//! Lifecycle Module - Teardown bookkeeping and shared global listeners
//!
//! - [`Disposer`] - Collects cleanup closures, runs them once on dispose
//! - [`GlobalEvents`] - One native listener per (scope, event name), fanned
//!   out to every handler the player registers for it
//!
//! Every native listener is paired with its teardown when it is attached, so
//! no matter how far a player got before being disposed, nothing is left on
//! `window` or `document` afterwards.
//!
//! # Example
//!
//! ```ignore
//! let events = GlobalEvents::new(host.window.clone(), host.document.clone(), disposer.clone());
//!
//! // Two handlers, one native "pointermove" listener on window
//! events.on(Scope::Window, "pointermove", |e| seek_track.on_move(e));
//! events.on(Scope::Window, "pointermove", |e| volume.on_move(e));
//!
//! disposer.dispose(); // removes the native listener
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::events::DomEvent;
use crate::host::{EventListener, EventTarget};

/// One-shot cleanup closure (same shape the registries hand back).
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// DISPOSER
// =============================================================================

/// Ordered set of cleanups. `dispose()` runs them newest first, exactly once.
#[derive(Default)]
pub struct Disposer {
    cleanups: RefCell<Vec<Cleanup>>,
    disposed: Cell<bool>,
}

impl Disposer {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Register a cleanup. After disposal it runs immediately instead.
    pub fn add(&self, cleanup: impl FnOnce() + 'static) {
        if self.disposed.get() {
            cleanup();
            return;
        }
        self.cleanups.borrow_mut().push(Box::new(cleanup));
    }

    /// Run every cleanup. Later calls do nothing.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        let cleanups: Vec<Cleanup> = self.cleanups.borrow_mut().drain(..).collect();
        log::debug!("disposing {} cleanups", cleanups.len());
        for cleanup in cleanups.into_iter().rev() {
            cleanup();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Pending cleanups.
    pub fn len(&self) -> usize {
        self.cleanups.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// GLOBAL EVENTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Window,
    Document,
}

type Handlers = Rc<RefCell<Vec<(u64, EventListener)>>>;

struct Channel {
    handlers: Handlers,
}

struct Registry {
    window: Rc<dyn EventTarget>,
    document: Rc<dyn EventTarget>,
    channels: RefCell<HashMap<(Scope, String), Channel>>,
    next_id: Cell<u64>,
}

impl Registry {
    fn target(&self, scope: Scope) -> Rc<dyn EventTarget> {
        match scope {
            Scope::Window => self.window.clone(),
            Scope::Document => self.document.clone(),
        }
    }
}

/// Window/document listener registry owned by one player.
#[derive(Clone)]
pub struct GlobalEvents {
    registry: Rc<Registry>,
    disposer: Rc<Disposer>,
}

impl GlobalEvents {
    pub fn new(
        window: Rc<dyn EventTarget>,
        document: Rc<dyn EventTarget>,
        disposer: Rc<Disposer>,
    ) -> Self {
        Self {
            registry: Rc::new(Registry {
                window,
                document,
                channels: RefCell::new(HashMap::new()),
                next_id: Cell::new(0),
            }),
            disposer,
        }
    }

    pub fn disposer(&self) -> &Rc<Disposer> {
        &self.disposer
    }

    /// Register `handler` for `event` on the given scope.
    ///
    /// The first handler for a (scope, event) pair attaches the native
    /// listener; its removal is registered with the disposer right away.
    /// After disposal nothing is attached.
    pub fn on(&self, scope: Scope, event: &str, handler: impl Fn(&DomEvent) + 'static) {
        if self.disposer.is_disposed() {
            log::debug!("ignoring {event} handler registered after dispose");
            return;
        }
        let id = self.registry.next_id.get();
        self.registry.next_id.set(id + 1);

        let key = (scope, event.to_string());
        let handlers = {
            let mut channels = self.registry.channels.borrow_mut();
            if let Some(channel) = channels.get(&key) {
                channel.handlers.clone()
            } else {
                let channel = self.attach(scope, event);
                let handlers = channel.handlers.clone();
                channels.insert(key, channel);
                handlers
            }
        };
        handlers.borrow_mut().push((id, Rc::new(handler)));
    }

    fn attach(&self, scope: Scope, event: &str) -> Channel {
        let handlers: Handlers = Rc::new(RefCell::new(Vec::new()));
        let fan_out = handlers.clone();
        let listener: EventListener = Rc::new(move |e: &DomEvent| {
            // Clone out so handlers may register handlers or dispose.
            let current: Vec<(u64, EventListener)> = fan_out.borrow().clone();
            for (id, handler) in current {
                if fan_out.borrow().iter().any(|(hid, _)| *hid == id) {
                    handler(e);
                }
            }
        });

        let target = self.registry.target(scope);
        let native_id = target.add_event_listener(event, listener);
        log::trace!("attached native {event} listener on {scope:?}");

        // Handlers cleared here are skipped by a dispatch already in flight.
        let teardown = handlers.clone();
        let registry: Weak<Registry> = Rc::downgrade(&self.registry);
        let name = event.to_string();
        self.disposer.add(move || {
            target.remove_event_listener(&name, native_id);
            teardown.borrow_mut().clear();
            if let Some(registry) = registry.upgrade() {
                registry.channels.borrow_mut().remove(&(scope, name));
            }
        });

        Channel { handlers }
    }

    /// Native listeners currently attached through this registry.
    pub fn native_listener_count(&self) -> usize {
        self.registry.channels.borrow().len()
    }

    /// Handlers across all channels.
    pub fn handler_count(&self) -> usize {
        self.registry
            .channels
            .borrow()
            .values()
            .map(|c| c.handlers.borrow().len())
            .sum()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimEventTarget;

    fn setup() -> (Rc<SimEventTarget>, Rc<SimEventTarget>, Rc<Disposer>, GlobalEvents) {
        let window = Rc::new(SimEventTarget::new());
        let document = Rc::new(SimEventTarget::new());
        let disposer = Disposer::new();
        let events = GlobalEvents::new(window.clone(), document.clone(), disposer.clone());
        (window, document, disposer, events)
    }

    #[test]
    fn test_disposer_runs_once_newest_first() {
        let disposer = Disposer::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let order = order.clone();
            disposer.add(move || order.borrow_mut().push(i));
        }

        disposer.dispose();
        disposer.dispose();
        assert_eq!(*order.borrow(), vec![2, 1, 0]);
        assert!(disposer.is_empty());
    }

    #[test]
    fn test_disposer_runs_late_cleanups_immediately() {
        let disposer = Disposer::new();
        disposer.dispose();

        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        disposer.add(move || flag.set(true));
        assert!(ran.get());
    }

    #[test]
    fn test_one_native_listener_per_event() {
        let (window, _document, _disposer, events) = setup();
        let calls = Rc::new(Cell::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            events.on(Scope::Window, "pointermove", move |_| calls.set(calls.get() + 1));
        }

        assert_eq!(window.listener_count("pointermove"), 1);
        assert_eq!(events.handler_count(), 3);

        window.dispatch("pointermove", &DomEvent::Change);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_dispose_removes_every_native_listener() {
        let (window, document, disposer, events) = setup();
        events.on(Scope::Window, "keydown", |_| {});
        events.on(Scope::Window, "pointerup", |_| {});
        events.on(Scope::Document, "fullscreenchange", |_| {});

        disposer.dispose();
        assert_eq!(window.total_listeners(), 0);
        assert_eq!(document.total_listeners(), 0);
        assert_eq!(events.native_listener_count(), 0);
    }

    #[test]
    fn test_on_after_dispose_attaches_nothing() {
        let (window, _document, disposer, events) = setup();
        disposer.dispose();

        events.on(Scope::Window, "keydown", |_| {});
        assert_eq!(window.total_listeners(), 0);
    }

    #[test]
    fn test_dispose_during_dispatch_skips_remaining_handlers() {
        let (window, _document, disposer, events) = setup();
        let later = Rc::new(Cell::new(false));

        let inner = disposer.clone();
        events.on(Scope::Window, "keydown", move |_| inner.dispose());
        let flag = later.clone();
        events.on(Scope::Window, "keydown", move |_| flag.set(true));

        window.dispatch("keydown", &DomEvent::Change);
        assert!(!later.get());
        assert_eq!(window.total_listeners(), 0);
        assert_eq!(events.handler_count(), 0);
    }
}
