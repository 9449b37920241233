//! Signal - Mutable reactive cell and its read-only view
//!
//! # API
//!
//! - `signal(initial)` - Create a writable signal
//! - `Signal::set` / `Signal::update` - Change the value, notify on change
//! - `ReadSignal::get` / `ReadSignal::with` - Read the current value
//! - `ReadSignal::subscribe` - Listen for changes, returns a [`Subscription`]
//! - `ReadSignal::destroy` - Detach everything and freeze the signal
//!
//! # Destroyed signals
//!
//! After `destroy()` the signal keeps its last value for `get()`, while
//! `set`/`update` are silent no-ops and `subscribe` hands back an inert
//! subscription. Derived views built on a destroyed signal are destroyed with
//! it. Other signals are never affected.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use super::runtime::{self, Job};

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Handle returned by `subscribe`. Call [`Subscription::unsubscribe`] to detach.
///
/// Dropping the handle does NOT detach the listener.
pub struct Subscription {
    detach: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    pub(crate) fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: RefCell::new(Some(Box::new(detach))),
        }
    }

    /// A subscription that is already detached.
    pub fn inert() -> Self {
        Self {
            detach: RefCell::new(None),
        }
    }

    /// Detach the listener. Safe to call any number of times, and after the
    /// signal was destroyed or dropped.
    pub fn unsubscribe(&self) {
        let detach = self.detach.borrow_mut().take();
        if let Some(detach) = detach {
            detach();
        }
    }

    /// True until `unsubscribe` has been called.
    pub fn is_active(&self) -> bool {
        self.detach.borrow().is_some()
    }

    /// Convert into a one-shot cleanup closure (for a [`crate::lifecycle::Disposer`]).
    pub fn into_cleanup(self) -> impl FnOnce() {
        move || self.unsubscribe()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

// =============================================================================
// NODE
// =============================================================================

type Listener<T> = Rc<dyn Fn(&T)>;

pub(crate) trait Destroy {
    fn destroy(&self);
}

/// Type-erased view of a node used while wiring derived views.
pub(crate) trait Upstream {
    fn height(&self) -> usize;
    fn watch(&self, on_change: Rc<dyn Fn()>) -> Subscription;
    fn adopt(&self, dependent: Weak<dyn Destroy>);
}

pub(crate) struct Node<T> {
    value: RefCell<T>,
    /// Last value handed to listeners; coalesced no-op changes are skipped.
    dispatched: RefCell<T>,
    listeners: RefCell<Vec<(u64, Listener<T>)>>,
    next_listener_id: Cell<u64>,
    queued: Cell<bool>,
    destroyed: Cell<bool>,
    height: usize,
    compute: Option<Box<dyn Fn() -> T>>,
    upstream: RefCell<Vec<Subscription>>,
    dependents: RefCell<Vec<Weak<dyn Destroy>>>,
    this: Weak<Node<T>>,
}

impl<T: Clone + PartialEq + 'static> Node<T> {
    fn create(initial: T, height: usize, compute: Option<Box<dyn Fn() -> T>>) -> Rc<Self> {
        Rc::new_cyclic(|this| Node {
            dispatched: RefCell::new(initial.clone()),
            value: RefCell::new(initial),
            listeners: RefCell::new(Vec::new()),
            next_listener_id: Cell::new(0),
            queued: Cell::new(false),
            destroyed: Cell::new(false),
            height,
            compute,
            upstream: RefCell::new(Vec::new()),
            dependents: RefCell::new(Vec::new()),
            this: this.clone(),
        })
    }

    pub(crate) fn derived(
        compute: Box<dyn Fn() -> T>,
        sources: Vec<Rc<dyn Upstream>>,
    ) -> Rc<Self> {
        let height = sources.iter().map(|s| s.height()).max().unwrap_or(0) + 1;
        let initial = compute();
        let node = Self::create(initial, height, Some(compute));

        let weak = Rc::downgrade(&node);
        for source in &sources {
            let target = weak.clone();
            let sub = source.watch(Rc::new(move || {
                if let Some(node) = target.upgrade() {
                    node.mark_dirty();
                }
            }));
            node.upstream.borrow_mut().push(sub);
            let dependent: Weak<dyn Destroy> = weak.clone();
            source.adopt(dependent);
        }

        node
    }

    fn mark_dirty(&self) {
        if self.destroyed.get() || self.queued.replace(true) {
            return;
        }
        if let Some(this) = self.this.upgrade() {
            let job: Rc<dyn Job> = this;
            runtime::schedule(job);
        }
    }

    fn write(&self, value: T) {
        if self.destroyed.get() {
            log::trace!("ignoring write to a destroyed signal");
            return;
        }
        let changed = *self.value.borrow() != value;
        if changed {
            *self.value.borrow_mut() = value;
            self.mark_dirty();
        }
    }

    fn add_listener(&self, listener: Listener<T>) -> Subscription {
        if self.destroyed.get() {
            return Subscription::inert();
        }
        let id = self.next_listener_id.get();
        self.next_listener_id.set(id + 1);
        self.listeners.borrow_mut().push((id, listener));

        let node = self.this.clone();
        Subscription::new(move || {
            if let Some(node) = node.upgrade() {
                node.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
            }
        })
    }

    fn is_listening(&self, id: u64) -> bool {
        self.listeners.borrow().iter().any(|(lid, _)| *lid == id)
    }
}

impl<T: Clone + PartialEq + 'static> Job for Node<T> {
    fn height(&self) -> usize {
        self.height
    }

    fn run(&self) {
        self.queued.set(false);
        if self.destroyed.get() {
            return;
        }

        if let Some(compute) = &self.compute {
            let next = compute();
            let changed = *self.value.borrow() != next;
            if changed {
                *self.value.borrow_mut() = next;
            }
        }

        let snapshot = self.value.borrow().clone();
        if *self.dispatched.borrow() == snapshot {
            return;
        }
        *self.dispatched.borrow_mut() = snapshot.clone();

        // Clone out so listeners may subscribe/unsubscribe while we iterate.
        let listeners: Vec<(u64, Listener<T>)> = self
            .listeners
            .borrow()
            .iter()
            .map(|(id, l)| (*id, l.clone()))
            .collect();

        for (id, listener) in listeners {
            if self.is_listening(id) {
                listener(&snapshot);
            }
        }
    }
}

impl<T: Clone + PartialEq + 'static> Destroy for Node<T> {
    fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        self.listeners.borrow_mut().clear();

        let upstream: Vec<Subscription> = self.upstream.borrow_mut().drain(..).collect();
        for sub in upstream {
            sub.unsubscribe();
        }

        let dependents: Vec<Weak<dyn Destroy>> = self.dependents.borrow_mut().drain(..).collect();
        for dependent in dependents {
            if let Some(dependent) = dependent.upgrade() {
                dependent.destroy();
            }
        }
    }
}

impl<T: Clone + PartialEq + 'static> Upstream for Node<T> {
    fn height(&self) -> usize {
        self.height
    }

    fn watch(&self, on_change: Rc<dyn Fn()>) -> Subscription {
        self.add_listener(Rc::new(move |_| on_change()))
    }

    fn adopt(&self, dependent: Weak<dyn Destroy>) {
        if self.destroyed.get() {
            if let Some(dependent) = dependent.upgrade() {
                dependent.destroy();
            }
            return;
        }
        let mut dependents = self.dependents.borrow_mut();
        dependents.retain(|d| d.strong_count() > 0);
        dependents.push(dependent);
    }
}

impl<T> Drop for Node<T> {
    fn drop(&mut self) {
        for sub in self.upstream.get_mut().drain(..) {
            sub.unsubscribe();
        }
    }
}

// =============================================================================
// READ SIGNAL
// =============================================================================

/// Read-only handle to a signal or a derived view.
///
/// Cloning produces another handle to the same cell (identity is shared).
pub struct ReadSignal<T> {
    pub(crate) node: Rc<Node<T>>,
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> ReadSignal<T> {
    /// Current value.
    pub fn get(&self) -> T {
        self.node.value.borrow().clone()
    }

    /// Borrow the current value without cloning.
    ///
    /// Writing to the same signal from inside `f` panics.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.node.value.borrow();
        f(&*value)
    }

    /// Call `listener` on every change, in subscription order.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        self.node.add_listener(Rc::new(listener))
    }

    /// Number of attached listeners (derived views count as one each).
    pub fn listener_count(&self) -> usize {
        self.node.listeners.borrow().len()
    }

    /// Derive a read-only view from this signal.
    pub fn derive<U, F>(&self, f: F) -> ReadSignal<U>
    where
        U: Clone + PartialEq + 'static,
        F: Fn(&T) -> U + 'static,
    {
        super::derived::derive(self, f)
    }

    /// Detach all listeners, destroy dependent views, freeze the value.
    pub fn destroy(&self) {
        self.node.destroy();
    }

    pub fn is_destroyed(&self) -> bool {
        self.node.destroyed.get()
    }

    /// Same underlying cell?
    pub fn ptr_eq(&self, other: &ReadSignal<T>) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    pub(crate) fn upstream(&self) -> Rc<dyn Upstream> {
        self.node.clone()
    }

    pub(crate) fn from_node(node: Rc<Node<T>>) -> Self {
        Self { node }
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> fmt::Debug for ReadSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadSignal")
            .field("value", &*self.node.value.borrow())
            .field("destroyed", &self.node.destroyed.get())
            .finish()
    }
}

// =============================================================================
// SIGNAL
// =============================================================================

/// Writable signal. Dereferences to [`ReadSignal`] for all read operations.
pub struct Signal<T> {
    read: ReadSignal<T>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            read: self.read.clone(),
        }
    }
}

/// Create a writable signal.
pub fn signal<T: Clone + PartialEq + 'static>(initial: T) -> Signal<T> {
    Signal {
        read: ReadSignal {
            node: Node::create(initial, 0, None),
        },
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    /// Replace the value; listeners run only if it changed.
    pub fn set(&self, value: T) {
        self.read.node.write(value);
    }

    /// Compute the next value from the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = self.read.with(f);
        self.set(next);
    }

    /// A read-only handle sharing this signal's identity.
    pub fn read_only(&self) -> ReadSignal<T> {
        self.read.clone()
    }
}

impl<T> Deref for Signal<T> {
    type Target = ReadSignal<T>;

    fn deref(&self) -> &ReadSignal<T> {
        &self.read
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("value", &*self.read.node.value.borrow())
            .field("destroyed", &self.read.node.destroyed.get())
            .finish()
    }
}

// =============================================================================
// SOURCE
// =============================================================================

/// Anything a derived view can read from.
pub trait SignalSource {
    type Value: Clone + PartialEq + 'static;

    fn read_signal(&self) -> ReadSignal<Self::Value>;
}

impl<T: Clone + PartialEq + 'static> SignalSource for ReadSignal<T> {
    type Value = T;

    fn read_signal(&self) -> ReadSignal<T> {
        self.clone()
    }
}

impl<T: Clone + PartialEq + 'static> SignalSource for Signal<T> {
    type Value = T;

    fn read_signal(&self) -> ReadSignal<T> {
        self.read.clone()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::batch;
    use std::cell::Cell;

    #[test]
    fn test_set_notifies_on_change_only() {
        let count = signal(0);
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();

        let _sub = count.subscribe(move |_| calls_clone.set(calls_clone.get() + 1));

        count.set(1);
        count.set(1);
        assert_eq!(calls.get(), 1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_listener_order_matches_subscription_order() {
        let value = signal(0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = seen.clone();
        let _a = value.subscribe(move |v| first.borrow_mut().push(("a", *v)));
        let second = seen.clone();
        let _b = value.subscribe(move |v| second.borrow_mut().push(("b", *v)));

        value.set(7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_reentrant_set_is_queued() {
        let value = signal(0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let writer = value.clone();
        let _a = value.subscribe(move |v| {
            if *v == 1 {
                writer.set(2);
            }
        });
        let log = seen.clone();
        let _b = value.subscribe(move |v| log.borrow_mut().push(*v));

        value.set(1);
        // Listener b finished the first pass with 1 before seeing 2.
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(value.get(), 2);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let value = signal(0);
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();

        let sub = value.subscribe(move |_| calls_clone.set(calls_clone.get() + 1));
        sub.unsubscribe();
        sub.unsubscribe();
        assert!(!sub.is_active());

        value.set(3);
        assert_eq!(calls.get(), 0);
        assert_eq!(value.listener_count(), 0);
    }

    #[test]
    fn test_unsubscribe_during_dispatch_skips_listener() {
        let value = signal(0);
        let later_calls = Rc::new(Cell::new(0));

        let later_sub: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let handle = later_sub.clone();
        let _first = value.subscribe(move |_| {
            if let Some(sub) = handle.borrow().as_ref() {
                sub.unsubscribe();
            }
        });

        let counter = later_calls.clone();
        *later_sub.borrow_mut() =
            Some(value.subscribe(move |_| counter.set(counter.get() + 1)));

        value.set(1);
        assert_eq!(later_calls.get(), 0);
    }

    #[test]
    fn test_destroy_freezes_signal() {
        let value = signal(5);
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let sub = value.subscribe(move |_| calls_clone.set(calls_clone.get() + 1));

        value.destroy();
        assert!(value.is_destroyed());

        value.set(6);
        assert_eq!(value.get(), 5);
        assert_eq!(calls.get(), 0);

        let late = value.subscribe(|_| {});
        assert!(!late.is_active());

        // Unsubscribing after destroy is harmless.
        sub.unsubscribe();
    }

    #[test]
    fn test_destroy_does_not_touch_other_signals() {
        let a = signal(1);
        let b = signal(1);
        a.destroy();
        b.set(2);
        assert_eq!(b.get(), 2);
        assert!(!b.is_destroyed());
    }

    #[test]
    fn test_coalesced_change_back_is_not_dispatched() {
        let value = signal(0);
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let _sub = value.subscribe(move |_| calls_clone.set(calls_clone.get() + 1));

        batch(|| {
            value.set(1);
            value.set(0);
        });
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_update_uses_previous_value() {
        let value = signal(10);
        value.update(|v| v + 5);
        assert_eq!(value.get(), 15);
    }

    #[test]
    fn test_identity() {
        let value = signal(1);
        let other = signal(1);
        assert!(value.read_only().ptr_eq(&value));
        assert!(!value.read_only().ptr_eq(&other));
    }
}
