//! Timing Module - Cancellable timeouts and leading/trailing throttles
//!
//! Both wrap a host [`Scheduler`]. Callbacks never run synchronously from
//! `start`/`call` except the throttle's leading edge.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::host::{Scheduler, TimerId};

// =============================================================================
// TIMEOUT
// =============================================================================

/// At most one pending timer. Starting again replaces the previous one.
#[derive(Clone)]
pub struct Timeout {
    scheduler: Rc<dyn Scheduler>,
    active: Rc<Cell<Option<TimerId>>>,
}

impl Timeout {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            active: Rc::new(Cell::new(None)),
        }
    }

    pub fn start(&self, delay_ms: u64, callback: impl FnOnce() + 'static) {
        self.cancel();
        let active = self.active.clone();
        let id = self.scheduler.set_timeout(
            delay_ms,
            Box::new(move || {
                active.set(None);
                callback();
            }),
        );
        self.active.set(Some(id));
    }

    pub fn cancel(&self) {
        if let Some(id) = self.active.take() {
            self.scheduler.clear_timeout(id);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.active.get().is_some()
    }
}

// =============================================================================
// THROTTLE
// =============================================================================

struct ThrottleState<A> {
    scheduler: Rc<dyn Scheduler>,
    wait_ms: u64,
    func: Box<dyn Fn(A)>,
    pending: RefCell<Option<A>>,
    timer: Cell<Option<TimerId>>,
}

impl<A: 'static> ThrottleState<A> {
    fn open_window(state: &Rc<Self>) {
        let weak: Weak<Self> = Rc::downgrade(state);
        let id = state.scheduler.set_timeout(
            state.wait_ms,
            Box::new(move || {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                state.timer.set(None);
                let pending = state.pending.borrow_mut().take();
                if let Some(args) = pending {
                    Self::open_window(&state);
                    (state.func)(args);
                }
            }),
        );
        state.timer.set(Some(id));
    }
}

/// Runs `func` immediately on the first call, then at most once per window
/// with the arguments of the latest call made during it.
pub struct Throttle<A> {
    state: Rc<ThrottleState<A>>,
}

impl<A> Clone for Throttle<A> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<A: 'static> Throttle<A> {
    pub fn new(scheduler: Rc<dyn Scheduler>, wait_ms: u64, func: impl Fn(A) + 'static) -> Self {
        Self {
            state: Rc::new(ThrottleState {
                scheduler,
                wait_ms,
                func: Box::new(func),
                pending: RefCell::new(None),
                timer: Cell::new(None),
            }),
        }
    }

    pub fn call(&self, args: A) {
        if self.state.timer.get().is_some() {
            *self.state.pending.borrow_mut() = Some(args);
            return;
        }
        ThrottleState::open_window(&self.state);
        (self.state.func)(args);
    }

    /// Apply the pending trailing call now and close the window.
    pub fn flush(&self) {
        if let Some(id) = self.state.timer.take() {
            self.state.scheduler.clear_timeout(id);
        }
        let pending = self.state.pending.borrow_mut().take();
        if let Some(args) = pending {
            (self.state.func)(args);
        }
    }

    /// Drop the pending call and close the window.
    pub fn cancel(&self) {
        if let Some(id) = self.state.timer.take() {
            self.state.scheduler.clear_timeout(id);
        }
        self.state.pending.borrow_mut().take();
    }

    pub fn has_pending(&self) -> bool {
        self.state.pending.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimScheduler;

    #[test]
    fn test_timeout_fires_once() {
        let scheduler = Rc::new(SimScheduler::new());
        let timeout = Timeout::new(scheduler.clone());
        let fired = Rc::new(Cell::new(0));

        let counter = fired.clone();
        timeout.start(100, move || counter.set(counter.get() + 1));
        assert!(timeout.is_pending());

        scheduler.advance(99);
        assert_eq!(fired.get(), 0);
        scheduler.advance(1);
        assert_eq!(fired.get(), 1);
        assert!(!timeout.is_pending());
    }

    #[test]
    fn test_timeout_restart_replaces_previous() {
        let scheduler = Rc::new(SimScheduler::new());
        let timeout = Timeout::new(scheduler.clone());
        let fired = Rc::new(Cell::new(0));

        let first = fired.clone();
        timeout.start(100, move || first.set(first.get() + 1));
        scheduler.advance(50);
        let second = fired.clone();
        timeout.start(100, move || second.set(second.get() + 10));

        scheduler.advance(60);
        assert_eq!(fired.get(), 0);
        scheduler.advance(40);
        assert_eq!(fired.get(), 10);
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[test]
    fn test_throttle_leading_and_trailing() {
        let scheduler = Rc::new(SimScheduler::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let throttle = Throttle::new(scheduler.clone(), 50, move |v: i32| log.borrow_mut().push(v));

        throttle.call(1);
        throttle.call(2);
        throttle.call(3);
        assert_eq!(*seen.borrow(), vec![1]);

        scheduler.advance(50);
        assert_eq!(*seen.borrow(), vec![1, 3]);

        // Trailing call reopened the window.
        throttle.call(4);
        assert_eq!(*seen.borrow(), vec![1, 3]);
        scheduler.advance(50);
        assert_eq!(*seen.borrow(), vec![1, 3, 4]);

        scheduler.advance(50);
        throttle.call(5);
        assert_eq!(*seen.borrow(), vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_throttle_flush_and_cancel() {
        let scheduler = Rc::new(SimScheduler::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let throttle = Throttle::new(scheduler.clone(), 50, move |v: i32| log.borrow_mut().push(v));

        throttle.call(1);
        throttle.call(2);
        throttle.flush();
        assert_eq!(*seen.borrow(), vec![1, 2]);

        throttle.call(3);
        throttle.call(4);
        throttle.cancel();
        scheduler.advance(100);
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
        assert_eq!(scheduler.pending_timers(), 0);
    }
}
