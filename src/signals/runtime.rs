//! Signal Runtime - Batch depth and the notification queue
//!
//! Every change a signal observes is turned into a queued job. Jobs run in
//! ascending height order (plain signals are height 0, a derived view sits one
//! above its highest source), so a derived view only recomputes after every
//! source it reads from has finished notifying.
//!
//! The queue is drained by whoever triggered the first job outside a batch.
//! Jobs scheduled while the queue is draining (a listener calling `set`) are
//! appended and picked up by the same drain loop, never run re-entrantly.

use std::cell::RefCell;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::rc::Rc;

// =============================================================================
// JOBS
// =============================================================================

/// A unit of deferred propagation work.
pub(crate) trait Job {
    /// Topological height: 0 for source signals.
    fn height(&self) -> usize;

    /// Recompute (if derived) and notify listeners.
    fn run(&self);
}

struct Entry {
    height: usize,
    seq: u64,
    job: Rc<dyn Job>,
}

impl Entry {
    fn key(&self) -> (usize, u64) {
        (self.height, self.seq)
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

// =============================================================================
// RUNTIME STATE
// =============================================================================

#[derive(Default)]
struct Runtime {
    batch_depth: usize,
    flushing: bool,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Entry>>,
}

thread_local! {
    static RUNTIME: RefCell<Runtime> = RefCell::new(Runtime::default());
}

/// Queue a job and drain the queue unless a batch or drain is in progress.
pub(crate) fn schedule(job: Rc<dyn Job>) {
    let should_flush = RUNTIME.with(|rt| {
        let mut rt = rt.borrow_mut();
        let seq = rt.next_seq;
        rt.next_seq += 1;
        let height = job.height();
        rt.queue.push(Reverse(Entry { height, seq, job }));
        rt.batch_depth == 0 && !rt.flushing
    });

    if should_flush {
        flush();
    }
}

/// Resets the draining flag even if a listener panics.
struct FlushGuard;

impl Drop for FlushGuard {
    fn drop(&mut self) {
        RUNTIME.with(|rt| rt.borrow_mut().flushing = false);
    }
}

fn flush() {
    RUNTIME.with(|rt| rt.borrow_mut().flushing = true);
    let _guard = FlushGuard;

    loop {
        let next = RUNTIME.with(|rt| rt.borrow_mut().queue.pop());
        match next {
            Some(Reverse(entry)) => entry.job.run(),
            None => break,
        }
    }
}

// =============================================================================
// BATCHING
// =============================================================================

/// Open a batch. Updates are coalesced until the matching [`commit_batch`].
///
/// Prefer [`batch`], which cannot be left open by an early return.
pub fn start_batch() {
    RUNTIME.with(|rt| rt.borrow_mut().batch_depth += 1);
}

/// Close a batch opened with [`start_batch`].
///
/// The outermost commit drains the queue. Committing without an open batch
/// does nothing.
pub fn commit_batch() {
    let should_flush = RUNTIME.with(|rt| {
        let mut rt = rt.borrow_mut();
        if rt.batch_depth == 0 {
            return false;
        }
        rt.batch_depth -= 1;
        rt.batch_depth == 0 && !rt.flushing && !rt.queue.is_empty()
    });

    if should_flush {
        flush();
    }
}

struct BatchGuard;

impl Drop for BatchGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            RUNTIME.with(|rt| {
                let mut rt = rt.borrow_mut();
                rt.batch_depth = rt.batch_depth.saturating_sub(1);
            });
        } else {
            commit_batch();
        }
    }
}

/// Run `f` inside a batch.
///
/// Derived views depending on several signals written inside `f` recompute
/// once, after `f` returns. Batches nest; only the outermost one flushes.
///
/// # Example
///
/// ```ignore
/// let sum = derive2(&x, &y, |x, y| x + y);
/// batch(|| {
///     x.set(1);
///     y.set(2);
/// }); // `sum` recomputed once, observing (1, 2)
/// ```
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    start_batch();
    let _guard = BatchGuard;
    f()
}

/// True while a batch is open on this thread.
pub fn is_batching() -> bool {
    RUNTIME.with(|rt| rt.borrow().batch_depth > 0)
}
