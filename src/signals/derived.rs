//! Derived - Read-only views computed from other signals
//!
//! A derived view stores only its memoized value. It recomputes eagerly when
//! any source changes, but the recompute is queued behind the sources, so one
//! batch (or one diamond-shaped propagation) yields exactly one recompute.
//!
//! Views can only be built from signals that already exist, so the graph is
//! acyclic by construction.
//!
//! ```ignore
//! let width = signal(640);
//! let fullscreen = signal(false);
//! let attr = derive2(&width, &fullscreen, |w, fs| (!fs).then_some(*w));
//! ```

use super::signal::{Node, ReadSignal, SignalSource};

/// View over one source.
pub fn derive<A, U, F>(a: &A, f: F) -> ReadSignal<U>
where
    A: SignalSource,
    U: Clone + PartialEq + 'static,
    F: Fn(&A::Value) -> U + 'static,
{
    let a = a.read_signal();
    let sources = vec![a.upstream()];
    let compute = move || a.with(|va| f(va));
    ReadSignal::from_node(Node::derived(Box::new(compute), sources))
}

/// View over two sources.
pub fn derive2<A, B, U, F>(a: &A, b: &B, f: F) -> ReadSignal<U>
where
    A: SignalSource,
    B: SignalSource,
    U: Clone + PartialEq + 'static,
    F: Fn(&A::Value, &B::Value) -> U + 'static,
{
    let a = a.read_signal();
    let b = b.read_signal();
    let sources = vec![a.upstream(), b.upstream()];
    let compute = move || a.with(|va| b.with(|vb| f(va, vb)));
    ReadSignal::from_node(Node::derived(Box::new(compute), sources))
}

/// View over three sources.
pub fn derive3<A, B, C, U, F>(a: &A, b: &B, c: &C, f: F) -> ReadSignal<U>
where
    A: SignalSource,
    B: SignalSource,
    C: SignalSource,
    U: Clone + PartialEq + 'static,
    F: Fn(&A::Value, &B::Value, &C::Value) -> U + 'static,
{
    let a = a.read_signal();
    let b = b.read_signal();
    let c = c.read_signal();
    let sources = vec![a.upstream(), b.upstream(), c.upstream()];
    let compute = move || a.with(|va| b.with(|vb| c.with(|vc| f(va, vb, vc))));
    ReadSignal::from_node(Node::derived(Box::new(compute), sources))
}

/// View over four sources.
pub fn derive4<A, B, C, D, U, F>(a: &A, b: &B, c: &C, d: &D, f: F) -> ReadSignal<U>
where
    A: SignalSource,
    B: SignalSource,
    C: SignalSource,
    D: SignalSource,
    U: Clone + PartialEq + 'static,
    F: Fn(&A::Value, &B::Value, &C::Value, &D::Value) -> U + 'static,
{
    let a = a.read_signal();
    let b = b.read_signal();
    let c = c.read_signal();
    let d = d.read_signal();
    let sources = vec![a.upstream(), b.upstream(), c.upstream(), d.upstream()];
    let compute =
        move || a.with(|va| b.with(|vb| c.with(|vc| d.with(|vd| f(va, vb, vc, vd)))));
    ReadSignal::from_node(Node::derived(Box::new(compute), sources))
}

// =============================================================================
// TESTS
// =============================================================================
