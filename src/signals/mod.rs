//! Signals Module - Minimal reactive primitives driving the player
//!
//! - [`Signal`] - Mutable reactive cell
//! - [`ReadSignal`] - Read-only handle, also the type of every derived view
//! - [`derive`], [`derive2`], [`derive3`], [`derive4`] - Computed views
//! - [`batch`] - Coalesce several writes into one propagation pass
//!
//! Propagation is push-based and synchronous: when `set` returns (outside a
//! batch) every listener and every derived view has observed the new value.
//! The runtime is thread-local; signals are `!Send` and live on the UI thread.

mod derived;
mod runtime;
mod signal;

pub use derived::{derive, derive2, derive3, derive4};
pub use runtime::{batch, commit_batch, is_batching, start_batch};
pub use signal::{signal, ReadSignal, Signal, SignalSource, Subscription};
