//! Gesture Module - Pointer and touch state machines
//!
//! - [`slider`] - Press/drag/release on the seek track and volume slider
//! - [`swipe`] - Horizontal touch seeking on the capture surface
//! - [`tap`] - Single tap vs double press on the capture surface

pub mod slider;
pub mod swipe;
pub mod tap;

pub use slider::{value_at, SliderGesture};
pub use swipe::{swipe_target, SwipeGesture, SwipeSession};
pub use tap::{TapDetector, TapOutcome};
