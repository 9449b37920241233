//! Tap detection on the capture surface.
//!
//! A press+release shorter than `tap_max_ms` is a tap. A press that starts
//! within `double_window_ms` of the previous release makes its release a
//! double press instead. The caller defers single taps by the same window so
//! a double press can cancel them.

use std::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Long press or release without press.
    Ignored,
    SingleTap,
    DoublePress,
}

pub struct TapDetector {
    double_window_ms: f64,
    tap_max_ms: f64,
    pressed_at: Cell<Option<f64>>,
    released_at: Cell<Option<f64>>,
    double_armed: Cell<bool>,
}

impl TapDetector {
    pub fn new(double_window_ms: u64, tap_max_ms: u64) -> Self {
        Self {
            double_window_ms: double_window_ms as f64,
            tap_max_ms: tap_max_ms as f64,
            pressed_at: Cell::new(None),
            released_at: Cell::new(None),
            double_armed: Cell::new(false),
        }
    }

    pub fn double_window_ms(&self) -> u64 {
        self.double_window_ms as u64
    }

    /// Returns true if this press completes a double press.
    pub fn press(&self, now_ms: f64) -> bool {
        let armed = self
            .released_at
            .get()
            .is_some_and(|released| now_ms - released <= self.double_window_ms);
        self.double_armed.set(armed);
        self.pressed_at.set(Some(now_ms));
        armed
    }

    pub fn release(&self, now_ms: f64) -> TapOutcome {
        let pressed_at = self.pressed_at.take();

        if self.double_armed.replace(false) {
            self.released_at.set(None);
            return TapOutcome::DoublePress;
        }

        self.released_at.set(Some(now_ms));
        match pressed_at {
            Some(at) if now_ms - at <= self.tap_max_ms => TapOutcome::SingleTap,
            _ => TapOutcome::Ignored,
        }
    }

    /// Forget everything (a swipe took over).
    pub fn reset(&self) {
        self.pressed_at.set(None);
        self.released_at.set(None);
        self.double_armed.set(false);
    }
}
