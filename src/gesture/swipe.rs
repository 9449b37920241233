//! Swipe Gesture - Horizontal touch-drag seeking on the capture surface
//!
//! `touchstart` opens a session remembering where the finger and the playhead
//! were. Moves beyond a small threshold turn the session into a swipe; the
//! finger's horizontal travel, as a fraction of the surface width, maps onto
//! up to `range` seconds of seeking in either direction. A finished swipe
//! suppresses the tap that would otherwise follow it.

use std::cell::{Cell, RefCell};

use crate::events::Touch;
use crate::math::clamp;

/// Snapshot taken at `touchstart`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeSession {
    pub started_at_ms: f64,
    pub start_media_time: f64,
    pub start_offset_x: f64,
    pub is_swiping: bool,
}

/// Seek target for a swipe of `delta_x` px.
///
/// Travel is normalized against `surface_width - edge_margin`, so a swipe
/// across nearly the whole surface reaches the full `range_secs`. The result
/// never leaves `[start - range, start + range]` nor `[0, duration]`.
pub fn swipe_target(
    start_media_time: f64,
    delta_x: f64,
    surface_width: f64,
    edge_margin: f64,
    range_secs: f64,
    duration: f64,
) -> f64 {
    let travel = (surface_width - edge_margin).max(1.0);
    let percent = clamp(delta_x.abs() / travel, 0.0, 1.0);
    let offset = percent * range_secs * delta_x.signum();

    let lower = (start_media_time - range_secs).max(0.0);
    let upper = (start_media_time + range_secs).min(duration);
    clamp(start_media_time + offset, lower, upper)
}

pub struct SwipeGesture {
    session: RefCell<Option<SwipeSession>>,
    suppress_tap: Cell<bool>,
    threshold_px: f64,
    edge_margin_px: f64,
}

impl SwipeGesture {
    pub fn new(threshold_px: f64, edge_margin_px: f64) -> Self {
        Self {
            session: RefCell::new(None),
            suppress_tap: Cell::new(false),
            threshold_px,
            edge_margin_px,
        }
    }

    pub fn start(&self, now_ms: f64, media_time: f64, touch: &Touch) {
        self.suppress_tap.set(false);
        *self.session.borrow_mut() = Some(SwipeSession {
            started_at_ms: now_ms,
            start_media_time: media_time,
            start_offset_x: touch.offset_x(),
            is_swiping: false,
        });
    }

    /// Seek target for this move, once the session counts as a swipe.
    pub fn move_to(&self, touch: &Touch, range_secs: f64, duration: f64) -> Option<f64> {
        let mut session = self.session.borrow_mut();
        let session = session.as_mut()?;

        let delta = touch.offset_x() - session.start_offset_x;
        if !session.is_swiping && delta.abs() >= self.threshold_px {
            session.is_swiping = true;
            log::trace!("swipe started at {:.2}s", session.start_media_time);
        }
        if !session.is_swiping || !duration.is_finite() {
            return None;
        }

        Some(swipe_target(
            session.start_media_time,
            delta,
            touch.target_rect.width,
            self.edge_margin_px,
            range_secs,
            duration,
        ))
    }

    /// Close the session. Returns whether it was a swipe.
    pub fn end(&self) -> bool {
        let was_swiping = self
            .session
            .borrow_mut()
            .take()
            .is_some_and(|s| s.is_swiping);
        if was_swiping {
            self.suppress_tap.set(true);
        }
        was_swiping
    }

    pub fn is_swiping(&self) -> bool {
        self.session.borrow().is_some_and(|s| s.is_swiping)
    }

    pub fn session(&self) -> Option<SwipeSession> {
        *self.session.borrow()
    }

    /// True once after a finished swipe.
    pub fn take_suppressed(&self) -> bool {
        self.suppress_tap.replace(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Rect;

    fn surface() -> Rect {
        Rect::new(0.0, 0.0, 500.0, 300.0)
    }

    #[test]
    fn test_full_width_swipe_reaches_range() {
        // 480 px of travel on a 500 px surface with a 20 px margin.
        let target = swipe_target(100.0, 480.0, 500.0, 20.0, 60.0, 600.0);
        assert!((target - 160.0).abs() < 1e-9);
        let back = swipe_target(100.0, -480.0, 500.0, 20.0, 60.0, 600.0);
        assert!((back - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_target_stays_inside_media() {
        assert_eq!(swipe_target(10.0, -480.0, 500.0, 20.0, 60.0, 600.0), 0.0);
        assert_eq!(swipe_target(590.0, 480.0, 500.0, 20.0, 60.0, 600.0), 600.0);
    }

    #[test]
    fn test_threshold_before_swiping() {
        let swipe = SwipeGesture::new(10.0, 20.0);
        swipe.start(0.0, 100.0, &Touch::new(200.0, surface()));

        assert_eq!(swipe.move_to(&Touch::new(205.0, surface()), 60.0, 600.0), None);
        assert!(!swipe.is_swiping());

        let target = swipe.move_to(&Touch::new(440.0, surface()), 60.0, 600.0);
        assert!(swipe.is_swiping());
        assert!((target.unwrap_or_default() - 130.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_duration_does_not_seek() {
        let swipe = SwipeGesture::new(10.0, 20.0);
        swipe.start(0.0, 0.0, &Touch::new(0.0, surface()));
        assert_eq!(swipe.move_to(&Touch::new(100.0, surface()), 60.0, f64::NAN), None);
    }

    #[test]
    fn test_end_suppresses_one_tap() {
        let swipe = SwipeGesture::new(10.0, 20.0);
        swipe.start(0.0, 0.0, &Touch::new(0.0, surface()));
        swipe.move_to(&Touch::new(100.0, surface()), 60.0, 600.0);

        assert!(swipe.end());
        assert!(swipe.take_suppressed());
        assert!(!swipe.take_suppressed());
    }

    #[test]
    fn test_short_touch_is_not_a_swipe() {
        let swipe = SwipeGesture::new(10.0, 20.0);
        swipe.start(0.0, 0.0, &Touch::new(0.0, surface()));
        assert!(!swipe.end());
        assert!(!swipe.take_suppressed());
    }
}
