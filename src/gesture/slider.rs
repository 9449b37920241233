//! Slider Gesture - Press-drag-release on a horizontal track
//!
//! Shared by the seek track and the volume slider. A press on the track
//! jumps to the pointer position; while pressed, window-level pointer moves
//! keep updating the value (so dragging outside the track still works); a
//! window-level pointer release ends the drag.
//!
//! Values are fractions in `[0, 1]`, quantized to `step` relative to the
//! current value (see [`crate::math::change_with_step`]).

use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::events::{DomEvent, PointerEvent, Rect};
use crate::lifecycle::{GlobalEvents, Scope};
use crate::math::{change_with_step, clamp, to_precision};

/// Value the pointer at `client_x` selects on `track`.
///
/// Returns `current` for a collapsed track.
pub fn value_at(track: &Rect, client_x: f64, current: f64, step: f64) -> f64 {
    if track.width <= 0.0 {
        return current;
    }
    let percent = to_precision((client_x - track.left) / track.width, 6);
    clamp(change_with_step(current, percent, step), 0.0, 1.0)
}

struct SliderState {
    pressed: Cell<bool>,
    step: f64,
    bounds: Box<dyn Fn() -> Rect>,
    value: Box<dyn Fn() -> f64>,
    on_change: Box<dyn Fn(f64)>,
}

impl SliderState {
    fn apply(&self, client_x: f64) {
        let next = value_at(&(self.bounds)(), client_x, (self.value)(), self.step);
        (self.on_change)(next);
    }
}

/// Drag state machine: `Idle --down--> Pressed --up--> Idle`.
#[derive(Clone)]
pub struct SliderGesture {
    state: Rc<SliderState>,
}

impl SliderGesture {
    /// - `bounds` - current client rect of the track
    /// - `value` - current value, the base for step quantization
    /// - `on_change` - receives every new value
    pub fn new(
        step: f64,
        bounds: impl Fn() -> Rect + 'static,
        value: impl Fn() -> f64 + 'static,
        on_change: impl Fn(f64) + 'static,
    ) -> Self {
        Self {
            state: Rc::new(SliderState {
                pressed: Cell::new(false),
                step,
                bounds: Box::new(bounds),
                value: Box::new(value),
                on_change: Box::new(on_change),
            }),
        }
    }

    /// Listen for window-level moves and releases.
    pub fn attach(&self, events: &GlobalEvents) {
        let weak: Weak<SliderState> = Rc::downgrade(&self.state);
        let on_move = weak.clone();
        events.on(Scope::Window, "pointermove", move |event| {
            if let (Some(state), DomEvent::Pointer(pointer)) = (on_move.upgrade(), event)
                && state.pressed.get()
            {
                state.apply(pointer.client_x);
            }
        });
        events.on(Scope::Window, "pointerup", move |event| {
            if let (Some(state), DomEvent::Pointer(_)) = (weak.upgrade(), event) {
                state.pressed.set(false);
            }
        });
    }

    /// Press on the track. Secondary mouse buttons are ignored.
    pub fn pointer_down(&self, event: &PointerEvent) -> bool {
        if !event.is_primary() {
            return false;
        }
        self.state.pressed.set(true);
        self.state.apply(event.client_x);
        true
    }

    /// Window-level move. Only acts while pressed.
    pub fn pointer_move(&self, event: &PointerEvent) -> bool {
        if !self.state.pressed.get() {
            return false;
        }
        self.state.apply(event.client_x);
        true
    }

    pub fn pointer_up(&self) {
        self.state.pressed.set(false);
    }

    pub fn is_pressed(&self) -> bool {
        self.state.pressed.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn track() -> Rect {
        Rect::new(100.0, 0.0, 200.0, 10.0)
    }

    fn slider(start: f64) -> (SliderGesture, Rc<RefCell<Vec<f64>>>, Rc<Cell<f64>>) {
        let value = Rc::new(Cell::new(start));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let read = value.clone();
        let write = value.clone();
        let log = seen.clone();
        let gesture = SliderGesture::new(
            0.01,
            track,
            move || read.get(),
            move |v| {
                write.set(v);
                log.borrow_mut().push(v);
            },
        );
        (gesture, seen, value)
    }

    #[test]
    fn test_value_at_clamps_outside_track() {
        assert_eq!(value_at(&track(), 50.0, 0.5, 0.01), 0.0);
        assert_eq!(value_at(&track(), 400.0, 0.5, 0.01), 1.0);
    }

    #[test]
    fn test_value_at_collapsed_track_keeps_current() {
        let empty = Rect::new(10.0, 0.0, 0.0, 0.0);
        assert_eq!(value_at(&empty, 20.0, 0.3, 0.01), 0.3);
    }

    #[test]
    fn test_press_jumps_to_pointer() {
        let (gesture, seen, _) = slider(0.0);
        assert!(gesture.pointer_down(&PointerEvent::mouse(150.0)));
        assert!(gesture.is_pressed());
        let got = seen.borrow()[0];
        assert!((got - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_secondary_button_is_ignored() {
        let (gesture, seen, _) = slider(0.0);
        assert!(!gesture.pointer_down(&PointerEvent::mouse(150.0).with_button(2)));
        assert!(!gesture.is_pressed());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_move_only_while_pressed() {
        let (gesture, seen, value) = slider(0.0);
        assert!(!gesture.pointer_move(&PointerEvent::mouse(200.0)));

        gesture.pointer_down(&PointerEvent::mouse(100.0));
        gesture.pointer_move(&PointerEvent::mouse(200.0));
        assert!((value.get() - 0.5).abs() < 1e-9);

        gesture.pointer_up();
        gesture.pointer_move(&PointerEvent::mouse(300.0));
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_window_listeners_drive_drag() {
        use crate::lifecycle::Disposer;
        use crate::sim::SimEventTarget;

        let window = Rc::new(SimEventTarget::new());
        let document = Rc::new(SimEventTarget::new());
        let events = GlobalEvents::new(window.clone(), document, Disposer::new());
        let (gesture, _, value) = slider(0.0);
        gesture.attach(&events);

        gesture.pointer_down(&PointerEvent::mouse(100.0));
        window.dispatch("pointermove", &DomEvent::Pointer(PointerEvent::mouse(250.0)));
        assert!((value.get() - 0.75).abs() < 1e-9);

        window.dispatch("pointerup", &DomEvent::Pointer(PointerEvent::mouse(250.0)));
        assert!(!gesture.is_pressed());
    }
}
