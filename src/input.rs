//! Input Module - Terminal event bridge
//!
//! Converts crossterm key and mouse events into the player's event types so
//! a terminal host can drive the shortcuts and the seek track. Mouse columns
//! become `client_x` (one cell = one unit).
//!
//! # API
//!
//! - `convert_key_event` - crossterm KeyEvent to [`KeyboardEvent`]
//! - `convert_mouse_event` - crossterm MouseEvent to a pointer phase + [`PointerEvent`]
//! - `to_dom_event` - Native event name and payload for window dispatch
//! - `poll_event` / `read_event` - Event polling
//! - `enable_mouse` / `disable_mouse` - Control mouse capture
//!
//! # Example
//!
//! ```ignore
//! loop {
//!     if let Ok(Some(event)) = input::poll_event(Duration::from_millis(16)) {
//!         if let Some((name, payload)) = input::to_dom_event(&event) {
//!             sim.window.dispatch(name, &payload);
//!         }
//!     }
//! }
//! ```

use crossterm::event::{
    poll, read, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode,
    KeyEvent as CrosstermKeyEvent, KeyEventKind, KeyModifiers,
    MouseButton as CrosstermMouseButton, MouseEvent as CrosstermMouseEvent, MouseEventKind,
};
use crossterm::execute;
use std::io::stdout;
use std::time::Duration;

use crate::events::{
    DomEvent, KeyState, KeyboardEvent, Modifiers, PointerEvent, PointerType, TargetInfo,
};

// =============================================================================
// INPUT EVENT ENUM
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Terminal events the player cares about
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key(KeyboardEvent),
    Pointer(PointerPhase, PointerEvent),
    /// Terminal resize (new width, height)
    Resize(u16, u16),
    None,
}

// =============================================================================
// KEY EVENT CONVERSION
// =============================================================================

/// Convert crossterm KeyEvent to our KeyboardEvent (DOM key names)
pub fn convert_key_event(event: CrosstermKeyEvent) -> KeyboardEvent {
    let key = match event.code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => String::new(),
    };

    let state = match event.kind {
        KeyEventKind::Press => KeyState::Press,
        KeyEventKind::Repeat => KeyState::Repeat,
        KeyEventKind::Release => KeyState::Release,
    };

    KeyboardEvent {
        key,
        modifiers: convert_modifiers(event.modifiers),
        state,
        target: TargetInfo::default(),
    }
}

fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    let mut out = Modifiers::empty();
    out.set(Modifiers::CTRL, mods.contains(KeyModifiers::CONTROL));
    out.set(Modifiers::ALT, mods.contains(KeyModifiers::ALT));
    out.set(Modifiers::SHIFT, mods.contains(KeyModifiers::SHIFT));
    out.set(
        Modifiers::META,
        mods.intersects(KeyModifiers::META | KeyModifiers::SUPER),
    );
    out
}

// =============================================================================
// MOUSE EVENT CONVERSION
// =============================================================================

/// DOM button numbering.
fn convert_mouse_button(btn: CrosstermMouseButton) -> i16 {
    match btn {
        CrosstermMouseButton::Left => 0,
        CrosstermMouseButton::Middle => 1,
        CrosstermMouseButton::Right => 2,
    }
}

/// Convert crossterm MouseEvent. Scrolling has no pointer equivalent.
pub fn convert_mouse_event(event: CrosstermMouseEvent) -> Option<(PointerPhase, PointerEvent)> {
    let (phase, button) = match event.kind {
        MouseEventKind::Down(btn) => (PointerPhase::Down, convert_mouse_button(btn)),
        MouseEventKind::Up(btn) => (PointerPhase::Up, convert_mouse_button(btn)),
        MouseEventKind::Drag(btn) => (PointerPhase::Move, convert_mouse_button(btn)),
        MouseEventKind::Moved => (PointerPhase::Move, 0),
        _ => return None,
    };

    Some((
        phase,
        PointerEvent {
            pointer_type: PointerType::Mouse,
            button,
            client_x: f64::from(event.column),
            client_y: f64::from(event.row),
            target: TargetInfo::default(),
        },
    ))
}

/// Window event name and payload for a converted event.
pub fn to_dom_event(event: &InputEvent) -> Option<(&'static str, DomEvent)> {
    match event {
        InputEvent::Key(key) => Some(("keydown", DomEvent::Key(key.clone()))),
        InputEvent::Pointer(phase, pointer) => {
            let name = match phase {
                PointerPhase::Down => "pointerdown",
                PointerPhase::Move => "pointermove",
                PointerPhase::Up => "pointerup",
            };
            Some((name, DomEvent::Pointer(pointer.clone())))
        }
        InputEvent::Resize(..) | InputEvent::None => None,
    }
}

// =============================================================================
// EVENT POLLING
// =============================================================================

/// Poll for an event with timeout.
/// Returns None if no event within timeout.
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<InputEvent>> {
    if poll(timeout)? {
        Ok(Some(read_event()?))
    } else {
        Ok(None)
    }
}

/// Read the next event (blocking).
pub fn read_event() -> std::io::Result<InputEvent> {
    match read()? {
        CrosstermEvent::Key(key) => Ok(InputEvent::Key(convert_key_event(key))),
        CrosstermEvent::Mouse(mouse) => Ok(convert_mouse_event(mouse)
            .map_or(InputEvent::None, |(phase, pointer)| {
                InputEvent::Pointer(phase, pointer)
            })),
        CrosstermEvent::Resize(w, h) => Ok(InputEvent::Resize(w, h)),
        _ => Ok(InputEvent::None),
    }
}

/// Enable mouse capture.
pub fn enable_mouse() -> std::io::Result<()> {
    execute!(stdout(), EnableMouseCapture)
}

/// Disable mouse capture.
pub fn disable_mouse() -> std::io::Result<()> {
    execute!(stdout(), DisableMouseCapture)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> CrosstermKeyEvent {
        CrosstermKeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_convert_key_char() {
        let event = convert_key_event(key(
            KeyCode::Char('m'),
            KeyModifiers::empty(),
            KeyEventKind::Press,
        ));
        assert_eq!(event.key, "m");
        assert_eq!(event.state, KeyState::Press);
        assert!(event.modifiers.is_empty());
    }

    #[test]
    fn test_space_uses_dom_name() {
        let event = convert_key_event(key(
            KeyCode::Char(' '),
            KeyModifiers::empty(),
            KeyEventKind::Press,
        ));
        assert_eq!(event.key, " ");
    }

    #[test]
    fn test_convert_key_all_arrows() {
        let arrows = [
            (KeyCode::Up, "ArrowUp"),
            (KeyCode::Down, "ArrowDown"),
            (KeyCode::Left, "ArrowLeft"),
            (KeyCode::Right, "ArrowRight"),
        ];
        for (code, expected) in arrows {
            let event = convert_key_event(key(code, KeyModifiers::empty(), KeyEventKind::Press));
            assert_eq!(event.key, expected);
        }
    }

    #[test]
    fn test_convert_key_with_all_modifiers() {
        let event = convert_key_event(key(
            KeyCode::Char('f'),
            KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT | KeyModifiers::SUPER,
            KeyEventKind::Press,
        ));
        assert_eq!(event.modifiers, Modifiers::all());
    }

    #[test]
    fn test_convert_key_states() {
        let states = [
            (KeyEventKind::Press, KeyState::Press),
            (KeyEventKind::Repeat, KeyState::Repeat),
            (KeyEventKind::Release, KeyState::Release),
        ];
        for (kind, expected) in states {
            let event = convert_key_event(key(KeyCode::Char('k'), KeyModifiers::empty(), kind));
            assert_eq!(event.state, expected);
        }
    }

    #[test]
    fn test_convert_mouse_phases() {
        let mouse = |kind| CrosstermMouseEvent {
            kind,
            column: 42,
            row: 3,
            modifiers: KeyModifiers::empty(),
        };

        let (phase, pointer) =
            convert_mouse_event(mouse(MouseEventKind::Down(CrosstermMouseButton::Left))).unwrap();
        assert_eq!(phase, PointerPhase::Down);
        assert_eq!(pointer.client_x, 42.0);
        assert_eq!(pointer.button, 0);

        let (phase, pointer) =
            convert_mouse_event(mouse(MouseEventKind::Drag(CrosstermMouseButton::Right))).unwrap();
        assert_eq!(phase, PointerPhase::Move);
        assert_eq!(pointer.button, 2);

        assert!(convert_mouse_event(mouse(MouseEventKind::ScrollUp)).is_none());
    }

    #[test]
    fn test_to_dom_event_names() {
        let key_event = InputEvent::Key(KeyboardEvent::new("k"));
        assert_eq!(to_dom_event(&key_event).map(|(n, _)| n), Some("keydown"));

        let up = InputEvent::Pointer(PointerPhase::Up, PointerEvent::mouse(1.0));
        assert_eq!(to_dom_event(&up).map(|(n, _)| n), Some("pointerup"));

        assert!(to_dom_event(&InputEvent::Resize(80, 24)).is_none());
    }
}
