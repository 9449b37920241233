//! Events Module - Input and media event types
//!
//! These are the shapes the host hands to the player. They carry only what
//! the coordination core needs: pointer coordinates, touch points with their
//! target bounds, key names with modifiers, and where in the widget the event
//! landed ([`TargetInfo`]).

use bitflags::bitflags;

// =============================================================================
// GEOMETRY
// =============================================================================

/// Client-space bounding box (what `getBoundingClientRect` returns).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

// =============================================================================
// EVENT TARGET INFO
// =============================================================================

/// Where an event landed relative to the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetInfo {
    /// Text inputs, selects, textareas, contenteditable.
    pub is_form_control: bool,
    /// Inside the widget's subtree.
    pub within_player: bool,
    /// Inside the control bar.
    pub within_controls: bool,
}

impl Default for TargetInfo {
    /// A plain target inside the widget, outside the control bar.
    fn default() -> Self {
        Self {
            is_form_control: false,
            within_player: true,
            within_controls: false,
        }
    }
}

impl TargetInfo {
    /// Somewhere else on the page.
    pub fn outside() -> Self {
        Self {
            within_player: false,
            ..Self::default()
        }
    }

    /// Inside the control bar.
    pub fn controls() -> Self {
        Self {
            within_controls: true,
            ..Self::default()
        }
    }

    /// A form control (outside the widget unless changed).
    pub fn form_control() -> Self {
        Self {
            is_form_control: true,
            within_player: false,
            within_controls: false,
        }
    }
}

// =============================================================================
// KEYBOARD
// =============================================================================

bitflags! {
    /// Modifier keys held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const CTRL = 1 << 0;
        const ALT = 1 << 1;
        const SHIFT = 1 << 2;
        const META = 1 << 3;
    }
}

/// Key event state (press, repeat, release)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Keyboard event. `key` follows DOM naming ("ArrowLeft", " ", "m").
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardEvent {
    pub key: String,
    pub modifiers: Modifiers,
    pub state: KeyState,
    pub target: TargetInfo,
}

impl KeyboardEvent {
    /// Key press inside the widget, no modifiers.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::empty(),
            state: KeyState::Press,
            target: TargetInfo::default(),
        }
    }

    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            modifiers,
            ..Self::new(key)
        }
    }

    pub fn with_target(mut self, target: TargetInfo) -> Self {
        self.target = target;
        self
    }
}

// =============================================================================
// POINTER / MOUSE / TOUCH
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerType {
    Mouse,
    Touch,
    Pen,
}

/// Pointer event. `button` uses DOM numbering: 0 is the primary button.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub pointer_type: PointerType,
    pub button: i16,
    pub client_x: f64,
    pub client_y: f64,
    pub target: TargetInfo,
}

impl PointerEvent {
    pub fn mouse(client_x: f64) -> Self {
        Self {
            pointer_type: PointerType::Mouse,
            button: 0,
            client_x,
            client_y: 0.0,
            target: TargetInfo::default(),
        }
    }

    pub fn touch(client_x: f64) -> Self {
        Self {
            pointer_type: PointerType::Touch,
            ..Self::mouse(client_x)
        }
    }

    pub fn with_button(mut self, button: i16) -> Self {
        self.button = button;
        self
    }

    pub fn is_primary(&self) -> bool {
        self.pointer_type != PointerType::Mouse || self.button == 0
    }
}

/// Mouse movement over the widget (hover tracking, control visibility).
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    pub client_x: f64,
    pub client_y: f64,
    pub target: TargetInfo,
}

impl MouseEvent {
    pub fn at(client_x: f64) -> Self {
        Self {
            client_x,
            client_y: 0.0,
            target: TargetInfo::default(),
        }
    }

    pub fn with_target(mut self, target: TargetInfo) -> Self {
        self.target = target;
        self
    }
}

/// One touch point with the bounds of the element it started on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub client_x: f64,
    pub target_rect: Rect,
}

impl Touch {
    pub fn new(client_x: f64, target_rect: Rect) -> Self {
        Self {
            client_x,
            target_rect,
        }
    }

    /// Horizontal offset within the target.
    pub fn offset_x(&self) -> f64 {
        self.client_x - self.target_rect.left
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TouchEvent {
    pub touches: Vec<Touch>,
}

impl TouchEvent {
    pub fn single(touch: Touch) -> Self {
        Self {
            touches: vec![touch],
        }
    }

    pub fn ended() -> Self {
        Self::default()
    }

    pub fn first(&self) -> Option<&Touch> {
        self.touches.first()
    }
}

// =============================================================================
// DOM EVENT
// =============================================================================

/// Payload delivered by window/document-scoped listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    Key(KeyboardEvent),
    Pointer(PointerEvent),
    Mouse(MouseEvent),
    Touch(TouchEvent),
    /// Payload-less notifications (fullscreen changes, cue changes).
    Change,
}

// =============================================================================
// MEDIA EVENTS
// =============================================================================

/// Native media element events the player reacts to or forwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaEvent {
    Play,
    Pause,
    TimeUpdate,
    Progress,
    VolumeChange,
    LoadedMetadata,
    CanPlay,
    Ended,
    Emptied,
    Seeking,
    Seeked,
    Waiting,
    Other(String),
}

impl MediaEvent {
    /// Native event name ("timeupdate", "loadedmetadata", ...).
    pub fn name(&self) -> &str {
        match self {
            MediaEvent::Play => "play",
            MediaEvent::Pause => "pause",
            MediaEvent::TimeUpdate => "timeupdate",
            MediaEvent::Progress => "progress",
            MediaEvent::VolumeChange => "volumechange",
            MediaEvent::LoadedMetadata => "loadedmetadata",
            MediaEvent::CanPlay => "canplay",
            MediaEvent::Ended => "ended",
            MediaEvent::Emptied => "emptied",
            MediaEvent::Seeking => "seeking",
            MediaEvent::Seeked => "seeked",
            MediaEvent::Waiting => "waiting",
            MediaEvent::Other(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "play" => MediaEvent::Play,
            "pause" => MediaEvent::Pause,
            "timeupdate" => MediaEvent::TimeUpdate,
            "progress" => MediaEvent::Progress,
            "volumechange" => MediaEvent::VolumeChange,
            "loadedmetadata" => MediaEvent::LoadedMetadata,
            "canplay" => MediaEvent::CanPlay,
            "ended" => MediaEvent::Ended,
            "emptied" => MediaEvent::Emptied,
            "seeking" => MediaEvent::Seeking,
            "seeked" => MediaEvent::Seeked,
            "waiting" => MediaEvent::Waiting,
            other => MediaEvent::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_event_names_round_trip() {
        for name in ["play", "pause", "timeupdate", "progress", "ended", "custom"] {
            assert_eq!(MediaEvent::from_name(name).name(), name);
        }
    }

    #[test]
    fn test_primary_button() {
        assert!(PointerEvent::mouse(0.0).is_primary());
        assert!(!PointerEvent::mouse(0.0).with_button(2).is_primary());
        assert!(PointerEvent::touch(0.0).with_button(-1).is_primary());
    }

    #[test]
    fn test_touch_offset() {
        let touch = Touch::new(150.0, Rect::new(100.0, 0.0, 400.0, 300.0));
        assert_eq!(touch.offset_x(), 50.0);
    }
}
