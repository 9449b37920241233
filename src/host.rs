//! Host Module - What the player needs from its environment
//!
//! The player never talks to a concrete DOM. Everything it touches goes
//! through these traits: the media element and its text tracks, the window
//! and document event targets, timers, the fullscreen API, persistent storage,
//! and the few environment queries the preview needs.
//!
//! [`crate::sim`] implements all of them in memory for tests and demos.
//!
//! # Contract
//!
//! - Timer callbacks never run synchronously inside `set_timeout`.
//! - Removing an unknown listener or clearing an unknown timer is a no-op.
//! - Fullscreen completion callbacks may run later (the request is async).

use std::rc::Rc;

use crate::error::{CleanupError, FullscreenError};
use crate::events::DomEvent;

// =============================================================================
// EVENT TARGETS
// =============================================================================

pub type ListenerId = u64;

pub type EventListener = Rc<dyn Fn(&DomEvent)>;

/// `window` or `document`.
pub trait EventTarget {
    fn add_event_listener(&self, event: &str, listener: EventListener) -> ListenerId;
    fn remove_event_listener(&self, event: &str, id: ListenerId);
}

// =============================================================================
// TIMERS
// =============================================================================

pub type TimerId = u64;

pub trait Scheduler {
    /// Monotonic milliseconds.
    fn now_ms(&self) -> f64;
    fn set_timeout(&self, delay_ms: u64, callback: Box<dyn FnOnce()>) -> TimerId;
    fn clear_timeout(&self, id: TimerId);
}

// =============================================================================
// MEDIA ELEMENT
// =============================================================================

/// One buffered range, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// The underlying `<video>` element.
pub trait MediaElement {
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
    /// NaN until metadata is loaded.
    fn duration(&self) -> f64;
    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);
    fn paused(&self) -> bool;
    fn play(&self);
    fn pause(&self);
    fn buffered(&self) -> Vec<TimeRange>;
    fn text_tracks(&self) -> Vec<Rc<dyn TextTrack>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackMode {
    Disabled,
    Hidden,
    Showing,
}

/// Vertical cue placement. `Auto` lets the renderer decide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CueLine {
    Auto,
    Line(f64),
}

pub trait Cue {
    fn text(&self) -> String;
    fn line(&self) -> CueLine;
    fn set_line(&self, line: CueLine);
}

pub trait TextTrack {
    /// Matches the `<track>` id the player assigned.
    fn id(&self) -> String;
    fn mode(&self) -> TrackMode;
    fn set_mode(&self, mode: TrackMode);
    fn cues(&self) -> Vec<Rc<dyn Cue>>;
    fn active_cues(&self) -> Vec<Rc<dyn Cue>>;
    fn add_cue_change_listener(&self, listener: Rc<dyn Fn()>) -> ListenerId;
    fn remove_cue_change_listener(&self, id: ListenerId);
}

// =============================================================================
// FULLSCREEN / STORAGE / ENVIRONMENT
// =============================================================================

pub type FullscreenCallback = Box<dyn FnOnce(Result<(), FullscreenError>)>;

/// Vendor differences are the host's problem; the player sees one API.
pub trait FullscreenHost {
    /// True if the document reports any fullscreen element.
    fn has_fullscreen_element(&self) -> bool;
    /// Request fullscreen for the widget root.
    fn request_fullscreen(&self, done: FullscreenCallback);
    fn exit_fullscreen(&self, done: FullscreenCallback);
}

/// `localStorage`-like string store.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
}

/// What to build for the hover preview.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSpec {
    pub src: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Secondary, muted, never-playing media element.
pub trait PreviewElement {
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
    /// Rendered width in px.
    fn width(&self) -> f64;
    fn set_left(&self, px: f64);
    fn set_visible(&self, visible: bool);
    fn remove(&self) -> Result<(), CleanupError>;
}

pub trait Environment {
    /// Touch-primary devices get no hover preview.
    fn is_touch_primary(&self) -> bool;
    fn viewport_width(&self) -> f64;
    fn create_preview(&self, spec: &PreviewSpec) -> Rc<dyn PreviewElement>;
}

// =============================================================================
// HOST BUNDLE
// =============================================================================

/// Everything the player needs besides the media element.
#[derive(Clone)]
pub struct Host {
    pub window: Rc<dyn EventTarget>,
    pub document: Rc<dyn EventTarget>,
    pub scheduler: Rc<dyn Scheduler>,
    pub fullscreen: Rc<dyn FullscreenHost>,
    /// `None` where storage is unavailable (private mode, sandboxed frames).
    pub storage: Option<Rc<dyn KeyValueStore>>,
    pub environment: Rc<dyn Environment>,
}
