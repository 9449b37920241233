//! Props Module - Typed reactive player props
//!
//! Every prop is a [`PropValue`]: either a plain value or a signal owned by
//! the embedding application. At construction [`PlayerSignals::from_props`]
//! turns all of them into signals, so the rest of the player only ever deals
//! with one shape.
//!
//! # Example
//!
//! ```ignore
//! let timeout = signal(Some(2000));
//!
//! let props = PlayerProps {
//!     sources: Some(Source::Url("movie.mp4".into())).into(),
//!     controls_timeout: timeout.read_only().into(),
//!     persistent_volume: Some(true).into(),
//!     ..Default::default()
//! };
//!
//! timeout.set(Some(500)); // the running player picks this up
//! ```

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::config::Tuning;
use crate::error::{PlayerError, Result};
use crate::events::MediaEvent;
use crate::signals::{signal, ReadSignal, Signal};

// =============================================================================
// PROP VALUE
// =============================================================================

/// A prop given as a plain value or as a signal.
#[derive(Clone)]
pub enum PropValue<T> {
    Static(T),
    Signal(ReadSignal<T>),
}

impl<T: Clone + PartialEq + 'static> PropValue<T> {
    /// Current value.
    pub fn get(&self) -> T {
        match self {
            PropValue::Static(v) => v.clone(),
            PropValue::Signal(s) => s.get(),
        }
    }

    pub fn is_reactive(&self) -> bool {
        matches!(self, PropValue::Signal(_))
    }

    /// Signalize: plain values get a fresh signal (owned, `true`), signals
    /// are shared as-is (`false`).
    fn into_signal(self) -> (ReadSignal<T>, bool) {
        match self {
            PropValue::Static(v) => (signal(v).read_only(), true),
            PropValue::Signal(s) => (s, false),
        }
    }
}

impl<T: Default> Default for PropValue<T> {
    fn default() -> Self {
        PropValue::Static(T::default())
    }
}

impl<T> From<T> for PropValue<T> {
    fn from(value: T) -> Self {
        PropValue::Static(value)
    }
}

impl<T> From<ReadSignal<T>> for PropValue<T> {
    fn from(signal: ReadSignal<T>) -> Self {
        PropValue::Signal(signal)
    }
}

impl<T: Clone + PartialEq + 'static> From<Signal<T>> for PropValue<T> {
    fn from(signal: Signal<T>) -> Self {
        PropValue::Signal(signal.read_only())
    }
}

impl<T: fmt::Debug + Clone + PartialEq + 'static> fmt::Debug for PropValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Static(v) => f.debug_tuple("Static").field(v).finish(),
            PropValue::Signal(s) => f.debug_tuple("Signal").field(&s.get()).finish(),
        }
    }
}

// =============================================================================
// PROP TYPES
// =============================================================================

/// One selectable `<source>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSource {
    pub id: Option<String>,
    pub src: String,
    pub mime_type: String,
    pub label: String,
}

/// Either a single URL or a list of typed, labelled sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    List(Vec<VideoSource>),
}

impl Source {
    /// URL for the element's own `src` attribute (single-URL form only).
    pub fn url(&self) -> Option<&str> {
        match self {
            Source::Url(url) => Some(url),
            Source::List(_) => None,
        }
    }

    /// Entries rendered as `<source>` children.
    pub fn entries(&self) -> &[VideoSource] {
        match self {
            Source::Url(_) => &[],
            Source::List(list) => list,
        }
    }
}

/// One selectable `<track kind="subtitles">`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleTrack {
    pub id: String,
    pub src: String,
    pub srclang: String,
    pub label: String,
    pub default: bool,
}

/// Stylesheet mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Styles {
    /// Built-in stylesheet.
    #[default]
    Default,
    /// No stylesheet at all.
    Disabled,
    /// Replace the built-in stylesheet.
    Custom(String),
}

/// Extra control-bar button placed at `index` among the built-in controls.
#[derive(Clone)]
pub struct CustomControl {
    pub index: usize,
    pub label: String,
    pub on_press: Rc<dyn Fn()>,
}

impl CustomControl {
    pub fn new(index: usize, label: impl Into<String>, on_press: impl Fn() + 'static) -> Self {
        Self {
            index,
            label: label.into(),
            on_press: Rc::new(on_press),
        }
    }
}

impl PartialEq for CustomControl {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.label == other.label
            && Rc::ptr_eq(&self.on_press, &other.on_press)
    }
}

impl fmt::Debug for CustomControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomControl")
            .field("index", &self.index)
            .field("label", &self.label)
            .finish()
    }
}

/// Callback for a native media event.
pub type MediaListener = Rc<dyn Fn(&MediaEvent)>;

// =============================================================================
// PLAYER PROPS
// =============================================================================

/// Everything a player can be configured with. `None` means "use the default".
#[derive(Clone, Default)]
pub struct PlayerProps {
    pub width: PropValue<Option<u32>>,
    pub height: PropValue<Option<u32>>,
    pub autoplay: PropValue<Option<bool>>,
    pub muted: PropValue<Option<bool>>,
    pub poster: PropValue<Option<String>>,
    pub preload: PropValue<Option<String>>,
    pub looped: PropValue<Option<bool>>,
    pub sources: PropValue<Option<Source>>,
    pub subtitles: PropValue<Option<Vec<SubtitleTrack>>>,
    /// Milliseconds.
    pub controls_timeout: PropValue<Option<u64>>,
    /// Preview video URL.
    pub preview: PropValue<Option<String>>,
    /// Milliseconds.
    pub preview_update_throttle: PropValue<Option<u64>>,
    pub preview_width: PropValue<Option<u32>>,
    pub preview_height: PropValue<Option<u32>>,
    pub persistent_volume: PropValue<Option<bool>>,
    pub styles: PropValue<Option<Styles>>,
    /// Milliseconds.
    pub swipe_control_range: PropValue<Option<f64>>,
    pub global_key_listener: PropValue<Option<bool>>,
    /// Seconds.
    pub key_seek_duration: PropValue<Option<f64>>,
    pub custom_controls: PropValue<Vec<CustomControl>>,
    /// Media event name ("play", "timeupdate", ...) to callbacks.
    pub listeners: HashMap<String, Vec<MediaListener>>,
    pub tuning: Tuning,
}

impl PlayerProps {
    /// Register a prop-level media event listener.
    pub fn listen(mut self, event: &str, listener: impl Fn(&MediaEvent) + 'static) -> Self {
        self.listeners
            .entry(event.to_string())
            .or_default()
            .push(Rc::new(listener));
        self
    }

    /// Reject values no player could work with.
    pub fn validate(&self) -> Result<()> {
        let non_negative = |name: &str, value: Option<f64>| match value {
            Some(v) if !v.is_finite() || v < 0.0 => {
                Err(PlayerError::validation(name, "a non-negative number"))
            }
            _ => Ok(()),
        };

        non_negative("swipe-control-range", self.swipe_control_range.get())?;
        non_negative("key-seek-duration", self.key_seek_duration.get())?;

        if let Some(Source::List(list)) = self.sources.get()
            && list.iter().any(|s| s.src.is_empty())
        {
            return Err(PlayerError::validation("sources", "a list of sources with a src"));
        }
        if let Some(tracks) = self.subtitles.get()
            && tracks.iter().any(|t| t.src.is_empty() || t.id.is_empty())
        {
            return Err(PlayerError::validation("subtitles", "a list of tracks with an id and src"));
        }
        Ok(())
    }
}

// =============================================================================
// PLAYER SIGNALS
// =============================================================================

/// Signalized props. Built once per player.
pub struct PlayerSignals {
    pub width: ReadSignal<Option<u32>>,
    pub height: ReadSignal<Option<u32>>,
    pub autoplay: ReadSignal<Option<bool>>,
    pub muted: ReadSignal<Option<bool>>,
    pub poster: ReadSignal<Option<String>>,
    pub preload: ReadSignal<Option<String>>,
    pub looped: ReadSignal<Option<bool>>,
    pub sources: ReadSignal<Option<Source>>,
    pub subtitles: ReadSignal<Option<Vec<SubtitleTrack>>>,
    pub controls_timeout: ReadSignal<Option<u64>>,
    pub preview: ReadSignal<Option<String>>,
    pub preview_update_throttle: ReadSignal<Option<u64>>,
    pub preview_width: ReadSignal<Option<u32>>,
    pub preview_height: ReadSignal<Option<u32>>,
    pub persistent_volume: ReadSignal<Option<bool>>,
    pub styles: ReadSignal<Option<Styles>>,
    pub swipe_control_range: ReadSignal<Option<f64>>,
    pub global_key_listener: ReadSignal<Option<bool>>,
    pub key_seek_duration: ReadSignal<Option<f64>>,
    pub custom_controls: ReadSignal<Vec<CustomControl>>,
    /// Signals created here (from static props); destroyed with the player.
    owned: Vec<Rc<dyn Fn()>>,
}

impl PlayerSignals {
    pub fn from_props(props: PlayerProps) -> Self {
        let mut owned: Vec<Rc<dyn Fn()>> = Vec::new();

        macro_rules! signalize {
            ($prop:expr) => {{
                let (sig, is_owned) = $prop.into_signal();
                if is_owned {
                    let handle = sig.clone();
                    owned.push(Rc::new(move || handle.destroy()));
                }
                sig
            }};
        }

        Self {
            width: signalize!(props.width),
            height: signalize!(props.height),
            autoplay: signalize!(props.autoplay),
            muted: signalize!(props.muted),
            poster: signalize!(props.poster),
            preload: signalize!(props.preload),
            looped: signalize!(props.looped),
            sources: signalize!(props.sources),
            subtitles: signalize!(props.subtitles),
            controls_timeout: signalize!(props.controls_timeout),
            preview: signalize!(props.preview),
            preview_update_throttle: signalize!(props.preview_update_throttle),
            preview_width: signalize!(props.preview_width),
            preview_height: signalize!(props.preview_height),
            persistent_volume: signalize!(props.persistent_volume),
            styles: signalize!(props.styles),
            swipe_control_range: signalize!(props.swipe_control_range),
            global_key_listener: signalize!(props.global_key_listener),
            key_seek_duration: signalize!(props.key_seek_duration),
            custom_controls: signalize!(props.custom_controls),
            owned,
        }
    }

    /// Number of signals created from static props.
    pub fn owned_count(&self) -> usize {
        self.owned.len()
    }

    /// Destroy the signals created from static props. Application-owned
    /// signals are left alone.
    pub(crate) fn destroy_owned(&self) {
        for destroy in &self.owned {
            destroy();
        }
    }
}
