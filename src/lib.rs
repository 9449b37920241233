//! # spark-player
//!
//! Reactive core of an embeddable video player widget.
//!
//! ## Architecture
//!
//! One native media element, many UI facets that depend on it: playback and
//! buffer progress, volume, control-bar visibility, fullscreen, the active
//! subtitle track, pointer and touch gestures. All of them are signals, and
//! everything the rendering layer shows is derived from them:
//!
//! ```text
//! media events → Player::handle_media_event → PlaybackCoordinator signals
//!             → derived view facets (ControlsView) → rendering layer
//! gestures / keys → gesture mappers → coordinator → media element + signals
//! ```
//!
//! The DOM is reached only through the traits in [`host`], so the whole
//! player runs against the simulated host in [`sim`] as well.
//!
//! ## Modules
//!
//! - [`signals`] - Signals, derived views, batching
//! - [`gesture`] - Slider drag, swipe and tap state machines
//! - [`playback`] - Playback coordinator (progress, volume, shortcuts, capture surface)
//! - [`fullscreen`] - Fullscreen controller
//! - [`subtitles`] - Subtitle track selection and cue placement
//! - [`preview`] - Hover thumbnail above the seek track
//! - [`lifecycle`] - Disposer and shared global listeners
//! - [`view`] - Derived facets for the rendering layer
//! - [`player`] - Construction and control surface
//! - [`element`] - Embeddable-tag adapter
//! - [`input`] - crossterm event bridge

pub mod config;
pub mod element;
pub mod error;
pub mod events;
pub mod fullscreen;
pub mod gesture;
pub mod host;
pub mod input;
pub mod lifecycle;
pub mod math;
pub mod playback;
pub mod player;
pub mod preview;
pub mod props;
pub mod signals;
pub mod sim;
pub mod subtitles;
pub mod timing;
pub mod view;

// Re-export commonly used items
pub use config::Tuning;
pub use error::{CleanupError, FullscreenError, PlayerError, Result};

pub use signals::{
    batch, commit_batch, derive, derive2, derive3, derive4, is_batching, signal, start_batch,
    ReadSignal, Signal, SignalSource, Subscription,
};

pub use events::{
    DomEvent, KeyState, KeyboardEvent, MediaEvent, Modifiers, MouseEvent, PointerEvent,
    PointerType, Rect, TargetInfo, Touch, TouchEvent,
};

pub use host::{
    Cue, CueLine, Environment, EventTarget, FullscreenHost, Host, KeyValueStore, MediaElement,
    PreviewElement, PreviewSpec, Scheduler, TextTrack, TimeRange, TrackMode,
};

pub use props::{
    CustomControl, PlayerProps, PlayerSignals, PropValue, Source, Styles, SubtitleTrack,
    VideoSource,
};

pub use element::{ElementAdapter, PropertyValue};
pub use fullscreen::FullscreenController;
pub use gesture::{SliderGesture, SwipeGesture, TapDetector, TapOutcome};
pub use lifecycle::{Disposer, GlobalEvents, Scope};
pub use playback::PlaybackCoordinator;
pub use player::Player;
pub use preview::PreviewCoordinator;
pub use subtitles::SubtitleController;
pub use view::{BuiltInControl, ControlSlot, ControlsView, MediaAttributes};
