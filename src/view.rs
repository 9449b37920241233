//! View Module - Derived facets for the rendering layer
//!
//! Everything the control bar and the media element bind to, expressed as
//! derived signals over the playback state and the props. The rendering layer
//! subscribes to these and never reads the coordinators directly.
//!
//! # Facets
//!
//! - Bar styles: `right: X%;` fills, `left: calc(X% - r);` thumbs
//! - `time_label` - `mm:ss` of the playhead, frozen while the bar is hidden
//! - `hide_cursor`, `is_muted`
//! - Class lists: `root_class`, `controls_class`
//! - Media attributes: `video_src`, `source_list`, `width_attr`, `height_attr`,
//!   `media_attrs`, `poster_attr`
//! - `styles`, `subtitle_tracks`, `control_layout`

use std::cell::RefCell;
use std::rc::Rc;

use crate::host::MediaElement;
use crate::math::{clamp, format_time};
use crate::playback::PlaybackCoordinator;
use crate::props::{CustomControl, PlayerSignals, Styles, SubtitleTrack, VideoSource};
use crate::signals::{derive, derive2, derive3, derive4, ReadSignal};

/// Thumb offset (half its width) on the seek track.
const TRACK_THUMB_OFFSET: &str = "0.3em";
/// Thumb offset on the volume slider.
const VOLUME_THUMB_OFFSET: &str = "0.75em";

// =============================================================================
// STYLE HELPERS
// =============================================================================

/// Fill style: the bar covers `fraction` of the track from the left.
pub fn fill_style(fraction: f64) -> String {
    format!("right: {}%;", clamp((1.0 - fraction) * 100.0, 0.0, 100.0))
}

/// Thumb style, centered on the fill edge.
pub fn thumb_style(fraction: f64, offset: &str) -> String {
    format!("left: calc({}% - {offset});", clamp(fraction * 100.0, 0.0, 100.0))
}

/// Class list of the widget root.
pub fn root_class(fullscreen: bool, show_controls: bool, playing: bool) -> String {
    let mut class = String::from("spark-player");
    for (on, name) in [
        (fullscreen, " fullscreen"),
        (!show_controls, " hide-cursor"),
        (playing, " playing"),
    ] {
        if on {
            class.push_str(name);
        }
    }
    class
}

/// Class list of the control bar.
pub fn controls_class(visible: bool, playing: bool) -> String {
    match (visible, playing) {
        (true, true) => "controls visible playing",
        (true, false) => "controls visible",
        (false, true) => "controls playing",
        (false, false) => "controls",
    }
    .to_string()
}

/// Playback attributes of the media element. Unset flags are off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaAttributes {
    pub autoplay: bool,
    pub muted: bool,
    pub looped: bool,
    pub preload: Option<String>,
}

// =============================================================================
// CONTROL LAYOUT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltInControl {
    PlayPause,
    Track,
    Time,
    Volume,
    Subtitles,
    Fullscreen,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlSlot {
    BuiltIn(BuiltInControl),
    Custom(CustomControl),
}

/// Built-in controls in bar order, with each custom control inserted at its
/// index. Indices past the end append. The subtitle selector only appears
/// when there are tracks to pick from.
pub fn control_layout(custom: &[CustomControl], with_subtitles: bool) -> Vec<ControlSlot> {
    let mut slots: Vec<ControlSlot> = [
        BuiltInControl::PlayPause,
        BuiltInControl::Track,
        BuiltInControl::Time,
        BuiltInControl::Volume,
        BuiltInControl::Subtitles,
        BuiltInControl::Fullscreen,
    ]
    .into_iter()
    .filter(|c| with_subtitles || *c != BuiltInControl::Subtitles)
    .map(ControlSlot::BuiltIn)
    .collect();

    let mut custom: Vec<&CustomControl> = custom.iter().collect();
    custom.sort_by_key(|c| c.index);
    for control in custom {
        let at = control.index.min(slots.len());
        slots.insert(at, ControlSlot::Custom(control.clone()));
    }
    slots
}

// =============================================================================
// CONTROLS VIEW
// =============================================================================

pub struct ControlsView {
    pub progress_bar_style: ReadSignal<String>,
    pub progress_thumb_style: ReadSignal<String>,
    pub buffer_bar_style: ReadSignal<String>,
    pub volume_bar_style: ReadSignal<String>,
    pub volume_thumb_style: ReadSignal<String>,
    pub is_muted: ReadSignal<bool>,
    /// Cursor hidden together with the control bar.
    pub hide_cursor: ReadSignal<bool>,
    pub time_label: ReadSignal<String>,
    pub root_class: ReadSignal<String>,
    pub controls_class: ReadSignal<String>,
    /// `src` attribute, set only for a single-URL source.
    pub video_src: ReadSignal<Option<String>>,
    /// `<source>` children for a source list.
    pub source_list: ReadSignal<Vec<VideoSource>>,
    /// Width attribute; dropped in fullscreen so the element can fill the screen.
    pub width_attr: ReadSignal<Option<u32>>,
    pub height_attr: ReadSignal<Option<u32>>,
    pub media_attrs: ReadSignal<MediaAttributes>,
    pub poster_attr: ReadSignal<Option<String>>,
    pub styles: ReadSignal<Styles>,
    pub subtitle_tracks: ReadSignal<Vec<SubtitleTrack>>,
    pub control_layout: ReadSignal<Vec<ControlSlot>>,
}

impl ControlsView {
    pub fn new(
        playback: &PlaybackCoordinator,
        is_fullscreen: &ReadSignal<bool>,
        media: Rc<dyn MediaElement>,
        props: &PlayerSignals,
    ) -> Self {
        let progress = playback.progress();
        let volume = playback.volume();
        let show_controls = playback.show_controls();
        let is_playing = playback.is_playing();

        let last_label = RefCell::new(format_time(0.0));
        let time_label = derive2(&progress, &show_controls, move |_, visible| {
            if *visible {
                *last_label.borrow_mut() = format_time(media.current_time());
            }
            last_label.borrow().clone()
        });

        Self {
            progress_bar_style: progress.derive(|p| fill_style(*p)),
            progress_thumb_style: progress.derive(|p| thumb_style(*p, TRACK_THUMB_OFFSET)),
            buffer_bar_style: playback.buffer_progress().derive(|p| fill_style(*p)),
            volume_bar_style: volume.derive(|v| fill_style(*v)),
            volume_thumb_style: volume.derive(|v| thumb_style(*v, VOLUME_THUMB_OFFSET)),
            is_muted: volume.derive(|v| *v == 0.0),
            hide_cursor: show_controls.derive(|show| !show),
            time_label,
            root_class: derive3(is_fullscreen, &show_controls, &is_playing, |fs, show, playing| {
                root_class(*fs, *show, *playing)
            }),
            controls_class: derive2(&show_controls, &is_playing, |show, playing| {
                controls_class(*show, *playing)
            }),
            video_src: derive(&props.sources, |s| {
                s.as_ref().and_then(|s| s.url()).map(str::to_string)
            }),
            source_list: derive(&props.sources, |s| {
                s.as_ref().map(|s| s.entries().to_vec()).unwrap_or_default()
            }),
            width_attr: derive2(&props.width, is_fullscreen, |w, fs| if *fs { None } else { *w }),
            height_attr: derive2(&props.height, is_fullscreen, |h, fs| if *fs { None } else { *h }),
            media_attrs: derive4(
                &props.autoplay,
                &props.muted,
                &props.looped,
                &props.preload,
                |autoplay, muted, looped, preload| MediaAttributes {
                    autoplay: autoplay.unwrap_or(false),
                    muted: muted.unwrap_or(false),
                    looped: looped.unwrap_or(false),
                    preload: preload.clone(),
                },
            ),
            poster_attr: props.poster.derive(|p| p.clone()),
            styles: derive(&props.styles, |s| s.clone().unwrap_or_default()),
            subtitle_tracks: derive(&props.subtitles, |t| t.clone().unwrap_or_default()),
            control_layout: derive2(&props.custom_controls, &props.subtitles, |custom, subs| {
                control_layout(custom, subs.as_ref().is_some_and(|t| !t.is_empty()))
            }),
        }
    }

    pub(crate) fn destroy(&self) {
        self.progress_bar_style.destroy();
        self.progress_thumb_style.destroy();
        self.buffer_bar_style.destroy();
        self.volume_bar_style.destroy();
        self.volume_thumb_style.destroy();
        self.is_muted.destroy();
        self.hide_cursor.destroy();
        self.time_label.destroy();
        self.root_class.destroy();
        self.controls_class.destroy();
        self.video_src.destroy();
        self.source_list.destroy();
        self.width_attr.destroy();
        self.height_attr.destroy();
        self.media_attrs.destroy();
        self.poster_attr.destroy();
        self.styles.destroy();
        self.subtitle_tracks.destroy();
        self.control_layout.destroy();
    }
}
