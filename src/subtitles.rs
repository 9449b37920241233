//! Subtitles Module - Track selection and cue placement
//!
//! At most one text track shows at a time. While the control bar is visible
//! the active cues are lifted above it (their line pinned a few rows up);
//! when the bar hides they fall back to automatic placement. Selecting a
//! track always lifts its active cues once, shortly after the switch.
//!
//! # API
//!
//! - `select(id)` - Show one track, hide the rest
//! - `disable()` - Hide the showing track
//! - `active_track()` - Id of the showing track

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::Tuning;
use crate::host::{CueLine, ListenerId, MediaElement, Scheduler, TextTrack, TrackMode};
use crate::lifecycle::Disposer;
use crate::signals::{signal, ReadSignal, Signal};
use crate::timing::Timeout;

/// Pin every automatically placed active cue above the control bar.
///
/// The line is first set to 1 so renderers notice the change, then to a
/// negative row leaving room for multi-line text.
pub fn lift_cues(track: &dyn TextTrack) {
    for cue in track.active_cues() {
        if cue.line() != CueLine::Auto {
            continue;
        }
        let newlines = cue.text().matches('\n').count() as f64;
        cue.set_line(CueLine::Line(1.0));
        cue.set_line(CueLine::Line(-3.0 - newlines));
    }
}

/// Back to automatic placement for every cue of the track.
pub fn reset_cues(track: &dyn TextTrack) {
    for cue in track.cues() {
        cue.set_line(CueLine::Auto);
    }
}

struct CueWatch {
    track: Rc<dyn TextTrack>,
    id: ListenerId,
}

pub struct SubtitleController {
    media: Rc<dyn MediaElement>,
    lift_delay_ms: u64,
    active_track: Signal<Option<String>>,
    lift_timer: Timeout,
    controls_visible: Cell<bool>,
    cue_watch: RefCell<Option<CueWatch>>,
}

impl SubtitleController {
    pub fn new(media: Rc<dyn MediaElement>, scheduler: Rc<dyn Scheduler>, tuning: &Tuning) -> Rc<Self> {
        let showing = media
            .text_tracks()
            .into_iter()
            .find(|t| t.mode() == TrackMode::Showing)
            .map(|t| t.id());
        Rc::new(Self {
            media,
            lift_delay_ms: tuning.cue_lift_delay_ms,
            active_track: signal(showing),
            lift_timer: Timeout::new(scheduler),
            controls_visible: Cell::new(true),
            cue_watch: RefCell::new(None),
        })
    }

    /// Follow control-bar visibility until disposal.
    pub fn attach(self: &Rc<Self>, show_controls: &ReadSignal<bool>, disposer: &Disposer) {
        self.controls_visible.set(show_controls.get());
        let weak = Rc::downgrade(self);
        let sub = show_controls.subscribe(move |visible| {
            if let Some(controller) = weak.upgrade() {
                controller.on_controls_visibility(*visible);
            }
        });
        disposer.add(sub.into_cleanup());

        let weak = Rc::downgrade(self);
        disposer.add(move || {
            if let Some(controller) = weak.upgrade() {
                controller.lift_timer.cancel();
                controller.unwatch_cues();
            }
        });
    }

    pub fn active_track(&self) -> ReadSignal<Option<String>> {
        self.active_track.read_only()
    }

    /// Show the track with `id`, hide all others. Unknown ids change nothing.
    pub fn select(&self, id: &str) -> bool {
        let tracks = self.media.text_tracks();
        let Some(chosen) = tracks.iter().find(|t| t.id() == id).cloned() else {
            log::debug!("no text track with id {id:?}");
            return false;
        };

        self.unwatch_cues();
        for track in &tracks {
            if track.id() != id {
                if track.mode() == TrackMode::Showing {
                    reset_cues(track.as_ref());
                }
                track.set_mode(TrackMode::Hidden);
            }
        }
        chosen.set_mode(TrackMode::Showing);
        self.active_track.set(Some(id.to_string()));

        if self.controls_visible.get() {
            self.watch_cues(chosen.clone());
        }
        let weak = Rc::downgrade(&chosen);
        self.lift_timer.start(self.lift_delay_ms, move || {
            if let Some(track) = weak.upgrade()
                && track.mode() == TrackMode::Showing
            {
                lift_cues(track.as_ref());
            }
        });
        true
    }

    /// Hide the showing track, if any.
    pub fn disable(&self) {
        self.lift_timer.cancel();
        self.unwatch_cues();
        for track in self.media.text_tracks() {
            if track.mode() == TrackMode::Showing {
                track.set_mode(TrackMode::Hidden);
                reset_cues(track.as_ref());
            }
        }
        self.active_track.set(None);
    }

    fn showing_track(&self) -> Option<Rc<dyn TextTrack>> {
        self.media
            .text_tracks()
            .into_iter()
            .find(|t| t.mode() == TrackMode::Showing)
    }

    fn on_controls_visibility(&self, visible: bool) {
        self.controls_visible.set(visible);
        let Some(track) = self.showing_track() else {
            return;
        };
        if visible {
            lift_cues(track.as_ref());
            self.watch_cues(track);
        } else {
            reset_cues(track.as_ref());
            self.unwatch_cues();
        }
    }

    fn watch_cues(&self, track: Rc<dyn TextTrack>) {
        if self
            .cue_watch
            .borrow()
            .as_ref()
            .is_some_and(|w| Rc::ptr_eq(&w.track, &track))
        {
            return;
        }
        self.unwatch_cues();

        let weak_track = Rc::downgrade(&track);
        let id = track.add_cue_change_listener(Rc::new(move || {
            if let Some(track) = weak_track.upgrade() {
                lift_cues(track.as_ref());
            }
        }));
        *self.cue_watch.borrow_mut() = Some(CueWatch { track, id });
    }

    fn unwatch_cues(&self) {
        let watch = self.cue_watch.borrow_mut().take();
        if let Some(watch) = watch {
            watch.track.remove_cue_change_listener(watch.id);
        }
    }

    pub(crate) fn destroy(&self) {
        self.active_track.destroy();
    }
}
