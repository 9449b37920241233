//! Sim Module - In-memory host for tests and demos
//!
//! A deterministic implementation of every [`crate::host`] trait:
//! a virtual clock driving timers, event targets that count their listeners,
//! a media element that queues the native events it would fire, text tracks
//! with controllable active cues, and an async fullscreen API that can be told
//! to refuse.
//!
//! # Example
//!
//! ```ignore
//! let sim = SimHost::new();
//! let media = Rc::new(SimMedia::new(120.0));
//! let player = Player::new(PlayerProps::default(), media.clone(), sim.host())?;
//!
//! media.play();
//! sim.pump(&player, &media);   // deliver queued media events
//! sim.scheduler.advance(1000); // controls hide
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::DEFAULT_PREVIEW_WIDTH;
use crate::error::{CleanupError, FullscreenError};
use crate::events::{DomEvent, KeyboardEvent, MediaEvent, PointerEvent};
use crate::host::{
    Cue, CueLine, Environment, EventListener, EventTarget, FullscreenCallback, FullscreenHost,
    Host, KeyValueStore, ListenerId, MediaElement, PreviewElement, PreviewSpec, Scheduler,
    TextTrack, TimeRange, TimerId, TrackMode,
};
use crate::player::Player;

// =============================================================================
// SCHEDULER
// =============================================================================

struct Timer {
    id: TimerId,
    due: f64,
    callback: Box<dyn FnOnce()>,
}

/// Virtual clock. Time only moves through [`SimScheduler::advance`].
#[derive(Default)]
pub struct SimScheduler {
    now: Cell<f64>,
    next_id: Cell<TimerId>,
    timers: RefCell<Vec<Timer>>,
}

impl SimScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward, firing due timers in (due time, creation) order.
    /// Timers scheduled by callbacks fire too if they fall inside the span.
    pub fn advance(&self, ms: u64) {
        let target = self.now.get() + ms as f64;
        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let earliest = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)))
                    .map(|(i, _)| i);
                earliest.map(|i| timers.remove(i))
            };
            let Some(timer) = next else {
                break;
            };
            self.now.set(timer.due);
            (timer.callback)();
        }
        self.now.set(target);
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }
}

impl Scheduler for SimScheduler {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }

    fn set_timeout(&self, delay_ms: u64, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.timers.borrow_mut().push(Timer {
            id,
            due: self.now.get() + delay_ms as f64,
            callback,
        });
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.timers.borrow_mut().retain(|t| t.id != id);
    }
}

// =============================================================================
// EVENT TARGET
// =============================================================================

#[derive(Default)]
pub struct SimEventTarget {
    listeners: RefCell<Vec<(ListenerId, String, EventListener)>>,
    next_id: Cell<ListenerId>,
}

impl SimEventTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self, event: &str, payload: &DomEvent) {
        let matching: Vec<EventListener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, name, _)| name == event)
            .map(|(_, _, l)| l.clone())
            .collect();
        for listener in matching {
            listener(payload);
        }
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(_, name, _)| name == event)
            .count()
    }

    pub fn total_listeners(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl EventTarget for SimEventTarget {
    fn add_event_listener(&self, event: &str, listener: EventListener) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners
            .borrow_mut()
            .push((id, event.to_string(), listener));
        id
    }

    fn remove_event_listener(&self, event: &str, id: ListenerId) {
        self.listeners
            .borrow_mut()
            .retain(|(lid, name, _)| !(*lid == id && name == event));
    }
}

// =============================================================================
// TEXT TRACKS
// =============================================================================

pub struct SimCue {
    text: String,
    line: Cell<CueLine>,
}

impl SimCue {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            line: Cell::new(CueLine::Auto),
        }
    }
}

impl Cue for SimCue {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn line(&self) -> CueLine {
        self.line.get()
    }

    fn set_line(&self, line: CueLine) {
        self.line.set(line);
    }
}

pub struct SimTrack {
    id: String,
    mode: Cell<TrackMode>,
    cues: Vec<Rc<SimCue>>,
    active: RefCell<Vec<usize>>,
    listeners: RefCell<Vec<(ListenerId, Rc<dyn Fn()>)>>,
    next_id: Cell<ListenerId>,
}

impl SimTrack {
    pub fn new(id: impl Into<String>, cues: Vec<Rc<SimCue>>) -> Self {
        Self {
            id: id.into(),
            mode: Cell::new(TrackMode::Disabled),
            cues,
            active: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn cue(&self, index: usize) -> Option<Rc<SimCue>> {
        self.cues.get(index).cloned()
    }

    /// Replace the active cue set and fire `cuechange`.
    pub fn set_active(&self, indices: &[usize]) {
        *self.active.borrow_mut() = indices.to_vec();
        let listeners: Vec<Rc<dyn Fn()>> =
            self.listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener();
        }
    }

    /// Replace the active cue set without firing `cuechange`.
    pub fn set_active_silently(&self, indices: &[usize]) {
        *self.active.borrow_mut() = indices.to_vec();
    }

    pub fn cue_listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl TextTrack for SimTrack {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn mode(&self) -> TrackMode {
        self.mode.get()
    }

    fn set_mode(&self, mode: TrackMode) {
        self.mode.set(mode);
    }

    fn cues(&self) -> Vec<Rc<dyn Cue>> {
        self.cues.iter().map(|c| c.clone() as Rc<dyn Cue>).collect()
    }

    fn active_cues(&self) -> Vec<Rc<dyn Cue>> {
        self.active
            .borrow()
            .iter()
            .filter_map(|i| self.cues.get(*i))
            .map(|c| c.clone() as Rc<dyn Cue>)
            .collect()
    }

    fn add_cue_change_listener(&self, listener: Rc<dyn Fn()>) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_cue_change_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
    }
}

// =============================================================================
// MEDIA ELEMENT
// =============================================================================

/// Media element whose native events are queued instead of dispatched.
/// Drain them with [`SimMedia::take_events`] (or [`SimHost::pump`]).
pub struct SimMedia {
    current_time: Cell<f64>,
    duration: Cell<f64>,
    volume: Cell<f64>,
    paused: Cell<bool>,
    buffered: RefCell<Vec<TimeRange>>,
    tracks: RefCell<Vec<Rc<SimTrack>>>,
    queued: RefCell<Vec<MediaEvent>>,
}

impl SimMedia {
    /// Paused at 0 with the given duration (NaN for "no metadata yet").
    pub fn new(duration: f64) -> Self {
        Self {
            current_time: Cell::new(0.0),
            duration: Cell::new(duration),
            volume: Cell::new(1.0),
            paused: Cell::new(true),
            buffered: RefCell::new(Vec::new()),
            tracks: RefCell::new(Vec::new()),
            queued: RefCell::new(Vec::new()),
        }
    }

    pub fn set_duration(&self, duration: f64) {
        self.duration.set(duration);
        self.queue(MediaEvent::LoadedMetadata);
    }

    pub fn set_buffered(&self, ranges: Vec<TimeRange>) {
        *self.buffered.borrow_mut() = ranges;
        self.queue(MediaEvent::Progress);
    }

    pub fn add_track(&self, track: Rc<SimTrack>) {
        self.tracks.borrow_mut().push(track);
    }

    /// Advance the playhead as playback would.
    pub fn tick(&self, seconds: f64) {
        if self.paused.get() {
            return;
        }
        let next = self.current_time.get() + seconds;
        let duration = self.duration.get();
        if duration.is_finite() && next >= duration {
            self.current_time.set(duration);
            self.paused.set(true);
            self.queue(MediaEvent::TimeUpdate);
            self.queue(MediaEvent::Pause);
            self.queue(MediaEvent::Ended);
        } else {
            self.current_time.set(next);
            self.queue(MediaEvent::TimeUpdate);
        }
    }

    pub fn take_events(&self) -> Vec<MediaEvent> {
        self.queued.borrow_mut().drain(..).collect()
    }

    fn queue(&self, event: MediaEvent) {
        self.queued.borrow_mut().push(event);
    }
}

impl MediaElement for SimMedia {
    fn current_time(&self) -> f64 {
        self.current_time.get()
    }

    fn set_current_time(&self, seconds: f64) {
        self.current_time.set(seconds);
        self.queue(MediaEvent::Seeking);
        self.queue(MediaEvent::TimeUpdate);
        self.queue(MediaEvent::Seeked);
    }

    fn duration(&self) -> f64 {
        self.duration.get()
    }

    fn volume(&self) -> f64 {
        self.volume.get()
    }

    fn set_volume(&self, volume: f64) {
        if self.volume.replace(volume) != volume {
            self.queue(MediaEvent::VolumeChange);
        }
    }

    fn paused(&self) -> bool {
        self.paused.get()
    }

    fn play(&self) {
        if self.paused.replace(false) {
            self.queue(MediaEvent::Play);
        }
    }

    fn pause(&self) {
        if !self.paused.replace(true) {
            self.queue(MediaEvent::Pause);
        }
    }

    fn buffered(&self) -> Vec<TimeRange> {
        self.buffered.borrow().clone()
    }

    fn text_tracks(&self) -> Vec<Rc<dyn TextTrack>> {
        self.tracks
            .borrow()
            .iter()
            .map(|t| t.clone() as Rc<dyn TextTrack>)
            .collect()
    }
}

// =============================================================================
// FULLSCREEN
// =============================================================================

/// Requests resolve on the next scheduler turn and fire `fullscreenchange`
/// on the document.
pub struct SimFullscreen {
    scheduler: Rc<SimScheduler>,
    document: Rc<SimEventTarget>,
    element: Rc<Cell<bool>>,
    deny: Cell<bool>,
    supported: Cell<bool>,
    requests: Cell<u32>,
}

impl SimFullscreen {
    pub fn new(scheduler: Rc<SimScheduler>, document: Rc<SimEventTarget>) -> Self {
        Self {
            scheduler,
            document,
            element: Rc::new(Cell::new(false)),
            deny: Cell::new(false),
            supported: Cell::new(true),
            requests: Cell::new(0),
        }
    }

    /// Refuse further requests (no user gesture, permissions policy).
    pub fn set_deny(&self, deny: bool) {
        self.deny.set(deny);
    }

    /// Host without a fullscreen API: requests fail synchronously.
    pub fn set_supported(&self, supported: bool) {
        self.supported.set(supported);
    }

    pub fn requests(&self) -> u32 {
        self.requests.get()
    }

    /// Fullscreen changed outside the player (Esc key, another element).
    pub fn change_externally(&self, fullscreen: bool, event: &str) {
        self.element.set(fullscreen);
        self.document.dispatch(event, &DomEvent::Change);
    }

    fn settle(&self, target: bool, done: FullscreenCallback) {
        if !self.supported.get() {
            done(Err(FullscreenError::Unsupported));
            return;
        }
        let deny = target && self.deny.get();
        let element = self.element.clone();
        let document = self.document.clone();
        self.scheduler.set_timeout(
            0,
            Box::new(move || {
                if deny {
                    done(Err(FullscreenError::Denied("permission check failed".into())));
                    return;
                }
                element.set(target);
                document.dispatch("fullscreenchange", &DomEvent::Change);
                done(Ok(()));
            }),
        );
    }
}

impl FullscreenHost for SimFullscreen {
    fn has_fullscreen_element(&self) -> bool {
        self.element.get()
    }

    fn request_fullscreen(&self, done: FullscreenCallback) {
        self.requests.set(self.requests.get() + 1);
        self.settle(true, done);
    }

    fn exit_fullscreen(&self, done: FullscreenCallback) {
        self.settle(false, done);
    }
}

// =============================================================================
// STORAGE / ENVIRONMENT / PREVIEW
// =============================================================================

#[derive(Default)]
pub struct SimStorage {
    items: RefCell<HashMap<String, String>>,
}

impl SimStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for SimStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

pub struct SimPreview {
    pub spec: PreviewSpec,
    time: Cell<f64>,
    left: Cell<f64>,
    visible: Cell<bool>,
    removed: Cell<bool>,
    seeks: Cell<u32>,
}

impl SimPreview {
    fn new(spec: PreviewSpec) -> Self {
        Self {
            spec,
            time: Cell::new(0.0),
            left: Cell::new(0.0),
            visible: Cell::new(false),
            removed: Cell::new(false),
            seeks: Cell::new(0),
        }
    }

    pub fn left(&self) -> f64 {
        self.left.get()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn is_removed(&self) -> bool {
        self.removed.get()
    }

    /// Number of `set_current_time` calls.
    pub fn seeks(&self) -> u32 {
        self.seeks.get()
    }
}

impl PreviewElement for SimPreview {
    fn current_time(&self) -> f64 {
        self.time.get()
    }

    fn set_current_time(&self, seconds: f64) {
        self.seeks.set(self.seeks.get() + 1);
        self.time.set(seconds);
    }

    fn width(&self) -> f64 {
        match (self.spec.width, self.spec.height) {
            (Some(w), _) => f64::from(w),
            (None, Some(h)) => f64::from(h) * 16.0 / 9.0,
            (None, None) => f64::from(DEFAULT_PREVIEW_WIDTH),
        }
    }

    fn set_left(&self, px: f64) {
        self.left.set(px);
    }

    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    fn remove(&self) -> Result<(), CleanupError> {
        if self.removed.replace(true) {
            return Err(CleanupError::Detached);
        }
        Ok(())
    }
}

pub struct SimEnvironment {
    touch_primary: Cell<bool>,
    viewport_width: Cell<f64>,
    previews: RefCell<Vec<Rc<SimPreview>>>,
}

impl Default for SimEnvironment {
    fn default() -> Self {
        Self {
            touch_primary: Cell::new(false),
            viewport_width: Cell::new(1280.0),
            previews: RefCell::new(Vec::new()),
        }
    }
}

impl SimEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_touch_primary(&self, touch: bool) {
        self.touch_primary.set(touch);
    }

    pub fn set_viewport_width(&self, width: f64) {
        self.viewport_width.set(width);
    }

    /// Every preview element created so far, oldest first.
    pub fn previews(&self) -> Vec<Rc<SimPreview>> {
        self.previews.borrow().clone()
    }

    pub fn last_preview(&self) -> Option<Rc<SimPreview>> {
        self.previews.borrow().last().cloned()
    }
}

impl Environment for SimEnvironment {
    fn is_touch_primary(&self) -> bool {
        self.touch_primary.get()
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width.get()
    }

    fn create_preview(&self, spec: &PreviewSpec) -> Rc<dyn PreviewElement> {
        let preview = Rc::new(SimPreview::new(spec.clone()));
        self.previews.borrow_mut().push(preview.clone());
        preview
    }
}

// =============================================================================
// HOST BUNDLE
// =============================================================================

/// Concrete handles to every simulated host object.
pub struct SimHost {
    pub window: Rc<SimEventTarget>,
    pub document: Rc<SimEventTarget>,
    pub scheduler: Rc<SimScheduler>,
    pub fullscreen: Rc<SimFullscreen>,
    pub storage: Rc<SimStorage>,
    pub environment: Rc<SimEnvironment>,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHost {
    pub fn new() -> Self {
        let scheduler = Rc::new(SimScheduler::new());
        let document = Rc::new(SimEventTarget::new());
        Self {
            window: Rc::new(SimEventTarget::new()),
            fullscreen: Rc::new(SimFullscreen::new(scheduler.clone(), document.clone())),
            document,
            scheduler,
            storage: Rc::new(SimStorage::new()),
            environment: Rc::new(SimEnvironment::new()),
        }
    }

    pub fn host(&self) -> Host {
        Host {
            window: self.window.clone(),
            document: self.document.clone(),
            scheduler: self.scheduler.clone(),
            fullscreen: self.fullscreen.clone(),
            storage: Some(self.storage.clone()),
            environment: self.environment.clone(),
        }
    }

    /// Same as [`SimHost::host`] without persistent storage.
    pub fn host_without_storage(&self) -> Host {
        Host {
            storage: None,
            ..self.host()
        }
    }

    /// Deliver every queued media event to the player.
    pub fn pump(&self, player: &Player, media: &SimMedia) {
        loop {
            let events = media.take_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                player.handle_media_event(&event);
            }
        }
    }

    /// Advance the clock, then deliver media events caused by timers.
    pub fn advance(&self, ms: u64, player: &Player, media: &SimMedia) {
        self.scheduler.advance(ms);
        self.pump(player, media);
    }

    /// Key press on the window.
    pub fn key(&self, event: KeyboardEvent) {
        self.window.dispatch("keydown", &DomEvent::Key(event));
    }

    pub fn pointer_move(&self, event: PointerEvent) {
        self.window.dispatch("pointermove", &DomEvent::Pointer(event));
    }

    pub fn pointer_up(&self, event: PointerEvent) {
        self.window.dispatch("pointerup", &DomEvent::Pointer(event));
    }
}
