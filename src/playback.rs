//! Playback Module - Coordinator between the media element and player state
//!
//! Owns the playback signals (`progress`, `buffer_progress`, `is_playing`,
//! `show_controls`, `volume`, `is_ready`) and keeps them in step with the
//! media element. It is also where user intent lands: keyboard shortcuts,
//! taps and swipes on the capture surface, and the control surface methods.
//!
//! # State machine
//!
//! ```text
//! {Paused, Playing} x {ControlsVisible, ControlsHidden}
//!
//! media play           -> Playing, restart hide timer
//! media pause / ended  -> Paused, ControlsVisible
//! mouse move / touch   -> ControlsVisible, restart hide timer
//! hide timer (Playing) -> ControlsHidden
//! mouse leave (Playing)-> ControlsHidden
//! ```
//!
//! # Capture surface
//!
//! The transparent layer over the video distinguishes taps (toggle play),
//! double presses (toggle fullscreen) and horizontal swipes (seek). Single
//! taps are deferred by the double-press window so a second press can
//! cancel them; a swipe suppresses the tap its release would produce.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::config::{
    Tuning, DEFAULT_CONTROLS_TIMEOUT_MS, DEFAULT_KEY_SEEK_SECS, DEFAULT_SWIPE_CONTROL_RANGE_MS,
    DEFAULT_VOLUME, VOLUME_STORAGE_KEY,
};
use crate::events::{
    DomEvent, KeyState, KeyboardEvent, MediaEvent, MouseEvent, PointerEvent, Touch, TouchEvent,
};
use crate::fullscreen::FullscreenController;
use crate::gesture::{SwipeGesture, TapDetector, TapOutcome};
use crate::host::{KeyValueStore, MediaElement, Scheduler, TimeRange};
use crate::lifecycle::{GlobalEvents, Scope};
use crate::math::clamp;
use crate::props::PlayerSignals;
use crate::signals::{batch, signal, ReadSignal, Signal};
use crate::timing::{Throttle, Timeout};

// =============================================================================
// PURE HELPERS
// =============================================================================

/// `current / duration`, or `None` while the duration is unusable.
pub fn playback_progress(current_time: f64, duration: f64) -> Option<f64> {
    if !duration.is_finite() || duration <= 0.0 {
        return None;
    }
    Some(clamp(current_time / duration, 0.0, 1.0))
}

/// End of the buffered range holding the playhead, as a fraction of the
/// duration. A range counts if the playhead is at most `slack` seconds
/// before its start. No match is 0; no ranges or no duration is `None`.
pub fn buffered_progress(
    ranges: &[TimeRange],
    current_time: f64,
    duration: f64,
    slack: f64,
) -> Option<f64> {
    if ranges.is_empty() || !duration.is_finite() || duration <= 0.0 {
        return None;
    }
    let end = ranges
        .iter()
        .find(|r| r.start - slack <= current_time && current_time <= r.end)
        .map_or(0.0, |r| r.end);
    Some(clamp(end / duration, 0.0, 1.0))
}

/// Parse a stored volume; anything unusable falls back to the default.
pub fn parse_stored_volume(stored: Option<&str>) -> f64 {
    stored
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map_or(DEFAULT_VOLUME, |v| clamp(v, 0.0, 1.0))
}

// =============================================================================
// COORDINATOR
// =============================================================================

pub struct PlaybackCoordinator {
    media: Rc<dyn MediaElement>,
    scheduler: Rc<dyn Scheduler>,
    storage: Option<Rc<dyn KeyValueStore>>,
    fullscreen: Rc<FullscreenController>,
    tuning: Tuning,

    controls_timeout: ReadSignal<Option<u64>>,
    persistent_volume: ReadSignal<Option<bool>>,
    swipe_control_range: ReadSignal<Option<f64>>,
    global_key_listener: ReadSignal<Option<bool>>,
    key_seek_duration: ReadSignal<Option<f64>>,

    progress: Signal<f64>,
    buffer_progress: Signal<f64>,
    is_playing: Signal<bool>,
    show_controls: Signal<bool>,
    volume: Signal<f64>,
    is_ready: Signal<bool>,

    last_audible_volume: Cell<f64>,
    hide_timer: Timeout,
    tap_timer: Timeout,
    tap: TapDetector,
    swipe: SwipeGesture,
    swipe_moves: Throttle<Touch>,
}

impl PlaybackCoordinator {
    pub fn new(
        media: Rc<dyn MediaElement>,
        scheduler: Rc<dyn Scheduler>,
        storage: Option<Rc<dyn KeyValueStore>>,
        fullscreen: Rc<FullscreenController>,
        props: &PlayerSignals,
        tuning: Tuning,
    ) -> Rc<Self> {
        let persisted = props.persistent_volume.get().unwrap_or(false);
        let initial_volume = match (&storage, persisted) {
            (Some(store), true) => parse_stored_volume(store.get_item(VOLUME_STORAGE_KEY).as_deref()),
            _ => DEFAULT_VOLUME,
        };
        media.set_volume(initial_volume);

        let initial_progress =
            playback_progress(media.current_time(), media.duration()).unwrap_or(0.0);
        let playing = !media.paused();
        let ready = media.duration().is_finite();

        Rc::new_cyclic(|this: &Weak<Self>| {
            let weak = this.clone();
            let swipe_moves = Throttle::new(scheduler.clone(), tuning.swipe_throttle_ms, {
                move |touch: Touch| {
                    if let Some(coordinator) = weak.upgrade() {
                        coordinator.apply_swipe(&touch);
                    }
                }
            });

            Self {
                media,
                hide_timer: Timeout::new(scheduler.clone()),
                tap_timer: Timeout::new(scheduler.clone()),
                scheduler,
                storage,
                fullscreen,
                tap: TapDetector::new(tuning.double_press_window_ms, tuning.tap_max_duration_ms),
                swipe: SwipeGesture::new(tuning.swipe_threshold_px, tuning.swipe_edge_margin_px),
                swipe_moves,
                tuning,

                controls_timeout: props.controls_timeout.clone(),
                persistent_volume: props.persistent_volume.clone(),
                swipe_control_range: props.swipe_control_range.clone(),
                global_key_listener: props.global_key_listener.clone(),
                key_seek_duration: props.key_seek_duration.clone(),

                progress: signal(initial_progress),
                buffer_progress: signal(0.0),
                is_playing: signal(playing),
                show_controls: signal(true),
                volume: signal(initial_volume),
                is_ready: signal(ready),

                last_audible_volume: Cell::new(if initial_volume > 0.0 {
                    initial_volume
                } else {
                    DEFAULT_VOLUME
                }),
            }
        })
    }

    /// Register the window keyboard listener, volume persistence and the
    /// teardown of every timer and throttle.
    pub fn attach(self: &Rc<Self>, events: &GlobalEvents) {
        let weak = Rc::downgrade(self);
        events.on(Scope::Window, "keydown", move |event| {
            if let (Some(coordinator), DomEvent::Key(key)) = (weak.upgrade(), event) {
                coordinator.handle_key(key);
            }
        });

        if let Some(store) = self.storage.clone() {
            let persistent = self.persistent_volume.clone();
            let sub = self.volume.subscribe(move |volume| {
                if persistent.get().unwrap_or(false) {
                    store.set_item(VOLUME_STORAGE_KEY, &volume.to_string());
                }
            });
            events.disposer().add(sub.into_cleanup());
        }

        let hide_timer = self.hide_timer.clone();
        let tap_timer = self.tap_timer.clone();
        let swipe_moves = self.swipe_moves.clone();
        events.disposer().add(move || {
            hide_timer.cancel();
            tap_timer.cancel();
            swipe_moves.cancel();
        });
    }

    // ===== SIGNALS =====

    pub fn progress(&self) -> ReadSignal<f64> {
        self.progress.read_only()
    }

    pub fn buffer_progress(&self) -> ReadSignal<f64> {
        self.buffer_progress.read_only()
    }

    pub fn is_playing(&self) -> ReadSignal<bool> {
        self.is_playing.read_only()
    }

    pub fn show_controls(&self) -> ReadSignal<bool> {
        self.show_controls.read_only()
    }

    pub fn volume(&self) -> ReadSignal<f64> {
        self.volume.read_only()
    }

    pub fn is_ready(&self) -> ReadSignal<bool> {
        self.is_ready.read_only()
    }

    // ===== MEDIA EVENTS =====

    pub fn handle_media_event(&self, event: &MediaEvent) {
        match event {
            MediaEvent::Play => {
                batch(|| {
                    self.is_playing.set(true);
                    self.update_progress();
                });
                self.restart_hide_timer();
            }
            MediaEvent::Pause => {
                self.hide_timer.cancel();
                batch(|| {
                    self.is_playing.set(false);
                    self.show_controls.set(true);
                    self.update_progress();
                });
            }
            MediaEvent::Ended => {
                self.hide_timer.cancel();
                batch(|| {
                    self.is_playing.set(false);
                    self.show_controls.set(true);
                });
            }
            MediaEvent::TimeUpdate => self.update_progress(),
            MediaEvent::Progress => self.update_buffer(),
            MediaEvent::VolumeChange => {
                let volume = self.media.volume();
                if volume.is_finite() {
                    self.volume.set(clamp(volume, 0.0, 1.0));
                }
            }
            MediaEvent::LoadedMetadata | MediaEvent::CanPlay => {
                batch(|| {
                    self.is_ready.set(true);
                    self.update_progress();
                    self.update_buffer();
                });
            }
            MediaEvent::Emptied => {
                batch(|| {
                    self.is_ready.set(false);
                    self.progress.set(0.0);
                    self.buffer_progress.set(0.0);
                });
            }
            _ => {}
        }
    }

    fn update_progress(&self) {
        if let Some(progress) = playback_progress(self.media.current_time(), self.media.duration())
        {
            self.progress.set(progress);
        }
    }

    fn update_buffer(&self) {
        if let Some(buffered) = buffered_progress(
            &self.media.buffered(),
            self.media.current_time(),
            self.media.duration(),
            self.tuning.buffer_slack,
        ) {
            self.buffer_progress.set(buffered);
        }
    }

    // ===== CONTROL SURFACE =====

    pub fn play(&self) {
        self.media.play();
    }

    pub fn pause(&self) {
        self.media.pause();
    }

    pub fn toggle_play(&self) {
        if self.media.paused() {
            self.media.play();
        } else {
            self.media.pause();
        }
    }

    /// Jump to `seconds`, clamped to the media. No-op without a duration.
    pub fn seek(&self, seconds: f64) {
        let duration = self.media.duration();
        if !duration.is_finite() || duration <= 0.0 || seconds.is_nan() {
            return;
        }
        let time = clamp(seconds, 0.0, duration);
        batch(|| {
            self.media.set_current_time(time);
            self.progress.set(time / duration);
        });
    }

    /// Seek to a fraction of the duration (seek track).
    pub fn seek_progress(&self, progress: f64) {
        let duration = self.media.duration();
        if !duration.is_finite() || progress.is_nan() {
            return;
        }
        self.seek(clamp(progress, 0.0, 1.0) * duration);
    }

    pub fn seek_by(&self, delta_secs: f64) {
        self.seek(self.media.current_time() + delta_secs);
    }

    pub fn set_volume(&self, volume: f64) {
        if volume.is_nan() {
            return;
        }
        let volume = clamp(volume, 0.0, 1.0);
        if volume > 0.0 {
            self.last_audible_volume.set(volume);
        }
        batch(|| {
            self.media.set_volume(volume);
            self.volume.set(volume);
        });
    }

    /// Mute, or restore the volume from before muting.
    pub fn toggle_mute(&self) {
        let current = self.volume.get();
        if current > 0.0 {
            self.last_audible_volume.set(current);
            self.set_volume(0.0);
        } else {
            self.set_volume(self.last_audible_volume.get());
        }
    }

    pub fn toggle_fullscreen(&self) {
        self.fullscreen.toggle();
    }

    /// Back to the start, paused, controls visible.
    pub fn reset(&self) {
        self.hide_timer.cancel();
        self.tap_timer.cancel();
        self.media.pause();
        let ready = self.media.duration().is_finite();
        batch(|| {
            if ready {
                self.media.set_current_time(0.0);
            }
            self.progress.set(0.0);
            self.show_controls.set(true);
        });
    }

    // ===== CONTROL VISIBILITY =====

    fn restart_hide_timer(&self) {
        let timeout = self
            .controls_timeout
            .get()
            .unwrap_or(DEFAULT_CONTROLS_TIMEOUT_MS);
        let show_controls = self.show_controls.clone();
        let is_playing = self.is_playing.read_only();
        self.hide_timer.start(timeout, move || {
            if is_playing.get() {
                log::trace!("hiding controls after {timeout}ms idle");
                show_controls.set(false);
            }
        });
    }

    /// Show the controls. Interactions inside the control bar keep them up
    /// until the pointer leaves it.
    pub fn reveal_controls(&self, within_controls: bool) {
        self.show_controls.set(true);
        if within_controls {
            self.hide_timer.cancel();
        } else {
            self.restart_hide_timer();
        }
    }

    pub fn handle_mouse_move(&self, event: &MouseEvent) {
        self.reveal_controls(event.target.within_controls);
    }

    pub fn handle_mouse_leave(&self) {
        self.hide_timer.cancel();
        if self.is_playing.get() {
            self.show_controls.set(false);
        }
    }

    // ===== KEYBOARD =====

    /// Returns true if the key was handled.
    pub fn handle_key(&self, event: &KeyboardEvent) -> bool {
        if event.state == KeyState::Release
            || event.target.is_form_control
            || !event.modifiers.is_empty()
        {
            return false;
        }
        let global = self.global_key_listener.get().unwrap_or(false);
        if !global && !event.target.within_player {
            return false;
        }

        let seek_secs = self.key_seek_duration.get().unwrap_or(DEFAULT_KEY_SEEK_SECS);
        match event.key.as_str() {
            "ArrowLeft" => {
                self.seek_by(-seek_secs);
                self.reveal_controls(false);
            }
            "ArrowRight" => {
                self.seek_by(seek_secs);
                self.reveal_controls(false);
            }
            "m" | "M" => self.toggle_mute(),
            "f" | "F" => self.toggle_fullscreen(),
            " " | "Space" | "Spacebar" | "k" | "K" => self.toggle_play(),
            _ => return false,
        }
        true
    }

    // ===== CAPTURE SURFACE =====

    pub fn capture_pointer_down(&self, event: &PointerEvent) {
        if !event.is_primary() {
            return;
        }
        // A suppression left over from a swipe whose pointerup came first.
        self.swipe.take_suppressed();
        if self.tap.press(self.scheduler.now_ms()) {
            self.tap_timer.cancel();
        }
    }

    pub fn capture_pointer_up(self: &Rc<Self>, event: &PointerEvent) {
        if !event.is_primary() {
            return;
        }
        if self.swipe.is_swiping() || self.swipe.take_suppressed() {
            self.tap.reset();
            return;
        }

        match self.tap.release(self.scheduler.now_ms()) {
            TapOutcome::SingleTap => {
                let weak = Rc::downgrade(self);
                self.tap_timer.start(self.tuning.double_press_window_ms, move || {
                    if let Some(coordinator) = weak.upgrade() {
                        coordinator.toggle_play();
                    }
                });
            }
            TapOutcome::DoublePress => {
                self.tap_timer.cancel();
                self.toggle_fullscreen();
            }
            TapOutcome::Ignored => {}
        }
    }

    pub fn touch_start(&self, event: &TouchEvent) {
        let Some(touch) = event.first() else {
            return;
        };
        self.reveal_controls(false);
        self.swipe
            .start(self.scheduler.now_ms(), self.media.current_time(), touch);
    }

    pub fn touch_move(&self, event: &TouchEvent) {
        if let Some(touch) = event.first() {
            self.swipe_moves.call(*touch);
        }
    }

    pub fn touch_end(&self, _event: &TouchEvent) {
        self.swipe_moves.flush();
        if self.swipe.end() {
            self.tap.reset();
            self.tap_timer.cancel();
        }
    }

    fn apply_swipe(&self, touch: &Touch) {
        let range_secs = self
            .swipe_control_range
            .get()
            .unwrap_or(DEFAULT_SWIPE_CONTROL_RANGE_MS)
            / 1000.0;
        if let Some(target) = self.swipe.move_to(touch, range_secs, self.media.duration()) {
            self.seek(target);
        }
    }

    pub fn swipe(&self) -> &SwipeGesture {
        &self.swipe
    }

    pub(crate) fn destroy(&self) {
        self.progress.destroy();
        self.buffer_progress.destroy();
        self.is_playing.destroy();
        self.show_controls.destroy();
        self.volume.destroy();
        self.is_ready.destroy();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Modifiers, Rect, TargetInfo};
    use crate::lifecycle::Disposer;
    use crate::props::PlayerProps;
    use crate::sim::{SimHost, SimMedia};

    struct Fixture {
        sim: SimHost,
        media: Rc<SimMedia>,
        coordinator: Rc<PlaybackCoordinator>,
        disposer: Rc<Disposer>,
    }

    impl Fixture {
        fn new(props: PlayerProps, duration: f64) -> Self {
            let sim = SimHost::new();
            let media = Rc::new(SimMedia::new(duration));
            let disposer = Disposer::new();
            let events =
                GlobalEvents::new(sim.window.clone(), sim.document.clone(), disposer.clone());
            let fullscreen = FullscreenController::new(sim.fullscreen.clone());
            fullscreen.attach(&events);
            let signals = PlayerSignals::from_props(props);
            let coordinator = PlaybackCoordinator::new(
                media.clone(),
                sim.scheduler.clone(),
                Some(sim.storage.clone()),
                fullscreen,
                &signals,
                Tuning::default(),
            );
            coordinator.attach(&events);
            Self {
                sim,
                media,
                coordinator,
                disposer,
            }
        }

        fn pump(&self) {
            for event in self.media.take_events() {
                self.coordinator.handle_media_event(&event);
            }
        }

        fn advance(&self, ms: u64) {
            self.sim.scheduler.advance(ms);
            self.pump();
        }
    }

    #[test]
    fn test_progress_helpers() {
        assert_eq!(playback_progress(5.0, 10.0), Some(0.5));
        assert_eq!(playback_progress(15.0, 10.0), Some(1.0));
        assert_eq!(playback_progress(5.0, f64::NAN), None);
        assert_eq!(playback_progress(5.0, 0.0), None);
    }

    #[test]
    fn test_buffer_slack_matching() {
        let ranges = [TimeRange::new(0.0, 10.0)];
        assert_eq!(buffered_progress(&ranges, 9.5, 20.0, 16.0), Some(0.5));
        assert_eq!(buffered_progress(&ranges, 11.0, 20.0, 16.0), Some(0.0));
        assert_eq!(buffered_progress(&[], 1.0, 20.0, 16.0), None);
        assert_eq!(buffered_progress(&ranges, 1.0, f64::NAN, 16.0), None);

        // Slack lets the playhead sit before a range start.
        let ahead = [TimeRange::new(20.0, 30.0)];
        assert_eq!(buffered_progress(&ahead, 5.0, 60.0, 16.0), Some(0.5));
    }

    #[test]
    fn test_parse_stored_volume() {
        assert_eq!(parse_stored_volume(Some("0.4")), 0.4);
        assert_eq!(parse_stored_volume(Some("loud")), 1.0);
        assert_eq!(parse_stored_volume(None), 1.0);
        assert_eq!(parse_stored_volume(Some("3")), 1.0);
    }

    #[test]
    fn test_nan_duration_keeps_progress() {
        let fx = Fixture::new(PlayerProps::default(), f64::NAN);
        fx.coordinator.handle_media_event(&MediaEvent::TimeUpdate);
        assert_eq!(fx.coordinator.progress().get(), 0.0);

        fx.coordinator.seek(10.0);
        assert_eq!(fx.media.current_time(), 0.0);
    }

    #[test]
    fn test_play_then_controls_hide() {
        let fx = Fixture::new(PlayerProps::default(), 100.0);
        fx.coordinator.play();
        fx.pump();
        assert!(fx.coordinator.is_playing().get());
        assert!(fx.coordinator.show_controls().get());

        fx.advance(999);
        assert!(fx.coordinator.show_controls().get());
        fx.advance(1);
        assert!(!fx.coordinator.show_controls().get());
    }

    #[test]
    fn test_mouse_move_inside_controls_keeps_them_up() {
        let fx = Fixture::new(PlayerProps::default(), 100.0);
        fx.coordinator.play();
        fx.pump();

        fx.coordinator
            .handle_mouse_move(&MouseEvent::at(10.0).with_target(TargetInfo::controls()));
        fx.advance(5000);
        assert!(fx.coordinator.show_controls().get());

        fx.coordinator.handle_mouse_move(&MouseEvent::at(10.0));
        fx.advance(1000);
        assert!(!fx.coordinator.show_controls().get());
    }

    #[test]
    fn test_pause_shows_controls() {
        let fx = Fixture::new(PlayerProps::default(), 100.0);
        fx.coordinator.play();
        fx.advance(2000);
        assert!(!fx.coordinator.show_controls().get());

        fx.coordinator.pause();
        fx.pump();
        assert!(fx.coordinator.show_controls().get());
        assert!(!fx.coordinator.is_playing().get());
    }

    #[test]
    fn test_seek_is_one_batch() {
        let fx = Fixture::new(PlayerProps::default(), 100.0);
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let log = seen.clone();
        let media = fx.media.clone();
        let _sub = fx
            .coordinator
            .progress()
            .subscribe(move |p| log.borrow_mut().push((*p, media.current_time())));

        fx.coordinator.seek(150.0);
        assert_eq!(*seen.borrow(), vec![(1.0, 100.0)]);
    }

    #[test]
    fn test_arrow_keys_seek() {
        let fx = Fixture::new(
            PlayerProps {
                key_seek_duration: Some(10.0).into(),
                ..Default::default()
            },
            100.0,
        );
        fx.sim.key(KeyboardEvent::new("ArrowRight"));
        assert_eq!(fx.media.current_time(), 10.0);
        fx.sim.key(KeyboardEvent::new("ArrowLeft"));
        fx.sim.key(KeyboardEvent::new("ArrowLeft"));
        assert_eq!(fx.media.current_time(), 0.0);
    }

    #[test]
    fn test_keys_ignored_for_form_controls_modifiers_and_outside() {
        let fx = Fixture::new(PlayerProps::default(), 100.0);
        fx.sim
            .key(KeyboardEvent::new("k").with_target(TargetInfo::form_control()));
        fx.sim
            .key(KeyboardEvent::with_modifiers("k", Modifiers::CTRL));
        fx.sim
            .key(KeyboardEvent::new("k").with_target(TargetInfo::outside()));
        assert!(fx.media.paused());

        fx.sim.key(KeyboardEvent::new(" "));
        assert!(!fx.media.paused());
    }

    #[test]
    fn test_global_key_listener_accepts_outside_targets() {
        let fx = Fixture::new(
            PlayerProps {
                global_key_listener: Some(true).into(),
                ..Default::default()
            },
            100.0,
        );
        fx.sim
            .key(KeyboardEvent::new("k").with_target(TargetInfo::outside()));
        assert!(!fx.media.paused());
    }

    #[test]
    fn test_toggle_mute_restores_volume() {
        let fx = Fixture::new(PlayerProps::default(), 100.0);
        fx.coordinator.set_volume(0.6);
        fx.coordinator.toggle_mute();
        assert_eq!(fx.coordinator.volume().get(), 0.0);
        fx.coordinator.toggle_mute();
        assert_eq!(fx.coordinator.volume().get(), 0.6);
        assert_eq!(fx.media.volume(), 0.6);
    }

    #[test]
    fn test_volume_change_event_syncs_signal() {
        let fx = Fixture::new(PlayerProps::default(), 100.0);
        fx.media.set_volume(0.25);
        fx.pump();
        assert_eq!(fx.coordinator.volume().get(), 0.25);
    }

    #[test]
    fn test_single_tap_is_deferred() {
        let fx = Fixture::new(PlayerProps::default(), 100.0);
        fx.coordinator.capture_pointer_down(&PointerEvent::mouse(10.0));
        fx.sim.scheduler.advance(50);
        fx.coordinator.capture_pointer_up(&PointerEvent::mouse(10.0));
        assert!(fx.media.paused());

        fx.advance(200);
        assert!(!fx.media.paused());
    }

    #[test]
    fn test_double_press_toggles_fullscreen_only() {
        let fx = Fixture::new(PlayerProps::default(), 100.0);
        let surface = PointerEvent::mouse(10.0);

        fx.coordinator.capture_pointer_down(&surface);
        fx.sim.scheduler.advance(40);
        fx.coordinator.capture_pointer_up(&surface);
        fx.sim.scheduler.advance(60);
        fx.coordinator.capture_pointer_down(&surface);
        fx.sim.scheduler.advance(40);
        fx.coordinator.capture_pointer_up(&surface);

        fx.advance(500);
        assert!(fx.media.paused());
        assert_eq!(fx.sim.fullscreen.requests(), 1);
    }

    #[test]
    fn test_held_second_press_cancels_pending_tap() {
        let fx = Fixture::new(PlayerProps::default(), 100.0);
        let surface = PointerEvent::mouse(10.0);

        fx.coordinator.capture_pointer_down(&surface);
        fx.sim.scheduler.advance(50);
        fx.coordinator.capture_pointer_up(&surface);
        fx.sim.scheduler.advance(100);
        fx.coordinator.capture_pointer_down(&surface);
        // Held past the first tap's deadline.
        fx.advance(150);
        assert!(fx.media.paused());
        fx.coordinator.capture_pointer_up(&surface);

        fx.advance(500);
        assert!(fx.media.paused());
        assert_eq!(fx.sim.fullscreen.requests(), 1);
    }

    #[test]
    fn test_click_after_swipe_still_toggles() {
        let fx = Fixture::new(PlayerProps::default(), 100.0);
        let surface = Rect::new(0.0, 0.0, 200.0, 100.0);

        fx.coordinator.capture_pointer_down(&PointerEvent::touch(20.0));
        fx.coordinator
            .touch_start(&TouchEvent::single(Touch::new(20.0, surface)));
        fx.coordinator
            .touch_move(&TouchEvent::single(Touch::new(120.0, surface)));
        fx.coordinator.capture_pointer_up(&PointerEvent::touch(120.0));
        fx.coordinator.touch_end(&TouchEvent::ended());
        fx.advance(500);
        assert!(fx.media.paused());

        fx.coordinator.capture_pointer_down(&PointerEvent::mouse(50.0));
        fx.sim.scheduler.advance(50);
        fx.coordinator.capture_pointer_up(&PointerEvent::mouse(50.0));
        fx.advance(300);
        assert!(!fx.media.paused());
    }

    #[test]
    fn test_swipe_seeks_and_suppresses_tap() {
        let fx = Fixture::new(PlayerProps::default(), 100.0);
        fx.coordinator.seek(50.0);
        let surface = Rect::new(0.0, 0.0, 520.0, 300.0);

        fx.coordinator
            .touch_start(&TouchEvent::single(Touch::new(0.0, surface)));
        fx.coordinator.capture_pointer_down(&PointerEvent::touch(0.0));
        fx.coordinator
            .touch_move(&TouchEvent::single(Touch::new(250.0, surface)));
        fx.coordinator
            .touch_move(&TouchEvent::single(Touch::new(500.0, surface)));
        fx.coordinator.capture_pointer_up(&PointerEvent::touch(500.0));
        fx.coordinator.touch_end(&TouchEvent::ended());

        // Trailing move flushed at touchend: full travel, clamped to duration.
        assert_eq!(fx.media.current_time(), 100.0);
        fx.advance(500);
        assert!(fx.media.paused());
    }

    #[test]
    fn test_volume_persists_when_enabled() {
        let fx = Fixture::new(
            PlayerProps {
                persistent_volume: Some(true).into(),
                ..Default::default()
            },
            100.0,
        );
        fx.coordinator.set_volume(0.4);
        assert_eq!(
            fx.sim.storage.get_item(VOLUME_STORAGE_KEY).as_deref(),
            Some("0.4")
        );
    }

    #[test]
    fn test_dispose_cancels_timers() {
        let fx = Fixture::new(PlayerProps::default(), 100.0);
        fx.coordinator.play();
        fx.pump();
        assert!(fx.sim.scheduler.pending_timers() > 0);

        fx.disposer.dispose();
        assert_eq!(fx.sim.scheduler.pending_timers(), 0);
        assert_eq!(fx.sim.window.total_listeners(), 0);
    }
}
