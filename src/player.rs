//! Player Module - Construction, control surface and disposal
//!
//! [`Player::new`] signalizes the props, builds every coordinator against one
//! shared [`Disposer`], registers the global listeners and returns the
//! control surface. [`Player::dispose`] (also run on drop) tears all of it
//! down: native listeners, timers, throttles, signals.
//!
//! # Example
//!
//! ```ignore
//! let player = Player::new(
//!     PlayerProps {
//!         sources: Some(Source::Url("movie.mp4".into())).into(),
//!         persistent_volume: Some(true).into(),
//!         ..Default::default()
//!     }
//!     .listen("ended", |_| log::info!("done")),
//!     media,
//!     host,
//! )?;
//!
//! // The host forwards native media events
//! player.handle_media_event(&MediaEvent::TimeUpdate);
//!
//! player.seek(30.0);
//! player.toggle_fullscreen();
//! player.dispose();
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Result;
use crate::events::{MediaEvent, Rect};
use crate::fullscreen::FullscreenController;
use crate::gesture::SliderGesture;
use crate::host::{Host, MediaElement};
use crate::lifecycle::{Disposer, GlobalEvents};
use crate::playback::PlaybackCoordinator;
use crate::preview::PreviewCoordinator;
use crate::props::{MediaListener, PlayerProps, PlayerSignals};
use crate::signals::{ReadSignal, Subscription};
use crate::subtitles::SubtitleController;
use crate::view::ControlsView;

// =============================================================================
// MEDIA LISTENERS
// =============================================================================

struct ListenerEntry {
    id: u64,
    event: String,
    listener: MediaListener,
    once: bool,
}

/// Prop listeners plus everything added through `on`/`once`.
#[derive(Default)]
struct MediaListeners {
    from_props: HashMap<String, Vec<MediaListener>>,
    entries: RefCell<Vec<ListenerEntry>>,
    next_id: Cell<u64>,
}

impl MediaListeners {
    fn add(self: &Rc<Self>, event: &str, listener: MediaListener, once: bool) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push(ListenerEntry {
            id,
            event: event.to_string(),
            listener,
            once,
        });

        let registry = Rc::downgrade(self);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.entries.borrow_mut().retain(|e| e.id != id);
            }
        })
    }

    fn emit(&self, event: &MediaEvent) {
        let name = event.name();
        let mut due: Vec<MediaListener> = self
            .from_props
            .get(name)
            .map(|l| l.to_vec())
            .unwrap_or_default();
        {
            // Once-listeners leave before anything runs so a reentrant emit
            // cannot fire them twice.
            let mut entries = self.entries.borrow_mut();
            due.extend(
                entries
                    .iter()
                    .filter(|e| e.event == name)
                    .map(|e| e.listener.clone()),
            );
            entries.retain(|e| !(e.once && e.event == name));
        }
        for listener in due {
            listener(event);
        }
    }

    fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

// =============================================================================
// PLAYER
// =============================================================================

pub struct Player {
    media: Rc<dyn MediaElement>,
    props: PlayerSignals,
    disposer: Rc<Disposer>,
    events: GlobalEvents,
    fullscreen: Rc<FullscreenController>,
    playback: Rc<PlaybackCoordinator>,
    subtitles: Rc<SubtitleController>,
    preview: Rc<PreviewCoordinator>,
    track_bounds: Rc<Cell<Rect>>,
    volume_bounds: Rc<Cell<Rect>>,
    seek_track: SliderGesture,
    volume_slider: SliderGesture,
    view: ControlsView,
    listeners: Rc<MediaListeners>,
    disposed: Cell<bool>,
}

impl Player {
    /// Build a player around a host-owned media element.
    ///
    /// Fails only if the props do not validate.
    pub fn new(mut props: PlayerProps, media: Rc<dyn MediaElement>, host: Host) -> Result<Self> {
        props.validate()?;

        let tuning = props.tuning.clone();
        let from_props = std::mem::take(&mut props.listeners);
        let props = PlayerSignals::from_props(props);

        let disposer = Disposer::new();
        let events = GlobalEvents::new(host.window.clone(), host.document.clone(), disposer.clone());

        let fullscreen = FullscreenController::new(host.fullscreen.clone());
        fullscreen.attach(&events);

        let playback = PlaybackCoordinator::new(
            media.clone(),
            host.scheduler.clone(),
            host.storage.clone(),
            fullscreen.clone(),
            &props,
            tuning.clone(),
        );
        playback.attach(&events);

        let subtitles = SubtitleController::new(media.clone(), host.scheduler.clone(), &tuning);
        subtitles.attach(&playback.show_controls(), &disposer);

        let preview = PreviewCoordinator::new(
            host.environment.clone(),
            host.scheduler.clone(),
            media.clone(),
            &props,
            &tuning,
        );
        preview.attach(&disposer);

        let track_bounds = Rc::new(Cell::new(Rect::default()));
        let seek_track = {
            let bounds = track_bounds.clone();
            let progress = playback.progress();
            let target = Rc::downgrade(&playback);
            SliderGesture::new(
                tuning.slider_step,
                move || bounds.get(),
                move || progress.get(),
                move |value| {
                    if let Some(playback) = target.upgrade() {
                        playback.seek_progress(value);
                    }
                },
            )
        };
        seek_track.attach(&events);

        let volume_bounds = Rc::new(Cell::new(Rect::default()));
        let volume_slider = {
            let bounds = volume_bounds.clone();
            let volume = playback.volume();
            let target = Rc::downgrade(&playback);
            SliderGesture::new(
                tuning.slider_step,
                move || bounds.get(),
                move || volume.get(),
                move |value| {
                    if let Some(playback) = target.upgrade() {
                        playback.set_volume(value);
                    }
                },
            )
        };
        volume_slider.attach(&events);

        let view = ControlsView::new(&playback, &fullscreen.is_fullscreen(), media.clone(), &props);

        let player = Self {
            media,
            props,
            disposer,
            events,
            fullscreen,
            playback,
            subtitles,
            preview,
            track_bounds,
            volume_bounds,
            seek_track,
            volume_slider,
            view,
            listeners: Rc::new(MediaListeners {
                from_props,
                ..Default::default()
            }),
            disposed: Cell::new(false),
        };
        player.select_default_subtitle();
        Ok(player)
    }

    fn select_default_subtitle(&self) {
        let preferred = self.props.subtitles.with(|tracks| {
            tracks
                .as_ref()
                .and_then(|t| t.iter().find(|t| t.default))
                .map(|t| t.id.clone())
        });
        if let Some(id) = preferred
            && self.subtitles.active_track().get().is_none()
        {
            self.subtitles.select(&id);
        }
    }

    // ===== MEDIA EVENTS =====

    /// Entry point for every native event of the media element.
    pub fn handle_media_event(&self, event: &MediaEvent) {
        if self.disposed.get() {
            return;
        }
        self.playback.handle_media_event(event);
        self.listeners.emit(event);
    }

    /// Listen for a media event until the subscription is revoked or the
    /// player is disposed.
    pub fn on(&self, event: &str, listener: impl Fn(&MediaEvent) + 'static) -> Subscription {
        if self.disposed.get() {
            return Subscription::inert();
        }
        self.listeners.add(event, Rc::new(listener), false)
    }

    /// Listen for the next occurrence of a media event only.
    pub fn once(&self, event: &str, listener: impl Fn(&MediaEvent) + 'static) -> Subscription {
        if self.disposed.get() {
            return Subscription::inert();
        }
        self.listeners.add(event, Rc::new(listener), true)
    }

    /// Listeners added through `on`/`once` that are still registered.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // ===== CONTROL SURFACE =====

    pub fn play(&self) {
        self.playback.play();
    }

    pub fn pause(&self) {
        self.playback.pause();
    }

    pub fn toggle_play(&self) {
        self.playback.toggle_play();
    }

    pub fn seek(&self, seconds: f64) {
        self.playback.seek(seconds);
    }

    pub fn set_volume(&self, volume: f64) {
        self.playback.set_volume(volume);
    }

    pub fn toggle_mute(&self) {
        self.playback.toggle_mute();
    }

    pub fn toggle_fullscreen(&self) {
        self.playback.toggle_fullscreen();
    }

    pub fn reset(&self) {
        self.playback.reset();
    }

    pub fn select_subtitle(&self, id: &str) -> bool {
        self.subtitles.select(id)
    }

    pub fn disable_subtitles(&self) {
        self.subtitles.disable();
    }

    /// The media element the player drives.
    pub fn video(&self) -> &Rc<dyn MediaElement> {
        &self.media
    }

    pub fn is_ready(&self) -> bool {
        self.playback.is_ready().get()
    }

    // ===== TRACK & SLIDER GEOMETRY =====

    /// Client rect of the seek track, as laid out by the rendering layer.
    pub fn set_track_bounds(&self, rect: Rect) {
        self.track_bounds.set(rect);
    }

    pub fn set_volume_bounds(&self, rect: Rect) {
        self.volume_bounds.set(rect);
    }

    /// Pointer hovering the seek track.
    pub fn hover_track(&self, client_x: f64) {
        self.preview.hover(client_x, self.track_bounds.get());
    }

    pub fn leave_track(&self) {
        self.preview.leave();
    }

    // ===== STATE =====

    pub fn progress(&self) -> ReadSignal<f64> {
        self.playback.progress()
    }

    pub fn buffer_progress(&self) -> ReadSignal<f64> {
        self.playback.buffer_progress()
    }

    pub fn is_playing(&self) -> ReadSignal<bool> {
        self.playback.is_playing()
    }

    pub fn show_controls(&self) -> ReadSignal<bool> {
        self.playback.show_controls()
    }

    pub fn volume(&self) -> ReadSignal<f64> {
        self.playback.volume()
    }

    pub fn is_fullscreen(&self) -> ReadSignal<bool> {
        self.fullscreen.is_fullscreen()
    }

    pub fn active_track(&self) -> ReadSignal<Option<String>> {
        self.subtitles.active_track()
    }

    // ===== COMPONENTS =====

    pub fn props(&self) -> &PlayerSignals {
        &self.props
    }

    pub fn playback(&self) -> &Rc<PlaybackCoordinator> {
        &self.playback
    }

    pub fn fullscreen(&self) -> &Rc<FullscreenController> {
        &self.fullscreen
    }

    pub fn subtitles(&self) -> &Rc<SubtitleController> {
        &self.subtitles
    }

    pub fn preview(&self) -> &Rc<PreviewCoordinator> {
        &self.preview
    }

    pub fn seek_track(&self) -> &SliderGesture {
        &self.seek_track
    }

    pub fn volume_slider(&self) -> &SliderGesture {
        &self.volume_slider
    }

    pub fn view(&self) -> &ControlsView {
        &self.view
    }

    pub fn events(&self) -> &GlobalEvents {
        &self.events
    }

    // ===== DISPOSAL =====

    /// Tear everything down. Later calls do nothing.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.disposer.dispose();
        self.listeners.clear();
        self.view.destroy();
        self.preview.destroy();
        self.subtitles.destroy();
        self.playback.destroy();
        self.fullscreen.destroy();
        self.props.destroy_owned();
        log::debug!("player disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::PointerEvent;
    use crate::props::SubtitleTrack;
    use crate::signals::signal;
    use crate::sim::{SimCue, SimHost, SimMedia, SimTrack};

    fn player_with(props: PlayerProps) -> (SimHost, Rc<SimMedia>, Player) {
        let sim = SimHost::new();
        let media = Rc::new(SimMedia::new(100.0));
        let player = Player::new(props, media.clone(), sim.host()).unwrap();
        (sim, media, player)
    }

    #[test]
    fn test_new_rejects_invalid_props() {
        let sim = SimHost::new();
        let media = Rc::new(SimMedia::new(100.0));
        let props = PlayerProps {
            swipe_control_range: Some(f64::NAN).into(),
            ..Default::default()
        };
        assert!(Player::new(props, media, sim.host()).is_err());
    }

    #[test]
    fn test_prop_listeners_receive_media_events() {
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let props = PlayerProps::default().listen("play", move |_| seen.set(seen.get() + 1));
        let (sim, media, player) = player_with(props);

        player.play();
        sim.pump(&player, &media);
        assert_eq!(count.get(), 1);
        assert!(player.is_playing().get());
    }

    #[test]
    fn test_once_fires_a_single_time() {
        let (sim, media, player) = player_with(PlayerProps::default());
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let _sub = player.once("pause", move |_| seen.set(seen.get() + 1));

        for _ in 0..2 {
            player.play();
            player.pause();
            sim.pump(&player, &media);
        }
        assert_eq!(count.get(), 1);
        assert_eq!(player.listener_count(), 0);
    }

    #[test]
    fn test_on_subscription_revokes() {
        let (_sim, _media, player) = player_with(PlayerProps::default());
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let sub = player.on("timeupdate", move |_| seen.set(seen.get() + 1));

        player.handle_media_event(&MediaEvent::TimeUpdate);
        sub.unsubscribe();
        player.handle_media_event(&MediaEvent::TimeUpdate);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_seek_track_drag_seeks() {
        let (sim, _media, player) = player_with(PlayerProps::default());
        player.set_track_bounds(Rect::new(0.0, 0.0, 200.0, 10.0));

        assert!(player.seek_track().pointer_down(&PointerEvent::mouse(50.0)));
        assert_eq!(player.video().current_time(), 25.0);

        sim.pointer_move(PointerEvent::mouse(100.0));
        assert_eq!(player.progress().get(), 0.5);

        sim.pointer_up(PointerEvent::mouse(100.0));
        sim.pointer_move(PointerEvent::mouse(150.0));
        assert_eq!(player.progress().get(), 0.5);
    }

    #[test]
    fn test_volume_slider_sets_volume() {
        let (_sim, _media, player) = player_with(PlayerProps::default());
        player.set_volume_bounds(Rect::new(10.0, 0.0, 100.0, 4.0));
        player.volume_slider().pointer_down(&PointerEvent::mouse(40.0));
        assert!((player.volume().get() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_default_subtitle_is_selected() {
        let sim = SimHost::new();
        let media = Rc::new(SimMedia::new(100.0));
        media.add_track(Rc::new(SimTrack::new("en", vec![Rc::new(SimCue::new("Hi"))])));
        media.add_track(Rc::new(SimTrack::new("de", vec![])));
        let props = PlayerProps {
            subtitles: Some(vec![
                SubtitleTrack {
                    id: "en".into(),
                    src: "en.vtt".into(),
                    srclang: "en".into(),
                    label: "English".into(),
                    default: false,
                },
                SubtitleTrack {
                    id: "de".into(),
                    src: "de.vtt".into(),
                    srclang: "de".into(),
                    label: "Deutsch".into(),
                    default: true,
                },
            ])
            .into(),
            ..Default::default()
        };
        let player = Player::new(props, media, sim.host()).unwrap();
        assert_eq!(player.active_track().get().as_deref(), Some("de"));
    }

    #[test]
    fn test_dispose_is_idempotent_and_keeps_app_signals() {
        let timeout = signal(Some(300u64));
        let (sim, _media, player) = player_with(PlayerProps {
            controls_timeout: timeout.clone().into(),
            ..Default::default()
        });
        assert!(sim.window.total_listeners() > 0);

        player.dispose();
        player.dispose();
        assert_eq!(sim.window.total_listeners(), 0);
        assert_eq!(sim.document.total_listeners(), 0);
        assert!(player.progress().is_destroyed());
        assert!(player.props().width.is_destroyed());
        assert!(!timeout.is_destroyed());
        assert_eq!(timeout.listener_count(), 0);
    }

    #[test]
    fn test_events_after_dispose_are_ignored() {
        let (_sim, _media, player) = player_with(PlayerProps::default());
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let _sub = player.on("play", move |_| seen.set(seen.get() + 1));
        player.dispose();

        player.handle_media_event(&MediaEvent::Play);
        assert_eq!(count.get(), 0);
        assert!(!player.on("play", |_| {}).is_active());
    }
}
