//! Preview Module - Hover thumbnail above the seek track
//!
//! Hovering the seek track shows a muted secondary video seeked to the time
//! under the pointer, plus a time label. The element is created on first
//! hover and thrown away whenever the preview URL or size changes, so the
//! next hover builds a fresh one. Seeking the secondary element is costly,
//! so it runs through a throttle and is skipped for negligible changes.
//!
//! Touch-primary devices and players without a preview URL never show one.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::{Tuning, DEFAULT_PREVIEW_UPDATE_THROTTLE_MS};
use crate::events::Rect;
use crate::gesture::value_at;
use crate::host::{Environment, MediaElement, PreviewElement, PreviewSpec, Scheduler};
use crate::lifecycle::Disposer;
use crate::math::{clamp, format_time};
use crate::props::PlayerSignals;
use crate::signals::{signal, ReadSignal, Signal};
use crate::timing::Throttle;

/// Left offset of the preview relative to the track, centered on the
/// pointer and kept inside the viewport.
pub fn preview_left(client_x: f64, track: &Rect, preview_width: f64, viewport_width: f64) -> f64 {
    let left = client_x - track.left - preview_width / 2.0;
    clamp(
        left,
        -track.left,
        viewport_width - preview_width - track.left,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Hover {
    client_x: f64,
    track: Rect,
}

pub struct PreviewCoordinator {
    environment: Rc<dyn Environment>,
    scheduler: Rc<dyn Scheduler>,
    media: Rc<dyn MediaElement>,
    url: ReadSignal<Option<String>>,
    width: ReadSignal<Option<u32>>,
    height: ReadSignal<Option<u32>>,
    throttle_ms: ReadSignal<Option<u64>>,
    step: f64,
    seek_threshold: f64,
    element: RefCell<Option<Rc<dyn PreviewElement>>>,
    throttle: RefCell<Option<Throttle<Hover>>>,
    time_label: Signal<String>,
    left: Signal<f64>,
    visible: Signal<bool>,
    this: Weak<PreviewCoordinator>,
}

impl PreviewCoordinator {
    pub fn new(
        environment: Rc<dyn Environment>,
        scheduler: Rc<dyn Scheduler>,
        media: Rc<dyn MediaElement>,
        props: &PlayerSignals,
        tuning: &Tuning,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            environment,
            scheduler,
            media,
            url: props.preview.clone(),
            width: props.preview_width.clone(),
            height: props.preview_height.clone(),
            throttle_ms: props.preview_update_throttle.clone(),
            step: tuning.slider_step,
            seek_threshold: tuning.preview_seek_threshold,
            element: RefCell::new(None),
            throttle: RefCell::new(None),
            time_label: signal(String::new()),
            left: signal(0.0),
            visible: signal(false),
            this: this.clone(),
        })
    }

    /// Rebuild on prop changes; tear everything down on dispose.
    pub fn attach(self: &Rc<Self>, disposer: &Disposer) {
        let discard = |this: &Rc<Self>| {
            let weak = Rc::downgrade(this);
            move || {
                if let Some(preview) = weak.upgrade() {
                    preview.discard_element();
                }
            }
        };

        let on_url = discard(self);
        disposer.add(self.url.subscribe(move |_| on_url()).into_cleanup());
        let on_width = discard(self);
        disposer.add(self.width.subscribe(move |_| on_width()).into_cleanup());
        let on_height = discard(self);
        disposer.add(self.height.subscribe(move |_| on_height()).into_cleanup());

        let weak = Rc::downgrade(self);
        let sub = self.throttle_ms.subscribe(move |_| {
            if let Some(preview) = weak.upgrade()
                && let Some(old) = preview.throttle.borrow_mut().take()
            {
                old.cancel();
            }
        });
        disposer.add(sub.into_cleanup());

        let weak = Rc::downgrade(self);
        disposer.add(move || {
            if let Some(preview) = weak.upgrade() {
                if let Some(throttle) = preview.throttle.borrow_mut().take() {
                    throttle.cancel();
                }
                preview.discard_element();
            }
        });
    }

    pub fn is_enabled(&self) -> bool {
        !self.environment.is_touch_primary()
            && self.url.with(|url| url.as_deref().is_some_and(|u| !u.is_empty()))
    }

    /// Pointer moving over the track.
    pub fn hover(&self, client_x: f64, track: Rect) {
        if !self.is_enabled() {
            return;
        }
        let Some(element) = self.ensure_element() else {
            return;
        };

        let left = preview_left(
            client_x,
            &track,
            element.width(),
            self.environment.viewport_width(),
        );
        element.set_left(left);
        element.set_visible(true);
        self.left.set(left);
        self.visible.set(true);

        self.ensure_throttle().call(Hover { client_x, track });
    }

    /// Pointer left the track.
    pub fn leave(&self) {
        if let Some(throttle) = self.throttle.borrow().as_ref() {
            throttle.cancel();
        }
        if let Some(element) = self.element.borrow().as_ref() {
            element.set_visible(false);
        }
        self.visible.set(false);
    }

    fn apply(&self, hover: Hover) {
        let duration = self.media.duration();
        let element = self.element.borrow().clone();
        let Some(element) = element else {
            return;
        };

        let time = value_at(&hover.track, hover.client_x, 0.0, self.step) * duration;
        if !time.is_finite() {
            return;
        }
        if (time - element.current_time()).abs() > self.seek_threshold {
            element.set_current_time(time);
        }
        self.time_label.set(format_time(time));
    }

    fn ensure_element(&self) -> Option<Rc<dyn PreviewElement>> {
        if let Some(element) = self.element.borrow().as_ref() {
            return Some(element.clone());
        }
        let src = self.url.get()?;
        let spec = PreviewSpec {
            src,
            width: self.width.get(),
            height: self.height.get(),
        };
        log::debug!("creating preview element for {}", spec.src);
        let element = self.environment.create_preview(&spec);
        *self.element.borrow_mut() = Some(element.clone());
        Some(element)
    }

    fn ensure_throttle(&self) -> Throttle<Hover> {
        if let Some(throttle) = self.throttle.borrow().as_ref() {
            return throttle.clone();
        }
        let wait = self
            .throttle_ms
            .get()
            .unwrap_or(DEFAULT_PREVIEW_UPDATE_THROTTLE_MS);
        let weak = self.this.clone();
        let throttle = Throttle::new(self.scheduler.clone(), wait, move |hover| {
            if let Some(preview) = weak.upgrade() {
                preview.apply(hover);
            }
        });
        *self.throttle.borrow_mut() = Some(throttle.clone());
        throttle
    }

    fn discard_element(&self) {
        let element = self.element.borrow_mut().take();
        if let Some(element) = element
            && let Err(err) = element.remove()
        {
            log::debug!("preview cleanup failed: {err}");
        }
        self.visible.set(false);
    }

    // ===== VIEW =====

    /// `mm:ss` under the pointer.
    pub fn time_label(&self) -> ReadSignal<String> {
        self.time_label.read_only()
    }

    /// Offset of the preview (and its label) relative to the track.
    pub fn left(&self) -> ReadSignal<f64> {
        self.left.read_only()
    }

    pub fn is_visible(&self) -> ReadSignal<bool> {
        self.visible.read_only()
    }

    pub fn has_element(&self) -> bool {
        self.element.borrow().is_some()
    }

    pub(crate) fn destroy(&self) {
        self.time_label.destroy();
        self.left.destroy();
        self.visible.destroy();
    }
}
