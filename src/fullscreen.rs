//! Fullscreen Module - One `is_fullscreen` signal over the host fullscreen API
//!
//! The document announces fullscreen changes under several vendor names.
//! All of them route to a single handler that asks the host whether any
//! fullscreen element is set, so the signal tracks changes made outside the
//! player too (Esc key, another element going fullscreen).
//!
//! Requests are asynchronous. A refused request is logged and changes
//! nothing: the signal only ever follows the document.

use std::rc::{Rc, Weak};

use crate::host::FullscreenHost;
use crate::lifecycle::{GlobalEvents, Scope};
use crate::signals::{signal, ReadSignal, Signal};

/// Document events signalling a fullscreen change.
pub const FULLSCREEN_CHANGE_EVENTS: [&str; 4] = [
    "fullscreenchange",
    "webkitfullscreenchange",
    "mozfullscreenchange",
    "MSFullscreenChange",
];

pub struct FullscreenController {
    host: Rc<dyn FullscreenHost>,
    is_fullscreen: Signal<bool>,
}

impl FullscreenController {
    pub fn new(host: Rc<dyn FullscreenHost>) -> Rc<Self> {
        let initial = host.has_fullscreen_element();
        Rc::new(Self {
            host,
            is_fullscreen: signal(initial),
        })
    }

    pub fn attach(self: &Rc<Self>, events: &GlobalEvents) {
        for name in FULLSCREEN_CHANGE_EVENTS {
            let weak: Weak<Self> = Rc::downgrade(self);
            events.on(Scope::Document, name, move |_| {
                if let Some(controller) = weak.upgrade() {
                    controller.sync();
                }
            });
        }
    }

    /// Re-read the document state.
    pub fn sync(&self) {
        self.is_fullscreen.set(self.host.has_fullscreen_element());
    }

    pub fn is_fullscreen(&self) -> ReadSignal<bool> {
        self.is_fullscreen.read_only()
    }

    pub fn request(&self) {
        self.host.request_fullscreen(Box::new(|result| {
            if let Err(err) = result {
                log::warn!("Fullscreen request was denied: {err}");
            }
        }));
    }

    pub fn exit(&self) {
        self.host.exit_fullscreen(Box::new(|result| {
            if let Err(err) = result {
                log::warn!("Leaving fullscreen failed: {err}");
            }
        }));
    }

    pub fn toggle(&self) {
        if self.is_fullscreen.get() {
            self.exit();
        } else {
            self.request();
        }
    }

    pub(crate) fn destroy(&self) {
        self.is_fullscreen.destroy();
    }
}
