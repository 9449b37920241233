//! Element Module - Embeddable-tag adapter
//!
//! Exposes a player through the capability set a custom element needs:
//! typed properties, attribute changes, connect and disconnect. The adapter
//! owns one signal per prop, so values set before `connect` (or between a
//! `disconnect` and the next `connect`) reach the player, and later changes
//! flow into the running player reactively.
//!
//! # Attributes
//!
//! Observed attributes are the prop names in kebab-case (`controls-timeout`,
//! `persistent-volume`, ...). Boolean attributes are true when present.
//! Sources and subtitles can also be spelled out one attribute at a time:
//!
//! ```text
//! source-1="hd.mp4"  source-1-type="video/mp4"  source-1-label="1080p"
//! sub-en="en.vtt"    sub-en-label="English"     sub-en-lang="en"
//! sub-default="en"
//! ```
//!
//! Records are keyed by the part after the prefix, sorted by that key
//! (numerically when both keys are numbers) and only handed to the player
//! once every field of a record is present.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::config::Tuning;
use crate::error::{PlayerError, Result};
use crate::host::{Host, MediaElement};
use crate::player::Player;
use crate::props::{PlayerProps, Source, Styles, SubtitleTrack, VideoSource};
use crate::signals::{signal, Signal};

/// Attributes that map one-to-one onto props.
pub const OBSERVED_ATTRIBUTES: [&str; 18] = [
    "autoplay",
    "controls-timeout",
    "global-key-listener",
    "height",
    "key-seek-duration",
    "loop",
    "muted",
    "persistent-volume",
    "poster",
    "preload",
    "preview",
    "preview-height",
    "preview-update-throttle",
    "preview-width",
    "sources",
    "styles",
    "swipe-control-range",
    "width",
];

// =============================================================================
// PROPERTY VALUES
// =============================================================================

/// Dynamically typed property value, as a host language binding sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Unset,
    Bool(bool),
    Number(f64),
    Text(String),
    Sources(Source),
    Subtitles(Vec<SubtitleTrack>),
    Styles(Styles),
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropertyValue::Unset, Into::into)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::Number(f64::from(value))
    }
}

impl From<u64> for PropertyValue {
    fn from(value: u64) -> Self {
        PropertyValue::Number(value as f64)
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<Source> for PropertyValue {
    fn from(value: Source) -> Self {
        PropertyValue::Sources(value)
    }
}

impl From<Vec<SubtitleTrack>> for PropertyValue {
    fn from(value: Vec<SubtitleTrack>) -> Self {
        PropertyValue::Subtitles(value)
    }
}

impl From<Styles> for PropertyValue {
    fn from(value: Styles) -> Self {
        PropertyValue::Styles(value)
    }
}

/// `controls-timeout` -> `controls_timeout`, `loop` -> `looped`.
pub fn property_name(attribute: &str) -> String {
    match attribute {
        "loop" => "looped".to_string(),
        other => other.replace('-', "_"),
    }
}

/// Inverse of [`property_name`], used in error messages.
fn attribute_name(property: &str) -> String {
    match property {
        "looped" => "loop".to_string(),
        other => other.replace('_', "-"),
    }
}

fn expect_bool(attr: &str, value: PropertyValue) -> Result<Option<bool>> {
    match value {
        PropertyValue::Unset => Ok(None),
        PropertyValue::Bool(b) => Ok(Some(b)),
        _ => Err(PlayerError::validation(attr, "a boolean")),
    }
}

fn expect_text(attr: &str, value: PropertyValue) -> Result<Option<String>> {
    match value {
        PropertyValue::Unset => Ok(None),
        PropertyValue::Text(s) => Ok(Some(s)),
        _ => Err(PlayerError::validation(attr, "a string")),
    }
}

fn expect_number(attr: &str, value: PropertyValue) -> Result<Option<f64>> {
    match value {
        PropertyValue::Unset => Ok(None),
        PropertyValue::Number(n) if n.is_nan() => Err(PlayerError::validation(attr, "a number")),
        PropertyValue::Number(n) if !n.is_finite() || n < 0.0 => {
            Err(PlayerError::validation(attr, "a non-negative number"))
        }
        PropertyValue::Number(n) => Ok(Some(n)),
        _ => Err(PlayerError::validation(attr, "a number")),
    }
}

fn expect_u32(attr: &str, value: PropertyValue) -> Result<Option<u32>> {
    Ok(expect_number(attr, value)?.map(|n| n.min(f64::from(u32::MAX)) as u32))
}

fn expect_u64(attr: &str, value: PropertyValue) -> Result<Option<u64>> {
    Ok(expect_number(attr, value)?.map(|n| n as u64))
}

// =============================================================================
// DYNAMIC SOURCE / SUBTITLE ATTRIBUTES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceField {
    Src,
    Type,
    Label,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubField {
    Src,
    Label,
    Lang,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DynamicAttribute {
    /// Bare `source`: a single URL.
    Source,
    SourceEntry(String, SourceField),
    SubEntry(String, SubField),
    SubDefault,
}

fn split_field<'a, F: Copy>(rest: &'a str, suffixes: &[(&str, F)], plain: F) -> Option<(&'a str, F)> {
    for (suffix, field) in suffixes {
        if let Some(key) = rest.strip_suffix(suffix)
            && !key.is_empty()
        {
            return Some((key, *field));
        }
    }
    (!rest.is_empty()).then_some((rest, plain))
}

impl DynamicAttribute {
    fn is_source(&self) -> bool {
        matches!(self, Self::Source | Self::SourceEntry(..))
    }
}

fn parse_dynamic(name: &str) -> Option<DynamicAttribute> {
    if name == "source" {
        return Some(DynamicAttribute::Source);
    }
    if name == "sub-default" {
        return Some(DynamicAttribute::SubDefault);
    }
    if let Some(rest) = name.strip_prefix("source-") {
        let suffixes = [("-type", SourceField::Type), ("-label", SourceField::Label)];
        let (key, field) = split_field(rest, &suffixes, SourceField::Src)?;
        return Some(DynamicAttribute::SourceEntry(key.to_string(), field));
    }
    if let Some(rest) = name.strip_prefix("sub-") {
        let suffixes = [("-label", SubField::Label), ("-lang", SubField::Lang)];
        let (key, field) = split_field(rest, &suffixes, SubField::Src)?;
        return Some(DynamicAttribute::SubEntry(key.to_string(), field));
    }
    None
}

/// Numeric keys in numeric order, then everything else lexically.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[derive(Debug, Default, Clone)]
struct PartialSource {
    src: Option<String>,
    mime_type: Option<String>,
    label: Option<String>,
}

#[derive(Debug, Default, Clone)]
struct PartialSub {
    src: Option<String>,
    label: Option<String>,
    lang: Option<String>,
}

#[derive(Debug, Default)]
struct DynamicRecords {
    single: Option<String>,
    sources: BTreeMap<String, PartialSource>,
    subs: BTreeMap<String, PartialSub>,
    default_sub: Option<String>,
}

impl DynamicRecords {
    fn apply(&mut self, attr: DynamicAttribute, value: Option<&str>) {
        let value = value.map(str::to_string);
        match attr {
            DynamicAttribute::Source => self.single = value,
            DynamicAttribute::SubDefault => self.default_sub = value,
            DynamicAttribute::SourceEntry(key, field) => {
                let entry = self.sources.entry(key).or_default();
                match field {
                    SourceField::Src => entry.src = value,
                    SourceField::Type => entry.mime_type = value,
                    SourceField::Label => entry.label = value,
                }
            }
            DynamicAttribute::SubEntry(key, field) => {
                let entry = self.subs.entry(key).or_default();
                match field {
                    SubField::Src => entry.src = value,
                    SubField::Label => entry.label = value,
                    SubField::Lang => entry.lang = value,
                }
            }
        }
    }

    fn sorted<'a, T>(map: &'a BTreeMap<String, T>) -> Vec<(&'a String, &'a T)> {
        let mut entries: Vec<_> = map.iter().collect();
        entries.sort_by(|(a, _), (b, _)| compare_keys(a, b));
        entries
    }

    /// Complete `source-N` records, or the bare `source` URL.
    fn sources(&self) -> Option<Source> {
        let list: Vec<VideoSource> = Self::sorted(&self.sources)
            .into_iter()
            .filter_map(|(key, p)| {
                Some(VideoSource {
                    id: Some(key.clone()),
                    src: p.src.clone()?,
                    mime_type: p.mime_type.clone()?,
                    label: p.label.clone()?,
                })
            })
            .collect();
        if !list.is_empty() {
            return Some(Source::List(list));
        }
        self.single.clone().map(Source::Url)
    }

    fn subtitles(&self) -> Option<Vec<SubtitleTrack>> {
        let tracks: Vec<SubtitleTrack> = Self::sorted(&self.subs)
            .into_iter()
            .filter_map(|(key, p)| {
                Some(SubtitleTrack {
                    id: key.clone(),
                    src: p.src.clone()?,
                    label: p.label.clone()?,
                    srclang: p.lang.clone()?,
                    default: self.default_sub.as_deref() == Some(key.as_str()),
                })
            })
            .collect();
        (!tracks.is_empty()).then_some(tracks)
    }
}

// =============================================================================
// ADAPTER
// =============================================================================

struct ElementSignals {
    autoplay: Signal<Option<bool>>,
    controls_timeout: Signal<Option<u64>>,
    global_key_listener: Signal<Option<bool>>,
    height: Signal<Option<u32>>,
    key_seek_duration: Signal<Option<f64>>,
    looped: Signal<Option<bool>>,
    muted: Signal<Option<bool>>,
    persistent_volume: Signal<Option<bool>>,
    poster: Signal<Option<String>>,
    preload: Signal<Option<String>>,
    preview: Signal<Option<String>>,
    preview_height: Signal<Option<u32>>,
    preview_update_throttle: Signal<Option<u64>>,
    preview_width: Signal<Option<u32>>,
    sources: Signal<Option<Source>>,
    styles: Signal<Option<Styles>>,
    subtitles: Signal<Option<Vec<SubtitleTrack>>>,
    swipe_control_range: Signal<Option<f64>>,
    width: Signal<Option<u32>>,
}

impl ElementSignals {
    fn new() -> Self {
        Self {
            autoplay: signal(None),
            controls_timeout: signal(None),
            global_key_listener: signal(None),
            height: signal(None),
            key_seek_duration: signal(None),
            looped: signal(None),
            muted: signal(None),
            persistent_volume: signal(None),
            poster: signal(None),
            preload: signal(None),
            preview: signal(None),
            preview_height: signal(None),
            preview_update_throttle: signal(None),
            preview_width: signal(None),
            sources: signal(None),
            styles: signal(None),
            subtitles: signal(None),
            swipe_control_range: signal(None),
            width: signal(None),
        }
    }
}

pub struct ElementAdapter {
    signals: ElementSignals,
    dynamic: DynamicRecords,
    tuning: Tuning,
    player: Option<Player>,
}

impl Default for ElementAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementAdapter {
    pub fn new() -> Self {
        Self::with_tuning(Tuning::default())
    }

    pub fn with_tuning(tuning: Tuning) -> Self {
        Self {
            signals: ElementSignals::new(),
            dynamic: DynamicRecords::default(),
            tuning,
            player: None,
        }
    }

    // ===== PROPERTIES =====

    /// Read a property by its snake_case name.
    pub fn get_property(&self, name: &str) -> Result<PropertyValue> {
        let s = &self.signals;
        let value = match name {
            "autoplay" => s.autoplay.get().into(),
            "controls_timeout" => s.controls_timeout.get().into(),
            "global_key_listener" => s.global_key_listener.get().into(),
            "height" => s.height.get().into(),
            "key_seek_duration" => s.key_seek_duration.get().into(),
            "looped" => s.looped.get().into(),
            "muted" => s.muted.get().into(),
            "persistent_volume" => s.persistent_volume.get().into(),
            "poster" => s.poster.get().into(),
            "preload" => s.preload.get().into(),
            "preview" => s.preview.get().into(),
            "preview_height" => s.preview_height.get().into(),
            "preview_update_throttle" => s.preview_update_throttle.get().into(),
            "preview_width" => s.preview_width.get().into(),
            "sources" => s.sources.get().into(),
            "styles" => s.styles.get().into(),
            "subtitles" => s.subtitles.get().into(),
            "swipe_control_range" => s.swipe_control_range.get().into(),
            "width" => s.width.get().into(),
            _ => return Err(PlayerError::UnknownProperty(name.to_string())),
        };
        Ok(value)
    }

    /// Assign a property by its snake_case name. Values of the wrong type
    /// are rejected and leave the property unchanged.
    pub fn set_property(&self, name: &str, value: PropertyValue) -> Result<()> {
        let s = &self.signals;
        let attr = attribute_name(name);
        let attr = attr.as_str();
        match name {
            "autoplay" => s.autoplay.set(expect_bool(attr, value)?),
            "controls_timeout" => s.controls_timeout.set(expect_u64(attr, value)?),
            "global_key_listener" => s.global_key_listener.set(expect_bool(attr, value)?),
            "height" => s.height.set(expect_u32(attr, value)?),
            "key_seek_duration" => s.key_seek_duration.set(expect_number(attr, value)?),
            "looped" => s.looped.set(expect_bool(attr, value)?),
            "muted" => s.muted.set(expect_bool(attr, value)?),
            "persistent_volume" => s.persistent_volume.set(expect_bool(attr, value)?),
            "poster" => s.poster.set(expect_text(attr, value)?),
            "preload" => s.preload.set(expect_text(attr, value)?),
            "preview" => s.preview.set(expect_text(attr, value)?),
            "preview_height" => s.preview_height.set(expect_u32(attr, value)?),
            "preview_update_throttle" => s.preview_update_throttle.set(expect_u64(attr, value)?),
            "preview_width" => s.preview_width.set(expect_u32(attr, value)?),
            "swipe_control_range" => s.swipe_control_range.set(expect_number(attr, value)?),
            "width" => s.width.set(expect_u32(attr, value)?),
            "sources" => s.sources.set(match value {
                PropertyValue::Unset => None,
                PropertyValue::Text(url) => Some(Source::Url(url)),
                PropertyValue::Sources(Source::List(list)) if list.iter().any(|e| e.src.is_empty()) => {
                    return Err(PlayerError::validation(attr, "a list of sources with a src"));
                }
                PropertyValue::Sources(source) => Some(source),
                _ => return Err(PlayerError::validation(attr, "a URL or a list of sources")),
            }),
            "subtitles" => s.subtitles.set(match value {
                PropertyValue::Unset => None,
                PropertyValue::Subtitles(tracks)
                    if tracks.iter().any(|t| t.id.is_empty() || t.src.is_empty()) =>
                {
                    return Err(PlayerError::validation(attr, "a list of tracks with an id and src"));
                }
                PropertyValue::Subtitles(tracks) => Some(tracks),
                _ => return Err(PlayerError::validation(attr, "a list of subtitle tracks")),
            }),
            "styles" => s.styles.set(match value {
                PropertyValue::Unset => None,
                PropertyValue::Bool(true) => Some(Styles::Default),
                PropertyValue::Bool(false) => Some(Styles::Disabled),
                PropertyValue::Text(css) => Some(Styles::Custom(css)),
                PropertyValue::Styles(styles) => Some(styles),
                _ => return Err(PlayerError::validation(attr, "either a string or a boolean")),
            }),
            _ => return Err(PlayerError::UnknownProperty(name.to_string())),
        }
        Ok(())
    }

    // ===== ATTRIBUTES =====

    /// Attribute set (`Some`) or removed (`None`). Unobserved names are ignored.
    pub fn on_attribute_change(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        if let Some(attr) = parse_dynamic(name) {
            let touches_sources = attr.is_source();
            self.dynamic.apply(attr, value);
            if touches_sources {
                self.signals.sources.set(self.dynamic.sources());
            } else {
                self.signals.subtitles.set(self.dynamic.subtitles());
            }
            return Ok(());
        }

        if !OBSERVED_ATTRIBUTES.contains(&name) {
            log::trace!("ignoring unobserved attribute {name:?}");
            return Ok(());
        }

        let property = property_name(name);
        let parsed = match (name, value) {
            (_, None) => PropertyValue::Unset,
            ("autoplay" | "loop" | "muted" | "persistent-volume" | "global-key-listener", Some(_)) => {
                PropertyValue::Bool(true)
            }
            (
                "controls-timeout" | "height" | "width" | "key-seek-duration" | "preview-height"
                | "preview-width" | "preview-update-throttle" | "swipe-control-range",
                Some(raw),
            ) => match raw.trim().parse::<f64>() {
                Ok(n) => PropertyValue::Number(n),
                Err(_) => return Err(PlayerError::validation(name, "a number")),
            },
            ("styles", Some("none")) => PropertyValue::Styles(Styles::Disabled),
            ("styles", Some(css)) => PropertyValue::Styles(Styles::Custom(css.to_string())),
            (_, Some(text)) => PropertyValue::Text(text.to_string()),
        };
        self.set_property(&property, parsed)
    }

    // ===== LIFECYCLE =====

    /// Mount a player on the media element, fed by the adapter's signals.
    pub fn connect(&mut self, media: Rc<dyn MediaElement>, host: Host) -> Result<()> {
        if self.player.is_some() {
            return Err(PlayerError::AlreadyConnected);
        }
        let s = &self.signals;
        let props = PlayerProps {
            autoplay: s.autoplay.clone().into(),
            controls_timeout: s.controls_timeout.clone().into(),
            global_key_listener: s.global_key_listener.clone().into(),
            height: s.height.clone().into(),
            key_seek_duration: s.key_seek_duration.clone().into(),
            looped: s.looped.clone().into(),
            muted: s.muted.clone().into(),
            persistent_volume: s.persistent_volume.clone().into(),
            poster: s.poster.clone().into(),
            preload: s.preload.clone().into(),
            preview: s.preview.clone().into(),
            preview_height: s.preview_height.clone().into(),
            preview_update_throttle: s.preview_update_throttle.clone().into(),
            preview_width: s.preview_width.clone().into(),
            sources: s.sources.clone().into(),
            styles: s.styles.clone().into(),
            subtitles: s.subtitles.clone().into(),
            swipe_control_range: s.swipe_control_range.clone().into(),
            width: s.width.clone().into(),
            tuning: self.tuning.clone(),
            ..Default::default()
        };
        self.player = Some(Player::new(props, media, host)?);
        Ok(())
    }

    /// Dispose the mounted player. The adapter keeps its property values.
    pub fn disconnect(&mut self) {
        if let Some(player) = self.player.take() {
            player.dispose();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.player.is_some()
    }

    /// Run `f` against the mounted player.
    pub fn with_player<R>(&self, f: impl FnOnce(&Player) -> R) -> Option<R> {
        self.player.as_ref().map(f)
    }
}

impl Drop for ElementAdapter {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimHost, SimMedia};

    #[test]
    fn test_property_names() {
        assert_eq!(property_name("controls-timeout"), "controls_timeout");
        assert_eq!(property_name("loop"), "looped");
        assert_eq!(attribute_name("preview_update_throttle"), "preview-update-throttle");
    }

    #[test]
    fn test_set_property_rejects_wrong_types() {
        let el = ElementAdapter::new();
        let err = el.set_property("width", PropertyValue::Text("wide".into())).unwrap_err();
        assert_eq!(err.to_string(), "attribute \"width\" must be a number");

        let err = el.set_property("looped", PropertyValue::Number(1.0)).unwrap_err();
        assert_eq!(err.to_string(), "attribute \"loop\" must be a boolean");

        assert!(matches!(
            el.set_property("volume", PropertyValue::Number(1.0)),
            Err(PlayerError::UnknownProperty(_))
        ));
        assert_eq!(el.get_property("width").unwrap(), PropertyValue::Unset);
    }

    #[test]
    fn test_negative_durations_are_rejected() {
        let el = ElementAdapter::new();
        let err = el
            .set_property("key_seek_duration", PropertyValue::Number(-5.0))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "attribute \"key-seek-duration\" must be a non-negative number"
        );
    }

    #[test]
    fn test_attribute_parsing() {
        let mut el = ElementAdapter::new();
        el.on_attribute_change("controls-timeout", Some("1500")).unwrap();
        el.on_attribute_change("muted", Some("")).unwrap();
        el.on_attribute_change("styles", Some("none")).unwrap();
        el.on_attribute_change("data-foo", Some("bar")).unwrap();

        assert_eq!(el.get_property("controls_timeout").unwrap(), PropertyValue::Number(1500.0));
        assert_eq!(el.get_property("muted").unwrap(), PropertyValue::Bool(true));
        assert_eq!(
            el.get_property("styles").unwrap(),
            PropertyValue::Styles(Styles::Disabled)
        );

        el.on_attribute_change("muted", None).unwrap();
        assert_eq!(el.get_property("muted").unwrap(), PropertyValue::Unset);

        let err = el.on_attribute_change("width", Some("wide")).unwrap_err();
        assert!(matches!(err, PlayerError::Validation { .. }));
    }

    #[test]
    fn test_key_ordering_is_numeric_aware() {
        let mut keys = vec!["10", "b", "2", "a", "1"];
        keys.sort_by(|a, b| compare_keys(a, b));
        assert_eq!(keys, ["1", "2", "10", "a", "b"]);
    }

    #[test]
    fn test_dynamic_sources_need_every_field() {
        let mut el = ElementAdapter::new();
        el.on_attribute_change("source-10", Some("low.mp4")).unwrap();
        el.on_attribute_change("source-10-type", Some("video/mp4")).unwrap();
        el.on_attribute_change("source-10-label", Some("480p")).unwrap();
        el.on_attribute_change("source-2", Some("hd.mp4")).unwrap();
        el.on_attribute_change("source-2-type", Some("video/mp4")).unwrap();
        el.on_attribute_change("source-3", Some("partial.mp4")).unwrap();

        // source-2 still lacks a label, source-3 lacks type and label.
        let PropertyValue::Sources(Source::List(list)) = el.get_property("sources").unwrap() else {
            panic!("expected a source list");
        };
        assert_eq!(list.len(), 1);

        el.on_attribute_change("source-2-label", Some("1080p")).unwrap();
        let PropertyValue::Sources(Source::List(list)) = el.get_property("sources").unwrap() else {
            panic!("expected a source list");
        };
        let ids: Vec<_> = list.iter().map(|s| s.id.clone().unwrap()).collect();
        assert_eq!(ids, ["2", "10"]);
        assert_eq!(list[0].label, "1080p");
    }

    #[test]
    fn test_bare_source_is_a_url() {
        let mut el = ElementAdapter::new();
        el.on_attribute_change("source", Some("movie.mp4")).unwrap();
        assert_eq!(
            el.get_property("sources").unwrap(),
            PropertyValue::Sources(Source::Url("movie.mp4".into()))
        );
    }

    #[test]
    fn test_dynamic_families_leave_each_other_alone() {
        let mut el = ElementAdapter::new();
        el.on_attribute_change("sources", Some("movie.mp4")).unwrap();
        el.on_attribute_change("sub-1", Some("en.vtt")).unwrap();
        assert_eq!(
            el.get_property("sources").unwrap(),
            PropertyValue::Sources(Source::Url("movie.mp4".into()))
        );

        let tracks = vec![SubtitleTrack {
            id: "en".into(),
            src: "en.vtt".into(),
            srclang: "en".into(),
            label: "English".into(),
            default: false,
        }];
        el.set_property("subtitles", tracks.clone().into()).unwrap();
        el.on_attribute_change("source-1", Some("hd.mp4")).unwrap();
        assert_eq!(
            el.get_property("subtitles").unwrap(),
            PropertyValue::Subtitles(tracks)
        );
    }

    #[test]
    fn test_dynamic_subtitles_with_default() {
        let mut el = ElementAdapter::new();
        for (name, value) in [
            ("sub-en", "en.vtt"),
            ("sub-en-label", "English"),
            ("sub-en-lang", "en"),
            ("sub-de", "de.vtt"),
            ("sub-de-label", "Deutsch"),
            ("sub-de-lang", "de"),
            ("sub-default", "en"),
        ] {
            el.on_attribute_change(name, Some(value)).unwrap();
        }

        let PropertyValue::Subtitles(tracks) = el.get_property("subtitles").unwrap() else {
            panic!("expected subtitles");
        };
        assert_eq!(tracks[0].id, "de");
        assert!(!tracks[0].default);
        assert_eq!(tracks[1].srclang, "en");
        assert!(tracks[1].default);
    }

    #[test]
    fn test_connect_feeds_player_reactively() {
        let sim = SimHost::new();
        let media = Rc::new(SimMedia::new(100.0));
        let mut el = ElementAdapter::new();
        el.set_property("width", PropertyValue::Number(640.0)).unwrap();
        el.connect(media.clone(), sim.host()).unwrap();

        assert!(matches!(
            el.connect(media.clone(), sim.host()),
            Err(PlayerError::AlreadyConnected)
        ));
        assert_eq!(el.with_player(|p| p.view().width_attr.get()), Some(Some(640)));

        el.on_attribute_change("width", Some("320")).unwrap();
        assert_eq!(el.with_player(|p| p.view().width_attr.get()), Some(Some(320)));

        el.disconnect();
        assert!(!el.is_connected());
        assert_eq!(sim.window.total_listeners(), 0);
        assert_eq!(el.get_property("width").unwrap(), PropertyValue::Number(320.0));

        el.connect(media, sim.host()).unwrap();
        assert!(el.is_connected());
    }
}
