//! Configuration - Defaults and tunable constants
//!
//! Prop defaults live here as `DEFAULT_*` constants. Values that are fixed in
//! practice but were never proven load-bearing (buffer slack, tap windows,
//! swipe margin, ...) are grouped in [`Tuning`], which can be loaded from JSON.
//!
//! # Example
//!
//! ```ignore
//! use spark_player::config::Tuning;
//!
//! let tuning = Tuning::from_json(r#"{ "double_press_window_ms": 300 }"#)?;
//! assert_eq!(tuning.buffer_slack, 16.0); // unspecified fields keep defaults
//! ```

use serde::Deserialize;

use crate::error::Result;

// =============================================================================
// PROP DEFAULTS
// =============================================================================

/// Idle time before the control bar hides while playing.
pub const DEFAULT_CONTROLS_TIMEOUT_MS: u64 = 1000;

/// Arrow-key seek distance.
pub const DEFAULT_KEY_SEEK_SECS: f64 = 5.0;

/// Maximum seek distance of one swipe, either direction.
pub const DEFAULT_SWIPE_CONTROL_RANGE_MS: f64 = 60_000.0;

/// Preview thumbnail update rate while hovering the seek track.
pub const DEFAULT_PREVIEW_UPDATE_THROTTLE_MS: u64 = 250;

/// Preview width used when neither width nor height is given.
pub const DEFAULT_PREVIEW_WIDTH: u32 = 320;

/// Key under which the persisted volume is stored.
pub const VOLUME_STORAGE_KEY: &str = "spark-player-volume";

/// Volume used when nothing (or garbage) is stored.
pub const DEFAULT_VOLUME: f64 = 1.0;

// =============================================================================
// TUNING
// =============================================================================

/// Tunable interaction constants.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Backward tolerance (seconds) when matching the playhead to a buffered range start.
    pub buffer_slack: f64,
    /// Second press within this window after a release toggles fullscreen.
    pub double_press_window_ms: u64,
    /// Press+release longer than this is not a tap.
    pub tap_max_duration_ms: u64,
    /// Touch-move throttle on the capture surface.
    pub swipe_throttle_ms: u64,
    /// Horizontal travel (px) below which a touch is not a swipe.
    pub swipe_threshold_px: f64,
    /// Subtracted from the target width when normalizing swipe travel.
    pub swipe_edge_margin_px: f64,
    /// Quantization step of slider gestures.
    pub slider_step: f64,
    /// Delay before cue positions are corrected on a freshly shown track.
    pub cue_lift_delay_ms: u64,
    /// Smallest preview seek (seconds) worth issuing.
    pub preview_seek_threshold: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            buffer_slack: 16.0,
            double_press_window_ms: 200,
            tap_max_duration_ms: 200,
            swipe_throttle_ms: 50,
            swipe_threshold_px: 10.0,
            swipe_edge_margin_px: 20.0,
            slider_step: 0.01,
            cue_lift_delay_ms: 25,
            preview_seek_threshold: 0.05,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON object; missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "double_press_window_ms": 300 }"#).unwrap();
        assert_eq!(tuning.double_press_window_ms, 300);
        assert_eq!(tuning.buffer_slack, 16.0);
        assert_eq!(tuning.slider_step, 0.01);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(err.to_string().starts_with("invalid tuning configuration"));
    }
}
