//! Error types.
//!
//! Only [`PlayerError`] ever reaches the embedding application. Host failures
//! ([`FullscreenError`], [`CleanupError`]) are logged and absorbed where they
//! happen.

use thiserror::Error;

/// Errors surfaced to callers: prop/attribute validation and configuration.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("attribute \"{attribute}\" must be {expected}")]
    Validation {
        attribute: String,
        expected: &'static str,
    },

    #[error("unknown property \"{0}\"")]
    UnknownProperty(String),

    #[error("invalid tuning configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("element is already connected")]
    AlreadyConnected,
}

impl PlayerError {
    pub fn validation(attribute: impl Into<String>, expected: &'static str) -> Self {
        Self::Validation {
            attribute: attribute.into(),
            expected,
        }
    }
}

/// Fullscreen request/exit refused by the host environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FullscreenError {
    #[error("fullscreen request was denied: {0}")]
    Denied(String),

    #[error("fullscreen is not supported by the host")]
    Unsupported,
}

/// Best-effort cleanup of host objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CleanupError {
    #[error("element is already detached")]
    Detached,
}

pub type Result<T, E = PlayerError> = std::result::Result<T, E>;
