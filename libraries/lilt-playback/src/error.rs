//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// The audio engine refused to create or start a resource
    #[error("Failed to start playback: {0}")]
    ResourceStart(String),

    /// Audio resource error
    #[error("Audio resource error: {0}")]
    AudioResource(String),

    /// Invalid volume level
    #[error("Invalid volume: {0}. Must be between 0.0 and 1.0")]
    InvalidVolume(f32),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The player event loop has stopped
    #[error("Player service is not running")]
    ServiceClosed,

    /// Error from a collaborator
    #[error(transparent)]
    Core(#[from] lilt_core::LiltError),
}

impl From<PlaybackError> for lilt_core::LiltError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::Core(inner) => inner,
            other => lilt_core::LiltError::audio(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for PlaybackError {
    fn from(err: config::ConfigError) -> Self {
        PlaybackError::Config(err.to_string())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
