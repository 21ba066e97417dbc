//! Player configuration

use crate::error::{PlaybackError, Result};
use lilt_artwork::MAX_ARTWORK_SIZE;
use lilt_metadata::DEFAULT_EXTENSIONS;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Author shown for tracks without an artist tag
pub const UNKNOWN_AUTHOR: &str = "unknown composer";

/// Runtime settings for the player core
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlayerConfig {
    /// Author substituted when metadata has no artist
    #[serde(default = "default_unknown_author")]
    pub unknown_author: String,

    /// Largest embedded picture accepted as a cover, in bytes
    #[serde(default = "default_max_artwork_bytes")]
    pub max_artwork_bytes: usize,

    /// File extensions picked up by directory discovery
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Linear volume applied to the first bound resource
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            unknown_author: default_unknown_author(),
            max_artwork_bytes: default_max_artwork_bytes(),
            extensions: default_extensions(),
            initial_volume: default_initial_volume(),
        }
    }
}

impl PlayerConfig {
    /// Load configuration from an optional TOML file and the environment
    ///
    /// Environment variables are prefixed with `LILT_` and override the file,
    /// e.g. `LILT_UNKNOWN_AUTHOR` or `LILT_EXTENSIONS=mp3,flac`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            if path.exists() {
                settings = settings.add_source(config::File::from(path));
            } else {
                tracing::debug!("Config file {:?} not found, using defaults", path);
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("LILT")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("extensions"),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.unknown_author.trim().is_empty() {
            return Err(PlaybackError::Config(
                "unknown_author must not be empty".to_string(),
            ));
        }

        if self.extensions.is_empty() {
            return Err(PlaybackError::Config(
                "at least one file extension is required".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(PlaybackError::InvalidVolume(self.initial_volume));
        }

        Ok(())
    }
}

// Default values
fn default_unknown_author() -> String {
    UNKNOWN_AUTHOR.to_string()
}

fn default_max_artwork_bytes() -> usize {
    MAX_ARTWORK_SIZE
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| (*ext).to_string()).collect()
}

fn default_initial_volume() -> f32 {
    1.0
}
