//! Collaborator traits for Lilt Player
//!
//! The playback core never talks to a tag library, an audio device, or a UI
//! toolkit directly. Everything outside the core is reached through these
//! traits so that platforms (and tests) can plug in their own implementations.

use crate::error::Result;
use crate::types::{CompletionSignal, EntryId, ExtractedMetadata, SourceRef};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Metadata extractor trait
///
/// Turns the raw bytes of one audio file into semantic tags. Implementations
/// are called from blocking worker threads, possibly several at once.
pub trait MetadataExtractor: Send + Sync {
    /// Extract metadata from the bytes of a file
    ///
    /// `name` is the original file name, usable as a format hint.
    ///
    /// # Errors
    /// Returns an error if the bytes are not a readable audio file
    fn extract(&self, name: &str, data: &[u8]) -> Result<ExtractedMetadata>;
}

/// Audio engine trait
///
/// Creates playable resources. The engine decides how audio reaches the
/// speakers; the playback core only ever holds one resource at a time.
pub trait AudioEngine: Send {
    /// Create a new resource for `source`
    ///
    /// The resource starts paused at position zero. It must fire `on_ended`
    /// exactly once when playback reaches the natural end of the source, and
    /// never after [`AudioResource::unload`] has been called.
    ///
    /// # Errors
    /// Returns an error if the source cannot be decoded
    fn create(
        &mut self,
        source: &SourceRef,
        on_ended: CompletionSignal,
    ) -> Result<Box<dyn AudioResource>>;
}

/// A single playable audio resource
pub trait AudioResource: Send {
    /// Start or resume producing audio
    ///
    /// # Errors
    /// Returns an error if the engine refuses to start (e.g. unsupported codec)
    fn play(&mut self) -> Result<()>;

    /// Pause playback, keeping the current position
    fn pause(&mut self);

    /// Whether the resource is currently paused
    fn is_paused(&self) -> bool;

    /// Current playback position
    fn position(&self) -> Duration;

    /// Move the playback position
    ///
    /// # Errors
    /// Returns an error if the position is outside the source
    fn set_position(&mut self, position: Duration) -> Result<()>;

    /// Set output volume (0.0 to 1.0, linear)
    ///
    /// # Errors
    /// Returns an error if the volume is out of range
    fn set_volume(&mut self, volume: f32) -> Result<()>;

    /// Detach the source and the completion listener
    ///
    /// After this call the resource produces no audio and its completion
    /// signal can no longer fire.
    fn unload(&mut self);
}

/// Kind of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Something the user asked for succeeded
    Success,
    /// Informational message
    Info,
}

/// Fire-and-forget notification sink
pub trait Notifier: Send + Sync {
    /// Show a message to the user
    fn notify(&self, message: &str, kind: NotificationKind);
}

/// Unique identifier source for playlist entries
pub trait IdGenerator: Send + Sync {
    /// Produce an identifier unique within the process lifetime
    fn new_id(&self) -> EntryId;
}

/// UUID v4 based identifier generator
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> EntryId {
        EntryId::generate()
    }
}
