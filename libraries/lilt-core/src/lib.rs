//! Lilt Player Core
//!
//! Platform-agnostic core types, traits, and error handling for Lilt Player.
//!
//! This crate provides the foundational building blocks shared by the
//! playback core and its collaborators (metadata extraction, audio engines,
//! notification sinks).
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `EntryId`, `SourceFile`, `SourceRef`, `ExtractedMetadata`
//! - **Collaborator Traits**: `MetadataExtractor`, `AudioEngine`, `AudioResource`,
//!   `Notifier`, `IdGenerator`
//! - **Error Handling**: Unified `LiltError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use lilt_core::{EntryId, SourceFile};
//!
//! let file = SourceFile::new("song.mp3", vec![0u8; 16]);
//! let source = file.to_source_ref();
//! assert_eq!(source.name(), "song.mp3");
//!
//! let id = EntryId::generate();
//! assert!(!id.as_str().is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{LiltError, Result};
pub use traits::{
    AudioEngine, AudioResource, IdGenerator, MetadataExtractor, NotificationKind, Notifier,
    UuidGenerator,
};

pub use types::{
    CompletionSignal, CompletionSink, EmbeddedPicture, EntryId, ExtractedMetadata, PlaybackToken,
    SourceFile, SourceRef,
};
