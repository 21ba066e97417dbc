//! Lilt Player - Playback Core
//!
//! Playlist management and the playback state machine for Lilt Player.
//!
//! This crate provides:
//! - Playlist entries built from raw files and extracted metadata
//! - An ordered playlist with wraparound next/previous navigation
//! - A playback session holding at most one live audio resource
//! - The player controller (play by id, start first, next/previous, clear, ingest)
//! - An async event loop serializing commands, track-ended signals and
//!   extraction results on one task
//!
//! # Architecture
//!
//! `lilt-playback` does not decode audio or parse tags itself. The audio
//! engine, metadata extractor and notification sink are traits from
//! `lilt-core`; platforms plug in their implementations (for example
//! `lilt-audio-desktop` and `lilt-metadata`).
//!
//! # Example
//!
//! ```rust
//! use lilt_core::{ExtractedMetadata, MetadataExtractor, SourceFile};
//! use lilt_playback::{MemoryEngine, PlayerController, PlayerState, TracingNotifier};
//! use std::sync::Arc;
//!
//! struct NoTags;
//!
//! impl MetadataExtractor for NoTags {
//!     fn extract(&self, _name: &str, _data: &[u8]) -> lilt_core::Result<ExtractedMetadata> {
//!         Ok(ExtractedMetadata::new())
//!     }
//! }
//!
//! let engine = MemoryEngine::new();
//! let mut player =
//!     PlayerController::with_defaults(Box::new(engine.clone()), Arc::new(TracingNotifier));
//!
//! let files = vec![
//!     SourceFile::new("intro.mp3", vec![0u8; 16]),
//!     SourceFile::new("outro.mp3", vec![0u8; 16]),
//! ];
//! player.ingest(&files, &NoTags);
//!
//! player.next().unwrap();
//! assert_eq!(player.active_entry().unwrap().title, "intro.mp3");
//! assert_eq!(player.active_entry().unwrap().author, "unknown composer");
//! assert_eq!(player.state(), PlayerState::Playing);
//!
//! player.clear_all();
//! assert_eq!(player.state(), PlayerState::Idle);
//! assert_eq!(engine.live_resources(), 0);
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod factory;
pub mod memory;
pub mod notify;
pub mod playlist;
pub mod service;
pub mod session;
pub mod types;

pub use config::{PlayerConfig, UNKNOWN_AUTHOR};
pub use controller::{BatchId, IngestFailure, IngestReport, PlayerController, TRACKS_ADDED_MESSAGE};
pub use error::{PlaybackError, Result};
pub use factory::{PlaylistEntryFactory, UNKNOWN_TITLE};
pub use memory::{MemoryEngine, MemoryResource};
pub use notify::{ChannelNotifier, Notification, TracingNotifier};
pub use playlist::Playlist;
pub use service::{PlayerCommand, PlayerHandle, PlayerService};
pub use session::PlaybackSession;
pub use types::{Direction, EntrySummary, PlayerSnapshot, PlayerState, PlaylistEntry};
