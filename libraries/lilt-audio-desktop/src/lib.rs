//! Desktop audio engine implementation using CPAL
//!
//! This crate provides [`CpalEngine`], an `AudioEngine` for cross-platform
//! desktop playback of in-memory audio files.
//!
//! # Features
//!
//! - Cross-platform audio output using CPAL
//! - Decoding of all Symphonia formats (MP3, FLAC, OGG, WAV, AAC, ...)
//! - Automatic sample rate conversion and channel mapping
//! - Decoding runs on the audio thread; `create` returns immediately
//! - Exactly-once track-ended signalling from the audio callback
//!
//! # Example
//!
//! ```no_run
//! use lilt_audio_desktop::CpalEngine;
//! use lilt_core::{AudioEngine, CompletionSignal, PlaybackToken, SourceFile};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = CpalEngine::new()?;
//!
//! let file = SourceFile::open("/music/song.flac")?;
//! let on_ended = CompletionSignal::new(
//!     PlaybackToken::new(1),
//!     Arc::new(|token| println!("track {} ended", token)),
//! );
//!
//! let mut resource = engine.create(&file.to_source_ref(), on_ended)?;
//! resource.set_volume(0.5)?;
//! resource.play()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod decode;
mod error;
mod output;
mod resample;

pub use decode::{decode_source, DecodedAudio};
pub use error::{AudioError, Result};
pub use output::{CpalEngine, CpalResource};
pub use resample::{map_channels, resample};
