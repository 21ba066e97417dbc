//! Lilt Player Metadata
//!
//! Metadata extraction and file discovery for Lilt Player.
//!
//! This crate provides:
//! - Tag reading from in-memory audio files (MP3, FLAC, OGG, WAV, AAC, OPUS)
//! - Embedded picture extraction for cover art
//! - Discovery of audio files under a path
//!
//! # Example
//!
//! ```rust,no_run
//! use lilt_core::MetadataExtractor;
//! use lilt_metadata::{discover_files, load_sources, LoftyMetadataExtractor, DEFAULT_EXTENSIONS};
//! use std::path::Path;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let paths = discover_files(Path::new("/music"), DEFAULT_EXTENSIONS)?;
//! let files = load_sources(&paths);
//!
//! let extractor = LoftyMetadataExtractor::new();
//! for file in &files {
//!     let metadata = extractor.extract(file.name(), file.data())?;
//!     println!("{:?}", metadata.title);
//! }
//! # Ok(())
//! # }
//! ```

mod discovery;
mod error;
mod extractor;

pub use discovery::{discover_files, is_supported_file, load_sources, DEFAULT_EXTENSIONS};
pub use error::{MetadataError, Result};
pub use extractor::LoftyMetadataExtractor;
