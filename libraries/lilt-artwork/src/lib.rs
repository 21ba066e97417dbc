//! Lilt Artwork - cover art references for playlist entries
//!
//! This library turns pictures embedded in audio tags into cover resource
//! references that a rendering layer can display directly.
//!
//! # Features
//!
//! - First-picture cover selection
//! - Base64 data URIs as self-contained cover references
//! - Size limits to prevent memory issues
//!
//! # Example
//!
//! ```
//! use lilt_artwork::CoverSelector;
//! use lilt_core::EmbeddedPicture;
//!
//! let selector = CoverSelector::default();
//! let pictures = vec![EmbeddedPicture::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg")];
//!
//! let cover = selector.select(&pictures).unwrap().unwrap();
//! assert!(cover.uri().starts_with("data:image/jpeg;base64,"));
//! ```

mod error;
mod selector;
mod types;

// Re-export public API
pub use error::{ArtworkError, Result};
pub use selector::{CoverSelector, MAX_ARTWORK_SIZE};
pub use types::{ArtworkData, CoverRef};
