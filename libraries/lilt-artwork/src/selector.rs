use crate::error::{ArtworkError, Result};
use crate::types::{ArtworkData, CoverRef};
use lilt_core::EmbeddedPicture;

/// Maximum artwork size (5MB)
pub const MAX_ARTWORK_SIZE: usize = 5 * 1024 * 1024;

const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Picks the cover for a playlist entry from its embedded pictures
#[derive(Debug, Clone)]
pub struct CoverSelector {
    max_size: usize,
}

impl CoverSelector {
    /// Create a selector with the given size limit in bytes
    pub fn new(max_size: usize) -> Self {
        Self { max_size }
    }

    /// Size limit in bytes
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Select a cover from embedded pictures
    ///
    /// Returns `Ok(Some(cover))` built from the first picture, `Ok(None)` if
    /// there are no pictures (or the first one is empty), or `Err` if the
    /// first picture exceeds the size limit.
    pub fn select(&self, pictures: &[EmbeddedPicture]) -> Result<Option<CoverRef>> {
        let Some(picture) = pictures.first() else {
            return Ok(None);
        };

        if picture.data.is_empty() {
            tracing::debug!("First embedded picture is empty, no cover");
            return Ok(None);
        }

        if picture.data.len() > self.max_size {
            return Err(ArtworkError::TooLarge(picture.data.len(), self.max_size));
        }

        let mime_type = if picture.mime_type.trim().is_empty() {
            DEFAULT_MIME_TYPE.to_string()
        } else {
            picture.mime_type.clone()
        };

        Ok(Some(CoverRef::new(ArtworkData::new(
            picture.data.clone(),
            mime_type,
        ))))
    }
}

impl Default for CoverSelector {
    fn default() -> Self {
        Self::new(MAX_ARTWORK_SIZE)
    }
}
