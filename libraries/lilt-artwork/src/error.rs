use thiserror::Error;

/// Errors that can occur while building a cover reference
#[derive(Debug, Error)]
pub enum ArtworkError {
    /// Artwork too large
    #[error("Artwork too large: {0} bytes (max {1} bytes)")]
    TooLarge(usize, usize),
}

impl From<ArtworkError> for lilt_core::LiltError {
    fn from(err: ArtworkError) -> Self {
        lilt_core::LiltError::metadata(err.to_string())
    }
}

/// Result type for artwork operations
pub type Result<T> = std::result::Result<T, ArtworkError>;
