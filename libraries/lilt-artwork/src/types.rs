use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::sync::Arc;

/// Artwork data taken from an audio file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkData {
    /// Raw image bytes
    pub data: Vec<u8>,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub mime_type: String,
}

impl ArtworkData {
    /// Create new artwork data
    pub fn new(data: Vec<u8>, mime_type: String) -> Self {
        Self { data, mime_type }
    }

    /// Get the data as a base64-encoded string
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    /// Get the data as a `data:` URI
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// Cover image resource reference
///
/// Owned by a playlist entry. The image bytes and the encoded URI are freed
/// together with the last clone of the reference.
#[derive(Clone, PartialEq, Eq)]
pub struct CoverRef {
    artwork: Arc<ArtworkData>,
    uri: Arc<str>,
}

impl CoverRef {
    /// Build a reference from artwork data
    pub fn new(artwork: ArtworkData) -> Self {
        let uri = Arc::from(artwork.to_data_uri());
        Self {
            artwork: Arc::new(artwork),
            uri,
        }
    }

    /// Self-contained URI for the image
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Underlying image data
    pub fn artwork(&self) -> &ArtworkData {
        &self.artwork
    }

    /// MIME type of the image
    pub fn mime_type(&self) -> &str {
        &self.artwork.mime_type
    }
}

impl fmt::Debug for CoverRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverRef")
            .field("mime_type", &self.artwork.mime_type)
            .field("len", &self.artwork.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_contains_mime_and_payload() {
        let artwork = ArtworkData::new(b"hello".to_vec(), "image/png".to_string());
        assert_eq!(artwork.to_base64(), "aGVsbG8=");
        assert_eq!(artwork.to_data_uri(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn cover_ref_exposes_uri() {
        let cover = CoverRef::new(ArtworkData::new(vec![1, 2, 3], "image/jpeg".to_string()));
        assert_eq!(cover.uri(), "data:image/jpeg;base64,AQID");
        assert_eq!(cover.mime_type(), "image/jpeg");
        assert_eq!(cover.artwork().data, vec![1, 2, 3]);
    }
}
