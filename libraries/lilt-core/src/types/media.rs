//! Raw ingestion input and the metadata extracted from it

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// One raw audio file handed to the player for ingestion
///
/// The bytes are shared and immutable, so turning a file into a
/// [`SourceRef`] never copies the audio data.
#[derive(Clone)]
pub struct SourceFile {
    name: String,
    data: Arc<[u8]>,
}

impl SourceFile {
    /// Create a source file from a name and its bytes
    pub fn new(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk
    ///
    /// The file name (without directories) becomes the source name.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, data))
    }

    /// Original file name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw file bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the file has no content
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Playable reference over this file's bytes
    pub fn to_source_ref(&self) -> SourceRef {
        SourceRef {
            name: Arc::from(self.name.as_str()),
            data: Arc::clone(&self.data),
        }
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("name", &self.name)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Opaque playable-resource reference
///
/// Shares ownership of the original file bytes. The bytes are released when
/// the last holder (playlist entry or live audio resource) drops its
/// reference, so discarding a playlist releases everything it owned.
#[derive(Clone)]
pub struct SourceRef {
    name: Arc<str>,
    data: Arc<[u8]>,
}

impl SourceRef {
    /// File name the reference was created from
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercased file extension, used as a format hint by decoders
    pub fn extension(&self) -> Option<String> {
        Path::new(&*self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }

    /// Shared handle to the audio bytes
    pub fn bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    /// Number of live holders of the underlying bytes
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.data)
    }
}

impl fmt::Debug for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceRef")
            .field("name", &self.name)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Picture embedded in an audio file's tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedPicture {
    /// Raw image bytes
    pub data: Vec<u8>,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub mime_type: String,
}

impl EmbeddedPicture {
    /// Create a new embedded picture
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }
}

/// Output of a metadata extractor
///
/// Every field is independently optional; consumers apply their own
/// fallbacks for whatever is missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedMetadata {
    /// Track title
    pub title: Option<String>,
    /// Track artist
    pub artist: Option<String>,
    /// Track duration
    pub duration: Option<Duration>,
    /// Embedded pictures, in tag order
    pub pictures: Vec<EmbeddedPicture>,
}

impl ExtractedMetadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }
}
