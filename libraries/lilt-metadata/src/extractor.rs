/// Metadata extractor implementation using lofty
use crate::error::{MetadataError, Result};
use lilt_core::{EmbeddedPicture, ExtractedMetadata, MetadataExtractor};
use lofty::{AudioFile, FileType, Probe, TaggedFileExt};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

/// Metadata extractor using the lofty library
///
/// Works on in-memory bytes: the format is sniffed from the content, with the
/// file name extension as a fallback hint.
pub struct LoftyMetadataExtractor;

impl LoftyMetadataExtractor {
    /// Create a new metadata extractor
    pub fn new() -> Self {
        Self
    }

    /// Sniff the format from the content, falling back to the extension
    fn probe<'a>(name: &str, data: &'a [u8]) -> Result<Probe<Cursor<&'a [u8]>>> {
        let mut probe = Probe::new(Cursor::new(data)).guess_file_type()?;

        if probe.file_type().is_none() {
            if let Some(file_type) = Path::new(name).extension().and_then(FileType::from_ext) {
                probe = probe.set_file_type(file_type);
            }
        }

        Ok(probe)
    }

    /// Probe and parse the bytes of one file
    fn read_tagged_file(name: &str, data: &[u8]) -> Result<lofty::TaggedFile> {
        if data.is_empty() {
            return Err(MetadataError::UnsupportedFormat(format!("{name} is empty")));
        }

        let probe = Self::probe(name, data)?;
        if probe.file_type().is_none() {
            return Err(MetadataError::UnsupportedFormat(name.to_string()));
        }

        Ok(probe.read()?)
    }

    /// Extract the fields we care about from a lofty tag
    fn apply_tag(tag: &lofty::Tag, metadata: &mut ExtractedMetadata) {
        for item in tag.items() {
            match item.key() {
                lofty::ItemKey::TrackTitle if metadata.title.is_none() => {
                    metadata.title = non_empty(item.value().text());
                }
                lofty::ItemKey::TrackArtist if metadata.artist.is_none() => {
                    metadata.artist = non_empty(item.value().text());
                }
                _ => {}
            }
        }

        metadata.pictures = tag
            .pictures()
            .iter()
            .map(|picture| {
                let mime_type = picture
                    .mime_type()
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                EmbeddedPicture::new(picture.data().to_vec(), mime_type)
            })
            .collect();
    }

    /// Read metadata from bytes, reporting crate-level errors
    pub fn read(&self, name: &str, data: &[u8]) -> Result<ExtractedMetadata> {
        let tagged_file = Self::read_tagged_file(name, data)?;

        let mut metadata = ExtractedMetadata::new();

        let duration = tagged_file.properties().duration();
        if duration > Duration::ZERO {
            metadata.duration = Some(duration);
        }

        // Get primary tag or first tag (if available)
        if let Some(tag) = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
        {
            Self::apply_tag(tag, &mut metadata);
        }

        tracing::debug!(
            file = name,
            title = ?metadata.title,
            artist = ?metadata.artist,
            pictures = metadata.pictures.len(),
            "Extracted metadata"
        );

        Ok(metadata)
    }
}

impl Default for LoftyMetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataExtractor for LoftyMetadataExtractor {
    fn extract(&self, name: &str, data: &[u8]) -> lilt_core::Result<ExtractedMetadata> {
        Ok(self.read(name, data)?)
    }
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
