//! Builds playlist entries from raw files and extracted metadata

use crate::config::PlayerConfig;
use crate::types::PlaylistEntry;
use lilt_artwork::CoverSelector;
use lilt_core::{ExtractedMetadata, IdGenerator, SourceFile, UuidGenerator};
use std::sync::Arc;
use std::time::Duration;

/// Title used when neither tags nor the file name provide one
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Turns one raw file plus its extracted metadata into a [`PlaylistEntry`]
///
/// Never fails: missing fields fall back to the file name, the unknown-author
/// sentinel or a zero duration. The extractor is not called here.
pub struct PlaylistEntryFactory {
    ids: Arc<dyn IdGenerator>,
    covers: CoverSelector,
    unknown_author: String,
}

impl PlaylistEntryFactory {
    /// Create a factory with default settings and UUID ids
    pub fn new() -> Self {
        Self::with_config(&PlayerConfig::default())
    }

    /// Create a factory using the sentinel and artwork cap from `config`
    pub fn with_config(config: &PlayerConfig) -> Self {
        Self {
            ids: Arc::new(UuidGenerator),
            covers: CoverSelector::new(config.max_artwork_bytes),
            unknown_author: config.unknown_author.clone(),
        }
    }

    /// Replace the id generator
    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Build an entry with a fresh id
    pub fn create(&self, file: &SourceFile, metadata: ExtractedMetadata) -> PlaylistEntry {
        let title = metadata
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| fallback_title(file.name()));

        let author = metadata
            .artist
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| self.unknown_author.clone());

        let cover = match self.covers.select(&metadata.pictures) {
            Ok(cover) => cover,
            Err(e) => {
                tracing::warn!("Ignoring cover of {}: {}", file.name(), e);
                None
            }
        };

        let entry = PlaylistEntry {
            id: self.ids.new_id(),
            title,
            author,
            duration: metadata.duration.unwrap_or(Duration::ZERO),
            source: file.to_source_ref(),
            cover,
        };

        tracing::debug!(
            "Created entry {} ({} - {}) from {}",
            entry.id,
            entry.author,
            entry.title,
            file.name()
        );

        entry
    }
}

impl Default for PlaylistEntryFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PlaylistEntryFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaylistEntryFactory")
            .field("max_artwork_bytes", &self.covers.max_size())
            .field("unknown_author", &self.unknown_author)
            .finish_non_exhaustive()
    }
}

fn fallback_title(file_name: &str) -> String {
    if file_name.trim().is_empty() {
        UNKNOWN_TITLE.to_string()
    } else {
        file_name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UNKNOWN_AUTHOR;
    use lilt_core::{EmbeddedPicture, EntryId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SequentialIds(AtomicUsize);

    impl IdGenerator for SequentialIds {
        fn new_id(&self) -> EntryId {
            EntryId::new(format!("id-{}", self.0.fetch_add(1, Ordering::SeqCst)))
        }
    }

    fn file(name: &str) -> SourceFile {
        SourceFile::new(name, vec![1u8, 2, 3])
    }

    #[test]
    fn uses_extracted_fields() {
        let factory = PlaylistEntryFactory::new();
        let metadata = ExtractedMetadata {
            title: Some("Song".into()),
            artist: Some("Band".into()),
            duration: Some(Duration::from_secs(200)),
            pictures: Vec::new(),
        };

        let entry = factory.create(&file("song.mp3"), metadata);
        assert_eq!(entry.title, "Song");
        assert_eq!(entry.author, "Band");
        assert_eq!(entry.duration, Duration::from_secs(200));
        assert!(entry.cover.is_none());
        assert_eq!(entry.source.name(), "song.mp3");
    }

    #[test]
    fn falls_back_to_filename_and_sentinel() {
        let factory = PlaylistEntryFactory::new();
        let entry = factory.create(&file("01 - Intro.flac"), ExtractedMetadata::new());

        assert_eq!(entry.title, "01 - Intro.flac");
        assert_eq!(entry.author, "unknown composer");
        assert_eq!(entry.duration, Duration::ZERO);
    }

    #[test]
    fn blank_fields_count_as_absent() {
        let factory = PlaylistEntryFactory::new();
        let metadata = ExtractedMetadata {
            title: Some("   ".into()),
            artist: Some(String::new()),
            ..ExtractedMetadata::new()
        };

        let entry = factory.create(&file("a.mp3"), metadata);
        assert_eq!(entry.title, "a.mp3");
        assert_eq!(entry.author, UNKNOWN_AUTHOR);
    }

    #[test]
    fn empty_filename_gets_unknown_title() {
        let factory = PlaylistEntryFactory::new();
        let entry = factory.create(&file(""), ExtractedMetadata::new());
        assert_eq!(entry.title, UNKNOWN_TITLE);
    }

    #[test]
    fn first_picture_becomes_cover() {
        let factory = PlaylistEntryFactory::new();
        let metadata = ExtractedMetadata {
            pictures: vec![
                EmbeddedPicture::new(vec![0xFF, 0xD8], "image/jpeg"),
                EmbeddedPicture::new(vec![0x89, 0x50], "image/png"),
            ],
            ..ExtractedMetadata::new()
        };

        let entry = factory.create(&file("a.mp3"), metadata);
        let cover = entry.cover.expect("cover");
        assert_eq!(cover.mime_type(), "image/jpeg");
        assert!(cover.uri().starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn oversized_cover_is_dropped() {
        let config = PlayerConfig {
            max_artwork_bytes: 2,
            ..PlayerConfig::default()
        };
        let factory = PlaylistEntryFactory::with_config(&config);
        let metadata = ExtractedMetadata {
            pictures: vec![EmbeddedPicture::new(vec![0; 3], "image/png")],
            ..ExtractedMetadata::new()
        };

        assert!(factory.create(&file("a.mp3"), metadata).cover.is_none());
    }

    #[test]
    fn custom_sentinel_and_ids() {
        let config = PlayerConfig {
            unknown_author: "nobody".into(),
            ..PlayerConfig::default()
        };
        let factory = PlaylistEntryFactory::with_config(&config)
            .with_id_generator(Arc::new(SequentialIds(AtomicUsize::new(0))));

        let a = factory.create(&file("a.mp3"), ExtractedMetadata::new());
        let b = factory.create(&file("b.mp3"), ExtractedMetadata::new());

        assert_eq!(a.author, "nobody");
        assert_eq!(a.id, EntryId::new("id-0"));
        assert_eq!(b.id, EntryId::new("id-1"));
    }

    #[test]
    fn generated_ids_are_distinct() {
        let factory = PlaylistEntryFactory::default();
        let a = factory.create(&file("a.mp3"), ExtractedMetadata::new());
        let b = factory.create(&file("a.mp3"), ExtractedMetadata::new());
        assert_ne!(a.id, b.id);
    }
}
