//! Ordered playlist with id lookup and wraparound navigation
//!
//! Insertion order defines next/previous traversal. The list is replaced
//! wholesale by each ingestion batch and never merged with a previous one.

use crate::types::{Direction, PlaylistEntry};
use lilt_core::EntryId;

/// Ordered sequence of playlist entries
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    entries: Vec<PlaylistEntry>,
}

impl Playlist {
    /// Create new empty playlist
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Discard current entries and install a new ordered list
    ///
    /// Does not touch playback; callers stop the session first if needed.
    pub fn replace_all(&mut self, entries: Vec<PlaylistEntry>) {
        debug_assert!(
            Self::ids_unique(&entries),
            "playlist entries must have unique ids"
        );
        self.entries = entries;
    }

    /// Append one entry
    pub fn push(&mut self, entry: PlaylistEntry) {
        debug_assert!(
            self.index_of(&entry.id).is_none(),
            "duplicate playlist entry id {}",
            entry.id
        );
        self.entries.push(entry);
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Look up an entry by id
    pub fn find_by_id(&self, id: &EntryId) -> Option<&PlaylistEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// Position of an entry by id
    pub fn index_of(&self, id: &EntryId) -> Option<usize> {
        self.entries.iter().position(|e| &e.id == id)
    }

    /// Index of the neighbour of `current` in `direction`, with wraparound
    ///
    /// Past the last entry `Next` returns 0; before the first entry
    /// `Previous` returns the last index. Must not be called on an empty
    /// playlist (returns 0 in that case).
    pub fn neighbor_index(&self, current: usize, direction: Direction) -> usize {
        let len = self.entries.len();
        debug_assert!(len > 0, "neighbor_index called on an empty playlist");
        if len == 0 {
            return 0;
        }

        let current = current % len;
        match direction {
            Direction::Next => (current + 1) % len,
            Direction::Previous => (current + len - 1) % len,
        }
    }

    /// Entry at index
    pub fn get(&self, index: usize) -> Option<&PlaylistEntry> {
        self.entries.get(index)
    }

    /// First entry
    pub fn first(&self) -> Option<&PlaylistEntry> {
        self.entries.first()
    }

    /// All entries in order
    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    /// Iterate entries in order
    pub fn iter(&self) -> std::slice::Iter<'_, PlaylistEntry> {
        self.entries.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if playlist is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ids_unique(entries: &[PlaylistEntry]) -> bool {
        let mut seen = std::collections::HashSet::new();
        entries.iter().all(|e| seen.insert(&e.id))
    }
}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a PlaylistEntry;
    type IntoIter = std::slice::Iter<'a, PlaylistEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lilt_core::SourceFile;
    use std::time::Duration;

    fn create_test_entry(id: &str) -> PlaylistEntry {
        PlaylistEntry {
            id: EntryId::new(id),
            title: format!("Track {}", id),
            author: "Test Artist".to_string(),
            duration: Duration::from_secs(180),
            source: SourceFile::new(format!("{}.mp3", id), vec![0u8; 8]).to_source_ref(),
            cover: None,
        }
    }

    fn playlist_of(ids: &[&str]) -> Playlist {
        let mut playlist = Playlist::new();
        playlist.replace_all(ids.iter().map(|id| create_test_entry(id)).collect());
        playlist
    }

    #[test]
    fn create_empty_playlist() {
        let playlist = Playlist::new();
        assert_eq!(playlist.len(), 0);
        assert!(playlist.is_empty());
        assert!(playlist.first().is_none());
    }

    #[test]
    fn replace_all_discards_previous_entries() {
        let mut playlist = playlist_of(&["1", "2", "3"]);
        playlist.replace_all(vec![create_test_entry("4")]);

        assert_eq!(playlist.len(), 1);
        assert!(playlist.find_by_id(&EntryId::new("1")).is_none());
        assert_eq!(playlist.first().unwrap().id, EntryId::new("4"));
    }

    #[test]
    fn lookup_by_id() {
        let playlist = playlist_of(&["a", "b", "c"]);

        assert_eq!(playlist.index_of(&EntryId::new("b")), Some(1));
        assert_eq!(
            playlist.find_by_id(&EntryId::new("c")).unwrap().title,
            "Track c"
        );
        assert_eq!(playlist.index_of(&EntryId::new("missing")), None);
        assert!(playlist.find_by_id(&EntryId::new("missing")).is_none());
    }

    #[test]
    fn next_wraps_to_first() {
        let playlist = playlist_of(&["a", "b", "c"]);
        assert_eq!(playlist.neighbor_index(0, Direction::Next), 1);
        assert_eq!(playlist.neighbor_index(2, Direction::Next), 0);
    }

    #[test]
    fn previous_wraps_to_last() {
        let playlist = playlist_of(&["a", "b", "c"]);
        assert_eq!(playlist.neighbor_index(2, Direction::Previous), 1);
        assert_eq!(playlist.neighbor_index(0, Direction::Previous), 2);
    }

    #[test]
    fn single_entry_is_its_own_neighbor() {
        let playlist = playlist_of(&["only"]);
        assert_eq!(playlist.neighbor_index(0, Direction::Next), 0);
        assert_eq!(playlist.neighbor_index(0, Direction::Previous), 0);
    }

    #[test]
    fn push_preserves_insertion_order() {
        let mut playlist = Playlist::new();
        playlist.push(create_test_entry("x"));
        playlist.push(create_test_entry("y"));

        let ids: Vec<_> = playlist.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y"]);
        assert_eq!(playlist.get(1).unwrap().id, EntryId::new("y"));
    }

    #[test]
    fn clear_playlist() {
        let mut playlist = playlist_of(&["1", "2"]);
        playlist.clear();
        assert!(playlist.is_empty());
    }
}
