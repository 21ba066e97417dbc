//! Core types for playback management

use lilt_artwork::CoverRef;
use lilt_core::{EntryId, SourceRef};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One ingested track
///
/// Owns its playable source and optional cover. Both are released when the
/// entry (or the playlist holding it) is dropped, unless a live audio
/// resource still shares the source.
#[derive(Debug, Clone)]
pub struct PlaylistEntry {
    /// Unique identifier, the only lookup key
    pub id: EntryId,

    /// Track title (never empty)
    pub title: String,

    /// Author name (never empty)
    pub author: String,

    /// Track duration, zero when unknown
    pub duration: Duration,

    /// Playable source
    pub source: SourceRef,

    /// Cover image, if the file carried one
    pub cover: Option<CoverRef>,
}

impl PlaylistEntry {
    /// Duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }

    /// Display view of this entry
    pub fn summary(&self) -> EntrySummary {
        EntrySummary {
            id: self.id.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            duration_seconds: self.duration_seconds(),
            cover_uri: self.cover.as_ref().map(|c| c.uri().to_string()),
        }
    }
}

/// Serializable display view of a playlist entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySummary {
    pub id: EntryId,
    pub title: String,
    pub author: String,
    pub duration_seconds: f64,
    pub cover_uri: Option<String>,
}

/// Player state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// No resource bound
    Idle,

    /// One entry bound to a live resource (possibly paused)
    Playing,
}

/// Point-in-time view of the player for rendering layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub state: PlayerState,
    pub entries: Vec<EntrySummary>,
    pub active_entry_id: Option<EntryId>,
    pub is_paused: bool,
    pub volume: f32,
}

impl PlayerSnapshot {
    /// Summary of the active entry, if it is still in the playlist
    pub fn active_entry(&self) -> Option<&EntrySummary> {
        let active = self.active_entry_id.as_ref()?;
        self.entries.iter().find(|e| &e.id == active)
    }
}

/// Navigation direction through the playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Towards the end, wrapping to the first entry
    Next,

    /// Towards the start, wrapping to the last entry
    Previous,
}

impl Direction {
    /// `Next` for `true`, `Previous` for `false`
    pub fn from_is_next(is_next: bool) -> Self {
        if is_next {
            Direction::Next
        } else {
            Direction::Previous
        }
    }
}
