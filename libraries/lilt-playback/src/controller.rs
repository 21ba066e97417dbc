//! Player controller: the playback state machine
//!
//! Composes the [`Playlist`] and the [`PlaybackSession`] and implements
//! play-by-id, next/previous with wraparound, clear and ingestion. Every
//! operation that can change the active track releases the current resource
//! before binding a new one, so at most one resource is ever live.

use crate::config::PlayerConfig;
use crate::error::Result;
use crate::factory::PlaylistEntryFactory;
use crate::playlist::Playlist;
use crate::session::PlaybackSession;
use crate::types::{Direction, PlayerSnapshot, PlayerState, PlaylistEntry};
use lilt_core::{
    AudioEngine, CompletionSink, EntryId, ExtractedMetadata, MetadataExtractor, NotificationKind,
    Notifier, PlaybackToken, SourceFile,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Message shown when an ingestion batch is accepted
pub const TRACKS_ADDED_MESSAGE: &str = "Tracks added successfully!";

/// Identifies one ingestion batch
///
/// Units completed for a batch that is no longer current are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(u64);

impl BatchId {
    /// Sequence number of the batch
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// A file that could not be turned into a playlist entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestFailure {
    pub file_name: String,
    pub reason: String,
}

/// Outcome of one ingestion batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Number of entries appended to the playlist
    pub added: usize,

    /// Files skipped because extraction failed
    pub failed: Vec<IngestFailure>,
}

impl IngestReport {
    /// Number of files the batch covered
    pub fn total(&self) -> usize {
        self.added + self.failed.len()
    }

    /// Whether every file was added
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug)]
struct PendingBatch {
    id: BatchId,
    remaining: usize,
    report: IngestReport,
}

/// Owns the playlist and the playback session
pub struct PlayerController {
    playlist: Playlist,
    session: PlaybackSession,
    factory: PlaylistEntryFactory,
    notifier: Arc<dyn Notifier>,
    batch_seq: u64,
    batch: Option<PendingBatch>,
}

impl PlayerController {
    /// Create controller
    ///
    /// # Errors
    /// Returns an error if `config` is invalid
    pub fn new(
        engine: Box<dyn AudioEngine>,
        notifier: Arc<dyn Notifier>,
        config: &PlayerConfig,
    ) -> Result<Self> {
        config.validate()?;

        let mut session = PlaybackSession::new(engine);
        session.set_volume(config.initial_volume)?;

        Ok(Self {
            playlist: Playlist::new(),
            session,
            factory: PlaylistEntryFactory::with_config(config),
            notifier,
            batch_seq: 0,
            batch: None,
        })
    }

    /// Create controller with default configuration
    pub fn with_defaults(engine: Box<dyn AudioEngine>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            playlist: Playlist::new(),
            session: PlaybackSession::new(engine),
            factory: PlaylistEntryFactory::new(),
            notifier,
            batch_seq: 0,
            batch: None,
        }
    }

    /// Replace the entry factory
    #[must_use]
    pub fn with_factory(mut self, factory: PlaylistEntryFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Register where track-ended signals are delivered
    ///
    /// The sink receives the token of the finished resource; feed it back
    /// through [`handle_track_ended`](Self::handle_track_ended).
    pub fn set_completion_sink(&mut self, sink: CompletionSink) {
        self.session.on_completion(sink);
    }

    // ===== Transport =====

    /// Play the entry with `id`
    ///
    /// Unknown ids are ignored, so late callbacks referring to a replaced
    /// list do nothing.
    ///
    /// # Errors
    /// Returns [`PlaybackError::ResourceStart`](crate::PlaybackError::ResourceStart)
    /// if the engine cannot start the track. The target stays active.
    pub fn play_by_id(&mut self, id: &EntryId) -> Result<()> {
        let Some(entry) = self.playlist.find_by_id(id) else {
            tracing::debug!("Ignoring play request for unknown entry {}", id);
            return Ok(());
        };

        self.session.release();

        match self.session.bind(entry) {
            Ok(token) => {
                tracing::info!("Now playing {} ({}), token {}", entry.title, entry.id, token);
                self.notifier.notify(
                    &format!("Now playing: {}", entry.title),
                    NotificationKind::Success,
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to start {}: {}", entry.title, e);
                Err(e)
            }
        }
    }

    /// Play the first entry; does nothing on an empty playlist
    pub fn start_first(&mut self) -> Result<()> {
        let Some(first) = self.playlist.first() else {
            return Ok(());
        };
        let id = first.id.clone();
        self.play_by_id(&id)
    }

    /// Play the neighbour of the active entry, wrapping at both ends
    ///
    /// With no active entry the first entry is played regardless of
    /// direction. If the active entry is no longer in the playlist, next
    /// goes to the first entry and previous to the last.
    pub fn play_previous_or_next(&mut self, is_next: bool) -> Result<()> {
        if self.playlist.is_empty() {
            return Ok(());
        }

        let Some(active) = self.session.active_entry_id() else {
            return self.start_first();
        };

        let direction = Direction::from_is_next(is_next);
        let target = match self.playlist.index_of(active) {
            Some(current) => self.playlist.neighbor_index(current, direction),
            None => match direction {
                Direction::Next => 0,
                Direction::Previous => self.playlist.len() - 1,
            },
        };

        let Some(entry) = self.playlist.get(target) else {
            return Ok(());
        };
        let id = entry.id.clone();
        self.play_by_id(&id)
    }

    /// Play the next entry
    pub fn next(&mut self) -> Result<()> {
        self.play_previous_or_next(true)
    }

    /// Play the previous entry
    pub fn previous(&mut self) -> Result<()> {
        self.play_previous_or_next(false)
    }

    /// React to a resource reaching its natural end
    ///
    /// Advances to the next entry if `token` belongs to the bound resource;
    /// completions of released resources are ignored.
    pub fn handle_track_ended(&mut self, token: PlaybackToken) -> Result<()> {
        if !self.session.is_current(token) {
            tracing::warn!(
                "Ignoring stale completion {} (current {})",
                token,
                self.session.token()
            );
            return Ok(());
        }

        tracing::debug!("Track {} ended, advancing", token);
        self.play_previous_or_next(true)
    }

    /// Pause or resume
    ///
    /// With nothing bound, restarts the active entry, or the first entry if
    /// there is none.
    pub fn toggle_pause(&mut self) -> Result<()> {
        if self.session.is_bound() {
            if self.session.is_paused() {
                self.session.resume()
            } else {
                self.session.pause()
            }
        } else {
            match self.session.active_entry_id() {
                Some(active) if self.playlist.index_of(active).is_some() => {
                    let id = active.clone();
                    self.play_by_id(&id)
                }
                _ => self.start_first(),
            }
        }
    }

    /// Seek within the bound resource
    pub fn seek(&mut self, position: Duration) -> Result<()> {
        self.session.seek(position)
    }

    /// Set linear volume (0.0 to 1.0)
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.session.set_volume(volume)
    }

    /// Stop playback, empty the playlist and forget the active entry
    ///
    /// Also supersedes any ingestion batch still in progress.
    pub fn clear_all(&mut self) {
        self.session.reset();
        self.playlist.clear();
        self.batch = None;
        tracing::info!("Playlist cleared");
    }

    /// Stop playback and drop pending work
    pub fn shutdown(&mut self) {
        self.session.reset();
        self.batch = None;
    }

    // ===== Ingestion =====

    /// Start a new ingestion batch of `count` files
    ///
    /// Stops playback, clears the playlist and the active entry, and emits
    /// the success notification. Returns `None` (and changes nothing) when
    /// `count` is zero.
    pub fn begin_ingest(&mut self, count: usize) -> Option<BatchId> {
        if count == 0 {
            return None;
        }

        self.session.reset();
        self.playlist.clear();

        self.batch_seq += 1;
        let id = BatchId(self.batch_seq);
        if let Some(previous) = self.batch.replace(PendingBatch {
            id,
            remaining: count,
            report: IngestReport::default(),
        }) {
            tracing::debug!(
                "Batch {} superseded with {} files outstanding",
                previous.id.sequence(),
                previous.remaining
            );
        }

        tracing::info!("Ingesting {} files (batch {})", count, id.sequence());
        self.notifier
            .notify(TRACKS_ADDED_MESSAGE, NotificationKind::Success);
        Some(id)
    }

    /// Record the extraction result of one file of `batch`
    ///
    /// Appends an entry on success and skips the file on failure. Returns
    /// the batch report once every file of the batch has been recorded.
    /// Results for a superseded batch are discarded.
    pub fn complete_ingest_unit(
        &mut self,
        batch: BatchId,
        file: &SourceFile,
        result: lilt_core::Result<ExtractedMetadata>,
    ) -> Option<IngestReport> {
        let pending = match self.batch.as_mut() {
            Some(pending) if pending.id == batch => pending,
            _ => {
                tracing::debug!(
                    "Discarding {} from superseded batch {}",
                    file.name(),
                    batch.sequence()
                );
                return None;
            }
        };

        match result {
            Ok(metadata) => {
                let entry = self.factory.create(file, metadata);
                self.playlist.push(entry);
                pending.report.added += 1;
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {}", file.name(), e);
                pending.report.failed.push(IngestFailure {
                    file_name: file.name().to_string(),
                    reason: e.to_string(),
                });
            }
        }

        pending.remaining = pending.remaining.saturating_sub(1);
        if pending.remaining > 0 {
            return None;
        }

        let report = self.batch.take().map(|done| done.report)?;
        if !report.is_complete() {
            self.notifier.notify(
                &format!(
                    "{} of {} files could not be read",
                    report.failed.len(),
                    report.total()
                ),
                NotificationKind::Info,
            );
        }
        tracing::info!(
            "Batch {} done: {} added, {} failed",
            batch.sequence(),
            report.added,
            report.failed.len()
        );
        Some(report)
    }

    /// Ingest `files` synchronously, in input order
    pub fn ingest(
        &mut self,
        files: &[SourceFile],
        extractor: &dyn MetadataExtractor,
    ) -> IngestReport {
        let Some(batch) = self.begin_ingest(files.len()) else {
            return IngestReport::default();
        };

        let mut report = None;
        for file in files {
            let result = extractor.extract(file.name(), file.data());
            report = self.complete_ingest_unit(batch, file, result);
        }
        report.unwrap_or_default()
    }

    /// Replace the playlist with prepared entries
    ///
    /// Stops playback and supersedes any batch in progress.
    pub fn load_entries(&mut self, entries: Vec<PlaylistEntry>) {
        self.session.reset();
        self.batch = None;
        self.playlist.replace_all(entries);
    }

    /// Batch currently being ingested
    pub fn pending_batch(&self) -> Option<BatchId> {
        self.batch.as_ref().map(|b| b.id)
    }

    // ===== Queries =====

    /// The playlist
    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Id of the active entry
    pub fn active_entry_id(&self) -> Option<&EntryId> {
        self.session.active_entry_id()
    }

    /// The active entry, if it is still in the playlist
    pub fn active_entry(&self) -> Option<&PlaylistEntry> {
        self.session
            .active_entry_id()
            .and_then(|id| self.playlist.find_by_id(id))
    }

    /// Whether playback is paused; `true` when nothing is bound
    pub fn is_paused(&self) -> bool {
        self.session.is_paused()
    }

    /// Playback position of the bound resource
    pub fn position(&self) -> Duration {
        self.session.position()
    }

    /// Current linear volume
    pub fn volume(&self) -> f32 {
        self.session.volume()
    }

    /// Token of the most recent bind
    pub fn current_token(&self) -> PlaybackToken {
        self.session.token()
    }

    /// Current state
    pub fn state(&self) -> PlayerState {
        if self.session.is_bound() {
            PlayerState::Playing
        } else {
            PlayerState::Idle
        }
    }

    /// Serializable view for rendering layers
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            state: self.state(),
            entries: self.playlist.iter().map(PlaylistEntry::summary).collect(),
            active_entry_id: self.session.active_entry_id().cloned(),
            is_paused: self.session.is_paused(),
            volume: self.session.volume(),
        }
    }
}

impl std::fmt::Debug for PlayerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerController")
            .field("entries", &self.playlist.len())
            .field("session", &self.session)
            .field("batch", &self.batch)
            .finish_non_exhaustive()
    }
}
