//! Event loop driving the player controller
//!
//! All state transitions run on one tokio task. User commands, track-ended
//! signals from the engine and per-file extraction results are messages on a
//! single channel, handled one at a time. Metadata extraction runs on the
//! blocking pool and posts its result back, so entries are appended in
//! completion order. An extractor panic counts as a failure for that file.

use crate::controller::{BatchId, IngestReport, PlayerController};
use crate::error::{PlaybackError, Result};
use crate::types::PlayerSnapshot;
use lilt_core::{
    EntryId, ExtractedMetadata, LiltError, MetadataExtractor, PlaybackToken, SourceFile,
};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Commands accepted by the player loop
#[derive(Debug)]
pub enum PlayerCommand {
    PlayById(EntryId),
    StartFirst,
    Next,
    Previous,
    ClearAll,
    Ingest {
        files: Vec<SourceFile>,
        done: Option<oneshot::Sender<Option<IngestReport>>>,
    },
    TogglePause,
    Seek(Duration),
    SetVolume(f32),
    Snapshot(oneshot::Sender<PlayerSnapshot>),
    Shutdown,
}

#[derive(Debug)]
enum LoopMessage {
    Command {
        command: PlayerCommand,
        reply: oneshot::Sender<Result<()>>,
    },
    TrackEnded(PlaybackToken),
    Extracted {
        batch: BatchId,
        file: SourceFile,
        result: lilt_core::Result<ExtractedMetadata>,
    },
}

/// Spawns the player loop
pub struct PlayerService;

impl PlayerService {
    /// Move `controller` onto a new task and return a handle to it
    ///
    /// Must be called from within a tokio runtime. The loop stops on
    /// [`PlayerHandle::shutdown`] or when every handle has been dropped.
    pub fn spawn(
        mut controller: PlayerController,
        extractor: Arc<dyn MetadataExtractor>,
    ) -> (PlayerHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let weak = tx.downgrade();

        let ended = weak.clone();
        controller.set_completion_sink(Arc::new(move |token| {
            if let Some(tx) = ended.upgrade() {
                let _ = tx.send(LoopMessage::TrackEnded(token));
            }
        }));

        let event_loop = EventLoop {
            controller,
            extractor,
            rx,
            tx: weak,
            waiters: HashMap::new(),
        };

        let task = tokio::spawn(event_loop.run());
        (PlayerHandle { tx }, task)
    }
}

struct EventLoop {
    controller: PlayerController,
    extractor: Arc<dyn MetadataExtractor>,
    rx: mpsc::UnboundedReceiver<LoopMessage>,
    tx: mpsc::WeakUnboundedSender<LoopMessage>,
    waiters: HashMap<BatchId, oneshot::Sender<Option<IngestReport>>>,
}

impl EventLoop {
    async fn run(mut self) {
        tracing::debug!("Player loop started");

        while let Some(message) = self.rx.recv().await {
            if !self.handle(message) {
                break;
            }
        }

        self.controller.shutdown();
        tracing::debug!("Player loop stopped");
    }

    /// Returns `false` when the loop should stop
    fn handle(&mut self, message: LoopMessage) -> bool {
        match message {
            LoopMessage::Command { command, reply } => {
                if matches!(command, PlayerCommand::Shutdown) {
                    self.controller.shutdown();
                    let _ = reply.send(Ok(()));
                    return false;
                }
                let result = self.apply(command);
                if let Err(e) = &result {
                    tracing::warn!("Command failed: {}", e);
                }
                let _ = reply.send(result);
            }
            LoopMessage::TrackEnded(token) => {
                if let Err(e) = self.controller.handle_track_ended(token) {
                    tracing::error!("Auto-advance failed: {}", e);
                }
            }
            LoopMessage::Extracted {
                batch,
                file,
                result,
            } => {
                if let Some(report) = self.controller.complete_ingest_unit(batch, &file, result) {
                    if let Some(waiter) = self.waiters.remove(&batch) {
                        let _ = waiter.send(Some(report));
                    }
                }
            }
        }
        true
    }

    fn apply(&mut self, command: PlayerCommand) -> Result<()> {
        match command {
            PlayerCommand::PlayById(id) => self.controller.play_by_id(&id),
            PlayerCommand::StartFirst => self.controller.start_first(),
            PlayerCommand::Next => self.controller.next(),
            PlayerCommand::Previous => self.controller.previous(),
            PlayerCommand::ClearAll => {
                self.controller.clear_all();
                self.release_waiters();
                Ok(())
            }
            PlayerCommand::Ingest { files, done } => {
                self.ingest(files, done);
                Ok(())
            }
            PlayerCommand::TogglePause => self.controller.toggle_pause(),
            PlayerCommand::Seek(position) => self.controller.seek(position),
            PlayerCommand::SetVolume(volume) => self.controller.set_volume(volume),
            PlayerCommand::Snapshot(reply) => {
                let _ = reply.send(self.controller.snapshot());
                Ok(())
            }
            PlayerCommand::Shutdown => Ok(()),
        }
    }

    fn ingest(
        &mut self,
        files: Vec<SourceFile>,
        done: Option<oneshot::Sender<Option<IngestReport>>>,
    ) {
        let Some(batch) = self.controller.begin_ingest(files.len()) else {
            if let Some(done) = done {
                let _ = done.send(None);
            }
            return;
        };

        // A new batch supersedes every earlier one
        self.release_waiters();
        if let Some(done) = done {
            self.waiters.insert(batch, done);
        }

        let Some(tx) = self.tx.upgrade() else {
            return;
        };

        for file in files {
            let extractor = Arc::clone(&self.extractor);
            let tx = tx.clone();
            tokio::task::spawn_blocking(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    extractor.extract(file.name(), file.data())
                }))
                .unwrap_or_else(|_| {
                    tracing::error!("Metadata extractor panicked on {}", file.name());
                    Err(LiltError::metadata(format!(
                        "extractor panicked on {}",
                        file.name()
                    )))
                });
                let _ = tx.send(LoopMessage::Extracted {
                    batch,
                    file,
                    result,
                });
            });
        }
    }

    fn release_waiters(&mut self) {
        for (_, waiter) in self.waiters.drain() {
            let _ = waiter.send(None);
        }
    }
}

/// Cloneable handle to a running player loop
///
/// Every method returns [`PlaybackError::ServiceClosed`] once the loop has
/// stopped.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    tx: mpsc::UnboundedSender<LoopMessage>,
}

impl PlayerHandle {
    /// Send a command and wait until the loop has applied it
    pub async fn send(&self, command: PlayerCommand) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(LoopMessage::Command { command, reply })
            .map_err(|_| PlaybackError::ServiceClosed)?;
        rx.await.map_err(|_| PlaybackError::ServiceClosed)?
    }

    /// Play the entry with `id`
    pub async fn play_by_id(&self, id: EntryId) -> Result<()> {
        self.send(PlayerCommand::PlayById(id)).await
    }

    /// Play the first entry
    pub async fn start_first(&self) -> Result<()> {
        self.send(PlayerCommand::StartFirst).await
    }

    /// Play the next entry
    pub async fn next(&self) -> Result<()> {
        self.send(PlayerCommand::Next).await
    }

    /// Play the previous entry
    pub async fn previous(&self) -> Result<()> {
        self.send(PlayerCommand::Previous).await
    }

    /// Stop playback and empty the playlist
    pub async fn clear_all(&self) -> Result<()> {
        self.send(PlayerCommand::ClearAll).await
    }

    /// Pause or resume
    pub async fn toggle_pause(&self) -> Result<()> {
        self.send(PlayerCommand::TogglePause).await
    }

    /// Seek within the current track
    pub async fn seek(&self, position: Duration) -> Result<()> {
        self.send(PlayerCommand::Seek(position)).await
    }

    /// Set linear volume (0.0 to 1.0)
    pub async fn set_volume(&self, volume: f32) -> Result<()> {
        self.send(PlayerCommand::SetVolume(volume)).await
    }

    /// Start ingesting `files`; returns once the batch has begun
    pub async fn ingest(&self, files: Vec<SourceFile>) -> Result<()> {
        self.send(PlayerCommand::Ingest { files, done: None }).await
    }

    /// Ingest `files` and wait for every file to be processed
    ///
    /// Returns `None` for an empty file set or when the batch was
    /// superseded by a later ingest or a clear.
    pub async fn ingest_and_wait(&self, files: Vec<SourceFile>) -> Result<Option<IngestReport>> {
        let (done, rx) = oneshot::channel();
        self.send(PlayerCommand::Ingest {
            files,
            done: Some(done),
        })
        .await?;
        rx.await.map_err(|_| PlaybackError::ServiceClosed)
    }

    /// Discover audio files under `path` and ingest them
    ///
    /// Returns the number of files queued for extraction.
    pub async fn ingest_path(&self, path: PathBuf, extensions: Vec<String>) -> Result<usize> {
        let files = tokio::task::spawn_blocking(move || {
            lilt_metadata::discover_files(&path, extensions.as_slice())
                .map(|paths| lilt_metadata::load_sources(&paths))
        })
        .await
        .map_err(|e| LiltError::Other(e.to_string()))?
        .map_err(LiltError::from)?;

        let count = files.len();
        self.ingest(files).await?;
        Ok(count)
    }

    /// Current player state
    pub async fn snapshot(&self) -> Result<PlayerSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(PlayerCommand::Snapshot(reply)).await?;
        rx.await.map_err(|_| PlaybackError::ServiceClosed)
    }

    /// Stop playback and end the loop
    pub async fn shutdown(&self) -> Result<()> {
        self.send(PlayerCommand::Shutdown).await
    }

    /// Whether the loop is still accepting commands
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}
