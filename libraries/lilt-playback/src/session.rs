//! The single live audio-resource binding
//!
//! A session owns at most one [`AudioResource`]. Callers must [`release`]
//! before [`bind`]ing a new entry; the controller does this at every entry
//! point, so the session does not re-check it.
//!
//! [`release`]: PlaybackSession::release
//! [`bind`]: PlaybackSession::bind

use crate::error::{PlaybackError, Result};
use crate::types::PlaylistEntry;
use lilt_core::{
    AudioEngine, AudioResource, CompletionSignal, CompletionSink, EntryId, PlaybackToken,
};
use std::sync::Arc;
use std::time::Duration;

/// Owns the engine and the currently bound resource
pub struct PlaybackSession {
    engine: Box<dyn AudioEngine>,
    resource: Option<Box<dyn AudioResource>>,
    active_entry_id: Option<EntryId>,
    token: PlaybackToken,
    on_completion: Option<CompletionSink>,
    volume: f32,
}

impl PlaybackSession {
    /// Create an unbound session over `engine`
    pub fn new(engine: Box<dyn AudioEngine>) -> Self {
        Self {
            engine,
            resource: None,
            active_entry_id: None,
            token: PlaybackToken::new(0),
            on_completion: None,
            volume: 1.0,
        }
    }

    /// Register where completion signals of future resources are delivered
    ///
    /// Each bound resource gets its own one-shot signal carrying the token
    /// it was bound with.
    pub fn on_completion(&mut self, sink: CompletionSink) {
        self.on_completion = Some(sink);
    }

    /// Create and start a resource for `entry`
    ///
    /// Sets `entry` as the active entry even if starting fails, so
    /// navigation can continue from it. On failure nothing stays bound.
    pub fn bind(&mut self, entry: &PlaylistEntry) -> Result<PlaybackToken> {
        debug_assert!(self.resource.is_none(), "bind called without release");

        self.token = self.token.next();
        self.active_entry_id = Some(entry.id.clone());

        let sink = self
            .on_completion
            .clone()
            .unwrap_or_else(|| Arc::new(|_| {}));
        let signal = CompletionSignal::new(self.token, sink);

        let mut resource = self
            .engine
            .create(&entry.source, signal)
            .map_err(|e| PlaybackError::ResourceStart(e.to_string()))?;

        let started = resource
            .set_volume(self.volume)
            .and_then(|()| resource.play());

        if let Err(e) = started {
            resource.unload();
            return Err(PlaybackError::ResourceStart(e.to_string()));
        }

        tracing::debug!("Bound entry {} with token {}", entry.id, self.token);
        self.resource = Some(resource);
        Ok(self.token)
    }

    /// Stop and drop the bound resource, if any
    ///
    /// Pauses, rewinds to the start, detaches the source and completion
    /// listener, then drops the handle. Calling it with nothing bound does
    /// nothing. The active entry id is kept.
    pub fn release(&mut self) {
        let Some(mut resource) = self.resource.take() else {
            return;
        };

        resource.pause();
        if let Err(e) = resource.set_position(Duration::ZERO) {
            tracing::warn!("Failed to rewind resource on release: {}", e);
        }
        resource.unload();
        drop(resource);

        tracing::debug!("Released resource with token {}", self.token);
    }

    /// Release and forget the active entry
    pub fn reset(&mut self) {
        self.release();
        self.active_entry_id = None;
    }

    /// Whether a resource is currently bound
    pub fn is_bound(&self) -> bool {
        self.resource.is_some()
    }

    /// Transport state; `true` when nothing is bound
    pub fn is_paused(&self) -> bool {
        self.resource.as_ref().map_or(true, |r| r.is_paused())
    }

    /// Id of the entry last bound
    pub fn active_entry_id(&self) -> Option<&EntryId> {
        self.active_entry_id.as_ref()
    }

    /// Generation of the most recent bind
    pub fn token(&self) -> PlaybackToken {
        self.token
    }

    /// Whether `token` belongs to the currently bound resource
    pub fn is_current(&self, token: PlaybackToken) -> bool {
        self.is_bound() && token == self.token
    }

    /// Pause the bound resource
    pub fn pause(&mut self) -> Result<()> {
        let resource = self.resource.as_mut().ok_or(PlaybackError::NoTrackLoaded)?;
        resource.pause();
        Ok(())
    }

    /// Resume the bound resource
    pub fn resume(&mut self) -> Result<()> {
        let resource = self.resource.as_mut().ok_or(PlaybackError::NoTrackLoaded)?;
        resource
            .play()
            .map_err(|e| PlaybackError::AudioResource(e.to_string()))
    }

    /// Move the playback position of the bound resource
    pub fn seek(&mut self, position: Duration) -> Result<()> {
        let resource = self.resource.as_mut().ok_or(PlaybackError::NoTrackLoaded)?;
        resource
            .set_position(position)
            .map_err(|e| PlaybackError::AudioResource(e.to_string()))
    }

    /// Playback position, zero when nothing is bound
    pub fn position(&self) -> Duration {
        self.resource
            .as_ref()
            .map_or(Duration::ZERO, |r| r.position())
    }

    /// Set linear volume (0.0 to 1.0), kept across rebinds
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(PlaybackError::InvalidVolume(volume));
        }

        self.volume = volume;
        if let Some(resource) = self.resource.as_mut() {
            resource
                .set_volume(volume)
                .map_err(|e| PlaybackError::AudioResource(e.to_string()))?;
        }
        Ok(())
    }

    /// Current linear volume
    pub fn volume(&self) -> f32 {
        self.volume
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("active_entry_id", &self.active_entry_id)
            .field("bound", &self.is_bound())
            .field("token", &self.token)
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryEngine;
    use lilt_core::SourceFile;
    use std::sync::Mutex;

    fn entry(id: &str) -> PlaylistEntry {
        PlaylistEntry {
            id: EntryId::new(id),
            title: id.to_string(),
            author: "Artist".to_string(),
            duration: Duration::from_secs(10),
            source: SourceFile::new(format!("{}.mp3", id), vec![0u8; 4]).to_source_ref(),
            cover: None,
        }
    }

    #[test]
    fn unbound_session_is_paused() {
        let session = PlaybackSession::new(Box::new(MemoryEngine::new()));
        assert!(session.is_paused());
        assert!(!session.is_bound());
        assert!(session.active_entry_id().is_none());
        assert_eq!(session.position(), Duration::ZERO);
    }

    #[test]
    fn bind_starts_playing() {
        let engine = MemoryEngine::new();
        let mut session = PlaybackSession::new(Box::new(engine.clone()));

        let token = session.bind(&entry("a")).unwrap();
        assert_eq!(token, session.token());
        assert!(!session.is_paused());
        assert_eq!(session.active_entry_id(), Some(&EntryId::new("a")));
        assert_eq!(engine.live_resources(), 1);
    }

    #[test]
    fn release_is_idempotent() {
        let engine = MemoryEngine::new();
        let mut session = PlaybackSession::new(Box::new(engine.clone()));
        session.bind(&entry("a")).unwrap();

        session.release();
        session.release();

        assert_eq!(engine.live_resources(), 0);
        assert!(session.is_paused());
        assert_eq!(session.active_entry_id(), Some(&EntryId::new("a")));
    }

    #[test]
    fn released_resource_never_completes() {
        let engine = MemoryEngine::new();
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut session = PlaybackSession::new(Box::new(engine.clone()));
        let sink = Arc::clone(&fired);
        session.on_completion(Arc::new(move |t| sink.lock().unwrap().push(t)));

        let token = session.bind(&entry("a")).unwrap();
        session.release();

        assert!(!engine.finish(token));
        assert!(fired.lock().unwrap().is_empty());
    }

    #[test]
    fn completion_carries_bind_token() {
        let engine = MemoryEngine::new();
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut session = PlaybackSession::new(Box::new(engine.clone()));
        let sink = Arc::clone(&fired);
        session.on_completion(Arc::new(move |t| sink.lock().unwrap().push(t)));

        session.bind(&entry("a")).unwrap();
        session.release();
        let second = session.bind(&entry("b")).unwrap();

        assert!(engine.finish_current());
        assert_eq!(*fired.lock().unwrap(), vec![second]);
        assert!(session.is_current(second));
    }

    #[test]
    fn failed_start_leaves_nothing_bound() {
        let engine = MemoryEngine::new();
        engine.fail_on("bad.mp3");
        let mut session = PlaybackSession::new(Box::new(engine.clone()));

        let err = session.bind(&entry("bad")).unwrap_err();
        assert!(matches!(err, PlaybackError::ResourceStart(_)));
        assert!(!session.is_bound());
        assert!(session.is_paused());
        assert_eq!(session.active_entry_id(), Some(&EntryId::new("bad")));
        assert_eq!(engine.live_resources(), 0);
    }

    #[test]
    fn volume_survives_rebind() {
        let engine = MemoryEngine::new();
        let mut session = PlaybackSession::new(Box::new(engine.clone()));

        session.set_volume(0.25).unwrap();
        session.bind(&entry("a")).unwrap();
        assert_eq!(engine.current_volume(), Some(0.25));

        assert!(session.set_volume(1.5).is_err());
        assert_eq!(session.volume(), 0.25);
    }

    #[test]
    fn transport_requires_binding() {
        let mut session = PlaybackSession::new(Box::new(MemoryEngine::new()));
        assert!(matches!(session.pause(), Err(PlaybackError::NoTrackLoaded)));
        assert!(matches!(session.resume(), Err(PlaybackError::NoTrackLoaded)));
        assert!(matches!(
            session.seek(Duration::from_secs(1)),
            Err(PlaybackError::NoTrackLoaded)
        ));
    }

    #[test]
    fn pause_resume_seek() {
        let mut session = PlaybackSession::new(Box::new(MemoryEngine::new()));
        session.bind(&entry("a")).unwrap();

        session.pause().unwrap();
        assert!(session.is_paused());
        session.seek(Duration::from_secs(3)).unwrap();
        assert_eq!(session.position(), Duration::from_secs(3));
        session.resume().unwrap();
        assert!(!session.is_paused());
    }
}
