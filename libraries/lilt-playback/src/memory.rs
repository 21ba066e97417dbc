//! Headless audio engine
//!
//! [`MemoryEngine`] produces no sound. Resources only track transport state,
//! and completion is triggered by hand with [`MemoryEngine::finish`]. It
//! counts live resources so callers can check that at most one exists at a
//! time. Used by tests and by hosts without an audio device.

use lilt_core::{
    AudioEngine, AudioResource, CompletionSignal, LiltError, PlaybackToken, Result, SourceRef,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct EngineState {
    live: usize,
    peak: usize,
    created: usize,
    current: Option<PlaybackToken>,
    pending: HashMap<PlaybackToken, CompletionSignal>,
    volumes: HashMap<PlaybackToken, f32>,
    failing: HashSet<String>,
    opened: Vec<String>,
}

/// Audio engine that keeps everything in memory
///
/// Clones share state, so a test can keep one clone while the controller
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    state: Arc<Mutex<EngineState>>,
}

impl MemoryEngine {
    /// Create new engine
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make resources created for source `name` refuse to play
    pub fn fail_on(&self, name: impl Into<String>) {
        self.lock().failing.insert(name.into());
    }

    /// Deliver the natural end of the resource bound with `token`
    ///
    /// Returns `false` if that resource was released (or already finished).
    pub fn finish(&self, token: PlaybackToken) -> bool {
        let signal = self.lock().pending.remove(&token);
        match signal {
            Some(signal) => {
                signal.fire();
                true
            }
            None => false,
        }
    }

    /// Deliver the natural end of the most recently created live resource
    pub fn finish_current(&self) -> bool {
        let current = self.lock().current;
        current.map_or(false, |token| self.finish(token))
    }

    /// Number of resources alive right now
    pub fn live_resources(&self) -> usize {
        self.lock().live
    }

    /// Highest number of simultaneously live resources seen
    pub fn peak_live_resources(&self) -> usize {
        self.lock().peak
    }

    /// Total number of resources created
    pub fn created_count(&self) -> usize {
        self.lock().created
    }

    /// Source names in the order resources were created for them
    pub fn opened_sources(&self) -> Vec<String> {
        self.lock().opened.clone()
    }

    /// Volume of the most recently created live resource
    pub fn current_volume(&self) -> Option<f32> {
        let state = self.lock();
        state
            .current
            .and_then(|token| state.volumes.get(&token).copied())
    }
}

impl AudioEngine for MemoryEngine {
    fn create(
        &mut self,
        source: &SourceRef,
        on_ended: CompletionSignal,
    ) -> Result<Box<dyn AudioResource>> {
        let token = on_ended.token();
        let mut state = self.lock();

        state.live += 1;
        state.peak = state.peak.max(state.live);
        state.created += 1;
        state.current = Some(token);
        state.volumes.insert(token, 1.0);
        state.opened.push(source.name().to_string());
        state.pending.insert(token, on_ended);
        let fails = state.failing.contains(source.name());
        drop(state);

        Ok(Box::new(MemoryResource {
            state: Arc::clone(&self.state),
            token,
            source: Some(source.clone()),
            paused: true,
            position: Duration::ZERO,
            fails,
        }))
    }
}

/// Resource created by [`MemoryEngine`]
#[derive(Debug)]
pub struct MemoryResource {
    state: Arc<Mutex<EngineState>>,
    token: PlaybackToken,
    source: Option<SourceRef>,
    paused: bool,
    position: Duration,
    fails: bool,
}

impl MemoryResource {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AudioResource for MemoryResource {
    fn play(&mut self) -> Result<()> {
        let Some(source) = &self.source else {
            return Err(LiltError::audio("no source loaded"));
        };
        if self.fails {
            return Err(LiltError::audio(format!(
                "unsupported source: {}",
                source.name()
            )));
        }
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn set_position(&mut self, position: Duration) -> Result<()> {
        self.position = position;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(LiltError::invalid_input(format!(
                "volume out of range: {}",
                volume
            )));
        }
        self.lock().volumes.insert(self.token, volume);
        Ok(())
    }

    fn unload(&mut self) {
        self.source = None;
        self.paused = true;
        let signal = self.lock().pending.remove(&self.token);
        drop(signal);
    }
}

impl Drop for MemoryResource {
    fn drop(&mut self) {
        let token = self.token;
        let mut state = self.lock();
        state.live = state.live.saturating_sub(1);
        state.volumes.remove(&token);
        if state.current == Some(token) {
            state.current = None;
        }
        let signal = state.pending.remove(&token);
        drop(state);
        drop(signal);
    }
}
