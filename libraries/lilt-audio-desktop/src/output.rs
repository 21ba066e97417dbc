/// CPAL-based audio engine with a dedicated audio thread
use crate::decode::{decode_source, DecodedAudio};
use crate::error::{AudioError, Result};
use crate::resample::{map_channels, resample};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, StreamConfig};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use lilt_core::{AudioEngine, AudioResource, CompletionSignal, SourceRef};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Commands sent to the audio thread
enum AudioCommand {
    /// Decode `source` and fill voice `id`
    Load { id: u64, source: SourceRef },
    /// Drop the stream and exit
    Shutdown,
}

/// Samples of one resource plus its transport state
struct Voice {
    id: u64,
    samples: Vec<f32>,
    /// Current position, in samples (not frames)
    position: usize,
    paused: bool,
    volume: f32,
    /// False until the decoder has filled `samples`
    loaded: bool,
    signal: Option<CompletionSignal>,
}

/// State shared between resources and the audio callback
///
/// Holds at most one voice. Reserving a new voice detaches the previous one,
/// dropping its completion signal unfired.
pub(crate) struct OutputState {
    voice: Mutex<Option<Voice>>,
    next_id: AtomicU64,
    sample_rate: u32,
    channels: usize,
}

impl OutputState {
    pub(crate) fn new(sample_rate: u32, channels: usize) -> Self {
        Self {
            voice: Mutex::new(None),
            next_id: AtomicU64::new(1),
            sample_rate,
            channels,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Voice>> {
        self.voice.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install an empty voice, paused at zero, and return its resource
    ///
    /// The voice plays silence until [`OutputState::fill`] hands it samples.
    /// Transport calls made in the meantime are kept and apply once filled.
    pub(crate) fn reserve(state: &Arc<Self>, signal: CompletionSignal) -> CpalResource {
        let id = state.next_id.fetch_add(1, Ordering::Relaxed);
        let previous = state.lock().replace(Voice {
            id,
            samples: Vec::new(),
            position: 0,
            paused: true,
            volume: 1.0,
            loaded: false,
            signal: Some(signal),
        });
        if let Some(previous) = previous {
            tracing::warn!("Voice {} replaced while still attached", previous.id);
        }

        CpalResource {
            state: Arc::clone(state),
            id,
        }
    }

    /// Convert decoded audio to the device rate and channel layout
    pub(crate) fn prepare(&self, audio: DecodedAudio) -> Result<Vec<f32>> {
        let samples = resample(
            audio.samples,
            audio.channels,
            audio.sample_rate,
            self.sample_rate,
        )?;
        Ok(map_channels(&samples, audio.channels, self.channels))
    }

    /// Hand samples to voice `id`; `false` if it is no longer attached
    pub(crate) fn fill(&self, id: u64, samples: Vec<f32>) -> bool {
        let mut guard = self.lock();
        match guard.as_mut().filter(|v| v.id == id) {
            Some(voice) => {
                voice.position = voice.position.min(samples.len());
                voice.samples = samples;
                voice.loaded = true;
                true
            }
            None => false,
        }
    }

    pub(crate) fn is_current(&self, id: u64) -> bool {
        self.lock().as_ref().is_some_and(|v| v.id == id)
    }

    /// Fill one device buffer from the current voice
    ///
    /// Fires the voice's completion signal, outside the lock, when the last
    /// sample has been written.
    pub(crate) fn render(&self, output: &mut [f32]) {
        let finished = {
            let mut guard = self.lock();
            match guard.as_mut() {
                Some(voice) if !voice.paused && voice.position < voice.samples.len() => {
                    let available = voice.samples.len() - voice.position;
                    let n = available.min(output.len());
                    let src = &voice.samples[voice.position..voice.position + n];
                    for (out, sample) in output[..n].iter_mut().zip(src) {
                        *out = sample * voice.volume;
                    }
                    output[n..].fill(0.0);
                    voice.position += n;

                    if voice.position >= voice.samples.len() {
                        voice.paused = true;
                        voice.signal.take()
                    } else {
                        None
                    }
                }
                _ => {
                    output.fill(0.0);
                    None
                }
            }
        };

        if let Some(signal) = finished {
            signal.fire();
        }
    }

    fn with_voice<T>(&self, id: u64, f: impl FnOnce(&mut Voice) -> T) -> Option<T> {
        let mut guard = self.lock();
        guard.as_mut().filter(|v| v.id == id).map(f)
    }

    fn detach(&self, id: u64) {
        let removed = {
            let mut guard = self.lock();
            if guard.as_ref().is_some_and(|v| v.id == id) {
                guard.take()
            } else {
                None
            }
        };
        drop(removed);
    }
}

/// Decode `source` for voice `id`, skipping work for superseded voices
///
/// A source that cannot be decoded leaves the voice loaded but empty, so it
/// stays silent and never reports completion.
pub(crate) fn load_voice(state: &OutputState, id: u64, source: &SourceRef) {
    if !state.is_current(id) {
        tracing::debug!("Skipping superseded load of {}", source.name());
        return;
    }

    let samples = match decode_source(source).and_then(|audio| state.prepare(audio)) {
        Ok(samples) => samples,
        Err(e) => {
            tracing::error!("Failed to load {}: {}", source.name(), e);
            Vec::new()
        }
    };

    let frames = samples.len() / state.channels.max(1);
    if state.fill(id, samples) {
        tracing::debug!("Loaded {} ({} frames)", source.name(), frames);
    } else {
        tracing::debug!("Discarded {}: voice detached while decoding", source.name());
    }
}

/// CPAL audio engine
///
/// **Architecture**: a dedicated audio thread owns the CPAL stream, which is
/// not `Send` on every platform. The stream runs for the engine's lifetime
/// and plays whatever voice is currently attached to the shared output state;
/// silence otherwise. Decoding also happens on the audio thread, so
/// [`AudioEngine::create`] returns as soon as the voice is reserved.
pub struct CpalEngine {
    command_tx: Sender<AudioCommand>,
    state: Arc<OutputState>,
    audio_thread: Option<JoinHandle<()>>,
}

impl CpalEngine {
    /// Create an engine on the default output device
    ///
    /// # Errors
    /// Returns an error if no audio device is found or the stream cannot start
    pub fn new() -> Result<Self> {
        let (command_tx, command_rx) = unbounded::<AudioCommand>();
        let (ready_tx, ready_rx) = bounded::<Result<Arc<OutputState>>>(1);

        let audio_thread = thread::Builder::new()
            .name("lilt-audio".into())
            .spawn(move || Self::audio_thread_run(&ready_tx, &command_rx))
            .map_err(|e| AudioError::DeviceError(e.to_string()))?;

        let state = ready_rx.recv().map_err(|_| AudioError::EngineClosed)??;

        tracing::info!(
            "Audio output ready: {} Hz, {} channels",
            state.sample_rate,
            state.channels
        );

        Ok(Self {
            command_tx,
            state,
            audio_thread: Some(audio_thread),
        })
    }

    /// Output device sample rate
    pub fn sample_rate(&self) -> u32 {
        self.state.sample_rate
    }

    /// Output device channel count
    pub fn channels(&self) -> usize {
        self.state.channels
    }

    fn open_default() -> Result<(Device, StreamConfig, u32)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::DeviceNotFound)?;

        let config = device.default_output_config()?;
        let sample_rate = config.sample_rate();
        Ok((device, config.config(), sample_rate))
    }

    /// Audio thread main loop
    ///
    /// Builds and starts the stream, reports the outcome, then decodes load
    /// requests until shutdown. The stream is dropped on this thread.
    fn audio_thread_run(
        ready_tx: &Sender<Result<Arc<OutputState>>>,
        command_rx: &Receiver<AudioCommand>,
    ) {
        let started = Self::open_default().and_then(|(device, config, sample_rate)| {
            let state = Arc::new(OutputState::new(sample_rate, usize::from(config.channels)));
            let callback_state = Arc::clone(&state);

            let stream = device.build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    callback_state.render(data);
                },
                |err| tracing::error!("Audio stream error: {}", err),
                None,
            )?;
            stream.play()?;
            Ok((stream, state))
        });

        let (stream, state) = match started {
            Ok((stream, state)) => {
                let _ = ready_tx.send(Ok(Arc::clone(&state)));
                (stream, state)
            }
            Err(e) => {
                tracing::error!("Failed to start audio output: {}", e);
                let _ = ready_tx.send(Err(e));
                return;
            }
        };

        while let Ok(command) = command_rx.recv() {
            match command {
                AudioCommand::Load { id, source } => load_voice(&state, id, &source),
                AudioCommand::Shutdown => break,
            }
        }

        drop(stream);
        tracing::debug!("Audio thread stopped");
    }
}

impl AudioEngine for CpalEngine {
    fn create(
        &mut self,
        source: &SourceRef,
        on_ended: CompletionSignal,
    ) -> lilt_core::Result<Box<dyn AudioResource>> {
        let resource = OutputState::reserve(&self.state, on_ended);
        self.command_tx
            .send(AudioCommand::Load {
                id: resource.id,
                source: source.clone(),
            })
            .map_err(|_| AudioError::EngineClosed)?;
        tracing::debug!("Queued {} for decoding", source.name());
        Ok(Box::new(resource))
    }
}

impl Drop for CpalEngine {
    fn drop(&mut self) {
        let _ = self.command_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.audio_thread.take() {
            let _ = handle.join();
        }
    }
}

/// Resource playing through a [`CpalEngine`]
///
/// Becomes inert once unloaded or replaced by a newer resource.
pub struct CpalResource {
    state: Arc<OutputState>,
    id: u64,
}

impl CpalResource {
    fn frames_to_duration(&self, samples: usize) -> Duration {
        let frames = samples / self.state.channels.max(1);
        Duration::from_secs_f64(frames as f64 / f64::from(self.state.sample_rate.max(1)))
    }

    /// Playback length; zero until decoding has finished
    pub fn duration(&self) -> Duration {
        let len = self
            .state
            .with_voice(self.id, |voice| voice.samples.len())
            .unwrap_or(0);
        self.frames_to_duration(len)
    }

    /// Whether decoding has finished for this resource
    pub fn is_loaded(&self) -> bool {
        self.state
            .with_voice(self.id, |voice| voice.loaded)
            .unwrap_or(false)
    }

    /// Whether this resource is still the attached voice
    pub fn is_attached(&self) -> bool {
        self.state.with_voice(self.id, |_| ()).is_some()
    }
}

impl AudioResource for CpalResource {
    fn play(&mut self) -> lilt_core::Result<()> {
        self.state
            .with_voice(self.id, |voice| voice.paused = false)
            .ok_or_else(|| AudioError::Detached.into())
    }

    fn pause(&mut self) {
        self.state.with_voice(self.id, |voice| voice.paused = true);
    }

    fn is_paused(&self) -> bool {
        self.state
            .with_voice(self.id, |voice| voice.paused)
            .unwrap_or(true)
    }

    fn position(&self) -> Duration {
        let position = self
            .state
            .with_voice(self.id, |voice| voice.position)
            .unwrap_or(0);
        self.frames_to_duration(position)
    }

    fn set_position(&mut self, position: Duration) -> lilt_core::Result<()> {
        let channels = self.state.channels.max(1);
        let frame = (position.as_secs_f64() * f64::from(self.state.sample_rate)).round() as usize;
        let sample = frame.saturating_mul(channels);

        self.state
            .with_voice(self.id, |voice| {
                if voice.loaded && sample > voice.samples.len() {
                    return Err(AudioError::InvalidPosition(position));
                }
                voice.position = sample;
                Ok(())
            })
            .unwrap_or(Err(AudioError::Detached))
            .map_err(Into::into)
    }

    fn set_volume(&mut self, volume: f32) -> lilt_core::Result<()> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(AudioError::InvalidVolume(volume).into());
        }

        self.state
            .with_voice(self.id, |voice| voice.volume = volume)
            .ok_or_else(|| AudioError::Detached.into())
    }

    fn unload(&mut self) {
        self.state.detach(self.id);
    }
}

impl Drop for CpalResource {
    fn drop(&mut self) {
        self.state.detach(self.id);
    }
}
