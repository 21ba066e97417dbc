//! Whole-file decoding with Symphonia
//!
//! Sources are small in-memory files, so they are decoded up front into one
//! interleaved f32 buffer at the file's native rate and channel count.
//! Every Symphonia sample format is normalized to [-1.0, 1.0] through the
//! same interleaving helper; only the normalization function differs.

use crate::error::{AudioError, Result};
use lilt_core::SourceRef;
use std::io::Cursor;
use std::time::Duration;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// Decoded audio, interleaved
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Native sample rate of the file
    pub sample_rate: u32,
    /// Native channel count of the file
    pub channels: usize,
}

impl DecodedAudio {
    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels
        }
    }

    /// Playback length
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }
}

/// Decode a whole source
///
/// The file extension is used as a probe hint. Corrupt packets are skipped
/// with a warning; anything that prevents opening the stream is an error.
pub fn decode_source(source: &SourceRef) -> Result<DecodedAudio> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(source.bytes())), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = source.extension() {
        hint.with_extension(&ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format_reader = probed.format;

    let track = format_reader
        .default_track()
        .ok_or_else(|| AudioError::UnsupportedFormat("no audio tracks found".into()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track.codec_params.channels.map_or(0, |c| c.count());

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    loop {
        let packet = match format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count();
                append_interleaved(decoded, &mut samples);
            }
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!("Skipping corrupt packet in {}: {}", source.name(), e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if sample_rate == 0 || channels == 0 {
        return Err(AudioError::UnsupportedFormat(format!(
            "{} has no decodable audio",
            source.name()
        )));
    }

    tracing::debug!(
        "Decoded {}: {} Hz, {} channels, {} samples",
        source.name(),
        sample_rate,
        channels,
        samples.len()
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Interleave all channels of a planar buffer, normalizing each sample
fn interleave_f32<T, F>(buf: &AudioBuffer<T>, normalize: F, out: &mut Vec<f32>)
where
    T: Sample,
    F: Fn(T) -> f32,
{
    let channels = buf.spec().channels.count();
    out.reserve(buf.frames() * channels);

    for frame in 0..buf.frames() {
        for ch in 0..channels {
            out.push(normalize(buf.chan(ch)[frame]));
        }
    }
}

fn append_interleaved(decoded: AudioBufferRef<'_>, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::F32(buf) => interleave_f32(&buf, |s| s, out),
        AudioBufferRef::F64(buf) => interleave_f32(&buf, |s| s as f32, out),

        AudioBufferRef::S8(buf) => interleave_f32(&buf, |s| f32::from(s) / f32::from(i8::MAX), out),
        AudioBufferRef::S16(buf) => {
            interleave_f32(&buf, |s| f32::from(s) / f32::from(i16::MAX), out);
        }
        AudioBufferRef::S24(buf) => interleave_f32(&buf, |s| s.inner() as f32 / 8_388_607.0, out),
        AudioBufferRef::S32(buf) => interleave_f32(&buf, |s| s as f32 / i32::MAX as f32, out),

        AudioBufferRef::U8(buf) => {
            interleave_f32(&buf, |s| (f32::from(s) / f32::from(u8::MAX)) * 2.0 - 1.0, out);
        }
        AudioBufferRef::U16(buf) => {
            interleave_f32(&buf, |s| (f32::from(s) / f32::from(u16::MAX)) * 2.0 - 1.0, out);
        }
        AudioBufferRef::U24(buf) => {
            interleave_f32(&buf, |s| (s.inner() as f32 / 16_777_215.0) * 2.0 - 1.0, out);
        }
        AudioBufferRef::U32(buf) => {
            interleave_f32(&buf, |s| (s as f32 / u32::MAX as f32) * 2.0 - 1.0, out);
        }
    }
}
