//! Sample rate conversion and channel mapping

use crate::error::{AudioError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Frames fed to the resampler per call
const CHUNK_FRAMES: usize = 1024;

/// Resample interleaved `samples` from `source_rate` to `target_rate`
///
/// Returns the input unchanged when the rates already match.
pub fn resample(
    samples: Vec<f32>,
    channels: usize,
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>> {
    if source_rate == target_rate || samples.is_empty() || channels == 0 {
        return Ok(samples);
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = f64::from(target_rate) / f64::from(source_rate);
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, CHUNK_FRAMES, channels)
        .map_err(|e| AudioError::ResampleError(e.to_string()))?;

    let planar = deinterleave(&samples, channels);
    let frames = planar[0].len();
    let expected = (frames as f64 * ratio).round() as usize;

    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(expected); channels];
    let mut offset = 0;

    while offset + CHUNK_FRAMES <= frames {
        let chunk: Vec<&[f32]> = planar
            .iter()
            .map(|ch| &ch[offset..offset + CHUNK_FRAMES])
            .collect();
        let resampled = resampler
            .process(&chunk, None)
            .map_err(|e| AudioError::ResampleError(e.to_string()))?;
        append_planar(&mut output, resampled);
        offset += CHUNK_FRAMES;
    }

    if offset < frames {
        let tail: Vec<&[f32]> = planar.iter().map(|ch| &ch[offset..]).collect();
        let resampled = resampler
            .process_partial(Some(tail.as_slice()), None)
            .map_err(|e| AudioError::ResampleError(e.to_string()))?;
        append_planar(&mut output, resampled);
    }

    // Drain the filter delay
    while output[0].len() < expected + resampler.output_delay() {
        let resampled = resampler
            .process_partial::<Vec<f32>>(None, None)
            .map_err(|e| AudioError::ResampleError(e.to_string()))?;
        if resampled[0].is_empty() {
            break;
        }
        append_planar(&mut output, resampled);
    }

    let delay = resampler.output_delay();
    for channel in &mut output {
        let start = delay.min(channel.len());
        channel.drain(..start);
        channel.truncate(expected);
    }

    Ok(interleave(&output))
}

/// Convert interleaved audio between channel counts
///
/// Mono is duplicated to every output channel, and any layout folds down to
/// mono by averaging. Otherwise channels are copied by index; missing ones
/// are silent and extra ones dropped.
pub fn map_channels(samples: &[f32], from: usize, to: usize) -> Vec<f32> {
    if from == to || from == 0 || to == 0 {
        return samples.to_vec();
    }

    let frames = samples.len() / from;
    let mut out = Vec::with_capacity(frames * to);

    for frame in samples.chunks_exact(from) {
        if from == 1 {
            out.extend(std::iter::repeat(frame[0]).take(to));
        } else if to == 1 {
            out.push(frame.iter().sum::<f32>() / from as f32);
        } else {
            out.extend((0..to).map(|ch| frame.get(ch).copied().unwrap_or(0.0)));
        }
    }

    out
}

fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let frames = samples.len() / channels;
    let mut planar = vec![Vec::with_capacity(frames); channels];
    for frame in samples.chunks_exact(channels) {
        for (ch, sample) in frame.iter().enumerate() {
            planar[ch].push(*sample);
        }
    }
    planar
}

fn interleave(planar: &[Vec<f32>]) -> Vec<f32> {
    let frames = planar.first().map_or(0, Vec::len);
    let mut out = Vec::with_capacity(frames * planar.len());
    for frame in 0..frames {
        for channel in planar {
            out.push(channel[frame]);
        }
    }
    out
}

fn append_planar(output: &mut [Vec<f32>], chunk: Vec<Vec<f32>>) {
    for (dst, src) in output.iter_mut().zip(chunk) {
        dst.extend(src);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_rate_is_passthrough() {
        let samples = vec![0.1, 0.2, 0.3, 0.4];
        assert_eq!(resample(samples.clone(), 2, 44100, 44100).unwrap(), samples);
    }

    #[test]
    fn upsampling_scales_length() {
        let samples: Vec<f32> = (0..4410).map(|i| (i as f32 * 0.01).sin()).collect();
        let out = resample(samples, 1, 44100, 48000).unwrap();
        assert_eq!(out.len(), 4800);
        assert!(out.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn downsampling_keeps_channels_interleaved() {
        let samples: Vec<f32> = (0..2 * 4800).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }).collect();
        let out = resample(samples, 2, 48000, 24000).unwrap();
        assert_eq!(out.len(), 2 * 2400);

        // Away from the edges each channel keeps its level
        let mid = (out.len() / 2) & !1;
        assert!((out[mid] - 0.5).abs() < 0.05);
        assert!((out[mid + 1] + 0.5).abs() < 0.05);
    }

    #[test]
    fn mono_duplicates_to_stereo() {
        assert_eq!(map_channels(&[0.1, 0.2], 1, 2), vec![0.1, 0.1, 0.2, 0.2]);
    }

    #[test]
    fn stereo_folds_to_mono() {
        assert_eq!(map_channels(&[0.2, 0.4, -1.0, 1.0], 2, 1), vec![0.3, 0.0]);
    }

    #[test]
    fn stereo_to_surround_pads_silence() {
        let out = map_channels(&[0.1, 0.2], 2, 4);
        assert_eq!(out, vec![0.1, 0.2, 0.0, 0.0]);
    }

    #[test]
    fn surround_to_stereo_drops_extra() {
        let out = map_channels(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], 3, 2);
        assert_eq!(out, vec![0.1, 0.2, 0.4, 0.5]);
    }
}
