use std::path::Path;

use crate::audio::{AudioFormat, PcmBuffer};
use crate::error::{Error, Result};

/// Decodes a sample file into PCM.
pub trait SampleStore {
    fn load(&self, path: &Path) -> Result<(PcmBuffer, AudioFormat)>;
}

/// Loads WAV files with hound.
///
/// Without a target the sample keeps the file's own format. With one, it is
/// resampled and its channels remapped so it can join a pipeline in that format.
#[derive(Clone, Copy, Debug, Default)]
pub struct WavStore {
    target: Option<AudioFormat>,
}

impl WavStore {
    pub fn native() -> Self {
        Self { target: None }
    }

    pub fn conforming_to(target: AudioFormat) -> Self {
        Self {
            target: Some(target),
        }
    }
}

impl SampleStore for WavStore {
    fn load(&self, path: &Path) -> Result<(PcmBuffer, AudioFormat)> {
        let buf = load_wav(path)?;
        let buf = match self.target {
            Some(target) => conform(&buf, target)?,
            None => buf,
        };
        tracing::debug!(
            path = %path.display(),
            frames = buf.len(),
            audio_format = %buf.format(),
            "loaded sample"
        );
        let format = buf.format();
        Ok((buf, format))
    }
}

// Load a WAV file from disk in its own format
pub fn load_wav(path: &Path) -> Result<PcmBuffer> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let format = AudioFormat::new(spec.sample_rate, spec.channels, spec.bits_per_sample);
    format.validate()?;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader // float, just pass it through
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            // int, scale into [-1, 1]
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|x| x as f32 / max))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    PcmBuffer::from_interleaved(format, samples)
}

/// Converts `buf` to `target`'s channel count and sample rate. Bit depth is
/// only a label once samples are floats.
pub fn conform(buf: &PcmBuffer, target: AudioFormat) -> Result<PcmBuffer> {
    target.validate()?;
    let source = buf.format();
    if source.channels == 0 {
        return Err(Error::UnsupportedSample("zero-channel sample".into()));
    }

    let remapped = remap_channels(buf.samples(), source.channels, target.channels);
    let resampled = resample_linear(
        &remapped,
        target.channels as usize,
        source.sample_rate,
        target.sample_rate,
    );
    PcmBuffer::from_interleaved(target, resampled)
}

// mono is copied to every output channel, otherwise channel i reads source
// channel i, falling back to the last one
fn remap_channels(samples: &[f32], from: u16, to: u16) -> Vec<f32> {
    if from == to {
        return samples.to_vec();
    }
    let (from, to) = (from as usize, to as usize);
    let mut out = Vec::with_capacity(samples.len() / from * to);
    for frame in samples.chunks_exact(from) {
        for ch in 0..to {
            out.push(frame[ch.min(from - 1)]);
        }
    }
    out
}

fn resample_linear(
    samples: &[f32],
    channels: usize,
    source_rate: u32,
    target_rate: u32,
) -> Vec<f32> {
    // simple linear interpolation between neighbouring frames
    if source_rate == target_rate {
        return samples.to_vec();
    }
    let frames = samples.len() / channels;
    if frames == 0 {
        return Vec::new();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames as f64 * ratio).ceil() as usize;
    let mut out = Vec::with_capacity(out_len * channels);

    for i in 0..out_len {
        // fractional position in the source, e.g. 3.7
        let src_pos = i as f64 / ratio;
        let idx = src_pos.floor() as usize;
        let frac = (src_pos - idx as f64) as f32;
        if idx >= frames - 1 {
            // past the last pair of frames, hold the final frame
            out.extend_from_slice(&samples[(frames - 1) * channels..frames * channels]);
        } else {
            let a = &samples[idx * channels..(idx + 1) * channels];
            let b = &samples[(idx + 1) * channels..(idx + 2) * channels];
            out.extend(a.iter().zip(b).map(|(a, b)| a * (1.0 - frac) + b * frac));
        }
    }
    out
}
