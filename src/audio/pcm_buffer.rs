use std::ops::Range;

use super::format::AudioFormat;
use crate::error::{Error, Result};

/// A growable run of interleaved frames in one fixed format.
///
/// Lengths and offsets are counted in frames; a frame is `format.channels`
/// consecutive samples.
#[derive(Clone, Debug, PartialEq)]
pub struct PcmBuffer {
    format: AudioFormat,
    samples: Vec<f32>, // interleaved
}

impl PcmBuffer {
    pub fn empty(format: AudioFormat) -> Self {
        Self {
            format,
            samples: Vec::new(),
        }
    }

    pub fn silence(format: AudioFormat, frames: usize) -> Self {
        Self {
            format,
            samples: vec![0.0; frames * format.channels as usize],
        }
    }

    pub fn from_interleaved(format: AudioFormat, samples: Vec<f32>) -> Result<Self> {
        if format.channels == 0 {
            return Err(Error::InvalidFormat("channel count must be non-zero".into()));
        }
        if samples.len() % format.channels as usize != 0 {
            return Err(Error::PartialFrame {
                samples: samples.len(),
                channels: format.channels,
            });
        }
        Ok(Self { format, samples })
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Length in frames.
    pub fn len(&self) -> usize {
        // a zero-channel buffer never holds a frame
        self.samples.len().checked_div(self.width()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        let w = self.width();
        self.samples.get(index * w..(index + 1) * w)
    }

    /// Read-only view of a range of frames, clamped to the buffer.
    pub fn frames(&self, range: Range<usize>) -> &[f32] {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        let w = self.width();
        &self.samples[start * w..end * w]
    }

    pub fn copy_range(&self, range: Range<usize>) -> PcmBuffer {
        Self {
            format: self.format,
            samples: self.frames(range).to_vec(),
        }
    }

    pub fn append(&mut self, other: &PcmBuffer) {
        debug_assert_eq!(self.format, other.format, "appending across formats");
        self.samples.extend_from_slice(&other.samples);
    }

    pub fn append_silence(&mut self, frames: usize) {
        let n = self.samples.len() + frames * self.width();
        self.samples.resize(n, 0.0);
    }

    /// Drops the first `n` frames. Dropping more than the buffer holds leaves
    /// it empty.
    pub fn truncate_head(mut self, n: usize) -> PcmBuffer {
        let cut = (n * self.width()).min(self.samples.len());
        self.samples.drain(..cut);
        self
    }

    /// Splits off the first `n` frames (fewer if the buffer is shorter) and
    /// keeps the rest.
    pub fn pop_front(&mut self, n: usize) -> PcmBuffer {
        let cut = (n * self.width()).min(self.samples.len());
        let tail = self.samples.split_off(cut);
        let head = std::mem::replace(&mut self.samples, tail);
        Self {
            format: self.format,
            samples: head,
        }
    }

    /// Sums `other` into this buffer sample by sample, both starting at frame
    /// 0. The result is as long as the longer of the two.
    pub fn superpose(&mut self, other: &PcmBuffer) {
        debug_assert_eq!(self.format, other.format, "mixing across formats");
        if other.samples.len() > self.samples.len() {
            self.samples.resize(other.samples.len(), 0.0);
        }
        for (dst, src) in self.samples.iter_mut().zip(&other.samples) {
            *dst += *src;
        }
    }

    pub fn apply_gain(&mut self, gain: f32) {
        for s in &mut self.samples {
            *s *= gain;
        }
    }

    /// Cuts or silence-extends the buffer to exactly `frames` frames.
    pub fn fit_to(&mut self, frames: usize) {
        self.samples.resize(frames * self.width(), 0.0);
    }

    fn width(&self) -> usize {
        self.format.channels as usize
    }
}
