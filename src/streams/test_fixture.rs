// Purely for testing: streams with a fixed script of chunks.

use std::collections::VecDeque;

use super::Stream;
use crate::audio::{AudioFormat, PcmBuffer};

pub const FMT: AudioFormat = AudioFormat {
    sample_rate: 8000,
    channels: 1,
    bit_depth: 16,
};

/// Emits the scripted chunks in order, then reports exhausted. Counts pulls so
/// tests can check nobody pulls past the end.
pub struct Scripted {
    format: AudioFormat,
    chunks: VecDeque<PcmBuffer>,
    pub pulls: usize,
}

impl Scripted {
    pub fn new(format: AudioFormat, chunks: Vec<PcmBuffer>) -> Self {
        Self {
            format,
            chunks: chunks.into(),
            pulls: 0,
        }
    }

    /// `lengths.len()` chunks of constant `level`, sized as given.
    pub fn constant(format: AudioFormat, level: f32, lengths: &[usize]) -> Self {
        let chunks = lengths
            .iter()
            .map(|&n| filled(format, level, n))
            .collect();
        Self::new(format, chunks)
    }
}

impl Stream for Scripted {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn pull(&mut self) -> Option<PcmBuffer> {
        self.pulls += 1;
        self.chunks.pop_front()
    }
}

pub fn filled(format: AudioFormat, level: f32, frames: usize) -> PcmBuffer {
    let n = frames * format.channels as usize;
    PcmBuffer::from_interleaved(format, vec![level; n]).unwrap()
}

pub fn ramp(format: AudioFormat, frames: usize) -> PcmBuffer {
    let samples = (0..frames).map(|i| i as f32 + 1.0).collect();
    PcmBuffer::from_interleaved(format, samples).unwrap()
}

pub fn sum(buf: &PcmBuffer) -> f32 {
    buf.samples().iter().sum()
}
