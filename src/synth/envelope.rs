use std::time::Duration;

use crate::audio::{AudioFormat, PcmBuffer};
use crate::streams::Stream;

/// AHD (attack, hold, decay) amplitude envelope.
///
/// Each incoming chunk is treated as one triggered note: the envelope restarts
/// at frame 0 of every chunk. Attack ramps 0 -> 1, hold stays at 1, decay
/// ramps 1 -> 0, and anything after the decay is silenced.
pub struct Envelope<S> {
    incoming: S,
    attack: usize,
    hold: usize,
    decay: usize,
}

impl<S: Stream> Envelope<S> {
    pub fn new(incoming: S, attack: Duration, hold: Duration, decay: Duration) -> Self {
        let format = incoming.format();
        Self {
            attack: format.frames_in(attack),
            hold: format.frames_in(hold),
            decay: format.frames_in(decay),
            incoming,
        }
    }

    /// Total envelope length in frames.
    pub fn len(&self) -> usize {
        self.attack + self.hold + self.decay
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gain at frame `i` of a note.
    pub fn level(&self, i: usize) -> f32 {
        if i < self.attack {
            return i as f32 / self.attack as f32;
        }
        let i = i - self.attack;
        if i < self.hold {
            return 1.0;
        }
        let i = i - self.hold;
        if i < self.decay {
            return 1.0 - i as f32 / self.decay as f32;
        }
        0.0
    }
}

impl<S: Stream> Stream for Envelope<S> {
    fn format(&self) -> AudioFormat {
        self.incoming.format()
    }

    fn pull(&mut self) -> Option<PcmBuffer> {
        let mut chunk = self.incoming.pull()?;
        let channels = chunk.format().channels as usize;
        for (i, frame) in chunk.samples_mut().chunks_exact_mut(channels).enumerate() {
            let gain = self.level(i);
            for s in frame {
                *s *= gain;
            }
        }
        Some(chunk)
    }
}
