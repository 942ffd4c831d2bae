use std::f64::consts::TAU;

use crate::audio::{AudioFormat, PcmBuffer};
use crate::streams::Stream;

/// An endless sine tone, `frames` frames per pull.
///
/// Phase carries across pulls so consecutive chunks join without a click.
pub struct Oscillator {
    format: AudioFormat,
    frames: usize,
    amplitude: f32,
    phase: f64,     // radians
    phase_inc: f64, // radians per frame
}

impl Oscillator {
    pub fn sine(format: AudioFormat, frequency: f32, frames: usize) -> Self {
        Self {
            format,
            frames,
            amplitude: 1.0,
            phase: 0.0,
            phase_inc: TAU * frequency as f64 / format.sample_rate as f64,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }
}

impl Stream for Oscillator {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn pull(&mut self) -> Option<PcmBuffer> {
        let mut chunk = PcmBuffer::silence(self.format, self.frames);
        let channels = self.format.channels as usize;
        for frame in chunk.samples_mut().chunks_exact_mut(channels) {
            frame.fill(self.amplitude * self.phase.sin() as f32);
            self.phase += self.phase_inc;
            if self.phase >= TAU {
                self.phase -= TAU;
            }
        }
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn quarter_period_hits_the_peak() {
        // 1000Hz at 8000Hz: 8 frames a cycle
        let fmt = AudioFormat::new(8000, 1, 16);
        let mut osc = Oscillator::sine(fmt, 1000.0, 8).with_amplitude(0.5);
        let chunk = osc.pull().unwrap();
        assert_abs_diff_eq!(chunk.samples()[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(chunk.samples()[2], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(chunk.samples()[6], -0.5, epsilon = 1e-6);
    }

    #[test]
    fn phase_is_continuous_across_pulls() {
        let fmt = AudioFormat::new(8000, 1, 16);
        let mut split = Oscillator::sine(fmt, 440.0, 5);
        let mut whole = Oscillator::sine(fmt, 440.0, 10);
        let mut joined = split.pull().unwrap();
        joined.append(&split.pull().unwrap());
        let reference = whole.pull().unwrap();
        for (a, b) in joined.samples().iter().zip(reference.samples()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
        }
    }

    #[test]
    fn every_channel_carries_the_tone() {
        let mut osc = Oscillator::sine(AudioFormat::CD, 220.0, 16);
        let chunk = osc.pull().unwrap();
        assert_eq!(chunk.len(), 16);
        for i in 0..16 {
            let frame = chunk.frame(i).unwrap();
            assert_eq!(frame[0], frame[1]);
        }
    }
}
