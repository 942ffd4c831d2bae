//! Pull-based audio streams.
//!
//! Every pipeline stage is a [`Stream`]: each pull hands back one chunk of
//! audio or `None` once the stream is exhausted. Stages own their upstream, so
//! a pull on the outermost stage cascades synchronously through the chain.

use crate::audio::{AudioFormat, PcmBuffer};

mod audio_buf;
mod mixer;
mod quantiser;
mod sequencer;
mod volume;

#[cfg(test)]
pub(crate) mod test_fixture;

pub use audio_buf::{AudioBuf, MAX_LOOKAHEAD_BEATS};
pub use mixer::Mixer;
pub use quantiser::Quantiser;
pub use sequencer::Sequencer;
pub use volume::Volume;

/// A synchronous generator of audio chunks.
///
/// Not restartable: after `pull` returns `None` the stream must not be pulled
/// again. Build a fresh one to replay.
pub trait Stream: Send {
    fn format(&self) -> AudioFormat;

    fn pull(&mut self) -> Option<PcmBuffer>;

    fn boxed(self) -> BoxStream
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

pub type BoxStream = Box<dyn Stream>;

impl<S: Stream + ?Sized> Stream for Box<S> {
    fn format(&self) -> AudioFormat {
        (**self).format()
    }

    fn pull(&mut self) -> Option<PcmBuffer> {
        (**self).pull()
    }
}

/// Plays the same buffer on every pull, forever.
#[derive(Clone, Debug)]
pub struct SampleStream {
    buf: PcmBuffer,
}

impl SampleStream {
    pub fn new(buf: PcmBuffer) -> Self {
        Self { buf }
    }

    /// The Empty sentinel: zero-length chunks in `format`. This is what an off
    /// step or a finished track contributes to a mix.
    pub fn empty(format: AudioFormat) -> Self {
        Self::new(PcmBuffer::empty(format))
    }

    /// Cuts the sample short, or pads it with silence, so every pull is exactly
    /// `frames` long.
    pub fn with_hold(mut self, frames: usize) -> Self {
        self.buf.fit_to(frames);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Stream for SampleStream {
    fn format(&self) -> AudioFormat {
        self.buf.format()
    }

    fn pull(&mut self) -> Option<PcmBuffer> {
        Some(self.buf.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_stream_repeats_its_buffer() {
        let buf = PcmBuffer::from_interleaved(AudioFormat::CD, vec![0.5; 8]).unwrap();
        let mut s = SampleStream::new(buf.clone());
        for _ in 0..3 {
            assert_eq!(s.pull().as_ref(), Some(&buf));
        }
    }

    #[test]
    fn empty_sentinel_yields_zero_length_chunks() {
        let mut s = SampleStream::empty(AudioFormat::CD);
        let chunk = s.pull().unwrap();
        assert!(chunk.is_empty());
        assert_eq!(chunk.format(), AudioFormat::CD);
    }

    #[test]
    fn hold_cuts_and_pads() {
        let buf = PcmBuffer::from_interleaved(AudioFormat::CD, vec![0.5; 8]).unwrap();
        assert_eq!(SampleStream::new(buf.clone()).with_hold(2).pull().unwrap().len(), 2);

        let mut long = SampleStream::new(buf).with_hold(10);
        let chunk = long.pull().unwrap();
        assert_eq!(chunk.len(), 10);
        assert_eq!(chunk.frame(9), Some(&[0.0, 0.0][..]));
    }

    #[test]
    fn boxed_streams_still_pull() {
        let mut s: BoxStream = SampleStream::empty(AudioFormat::CD).boxed();
        assert_eq!(s.format(), AudioFormat::CD);
        assert!(s.pull().is_some());
    }
}
