use super::Stream;
use crate::audio::{AudioFormat, PcmBuffer, Quantisation, Tempo, Timing};
use crate::error::Result;
use crate::observe::{self, Observer, StageEvent};

const STAGE: &str = "quantiser";

/// Re-times an arbitrarily chunked stream onto a fixed grid of quanta.
///
/// Every pull emits exactly one quantum. Whatever an incoming chunk has past
/// the end of the quantum is carried over and summed, sample-aligned, into the
/// following quanta rather than dropped or queued behind new audio.
pub struct Quantiser<S> {
    incoming: S,
    timing: Timing,
    format: AudioFormat,
    // the whole buffer built by the previous pull; its first quantum has
    // already gone out
    tail: PcmBuffer,
    observer: Observer,
}

impl<S: Stream> Quantiser<S> {
    pub fn new(
        incoming: S,
        tempo: Tempo,
        quantisation: Quantisation,
        format: AudioFormat,
    ) -> Result<Self> {
        format.validate()?;
        format.expect(STAGE, incoming.format())?;
        let timing = Timing::beat(tempo, format)
            .quantise(quantisation)
            .non_empty(tempo, format)?;
        Ok(Self {
            incoming,
            timing,
            format,
            tail: PcmBuffer::empty(format),
            observer: observe::noop(),
        })
    }

    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = observer;
        self
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }
}

impl<S: Stream> Stream for Quantiser<S> {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn pull(&mut self) -> Option<PcmBuffer> {
        let quantum = self.timing.frames;
        let previous = std::mem::replace(&mut self.tail, PcmBuffer::empty(self.format));
        let carried = previous.truncate_head(quantum);

        // no more quanta once upstream is done; the carry-over goes with it
        let Some(next) = self.incoming.pull() else {
            self.observer.observe(STAGE, StageEvent::UpstreamExhausted);
            return None;
        };

        // a quantum of silence so the chunk is never short, with the new audio
        // and the carry-over laid on top of it
        let mut buf = PcmBuffer::silence(self.format, quantum);
        buf.superpose(&next);
        buf.superpose(&carried);

        let out = buf.copy_range(0..quantum);
        self.tail = buf;
        self.observer
            .observe(STAGE, StageEvent::Emitted { frames: out.len() });
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::error::Error;
    use crate::streams::test_fixture::{FMT, Scripted, filled, ramp, sum};

    // 8000Hz at 120bpm: 4000 frames a beat, 1000 a sixteenth
    fn tempo() -> Tempo {
        Tempo::new(120.0).unwrap()
    }

    fn quantise(incoming: Scripted) -> Quantiser<Scripted> {
        Quantiser::new(incoming, tempo(), Quantisation::Sixteenth, FMT).unwrap()
    }

    #[test]
    fn every_pull_is_exactly_one_quantum() {
        let lengths = [0, 17, 1000, 2500, 999, 1, 0, 4321];
        let mut q = quantise(Scripted::constant(FMT, 0.1, &lengths));
        assert_eq!(q.timing().frames, 1000);
        for _ in lengths {
            assert_eq!(q.pull().unwrap().len(), 1000);
        }
        assert!(q.pull().is_none());
    }

    #[test]
    fn short_chunks_are_padded_with_silence() {
        let mut q = quantise(Scripted::constant(FMT, 1.0, &[10]));
        let out = q.pull().unwrap();
        assert_eq!(sum(&out), 10.0);
        assert_eq!(out.frame(10), Some(&[0.0][..]));
    }

    #[test]
    fn overflow_carries_into_the_next_quantum() {
        let mut q = Quantiser::new(
            Scripted::new(FMT, vec![ramp(FMT, 1500), PcmBuffer::empty(FMT)]),
            tempo(),
            Quantisation::Sixteenth,
            FMT,
        )
        .unwrap();

        let first = q.pull().unwrap();
        let second = q.pull().unwrap();
        assert_eq!(first.frame(999), Some(&[1000.0][..]));
        // frame 1000 of the ramp opens the second quantum
        assert_eq!(second.frame(0), Some(&[1001.0][..]));
        assert_eq!(second.frame(499), Some(&[1500.0][..]));
        assert_eq!(second.frame(500), Some(&[0.0][..]));

        let total = sum(&ramp(FMT, 1500));
        assert_relative_eq!(sum(&first) + sum(&second), total);
    }

    #[test]
    fn carry_over_superposes_with_new_audio() {
        let mut q = quantise(Scripted::constant(FMT, 0.5, &[1200, 100]));
        q.pull().unwrap();
        let second = q.pull().unwrap();
        // 100 frames of new audio over 200 frames of carry-over
        assert_eq!(second.frame(50), Some(&[1.0][..]));
        assert_eq!(second.frame(150), Some(&[0.5][..]));
        assert_eq!(second.frame(250), Some(&[0.0][..]));
    }

    #[test]
    fn long_chunks_spread_over_several_quanta() {
        let mut q = quantise(Scripted::constant(FMT, 0.25, &[3500, 0, 0, 0]));
        let outs: Vec<_> = (0..4).map(|_| q.pull().unwrap()).collect();
        assert_relative_eq!(outs.iter().map(sum).sum::<f32>(), 3500.0 * 0.25);
        assert_relative_eq!(sum(&outs[3]), 500.0 * 0.25);
    }

    #[test]
    fn upstream_exhaustion_passes_straight_through() {
        let mut q = quantise(Scripted::constant(FMT, 1.0, &[2500]));
        assert!(q.pull().is_some());
        // 1500 frames are still pending, but no quanta are made up from them
        assert!(q.pull().is_none());
    }

    #[test]
    fn cd_quality_sixteenth_at_120() {
        let incoming = Scripted::new(AudioFormat::CD, vec![filled(AudioFormat::CD, 0.0, 3)]);
        let mut q = Quantiser::new(incoming, tempo(), Quantisation::Sixteenth, AudioFormat::CD)
            .unwrap();
        assert_eq!(q.pull().unwrap().len(), 5512);
    }

    #[test]
    fn rejects_mismatched_upstream_format() {
        let incoming = Scripted::new(AudioFormat::CD, vec![]);
        let err = Quantiser::new(incoming, tempo(), Quantisation::Eighth, FMT)
            .err()
            .unwrap();
        assert!(matches!(err, Error::FormatMismatch { stage: "quantiser", .. }));
    }

    #[test]
    fn rejects_zero_channel_format() {
        let fmt = AudioFormat::new(8000, 0, 16);
        let incoming = Scripted::new(fmt, vec![]);
        let err = Quantiser::new(incoming, tempo(), Quantisation::Sixteenth, fmt)
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }
}
