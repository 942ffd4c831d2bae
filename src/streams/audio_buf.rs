use super::Stream;
use crate::audio::{AudioFormat, PcmBuffer, Tempo, Timing};
use crate::error::{Error, Result};
use crate::observe::{self, Observer, StageEvent};

const STAGE: &str = "audio_buf";

/// Longest look-ahead an `AudioBuf` accepts, in beats.
pub const MAX_LOOKAHEAD_BEATS: usize = 64;

/// Look-ahead buffer between the pipeline and a real-time sink.
///
/// Keeps more than `quanta` beats of rendered audio in reserve and hands out
/// one beat per pull. It never reports exhausted: once upstream runs dry the
/// reserve is topped up with silence instead.
pub struct AudioBuf<S> {
    incoming: S,
    // top up while the reserve holds this many frames or fewer
    threshold: usize,
    timing: Timing,
    format: AudioFormat,
    reserve: PcmBuffer,
    upstream_done: bool,
    observer: Observer,
}

impl<S: Stream> AudioBuf<S> {
    pub fn new(incoming: S, quanta: usize, tempo: Tempo, format: AudioFormat) -> Result<Self> {
        format.validate()?;
        format.expect(STAGE, incoming.format())?;
        let timing = Timing::beat(tempo, format).non_empty(tempo, format)?;

        let too_long = || Error::LookaheadTooLong {
            beats: quanta,
            max: MAX_LOOKAHEAD_BEATS,
        };
        if quanta > MAX_LOOKAHEAD_BEATS {
            return Err(too_long());
        }
        // the reserve peaks one beat past the threshold
        let threshold = timing.frames.checked_mul(quanta).ok_or_else(too_long)?;
        threshold
            .checked_add(timing.frames)
            .and_then(|peak| peak.checked_mul(format.channels as usize))
            .ok_or_else(too_long)?;

        Ok(Self {
            incoming,
            threshold,
            timing,
            format,
            reserve: PcmBuffer::empty(format),
            upstream_done: false,
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

    /// Frames rendered but not yet handed out.
    pub fn reserve(&self) -> usize {
        self.reserve.len()
    }

    pub fn upstream_exhausted(&self) -> bool {
        self.upstream_done
    }

    fn top_up(&mut self) {
        let quantum = self.timing.frames;
        while self.reserve.len() <= self.threshold {
            let next = if self.upstream_done {
                None
            } else {
                self.incoming.pull()
            };
            match next {
                Some(chunk) if !chunk.is_empty() => self.reserve.append(&chunk),
                Some(_) => {
                    // a zero-length chunk can't grow the reserve
                    self.reserve.append_silence(quantum);
                    self.observer
                        .observe(STAGE, StageEvent::SilencePadded { frames: quantum });
                }
                None => {
                    if !self.upstream_done {
                        self.upstream_done = true;
                        self.observer.observe(STAGE, StageEvent::UpstreamExhausted);
                    }
                    self.reserve.append_silence(quantum);
                    self.observer
                        .observe(STAGE, StageEvent::SilencePadded { frames: quantum });
                }
            }
        }
    }
}

impl<S: Stream> Stream for AudioBuf<S> {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn pull(&mut self) -> Option<PcmBuffer> {
        self.top_up();
        let out = self.reserve.pop_front(self.timing.frames);
        self.observer
            .observe(STAGE, StageEvent::Emitted { frames: out.len() });
        Some(out)
    }
}
