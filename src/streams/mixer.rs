use super::{BoxStream, SampleStream, Stream};
use crate::audio::{AudioFormat, PcmBuffer};
use crate::error::Result;
use crate::observe::{self, Observer, StageEvent};

const STAGE: &str = "mixer";

/// Superposes one chunk from every track per pull.
///
/// A track that is exhausted contributes an empty chunk for that pull, so the
/// tracks still playing aren't starved. The mix is exhausted only on a pull
/// where every track reported exhausted.
pub struct Mixer {
    tracks: Vec<BoxStream>,
    format: AudioFormat,
    empty: SampleStream,
    observer: Observer,
}

impl Mixer {
    pub fn new(tracks: Vec<BoxStream>, format: AudioFormat) -> Result<Self> {
        format.validate()?;
        for track in &tracks {
            format.expect(STAGE, track.format())?;
        }
        Ok(Self {
            tracks,
            format,
            empty: SampleStream::empty(format),
            observer: observe::noop(),
        })
    }

    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = observer;
        self
    }
}

impl Stream for Mixer {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn pull(&mut self) -> Option<PcmBuffer> {
        let mut mix = PcmBuffer::empty(self.format);
        let mut all_closed = true;

        // every track advances one step, whatever the others are doing
        for (i, track) in self.tracks.iter_mut().enumerate() {
            match track.pull() {
                Some(chunk) => {
                    all_closed = false;
                    mix.superpose(&chunk);
                }
                None => {
                    self.observer
                        .observe(STAGE, StageEvent::TrackExhausted { track: i });
                    if let Some(silence) = self.empty.pull() {
                        mix.superpose(&silence);
                    }
                }
            }
        }

        if all_closed {
            self.observer.observe(STAGE, StageEvent::Exhausted);
            return None;
        }

        self.observer
            .observe(STAGE, StageEvent::Emitted { frames: mix.len() });
        Some(mix)
    }
}
