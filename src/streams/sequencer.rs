use super::{SampleStream, Stream};
use crate::audio::{AudioFormat, PcmBuffer};
use crate::observe::{self, Observer, StageEvent};

const STAGE: &str = "sequencer";

/// Plays `sound` on the on-steps of a boolean pattern and an empty chunk on
/// the off-steps, one step per pull.
pub struct Sequencer<S> {
    steps: Vec<bool>,
    looping: bool,
    sound: S,
    empty: SampleStream,
    cursor: usize,
    observer: Observer,
}

impl<S: Stream> Sequencer<S> {
    /// An empty pattern is accepted here and exhausts on the first pull.
    pub fn new(steps: Vec<bool>, looping: bool, sound: S) -> Self {
        let empty = SampleStream::empty(sound.format());
        Self {
            steps,
            looping,
            sound,
            empty,
            cursor: 0,
            observer: observe::noop(),
        }
    }

    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = observer;
        self
    }

    /// Index of the step the next pull will play.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl<S: Stream> Stream for Sequencer<S> {
    fn format(&self) -> AudioFormat {
        self.sound.format()
    }

    fn pull(&mut self) -> Option<PcmBuffer> {
        // done with the pattern (never true while looping, unless it's empty)
        let Some(&on) = self.steps.get(self.cursor) else {
            self.observer.observe(STAGE, StageEvent::Exhausted);
            return None;
        };

        let chunk = if on {
            self.sound.pull()
        } else {
            self.empty.pull()
        };
        // an exhausted sound ends the sequence, it is not replaced by silence
        let Some(chunk) = chunk else {
            self.observer.observe(STAGE, StageEvent::UpstreamExhausted);
            return None;
        };

        self.observer.observe(
            STAGE,
            StageEvent::Step {
                step: self.cursor,
                on,
            },
        );

        self.cursor += 1;
        if self.looping {
            self.cursor %= self.steps.len();
        }
        Some(chunk)
    }
}
