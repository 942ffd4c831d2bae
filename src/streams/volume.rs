use super::Stream;
use crate::audio::{AudioFormat, PcmBuffer};

const BASE: f32 = 2.0;

/// Scales every chunk by `2 ^ volume`.
///
/// `volume` counts doublings of amplitude: 0 is unity, -1 halves, 1 doubles.
pub struct Volume<S> {
    incoming: S,
    volume: f32,
    silent: bool,
}

impl<S: Stream> Volume<S> {
    pub fn new(incoming: S, volume: f32) -> Self {
        Self {
            incoming,
            volume,
            silent: false,
        }
    }

    pub fn set_silent(&mut self, silent: bool) {
        self.silent = silent;
    }

    pub fn gain(&self) -> f32 {
        if self.silent {
            0.0
        } else {
            BASE.powf(self.volume)
        }
    }
}

impl<S: Stream> Stream for Volume<S> {
    fn format(&self) -> AudioFormat {
        self.incoming.format()
    }

    fn pull(&mut self) -> Option<PcmBuffer> {
        let mut chunk = self.incoming.pull()?;
        let gain = self.gain();
        // skip the multiply at unity
        if gain != 1.0 {
            chunk.apply_gain(gain);
        }
        Some(chunk)
    }
}
