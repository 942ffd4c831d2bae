//! Tone sources for tracks that don't play a recorded sample.

mod envelope;
mod oscillator;

pub use envelope::Envelope;
pub use oscillator::Oscillator;
