// Tempo arithmetic: beats per minute -> frames and durations for a format.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::format::AudioFormat;
use crate::error::{Error, Result};

/// Beats per minute. Always positive and finite.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Tempo(f64);

impl Tempo {
    pub fn new(bpm: f64) -> Result<Self> {
        if bpm.is_finite() && bpm > 0.0 {
            Ok(Self(bpm))
        } else {
            Err(Error::InvalidTempo(bpm))
        }
    }

    pub fn bpm(self) -> f64 {
        self.0
    }

    // saturates for tempos too slow to fit in a Duration
    pub fn beat_duration(self) -> Duration {
        Duration::try_from_secs_f64(60.0 / self.0).unwrap_or(Duration::MAX)
    }

    // rounded to the nearest frame
    pub fn frames_per_beat(self, format: AudioFormat) -> usize {
        (format.sample_rate as f64 * 60.0 / self.0).round() as usize
    }
}

/// Subdivisions of a beat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantisation {
    Quarter = 1,
    Eighth = 2,
    #[default]
    Sixteenth = 4,
}

impl Quantisation {
    pub fn factor(self) -> u32 {
        self as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    pub duration: Duration,
    pub frames: usize,
}

impl Timing {
    /// One beat at `tempo`.
    pub fn beat(tempo: Tempo, format: AudioFormat) -> Self {
        Self {
            duration: tempo.beat_duration(),
            frames: tempo.frames_per_beat(format),
        }
    }

    /// Divides the timing by the subdivision factor. Frame counts truncate.
    pub fn quantise(self, q: Quantisation) -> Self {
        Self {
            duration: self.duration / q.factor(),
            frames: self.frames / q.factor() as usize,
        }
    }

    // stages can't make progress on a zero-frame quantum
    pub(crate) fn non_empty(self, tempo: Tempo, format: AudioFormat) -> Result<Self> {
        if self.frames == 0 {
            Err(Error::EmptyQuantum {
                bpm: tempo.bpm(),
                sample_rate: format.sample_rate,
            })
        } else {
            Ok(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_tempo() {
        assert!(Tempo::new(0.0).is_err());
        assert!(Tempo::new(-120.0).is_err());
        assert!(Tempo::new(f64::NAN).is_err());
        assert!(Tempo::new(f64::INFINITY).is_err());
        assert_eq!(Tempo::new(120.0).unwrap().bpm(), 120.0);
    }

    #[test]
    fn glacial_tempo_saturates_instead_of_panicking() {
        let tempo = Tempo::new(1e-300).unwrap();
        assert_eq!(tempo.beat_duration(), Duration::MAX);
        assert_eq!(tempo.frames_per_beat(AudioFormat::CD), usize::MAX);
    }

    #[test]
    fn sixteenth_at_120_is_5512_frames() {
        let tempo = Tempo::new(120.0).unwrap();
        let beat = Timing::beat(tempo, AudioFormat::CD);
        assert_eq!(beat.frames, 22050);
        assert_eq!(beat.duration, Duration::from_millis(500));

        let sixteenth = beat.quantise(Quantisation::Sixteenth);
        assert_eq!(sixteenth.frames, 5512);
        assert_eq!(sixteenth.duration, Duration::from_millis(125));
    }

    #[test]
    fn beat_frames_round_to_nearest() {
        // 44100 * 60 / 130 = 20353.846...
        let tempo = Tempo::new(130.0).unwrap();
        assert_eq!(tempo.frames_per_beat(AudioFormat::CD), 20354);
        assert_eq!(
            Timing::beat(tempo, AudioFormat::CD)
                .quantise(Quantisation::Eighth)
                .frames,
            10177
        );
    }

    #[test]
    fn quarter_leaves_the_beat_alone() {
        let tempo = Tempo::new(90.0).unwrap();
        let beat = Timing::beat(tempo, AudioFormat::CD);
        assert_eq!(beat.quantise(Quantisation::Quarter), beat);
    }

    #[test]
    fn zero_frame_quantum_is_rejected() {
        let tempo = Tempo::new(1_000_000.0).unwrap();
        let fmt = AudioFormat::new(8000, 1, 16);
        let t = Timing::beat(tempo, fmt).quantise(Quantisation::Sixteenth);
        assert!(matches!(
            t.non_empty(tempo, fmt),
            Err(Error::EmptyQuantum { .. })
        ));
    }
}
