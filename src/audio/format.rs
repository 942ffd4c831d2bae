use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Sample rate, channel count and bit depth shared by every stage of a pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: u16,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::CD
    }
}

impl AudioFormat {
    pub const CD: AudioFormat = AudioFormat {
        sample_rate: 44100,
        channels: 2,
        bit_depth: 16,
    };

    pub fn new(sample_rate: u32, channels: u16, bit_depth: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bit_depth,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidFormat("sample rate must be non-zero".into()));
        }
        if self.channels == 0 {
            return Err(Error::InvalidFormat("channel count must be non-zero".into()));
        }
        if !matches!(self.bit_depth, 8 | 16 | 24 | 32) {
            return Err(Error::InvalidFormat(format!(
                "unsupported bit depth {}",
                self.bit_depth
            )));
        }
        Ok(())
    }

    // frames covering `d`, truncated
    pub fn frames_in(&self, d: Duration) -> usize {
        (d.as_secs_f64() * self.sample_rate as f64) as usize
    }

    pub fn duration_of(&self, frames: usize) -> Duration {
        Duration::from_secs_f64(frames as f64 / self.sample_rate as f64)
    }

    /// Checks that `found` matches this format, naming the stage doing the check.
    pub fn expect(&self, stage: &'static str, found: AudioFormat) -> Result<()> {
        if *self == found {
            Ok(())
        } else {
            Err(Error::FormatMismatch {
                stage,
                expected: *self,
                found,
            })
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}Hz/{}ch/{}bit",
            self.sample_rate, self.channels, self.bit_depth
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_degenerate_formats() {
        assert!(AudioFormat::CD.validate().is_ok());
        assert!(AudioFormat::new(0, 2, 16).validate().is_err());
        assert!(AudioFormat::new(44100, 0, 16).validate().is_err());
        assert!(AudioFormat::new(44100, 2, 12).validate().is_err());
    }

    #[test]
    fn frames_and_durations_agree() {
        let f = AudioFormat::new(48000, 1, 24);
        assert_eq!(f.frames_in(Duration::from_millis(500)), 24000);
        assert_eq!(f.duration_of(12000), Duration::from_millis(250));
    }

    #[test]
    fn expect_reports_the_stage() {
        let err = AudioFormat::CD
            .expect("mixer", AudioFormat::new(48000, 2, 16))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "mixer: format mismatch, expected 44100Hz/2ch/16bit but found 48000Hz/2ch/16bit"
        );
    }
}
