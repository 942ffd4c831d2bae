// Project configuration: everything needed to build a drum machine pipeline,
// in the shape it is saved to disk.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize}; // serde does json

use crate::audio::{AudioFormat, Quantisation, Tempo};
use crate::error::{Error, Result};
use crate::streams::MAX_LOOKAHEAD_BEATS;

// a day
const MAX_PLAY_SECONDS: f64 = 86_400.0;

/// One loop cycle of on/off steps, written as a string like `"x-x- x---"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern(Vec<bool>);

impl Pattern {
    pub fn new(steps: Vec<bool>) -> Self {
        Self(steps)
    }

    pub fn steps(&self) -> &[bool] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c {
                'x' | 'X' | '1' => Ok(true),
                '-' | '.' | '0' => Ok(false),
                other => Err(Error::InvalidStep(other)),
            })
            .collect::<Result<Vec<_>>>()
            .map(Pattern)
    }
}

impl TryFrom<String> for Pattern {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Pattern> for String {
    fn from(p: Pattern) -> Self {
        p.to_string()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &on in &self.0 {
            f.write_str(if on { "x" } else { "-" })?;
        }
        Ok(())
    }
}

/// Where a track's sound comes from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SoundSource {
    /// A sample file, relative paths resolve against the project directory.
    Sample { path: PathBuf },
    /// A sine tone shaped by an AHD envelope, one quantum long per step.
    Tone {
        frequency: f32,
        #[serde(default = "default_amplitude")]
        amplitude: f32,
        #[serde(default)]
        attack_ms: u64,
        #[serde(default)]
        hold_ms: u64,
        #[serde(default = "default_decay_ms")]
        decay_ms: u64,
    },
}

fn default_amplitude() -> f32 {
    1.0
}

fn default_decay_ms() -> u64 {
    100
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackConfig {
    pub name: String,
    pub sound: SoundSource,
    pub steps: Pattern,

    // doublings of amplitude, 0.0 is unity
    #[serde(default)]
    pub volume: f32,
    // still steps, just silently
    #[serde(default)]
    pub muted: bool,

    // cut or pad the sound to this many quanta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_quanta: Option<usize>,
}

impl TrackConfig {
    pub fn sample(name: &str, path: &str, steps: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            sound: SoundSource::Sample { path: path.into() },
            steps: steps.parse()?,
            volume: 0.0,
            muted: false,
            hold_quanta: None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub bpm: f64,
    #[serde(default)]
    pub quantisation: Quantisation,
    #[serde(default = "default_lookahead")]
    pub lookahead_beats: usize,
    #[serde(default = "default_looping")]
    pub looping: bool,
    #[serde(default)]
    pub format: AudioFormat,
    // None plays until the process is killed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_seconds: Option<f64>,
    pub tracks: Vec<TrackConfig>,
}

fn default_lookahead() -> usize {
    4
}

fn default_looping() -> bool {
    true
}

impl Default for ProjectConfig {
    // four to the floor kick, hats on every sixteenth, off beat clap
    fn default() -> Self {
        let track = |name: &str, steps: &[bool]| TrackConfig {
            name: name.to_string(),
            sound: SoundSource::Sample {
                path: format!("{name}.wav").into(),
            },
            steps: Pattern::new(steps.to_vec()),
            volume: 0.0,
            muted: false,
            hold_quanta: None,
        };
        Self {
            bpm: 120.0,
            quantisation: Quantisation::Sixteenth,
            lookahead_beats: default_lookahead(),
            looping: true,
            format: AudioFormat::CD,
            play_seconds: Some(16.0),
            tracks: vec![
                track("kick", &[true, false]),
                track("hat", &[true]),
                track("clap", &[false, false, true, false]),
            ],
        }
    }
}

impl ProjectConfig {
    pub fn tempo(&self) -> Result<Tempo> {
        Tempo::new(self.bpm)
    }

    /// Rejects anything that would otherwise only show up once audio is
    /// flowing.
    pub fn validate(&self) -> Result<()> {
        self.tempo()?;
        self.format.validate()?;
        if self.lookahead_beats > MAX_LOOKAHEAD_BEATS {
            return Err(Error::LookaheadTooLong {
                beats: self.lookahead_beats,
                max: MAX_LOOKAHEAD_BEATS,
            });
        }
        let out_of_range = |s: &f64| !(0.0..=MAX_PLAY_SECONDS).contains(s);
        if let Some(seconds) = self.play_seconds.filter(out_of_range) {
            return Err(Error::InvalidPlayTime {
                seconds,
                max: MAX_PLAY_SECONDS,
            });
        }
        if self.tracks.is_empty() {
            return Err(Error::NoTracks);
        }
        if let Some(t) = self.tracks.iter().find(|t| t.steps.is_empty()) {
            return Err(Error::EmptyPattern {
                track: t.name.clone(),
            });
        }
        Ok(())
    }
}
