// Turns a ProjectConfig into a running stream graph:
//
//   sound -> Volume -> Sequencer   (one per track)
//                          \
//                           Mixer -> Quantiser -> AudioBuf -> sink
//
// Everything is pull-based; nothing renders until the sink asks.

use std::path::Path;
use std::time::Duration;

use crate::audio::{AudioFormat, Timing};
use crate::error::Result;
use crate::loader::SampleStore;
use crate::observe::Observer;
use crate::pipeline::project::{ProjectConfig, SoundSource, TrackConfig};
use crate::streams::{
    AudioBuf, BoxStream, Mixer, Quantiser, SampleStream, Sequencer, Stream, Volume,
};
use crate::synth::{Envelope, Oscillator};

/// The full drum machine as a single stream. Never exhausts; hands out one
/// beat per pull.
pub type Pipeline = AudioBuf<Quantiser<Mixer>>;

/// Builds the pipeline for `project`. Relative sample paths resolve against
/// `project_dir`.
///
/// Every configuration problem (bad tempo, empty pattern, a sample in the
/// wrong format) is reported here, before any audio is produced.
pub fn build(
    project: &ProjectConfig,
    project_dir: &Path,
    store: &dyn SampleStore,
    observer: Observer,
) -> Result<Pipeline> {
    project.validate()?;
    let tempo = project.tempo()?;
    let format = project.format;
    let quantum = Timing::beat(tempo, format)
        .quantise(project.quantisation)
        .non_empty(tempo, format)?;

    let tracks = project
        .tracks
        .iter()
        .map(|track| {
            let sound = track_sound(track, project_dir, store, format, quantum.frames)?;
            let mut sound = Volume::new(sound, track.volume);
            sound.set_silent(track.muted);
            Ok(
                Sequencer::new(track.steps.steps().to_vec(), project.looping, sound)
                    .with_observer(observer.clone())
                    .boxed(),
            )
        })
        .collect::<Result<Vec<BoxStream>>>()?;

    let mixer = Mixer::new(tracks, format)?.with_observer(observer.clone());
    let quantiser = Quantiser::new(mixer, tempo, project.quantisation, format)?
        .with_observer(observer.clone());
    let pipeline = AudioBuf::new(quantiser, project.lookahead_beats, tempo, format)?
        .with_observer(observer);

    tracing::info!(
        bpm = tempo.bpm(),
        quantum_frames = quantum.frames,
        beat_frames = pipeline.timing().frames,
        tracks = project.tracks.len(),
        audio_format = %format,
        "pipeline built"
    );
    Ok(pipeline)
}

// The stream a track's Sequencer pulls on every sounding step.
fn track_sound(
    track: &TrackConfig,
    project_dir: &Path,
    store: &dyn SampleStore,
    format: AudioFormat,
    quantum: usize,
) -> Result<BoxStream> {
    match &track.sound {
        SoundSource::Sample { path } => {
            // join keeps absolute paths as they are
            let path = project_dir.join(path);
            let (buf, found) = store.load(&path)?;
            format.expect("sample", found)?;
            let mut sound = SampleStream::new(buf);
            if let Some(n) = track.hold_quanta {
                sound = sound.with_hold(n * quantum);
            }
            Ok(sound.boxed())
        }
        SoundSource::Tone {
            frequency,
            amplitude,
            attack_ms,
            hold_ms,
            decay_ms,
        } => {
            let frames = track.hold_quanta.unwrap_or(1) * quantum;
            let tone = Oscillator::sine(format, *frequency, frames).with_amplitude(*amplitude);
            Ok(Envelope::new(
                tone,
                Duration::from_millis(*attack_ms),
                Duration::from_millis(*hold_ms),
                Duration::from_millis(*decay_ms),
            )
            .boxed())
        }
    }
}
