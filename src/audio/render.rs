// Offline sink: pull a stream into a WAV file instead of a device.

use std::path::Path;

use crate::error::Result;
use crate::streams::Stream;

/// Pulls at most `max_chunks` chunks (stopping early if the stream is
/// exhausted) and writes them to `path`. Returns the number of frames written.
///
/// 32-bit formats are written as float, everything else as integer PCM.
/// Samples are clipped to [-1, 1] here and nowhere earlier.
pub fn render_wav(stream: &mut dyn Stream, path: &Path, max_chunks: usize) -> Result<usize> {
    let format = stream.format();
    format.validate()?;
    let float = format.bit_depth == 32;
    let spec = hound::WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: format.bit_depth,
        sample_format: if float {
            hound::SampleFormat::Float
        } else {
            hound::SampleFormat::Int
        },
    };
    let max = ((1i64 << (format.bit_depth - 1)) - 1) as f32;

    let mut writer = hound::WavWriter::create(path, spec)?;
    let mut frames = 0;
    for _ in 0..max_chunks {
        let Some(chunk) = stream.pull() else {
            break;
        };
        frames += chunk.len();
        for &s in chunk.samples() {
            let s = s.clamp(-1.0, 1.0);
            if float {
                writer.write_sample(s)?;
            } else {
                writer.write_sample((s * max).round() as i32)?;
            }
        }
    }
    writer.finalize()?;

    tracing::info!(path = %path.display(), frames, "rendered");
    Ok(frames)
}
