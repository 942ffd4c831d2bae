use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};

use crate::streams::Stream;

mod format;
mod pcm_buffer;
mod render;
mod timing;

pub use format::AudioFormat;
pub use pcm_buffer::PcmBuffer;
pub use render::render_wav;
pub use timing::{Quantisation, Tempo, Timing};

// chunks rendered ahead of the device; the render thread blocks once this many
// are waiting
const CHUNKS_IN_FLIGHT: usize = 4;

pub struct AudioHandle {
    running: Arc<AtomicBool>,
    underruns: Arc<AtomicU64>,
    render_thread: Option<JoinHandle<()>>,
    output_stream: Option<cpal::Stream>,
}

impl AudioHandle {
    /// Device frames that had to be filled with silence because no rendered
    /// audio was waiting.
    pub fn underruns(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }
}

impl Drop for AudioHandle {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        // dropping the device stream drops the receiver, which unblocks a
        // render thread waiting to send
        self.output_stream.take();
        if let Some(t) = self.render_thread.take() {
            let _ = t.join();
        }
    }
}

/// Plays `pipeline` on the default output device.
///
/// A render thread pulls the pipeline and queues chunks for the device
/// callback, which only copies samples out. The pipeline should never exhaust
/// (put an `AudioBuf` last); if it does, playback continues as silence.
pub fn start_playback<S: Stream + 'static>(mut pipeline: S) -> anyhow::Result<AudioHandle> {
    let format = pipeline.format();
    let (tx, rx) = crossbeam_channel::bounded::<Vec<f32>>(CHUNKS_IN_FLIGHT);

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("no default output device")?;
    let supported = device
        .default_output_config()
        .context("no default output config")?;
    if supported.sample_format() != cpal::SampleFormat::F32 {
        anyhow::bail!("unsupported sample format (only f32 supported for now)");
    }

    let mut config: cpal::StreamConfig = supported.into();
    config.sample_rate = cpal::SampleRate(format.sample_rate);
    let device_channels = config.channels as usize;
    tracing::info!(
        pipeline = %format,
        device_channels,
        "starting playback"
    );

    let underruns = Arc::new(AtomicU64::new(0));
    let output_stream = build_output_stream_f32(
        &device,
        &config,
        ChunkReader::new(rx, format.channels as usize),
        device_channels,
        underruns.clone(),
    )?;
    output_stream
        .play()
        .context("failed to play output stream")?;

    let running = Arc::new(AtomicBool::new(true));
    let render_thread = {
        let running = running.clone();
        std::thread::Builder::new()
            .name("beatbox-render".into())
            .spawn(move || render_loop(&mut pipeline, &tx, &running))
            .context("failed to spawn render thread")?
    };

    Ok(AudioHandle {
        running,
        underruns,
        render_thread: Some(render_thread),
        output_stream: Some(output_stream),
    })
}

fn render_loop<S: Stream>(pipeline: &mut S, tx: &Sender<Vec<f32>>, running: &AtomicBool) {
    while running.load(Ordering::Relaxed) {
        let Some(chunk) = pipeline.pull() else {
            tracing::warn!("pipeline exhausted, playing silence from here on");
            return;
        };
        // blocks while the device is CHUNKS_IN_FLIGHT behind
        if tx.send(chunk.into_samples()).is_err() {
            return;
        }
    }
}

// ── Output stream ─────────────────────────────────────────────────

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut reader: ChunkReader,
    device_channels: usize,
    underruns: Arc<AtomicU64>,
) -> anyhow::Result<cpal::Stream> {
    let err_fn = |err| tracing::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
            let missed = reader.fill(data, device_channels);
            if missed > 0 {
                underruns.fetch_add(missed as u64, Ordering::Relaxed);
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

/// Device-side end of the render queue: copies queued interleaved chunks into
/// device buffers, mapping pipeline channels onto device channels.
struct ChunkReader {
    rx: Receiver<Vec<f32>>,
    pending: Vec<f32>,
    pos: usize,
    channels: usize,
}

impl ChunkReader {
    fn new(rx: Receiver<Vec<f32>>, channels: usize) -> Self {
        Self {
            rx,
            pending: Vec::new(),
            pos: 0,
            channels,
        }
    }

    /// Fills `data` and returns how many frames had nothing to play.
    fn fill(&mut self, data: &mut [f32], device_channels: usize) -> usize {
        let mut missed = 0;
        for frame in data.chunks_exact_mut(device_channels) {
            while self.pos >= self.pending.len() {
                match self.rx.try_recv() {
                    Ok(next) => {
                        self.pending = next;
                        self.pos = 0;
                    }
                    Err(_) => break,
                }
            }
            if self.pos >= self.pending.len() {
                frame.fill(0.0);
                missed += 1;
                continue;
            }

            let src = &self.pending[self.pos..self.pos + self.channels];
            for (c, out) in frame.iter_mut().enumerate() {
                *out = src[c.min(self.channels - 1)];
            }
            self.pos += self.channels;
        }
        missed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_spans_chunk_boundaries() {
        let (tx, rx) = crossbeam_channel::bounded(4);
        let mut reader = ChunkReader::new(rx, 2);
        tx.send(vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        tx.send(vec![]).unwrap();
        tx.send(vec![0.5, 0.6]).unwrap();

        let mut data = [9.0; 8];
        let missed = reader.fill(&mut data, 2);
        assert_eq!(missed, 1);
        assert_eq!(data, [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.0, 0.0]);
    }

    #[test]
    fn mono_pipeline_fans_out_to_every_device_channel() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let mut reader = ChunkReader::new(rx, 1);
        tx.send(vec![0.25, -0.25]).unwrap();

        let mut data = [0.0; 6];
        assert_eq!(reader.fill(&mut data, 3), 0);
        assert_eq!(data, [0.25, 0.25, 0.25, -0.25, -0.25, -0.25]);
    }

    #[test]
    fn render_loop_stops_when_the_device_goes_away() {
        use crate::streams::SampleStream;

        let (tx, rx) = crossbeam_channel::bounded(2);
        let mut pipeline = SampleStream::new(PcmBuffer::silence(AudioFormat::CD, 4));
        let running = AtomicBool::new(true);
        drop(rx);
        // SampleStream never exhausts, so only the closed channel ends this
        render_loop(&mut pipeline, &tx, &running);
    }
}
