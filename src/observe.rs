//! Pipeline observation.
//!
//! Stages report what they are doing to an explicitly passed observer instead
//! of a process-wide logger. The default observer drops everything;
//! [`TracingObserver`] forwards to `tracing`.

use std::sync::Arc;

/// Something a stage did during a pull.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageEvent {
    /// A sequencer emitted step `step`, sounding or silent.
    Step { step: usize, on: bool },
    /// A mixer input was exhausted this pull and stood in as silence.
    TrackExhausted { track: usize },
    /// The stage's upstream reported exhausted.
    UpstreamExhausted,
    /// The stage padded its output with `frames` frames of silence.
    SilencePadded { frames: usize },
    /// The stage emitted a chunk of `frames` frames.
    Emitted { frames: usize },
    /// The stage itself is now exhausted.
    Exhausted,
}

pub trait StreamObserver: Send + Sync {
    fn observe(&self, stage: &'static str, event: StageEvent);
}

pub type Observer = Arc<dyn StreamObserver>;

pub struct NoopObserver;

impl StreamObserver for NoopObserver {
    fn observe(&self, _stage: &'static str, _event: StageEvent) {}
}

pub struct TracingObserver;

impl StreamObserver for TracingObserver {
    fn observe(&self, stage: &'static str, event: StageEvent) {
        match event {
            StageEvent::Step { step, on } => tracing::trace!(stage, step, on, "step"),
            StageEvent::Emitted { frames } => tracing::trace!(stage, frames, "emitted chunk"),
            StageEvent::TrackExhausted { track } => {
                tracing::trace!(stage, track, "track exhausted, mixing silence")
            }
            StageEvent::UpstreamExhausted => tracing::debug!(stage, "upstream exhausted"),
            StageEvent::SilencePadded { frames } => {
                tracing::debug!(stage, frames, "padded with silence")
            }
            StageEvent::Exhausted => tracing::debug!(stage, "exhausted"),
        }
    }
}

pub fn noop() -> Observer {
    Arc::new(NoopObserver)
}

pub fn traced() -> Observer {
    Arc::new(TracingObserver)
}

#[cfg(test)]
pub(crate) mod recorder {
    use std::sync::{Arc, Mutex};

    use super::{StageEvent, StreamObserver};

    /// Collects every event for assertions.
    #[derive(Default)]
    pub struct Recorder {
        events: Mutex<Vec<(&'static str, StageEvent)>>,
    }

    impl Recorder {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn events(&self) -> Vec<(&'static str, StageEvent)> {
            self.events.lock().unwrap().clone()
        }

        pub fn count(&self, event: &StageEvent) -> usize {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, e)| e == event)
                .count()
        }
    }

    impl StreamObserver for Recorder {
        fn observe(&self, stage: &'static str, event: StageEvent) {
            self.events.lock().unwrap().push((stage, event));
        }
    }
}
