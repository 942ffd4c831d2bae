//! A drum machine built from pull-based audio streams.
//!
//! Each track's [`Sequencer`](streams::Sequencer) plays a sound on the on-steps
//! of its pattern and a [`Mixer`](streams::Mixer) sums the tracks. The mix is
//! laid onto a fixed grid by a [`Quantiser`](streams::Quantiser) and buffered
//! ahead of the sink by an [`AudioBuf`](streams::AudioBuf).
//! [`pipeline::build`] wires it all up from a
//! [`ProjectConfig`](pipeline::ProjectConfig).

pub mod audio;
pub mod error;
pub mod loader;
pub mod observe;
pub mod pipeline;
pub mod streams;
pub mod synth;

pub use error::{Error, Result};
pub use streams::Stream;
