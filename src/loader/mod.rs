pub mod sample_loader;

pub use sample_loader::{SampleStore, WavStore};
