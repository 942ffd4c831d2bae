pub mod drum_machine;
pub mod persistence;
pub mod project;

pub use drum_machine::{Pipeline, build};
pub use persistence::{load_project, save_project};
pub use project::{Pattern, ProjectConfig, SoundSource, TrackConfig};
