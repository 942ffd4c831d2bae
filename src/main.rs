use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

use beatbox::audio;
use beatbox::loader::WavStore;
use beatbox::observe;
use beatbox::pipeline::{self, ProjectConfig};

fn main() {
    tracing_subscriber::fmt::init();
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let project_dir: PathBuf = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let out: Option<PathBuf> = args.next().map(PathBuf::from);

    let project = match pipeline::load_project(&project_dir)
        .with_context(|| format!("failed to load project in {}", project_dir.display()))?
    {
        Some(project) => project,
        None => {
            tracing::info!(dir = %project_dir.display(), "no saved project, using the default kit");
            ProjectConfig::default()
        }
    };

    let store = WavStore::conforming_to(project.format);
    let mut pipeline = pipeline::build(&project, &project_dir, &store, observe::traced())
        .context("failed to build pipeline")?;

    match out {
        Some(path) => render(&mut pipeline, &project, &path),
        None => play(pipeline, &project),
    }
}

// play_seconds has been range checked by pipeline::build

fn render(
    pipeline: &mut pipeline::Pipeline,
    project: &ProjectConfig,
    path: &Path,
) -> anyhow::Result<()> {
    let seconds = project.play_seconds.unwrap_or(16.0);
    // whole beats, rounded up
    let frames = project.format.frames_in(Duration::from_secs_f64(seconds));
    let chunks = frames.div_ceil(pipeline.timing().frames);
    audio::render_wav(pipeline, path, chunks)
        .with_context(|| format!("failed to render {}", path.display()))?;
    Ok(())
}

fn play(pipeline: pipeline::Pipeline, project: &ProjectConfig) -> anyhow::Result<()> {
    let handle = audio::start_playback(pipeline)?;
    match project.play_seconds {
        Some(seconds) => std::thread::sleep(Duration::from_secs_f64(seconds)),
        None => loop {
            std::thread::park();
        },
    }
    if handle.underruns() > 0 {
        tracing::warn!(frames = handle.underruns(), "device underran");
    }
    Ok(())
}
