// Loads and saves the project file: <project_dir>/.beatbox/project.json
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::pipeline::project::ProjectConfig;

const BEATBOX_DIR: &str = ".beatbox";
const PROJECT_FILE: &str = "project.json";

pub fn project_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(BEATBOX_DIR).join(PROJECT_FILE)
}

/// `Ok(None)` when the project has never been saved. A file that exists but
/// doesn't parse is an error, not a silent fallback to the defaults.
pub fn load_project(project_dir: &Path) -> Result<Option<ProjectConfig>> {
    let path = project_file_path(project_dir);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&data)?))
}

// Save the project, making .beatbox/ if it doesn't exist already
pub fn save_project(project_dir: &Path, project: &ProjectConfig) -> Result<()> {
    let path = project_file_path(project_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(project)?;
    std::fs::write(&path, json)?;
    Ok(())
}
