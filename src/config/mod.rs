pub mod settings;

pub use settings::{GitSettings, Settings, SplitSettings};

use crate::errors::{ChangesetError, Result};
use crate::git::resolve_git_dir;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";

/// Global configuration directory (~/.changeset/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home_dir =
        dirs::home_dir().ok_or_else(|| ChangesetError::config("Could not find home directory"))?;
    Ok(home_dir.join(".changeset"))
}

/// Per-repository configuration directory, kept inside the git directory
/// so nothing written there shows up as a pending change
pub fn get_repo_config_dir(repo_root: &Path) -> Result<PathBuf> {
    Ok(resolve_git_dir(repo_root)?.join("changeset"))
}

/// Where run reports for this repository are written
pub fn runs_dir(repo_root: &Path) -> Result<PathBuf> {
    Ok(get_repo_config_dir(repo_root)?.join("runs"))
}

pub fn repo_config_path(repo_root: &Path) -> Result<PathBuf> {
    Ok(get_repo_config_dir(repo_root)?.join(CONFIG_FILE))
}

pub fn global_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

/// Ensure the configuration directory exists
pub fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        fs::create_dir_all(config_dir).map_err(|e| {
            ChangesetError::config(format!("Failed to create config directory: {e}"))
        })?;
    }
    Ok(())
}

/// Effective settings for a repository: its own file when present, else the
/// global file, else defaults
pub fn load_settings(repo_root: &Path) -> Result<Settings> {
    let repo_file = repo_config_path(repo_root)?;
    if repo_file.exists() {
        tracing::debug!("Using repository settings from {}", repo_file.display());
        return Settings::load_from_file(&repo_file);
    }

    match global_config_path() {
        Ok(global_file) if global_file.exists() => {
            tracing::debug!("Using global settings from {}", global_file.display());
            Settings::load_from_file(&global_file)
        }
        _ => Ok(Settings::default()),
    }
}
