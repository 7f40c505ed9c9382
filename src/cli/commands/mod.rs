pub mod cleanup;
pub mod completions;
pub mod config;
pub mod plan;
pub mod split;
pub mod status;
pub mod validate;

use crate::changeset::{PathSpec, RunOptions, TopologyMode};
use crate::config::{load_settings, Settings};
use crate::errors::{ChangesetError, Result};
use crate::git::{find_repository_root, relative_to_workdir, GitRepository};
use std::env;
use std::path::{Path, PathBuf};

/// Repository plus the settings that apply to it
pub(crate) struct Workspace {
    pub root: PathBuf,
    pub repo: GitRepository,
    pub settings: Settings,
}

impl Workspace {
    /// Open the repository containing the current directory
    pub fn open() -> Result<Self> {
        let current_dir = env::current_dir()
            .map_err(|e| ChangesetError::config(format!("Could not get current directory: {e}")))?;
        let root = find_repository_root(&current_dir)?;

        let settings = load_settings(&root)?;
        settings.validate()?;

        let mut repo = GitRepository::open(&root)?;
        if let Some((name, email)) = settings.author() {
            repo = repo.with_author(&name, &email);
        }

        Ok(Self {
            root,
            repo,
            settings,
        })
    }

    /// Run options from settings, with `mode` overriding `split.default_mode`.
    ///
    /// The manifest itself is excluded when it sits inside the working copy.
    pub fn run_options(&self, mode: Option<TopologyMode>, manifest: &Path) -> Result<RunOptions> {
        let mode = match mode {
            Some(mode) => mode,
            None => self.settings.mode()?,
        };
        Ok(RunOptions {
            mode,
            unstage_first: self.settings.split.unstage_first,
            exclude: self.exclusions(manifest)?,
        })
    }

    pub fn exclusions(&self, manifest: &Path) -> Result<Vec<PathSpec>> {
        let mut exclude = self.settings.exclude_specs()?;
        if let Some(relative) = relative_to_workdir(&self.root, manifest) {
            tracing::debug!("Excluding manifest '{}' from every change-set", relative);
            exclude.push(PathSpec::ExactPath(relative));
        }
        Ok(exclude)
    }
}
