pub mod repository;
pub mod status;
pub mod working_copy;

pub use repository::{GitRepository, RepositoryInfo};
pub use status::{ChangeKind, PendingChange};
pub use working_copy::WorkingCopy;

use crate::errors::{ChangesetError, Result};
use std::path::{Path, PathBuf};

/// Resolve the per-worktree git directory from a workdir path.
/// Handles both normal repos (.git is a directory) and worktrees (.git is a file
/// containing `gitdir: <path>`).
pub fn resolve_git_dir(workdir: &Path) -> Result<PathBuf> {
    let git_path = workdir.join(".git");
    if git_path.is_dir() {
        Ok(git_path)
    } else if git_path.is_file() {
        let content = std::fs::read_to_string(&git_path)
            .map_err(|e| ChangesetError::config(format!("Failed to read .git file: {e}")))?;
        let gitdir = content
            .strip_prefix("gitdir: ")
            .map(|s| s.trim())
            .ok_or_else(|| ChangesetError::config("Invalid .git file format"))?;
        let resolved = if Path::new(gitdir).is_absolute() {
            PathBuf::from(gitdir)
        } else {
            workdir.join(gitdir)
        };
        Ok(resolved)
    } else {
        Err(ChangesetError::NotARepository(format!(
            "{} does not exist",
            git_path.display()
        )))
    }
}

/// Find the root of the Git repository
pub fn find_repository_root(start_path: &Path) -> Result<PathBuf> {
    let repo = git2::Repository::discover(start_path).map_err(|e| {
        ChangesetError::NotARepository(format!("{}: {}", start_path.display(), e.message()))
    })?;

    let workdir = repo.workdir().ok_or_else(|| {
        ChangesetError::NotARepository("repository has no working directory (bare repo?)".into())
    })?;

    Ok(workdir.to_path_buf())
}

/// Get the current working directory as a Git repository
pub fn get_current_repository() -> Result<GitRepository> {
    let current_dir = std::env::current_dir()
        .map_err(|e| ChangesetError::config(format!("Could not get current directory: {e}")))?;

    let repo_root = find_repository_root(&current_dir)?;
    GitRepository::open(&repo_root)
}

/// Express `path` relative to the working copy root with `/` separators.
///
/// Returns `None` when `path` lies outside the working copy.
pub fn relative_to_workdir(workdir: &Path, path: &Path) -> Option<String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };
    let absolute = absolute.canonicalize().unwrap_or(absolute);
    let workdir = workdir
        .canonicalize()
        .unwrap_or_else(|_| workdir.to_path_buf());

    let relative = absolute.strip_prefix(&workdir).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
