use crate::errors::{ChangesetError, Result};
use crate::git::{ChangeKind, PendingChange, WorkingCopy};
use git2::build::CheckoutBuilder;
use git2::{BranchType, ErrorCode, IndexAddOption, Repository, Signature, StatusOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Repository information
#[derive(Debug, Clone)]
pub struct RepositoryInfo {
    pub path: PathBuf,
    pub git_dir: PathBuf,
    pub head_branch: Option<String>,
    pub head_commit: Option<String>,
    pub pending: Vec<PendingChange>,
}

/// Wrapper around git2::Repository with safe operations
pub struct GitRepository {
    repo: Repository,
    path: PathBuf,
    author: Option<(String, String)>,
}

impl GitRepository {
    /// Open a Git repository at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|e| {
            ChangesetError::NotARepository(format!("{}: {}", path.display(), e.message()))
        })?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| {
                ChangesetError::NotARepository(
                    "repository has no working directory (bare repo?)".to_string(),
                )
            })?
            .to_path_buf();

        Ok(Self {
            repo,
            path: workdir,
            author: None,
        })
    }

    /// Commit as this identity instead of the one from git config
    pub fn with_author(mut self, name: &str, email: &str) -> Self {
        self.author = Some((name.to_string(), email.to_string()));
        self
    }

    /// The per-worktree git directory (`.git` or the worktree's gitdir)
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Get repository information
    pub fn get_info(&self) -> Result<RepositoryInfo> {
        let head_branch = self.current_branch().ok();
        let head_commit = self.get_head_commit_hash().ok();
        let pending = self.pending_changes()?;

        Ok(RepositoryInfo {
            path: self.path.clone(),
            git_dir: self.git_dir().to_path_buf(),
            head_branch,
            head_commit,
            pending,
        })
    }

    /// Get the HEAD commit hash
    pub fn get_head_commit_hash(&self) -> Result<String> {
        Ok(self.head_commit()?.id().to_string())
    }

    /// Get the commit hash at the head of a branch
    pub fn get_branch_head(&self, branch_name: &str) -> Result<String> {
        let branch = self
            .repo
            .find_branch(branch_name, BranchType::Local)
            .map_err(|e| {
                ChangesetError::branch(format!("Could not find branch '{branch_name}': {e}"))
            })?;

        let commit = branch.get().peel_to_commit().map_err(|e| {
            ChangesetError::branch(format!(
                "Could not get commit for branch '{branch_name}': {e}"
            ))
        })?;

        Ok(commit.id().to_string())
    }

    /// List all local branches
    pub fn list_branches(&self) -> Result<Vec<String>> {
        let branches = self.repo.branches(Some(BranchType::Local))?;

        let mut branch_names = Vec::new();
        for branch in branches {
            let (branch, _) = branch?;
            if let Some(name) = branch.name()? {
                branch_names.push(name.to_string());
            }
        }

        Ok(branch_names)
    }

    /// Delete a local branch
    pub fn delete_branch(&self, name: &str) -> Result<()> {
        let mut branch = self
            .repo
            .find_branch(name, BranchType::Local)
            .map_err(|e| ChangesetError::branch(format!("Could not find branch '{name}': {e}")))?;

        branch
            .delete()
            .map_err(|e| ChangesetError::branch(format!("Could not delete branch '{name}': {e}")))?;

        info!("Deleted branch '{}'", name);
        Ok(())
    }

    fn head_commit(&self) -> Result<git2::Commit<'_>> {
        let head = self
            .repo
            .head()
            .map_err(|e| ChangesetError::branch(format!("Could not get HEAD: {e}")))?;
        head.peel_to_commit()
            .map_err(|e| ChangesetError::branch(format!("Could not get HEAD commit: {e}")))
    }

    fn resolve_commit(&self, reference: &str) -> Result<git2::Commit<'_>> {
        let obj = self.repo.revparse_single(reference).map_err(|e| {
            ChangesetError::branch(format!("Could not find target '{reference}': {e}"))
        })?;
        obj.peel_to_commit().map_err(|e| {
            ChangesetError::branch(format!("Target '{reference}' is not a commit: {e}"))
        })
    }

    /// Get a signature for commits
    fn get_signature(&self) -> Result<Signature<'static>> {
        if let Some((name, email)) = &self.author {
            return Ok(Signature::now(name, email)?);
        }

        // Try to get signature from Git config
        if let Ok(config) = self.repo.config() {
            if let (Ok(name), Ok(email)) = (
                config.get_string("user.name"),
                config.get_string("user.email"),
            ) {
                return Ok(Signature::now(&name, &email)?);
            }
        }

        // Fallback to default signature
        Ok(Signature::now("Changeset CLI", "changeset@example.com")?)
    }
}

impl WorkingCopy for GitRepository {
    fn current_branch(&self) -> Result<String> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                return Err(ChangesetError::branch(
                    "HEAD points at a branch with no commits yet",
                ));
            }
            Err(e) => return Err(ChangesetError::branch(format!("Could not get HEAD: {e}"))),
        };

        if !head.is_branch() {
            let commit = head
                .peel_to_commit()
                .map_err(|e| ChangesetError::branch(format!("Could not get HEAD commit: {e}")))?;
            return Err(ChangesetError::DetachedHead(commit.id().to_string()));
        }

        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| ChangesetError::branch("Current branch name is not valid UTF-8"))
    }

    fn pending_changes(&self) -> Result<Vec<PendingChange>> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .exclude_submodules(true);

        let statuses = self.repo.statuses(Some(&mut options))?;

        let mut changes = Vec::new();
        for entry in statuses.iter() {
            let Some(kind) = ChangeKind::from_status(entry.status()) else {
                continue;
            };
            match entry.path() {
                Some(path) => changes.push(PendingChange::new(path, kind)),
                None => warn!("Skipping pending path that is not valid UTF-8"),
            }
        }

        changes.sort();
        changes.dedup_by(|a, b| a.path == b.path);
        debug!("Found {} pending paths", changes.len());
        Ok(changes)
    }

    fn branch_exists(&self, name: &str) -> bool {
        self.repo.find_branch(name, BranchType::Local).is_ok()
    }

    fn create_and_switch_branch(&self, name: &str, from: &str) -> Result<()> {
        if self.branch_exists(name) {
            return Err(ChangesetError::BranchAlreadyExists(name.to_string()));
        }

        let target_commit = self.resolve_commit(from)?;
        self.repo
            .branch(name, &target_commit, false)
            .map_err(|e| match e.code() {
                ErrorCode::Exists => ChangesetError::BranchAlreadyExists(name.to_string()),
                _ => ChangesetError::branch(format!("Could not create branch '{name}': {e}")),
            })?;

        info!("Created branch '{}' from '{}'", name, from);
        self.switch_to(name)
    }

    fn switch_to(&self, reference: &str) -> Result<()> {
        let branch = self
            .repo
            .find_branch(reference, BranchType::Local)
            .map_err(|e| ChangesetError::switch_failure(reference, e.message()))?;

        let branch_ref = branch.get();
        let refname = branch_ref
            .name()
            .ok_or_else(|| ChangesetError::switch_failure(reference, "ref name is not UTF-8"))?
            .to_string();
        let tree = branch_ref
            .peel_to_tree()
            .map_err(|e| ChangesetError::switch_failure(reference, e.message()))?;

        // Safe checkout: files whose content differs from both sides are left alone
        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        self.repo
            .checkout_tree(tree.as_object(), Some(&mut checkout))
            .map_err(|e| ChangesetError::switch_failure(reference, e.message()))?;

        self.repo
            .set_head(&refname)
            .map_err(|e| ChangesetError::switch_failure(reference, e.message()))?;

        info!("Switched to branch '{}'", reference);
        Ok(())
    }

    fn stage_path(&self, path: &str) -> Result<()> {
        let relative = Path::new(path);
        let mut index = self
            .repo
            .index()
            .map_err(|e| ChangesetError::stage_failure(path, e.message()))?;

        match std::fs::symlink_metadata(self.path.join(relative)) {
            Ok(meta) if meta.is_dir() => {
                index
                    .add_all([path], IndexAddOption::DEFAULT, None)
                    .map_err(|e| ChangesetError::stage_failure(path, e.message()))?;
            }
            Ok(_) => {
                index
                    .add_path(relative)
                    .map_err(|e| ChangesetError::stage_failure(path, e.message()))?;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                index
                    .remove_path(relative)
                    .map_err(|e| ChangesetError::stage_failure(path, e.message()))?;
                debug!("Staged deletion of '{}'", path);
            }
            Err(e) => return Err(ChangesetError::stage_failure(path, e.to_string())),
        }

        index
            .write()
            .map_err(|e| ChangesetError::stage_failure(path, e.message()))?;

        debug!("Staged '{}'", path);
        Ok(())
    }

    fn unstage_paths(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let head = self.head_commit()?;
        self.repo
            .reset_default(Some(head.as_object()), paths.iter().map(String::as_str))?;

        debug!("Unstaged {} paths", paths.len());
        Ok(())
    }

    fn has_staged_changes(&self) -> Result<bool> {
        let head_tree = self.head_commit()?.tree()?;
        let index = self.repo.index()?;
        let diff = self
            .repo
            .diff_tree_to_index(Some(&head_tree), Some(&index), None)?;

        Ok(diff.deltas().len() > 0)
    }

    fn commit(&self, message: &str) -> Result<String> {
        let branch = self
            .current_branch()
            .unwrap_or_else(|_| "HEAD".to_string());
        let fail = |e: git2::Error| ChangesetError::commit_failure(branch.as_str(), e.message());

        let signature = self.get_signature()?;
        let mut index = self.repo.index().map_err(fail)?;
        let tree_id = index.write_tree().map_err(fail)?;
        let tree = self.repo.find_tree(tree_id).map_err(fail)?;
        let parent_commit = self.head_commit()?;

        let commit_id = self
            .repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &[&parent_commit],
            )
            .map_err(fail)?;

        info!("Created commit: {} - {}", commit_id, message);
        Ok(commit_id.to_string())
    }
}
