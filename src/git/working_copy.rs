use crate::errors::Result;
use crate::git::PendingChange;

/// The version-control operations the split engine needs from a working copy.
///
/// `GitRepository` is the production implementation. Every call is blocking
/// and its outcome is observed before the next one is issued.
pub trait WorkingCopy {
    /// Short name of the checked-out branch.
    ///
    /// Fails with `DetachedHead` when HEAD is not a symbolic ref.
    fn current_branch(&self) -> Result<String>;

    /// Point-in-time list of paths with uncommitted changes, sorted by path.
    fn pending_changes(&self) -> Result<Vec<PendingChange>>;

    fn branch_exists(&self, name: &str) -> bool;

    /// Create `name` at `from` and check it out.
    ///
    /// Fails with `BranchAlreadyExists` instead of moving an existing branch.
    fn create_and_switch_branch(&self, name: &str, from: &str) -> Result<()>;

    /// Check out an existing branch, keeping unrelated pending changes.
    fn switch_to(&self, reference: &str) -> Result<()>;

    /// Record the working-tree state of `path` in the index.
    ///
    /// A path missing from disk is staged as a deletion; only real failures
    /// (permissions, unreadable content) surface as `PathStageFailure`.
    fn stage_path(&self, path: &str) -> Result<()>;

    /// Reset the index entries of `paths` to HEAD without touching the files.
    fn unstage_paths(&self, paths: &[String]) -> Result<()>;

    /// Whether the index differs from HEAD.
    fn has_staged_changes(&self) -> Result<bool>;

    /// Commit the index on the current branch and return the new commit id.
    fn commit(&self, message: &str) -> Result<String>;
}
