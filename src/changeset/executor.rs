use crate::changeset::report::{BranchChainEntry, GroupOutcome, Step};
use crate::changeset::resolver::{filter_excluded, PathResolver};
use crate::changeset::{ChangeSet, PathSpec};
use crate::errors::ChangesetError;
use crate::git::WorkingCopy;
use tracing::{debug, info, warn};

/// Applies a single change-set: branch, stage, and commit if anything is staged
pub struct StagingExecutor<'a, W: WorkingCopy + ?Sized> {
    working_copy: &'a W,
    exclude: &'a [PathSpec],
}

impl<'a, W: WorkingCopy + ?Sized> StagingExecutor<'a, W> {
    pub fn new(working_copy: &'a W, exclude: &'a [PathSpec]) -> Self {
        Self {
            working_copy,
            exclude,
        }
    }

    /// Create the change-set's branch from `base_ref`, stage its paths and
    /// commit them.
    ///
    /// Never returns early with an error: a failing step is recorded in the
    /// entry's outcome so the caller can stop the chain and report exactly
    /// where it stopped. Paths resolved here are claimed in `resolver`.
    pub fn apply(
        &self,
        change_set: &ChangeSet,
        base_ref: &str,
        resolver: &mut PathResolver,
    ) -> BranchChainEntry {
        let mut entry = BranchChainEntry {
            change_set_name: change_set.name.clone(),
            created_branch: change_set.branch_name.clone(),
            parent_ref: base_ref.to_string(),
            branch_created: false,
            paths: Vec::new(),
            outcome: GroupOutcome::SkippedEmpty,
        };

        if let Err(e) = self
            .working_copy
            .create_and_switch_branch(&change_set.branch_name, base_ref)
        {
            // the branch may exist even if switching to it failed
            entry.branch_created = !matches!(e, ChangesetError::BranchAlreadyExists(_))
                && self.working_copy.branch_exists(&change_set.branch_name);
            return self.fail(entry, Step::CreateBranch, e);
        }
        entry.branch_created = true;

        let pending = match self.working_copy.pending_changes() {
            Ok(pending) => filter_excluded(pending, self.exclude),
            Err(e) => return self.fail(entry, Step::Inspect, e),
        };

        let paths = resolver.resolve_change_set(change_set, &pending);
        resolver.claim(&paths);
        entry.paths = paths.iter().cloned().collect();
        debug!(
            "Change-set '{}' resolved {} of {} pending paths",
            change_set.name,
            paths.len(),
            pending.len()
        );

        for path in &paths {
            if let Err(e) = self.working_copy.stage_path(path) {
                return self.fail(entry, Step::Stage, e);
            }
        }

        let has_staged = match self.working_copy.has_staged_changes() {
            Ok(has_staged) => has_staged,
            Err(e) => return self.fail(entry, Step::Inspect, e),
        };

        if !has_staged {
            info!(
                "Nothing pending for '{}'; leaving '{}' without a commit",
                change_set.name, change_set.branch_name
            );
            entry.outcome = GroupOutcome::SkippedEmpty;
            return entry;
        }

        match self.working_copy.commit(&change_set.commit_message) {
            Ok(commit) => {
                info!(
                    "Committed {} paths for '{}' on '{}'",
                    entry.paths.len(),
                    change_set.name,
                    change_set.branch_name
                );
                entry.outcome = GroupOutcome::Committed { commit };
                entry
            }
            Err(e) => self.fail(entry, Step::Commit, e),
        }
    }

    fn fail(
        &self,
        mut entry: BranchChainEntry,
        step: Step,
        error: ChangesetError,
    ) -> BranchChainEntry {
        warn!(
            "Change-set '{}' failed during {}: {}",
            entry.change_set_name, step, error
        );
        entry.outcome = GroupOutcome::failed(step, &error);
        entry
    }
}
