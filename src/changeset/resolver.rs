use crate::changeset::{ChangeSet, Manifest, PathSpec};
use crate::git::PendingChange;
use serde::Serialize;
use std::collections::BTreeSet;

/// Expands path specs into concrete pending paths.
///
/// Carries the running set of paths claimed by earlier change-sets so a
/// catch-all only sees what is left over.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    claimed: BTreeSet<String>,
}

impl PathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve one spec against a pending snapshot.
    ///
    /// Membership in the snapshot is all that counts, so a deleted file still
    /// resolves and a path that is not pending simply yields nothing.
    pub fn resolve(&self, spec: &PathSpec, pending: &[PendingChange]) -> BTreeSet<String> {
        pending
            .iter()
            .filter(|change| spec.matches(&change.path))
            .filter(|change| !spec.is_catch_all() || !self.claimed.contains(&change.path))
            .map(|change| change.path.clone())
            .collect()
    }

    /// Union of every spec of a change-set; duplicates collapse.
    pub fn resolve_change_set(
        &self,
        change_set: &ChangeSet,
        pending: &[PendingChange],
    ) -> BTreeSet<String> {
        change_set
            .path_specs
            .iter()
            .flat_map(|spec| self.resolve(spec, pending))
            .collect()
    }

    /// Record paths as taken by the change-set just processed
    pub fn claim<'a, I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        self.claimed.extend(paths.into_iter().cloned());
    }

    pub fn is_claimed(&self, path: &str) -> bool {
        self.claimed.contains(path)
    }

    pub fn claimed(&self) -> &BTreeSet<String> {
        &self.claimed
    }
}

/// Drop pending paths matched by any exclusion spec
pub fn filter_excluded(pending: Vec<PendingChange>, exclude: &[PathSpec]) -> Vec<PendingChange> {
    if exclude.is_empty() {
        return pending;
    }
    pending
        .into_iter()
        .filter(|change| !exclude.iter().any(|spec| spec.matches(&change.path)))
        .collect()
}

/// Paths one change-set is predicted to commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub change_set: String,
    pub branch: String,
    pub paths: BTreeSet<String>,
    /// Paths this change-set's explicit specs match but an earlier change-set
    /// already took. Non-empty means the manifest double-claims.
    pub contested: BTreeSet<String>,
}

/// Outcome of the pure planning pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub assignments: Vec<Assignment>,
    pub snapshot: BTreeSet<String>,
}

impl Plan {
    /// Pending paths no change-set will commit
    pub fn unclaimed(&self) -> BTreeSet<String> {
        let claimed: BTreeSet<&String> = self
            .assignments
            .iter()
            .flat_map(|assignment| assignment.paths.iter())
            .collect();
        self.snapshot
            .iter()
            .filter(|path| !claimed.contains(path))
            .cloned()
            .collect()
    }

    pub fn has_contested_paths(&self) -> bool {
        self.assignments.iter().any(|a| !a.contested.is_empty())
    }

    /// Change-sets predicted to end up without a commit
    pub fn empty_change_sets(&self) -> Vec<&str> {
        self.assignments
            .iter()
            .filter(|a| a.paths.is_empty())
            .map(|a| a.change_set.as_str())
            .collect()
    }
}

/// Decide which pending paths each change-set gets, without touching a repository.
///
/// Mirrors a real run: change-set *k* sees the snapshot minus whatever
/// change-sets `1..k-1` claimed, because those paths have been committed away
/// by the time *k* is processed.
pub fn plan(manifest: &Manifest, snapshot: &[PendingChange]) -> Plan {
    let mut resolver = PathResolver::new();
    let mut assignments = Vec::with_capacity(manifest.len());

    for change_set in manifest.change_sets() {
        let remaining: Vec<PendingChange> = snapshot
            .iter()
            .filter(|change| !resolver.is_claimed(&change.path))
            .cloned()
            .collect();
        let paths = resolver.resolve_change_set(change_set, &remaining);

        let contested = snapshot
            .iter()
            .filter(|change| resolver.is_claimed(&change.path))
            .filter(|change| {
                change_set
                    .path_specs
                    .iter()
                    .any(|spec| !spec.is_catch_all() && spec.matches(&change.path))
            })
            .map(|change| change.path.clone())
            .collect();

        resolver.claim(&paths);
        assignments.push(Assignment {
            change_set: change_set.name.clone(),
            branch: change_set.branch_name.clone(),
            paths,
            contested,
        });
    }

    Plan {
        assignments,
        snapshot: snapshot.iter().map(|change| change.path.clone()).collect(),
    }
}
