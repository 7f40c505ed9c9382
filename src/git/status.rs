use serde::{Deserialize, Serialize};
use std::fmt;

/// How a pending path differs from HEAD
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// New file already recorded in the index
    Added,
    /// Tracked file whose content or mode changed
    Modified,
    /// Tracked file removed from disk or from the index
    Deleted,
    /// New file git does not know about yet
    Untracked,
}

impl ChangeKind {
    /// Classify a libgit2 status entry. Returns `None` for clean or ignored entries.
    pub fn from_status(status: git2::Status) -> Option<Self> {
        if status.is_empty() || status.contains(git2::Status::IGNORED) {
            return None;
        }

        if status.intersects(git2::Status::WT_DELETED | git2::Status::INDEX_DELETED) {
            Some(ChangeKind::Deleted)
        } else if status.contains(git2::Status::INDEX_NEW) {
            Some(ChangeKind::Added)
        } else if status.contains(git2::Status::WT_NEW) {
            Some(ChangeKind::Untracked)
        } else {
            // modified, renamed, typechange and conflicted all stage the same way
            Some(ChangeKind::Modified)
        }
    }

    /// Single-letter code in the spirit of `git status --short`
    pub fn short_code(&self) -> &'static str {
        match self {
            ChangeKind::Added => "A",
            ChangeKind::Modified => "M",
            ChangeKind::Deleted => "D",
            ChangeKind::Untracked => "??",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Untracked => "untracked",
        };
        f.write_str(label)
    }
}

/// A path with uncommitted changes, relative to the working copy root
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PendingChange {
    pub path: String,
    pub kind: ChangeKind,
}

impl PendingChange {
    pub fn new<P: Into<String>>(path: P, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}
