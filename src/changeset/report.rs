use crate::changeset::TopologyMode;
use crate::errors::{ChangesetError, Result};
use crate::utils::atomic_file;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The stage of a change-set's application that was running when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    CreateBranch,
    Inspect,
    Stage,
    Commit,
    ReturnToBase,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Step::CreateBranch => "create-branch",
            Step::Inspect => "inspect",
            Step::Stage => "stage",
            Step::Commit => "commit",
            Step::ReturnToBase => "return-to-base",
        };
        f.write_str(label)
    }
}

/// What happened to one change-set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupOutcome {
    /// Something was staged and committed
    Committed { commit: String },
    /// Nothing pending for this change-set; branch left at its parent
    SkippedEmpty,
    /// The change-set stopped at `step`
    Failed {
        step: Step,
        code: String,
        reason: String,
    },
}

impl GroupOutcome {
    pub fn failed(step: Step, error: &ChangesetError) -> Self {
        GroupOutcome::Failed {
            step,
            code: error.code().to_string(),
            reason: error.to_string(),
        }
    }
}

/// One processed change-set, in run order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchChainEntry {
    pub change_set_name: String,
    pub created_branch: String,
    pub parent_ref: String,
    /// False only when the branch could not be created
    pub branch_created: bool,
    pub paths: Vec<String>,
    pub outcome: GroupOutcome,
}

impl BranchChainEntry {
    pub fn commit_created(&self) -> bool {
        matches!(self.outcome, GroupOutcome::Committed { .. })
    }

    pub fn commit(&self) -> Option<&str> {
        match &self.outcome {
            GroupOutcome::Committed { commit } => Some(commit.as_str()),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, GroupOutcome::Failed { .. })
    }
}

/// Where a run stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Halt {
    pub group: String,
    pub step: Step,
    pub code: String,
    pub reason: String,
}

impl Halt {
    pub fn new(group: &str, step: Step, error: &ChangesetError) -> Self {
        Self {
            group: group.to_string(),
            step,
            code: error.code().to_string(),
            reason: error.to_string(),
        }
    }

    pub fn to_error(&self) -> ChangesetError {
        ChangesetError::RunHalted {
            group: self.group.clone(),
            step: self.step.to_string(),
            reason: self.reason.clone(),
        }
    }
}

/// Audit trail of one split run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub mode: TopologyMode,
    pub base_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub entries: Vec<BranchChainEntry>,
    pub halt: Option<Halt>,
}

impl RunReport {
    pub fn new(mode: TopologyMode, base_ref: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            mode,
            base_ref: base_ref.to_string(),
            manifest: None,
            started_at: Utc::now(),
            finished_at: None,
            entries: Vec::new(),
            halt: None,
        }
    }

    pub fn with_manifest(mut self, manifest: &Path) -> Self {
        self.manifest = Some(manifest.display().to_string());
        self
    }

    /// Append the next processed change-set
    pub fn push(&mut self, entry: BranchChainEntry) {
        self.entries.push(entry);
    }

    pub fn halt(&mut self, halt: Halt) {
        self.halt = Some(halt);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn is_success(&self) -> bool {
        self.halt.is_none()
    }

    pub fn committed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.commit_created()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == GroupOutcome::SkippedEmpty)
            .count()
    }

    /// Branches this run actually created, in creation order
    pub fn created_branches(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.branch_created)
            .map(|e| e.created_branch.as_str())
            .collect()
    }

    pub fn entry(&self, change_set_name: &str) -> Option<&BranchChainEntry> {
        self.entries
            .iter()
            .find(|e| e.change_set_name == change_set_name)
    }

    /// `Ok` for a complete run, `RunHalted` naming the failing change-set otherwise
    pub fn into_result(self) -> Result<Self> {
        if let Some(halt) = &self.halt {
            return Err(halt.to_error());
        }
        Ok(self)
    }

    /// `<runs_dir>/<run_id>.json`
    pub fn default_path(&self, runs_dir: &Path) -> PathBuf {
        runs_dir.join(format!("{}.json", self.run_id))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        atomic_file::write_json(path, self)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ChangesetError::config(format!(
                "Failed to read run report {}: {e}",
                path.display()
            ))
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}
