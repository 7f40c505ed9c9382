use crate::changeset::executor::StagingExecutor;
use crate::changeset::report::{GroupOutcome, Halt, RunReport, Step};
use crate::changeset::resolver::PathResolver;
use crate::changeset::{Manifest, PathSpec};
use crate::errors::{ChangesetError, Result};
use crate::git::WorkingCopy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Where each change-set's branch starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopologyMode {
    /// Every branch starts at the original ref; the working copy returns
    /// there after each change-set
    #[default]
    Sibling,
    /// Each branch starts at the previous change-set's branch
    Stacked,
}

impl fmt::Display for TopologyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyMode::Sibling => f.write_str("sibling"),
            TopologyMode::Stacked => f.write_str("stacked"),
        }
    }
}

impl FromStr for TopologyMode {
    type Err = ChangesetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sibling" => Ok(TopologyMode::Sibling),
            "stacked" => Ok(TopologyMode::Stacked),
            other => Err(ChangesetError::config(format!(
                "Unknown topology mode '{other}'. Valid options: sibling, stacked"
            ))),
        }
    }
}

/// Knobs for one run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub mode: TopologyMode,
    /// Reset the index to HEAD for every pending path before the first change-set
    pub unstage_first: bool,
    /// Paths never offered to any change-set
    pub exclude: Vec<PathSpec>,
}

/// State threaded through the controller's transitions
#[derive(Debug, Clone)]
pub struct ChainContext {
    /// Ref checked out when the run started
    pub base_ref: String,
    /// Ref the working copy is on right now
    pub current_ref: String,
    pub resolver: PathResolver,
}

impl ChainContext {
    pub fn new(base_ref: String) -> Self {
        Self {
            current_ref: base_ref.clone(),
            base_ref,
            resolver: PathResolver::new(),
        }
    }

    /// Parent for the next change-set's branch
    pub fn next_parent(&self, mode: TopologyMode) -> &str {
        match mode {
            TopologyMode::Sibling => &self.base_ref,
            TopologyMode::Stacked => &self.current_ref,
        }
    }
}

/// Drives the manifest's change-sets in order, one branch each
pub struct BranchChainController<'a, W: WorkingCopy + ?Sized> {
    working_copy: &'a W,
    options: RunOptions,
}

impl<'a, W: WorkingCopy + ?Sized> BranchChainController<'a, W> {
    pub fn new(working_copy: &'a W, options: RunOptions) -> Self {
        Self {
            working_copy,
            options,
        }
    }

    /// Split the pending changes according to `manifest`.
    ///
    /// Errors before the first change-set (no branch to start from, index
    /// reset failed) are returned directly. Once change-sets are being applied
    /// the run is fail-fast: the first failure is recorded in the report's
    /// `halt` and nothing already created is rolled back.
    pub fn run(&self, manifest: &Manifest) -> Result<RunReport> {
        let base_ref = self.working_copy.current_branch()?;
        info!(
            "Splitting pending changes into {} change-sets from '{}' ({} mode)",
            manifest.len(),
            base_ref,
            self.options.mode
        );

        if self.options.unstage_first {
            self.unstage_everything()?;
        }

        let mut context = ChainContext::new(base_ref);
        let mut report = RunReport::new(self.options.mode, &context.base_ref);
        let executor = StagingExecutor::new(self.working_copy, &self.options.exclude);

        for change_set in manifest.change_sets() {
            let parent_ref = context.next_parent(self.options.mode).to_string();
            debug!(
                "Applying '{}' onto '{}' as '{}'",
                change_set.name, parent_ref, change_set.branch_name
            );

            let entry = executor.apply(change_set, &parent_ref, &mut context.resolver);
            if entry.branch_created {
                context.current_ref = entry.created_branch.clone();
            }

            let failure = match &entry.outcome {
                GroupOutcome::Failed { step, code, reason } => Some(Halt {
                    group: change_set.name.clone(),
                    step: *step,
                    code: code.clone(),
                    reason: reason.clone(),
                }),
                _ => None,
            };
            report.push(entry);

            if let Some(halt) = failure {
                warn!("Run halted at '{}' during {}", halt.group, halt.step);
                report.halt(halt);
                break;
            }

            if self.options.mode == TopologyMode::Sibling {
                if let Err(e) = self.working_copy.switch_to(&context.base_ref) {
                    warn!("Could not return to '{}': {}", context.base_ref, e);
                    report.halt(Halt::new(&change_set.name, Step::ReturnToBase, &e));
                    break;
                }
                context.current_ref = context.base_ref.clone();
            }
        }

        report.finish();
        info!(
            "Run finished on '{}': {} committed, {} empty",
            context.current_ref,
            report.committed_count(),
            report.skipped_count()
        );
        Ok(report)
    }

    fn unstage_everything(&self) -> Result<()> {
        let paths: Vec<String> = self
            .working_copy
            .pending_changes()?
            .into_iter()
            .map(|change| change.path)
            .collect();
        self.working_copy.unstage_paths(&paths)
    }
}
