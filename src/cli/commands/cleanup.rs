use super::Workspace;
use crate::changeset::{BranchChainEntry, RunReport};
use crate::cli::output::Output;
use crate::errors::Result;
use crate::git::WorkingCopy;
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::path::Path;

/// Remove the branches a recorded run created
pub fn run(report_path: &Path, execute: bool, force: bool) -> Result<()> {
    let report = RunReport::load_from_file(report_path)?;
    let workspace = Workspace::open()?;
    let repo = &workspace.repo;

    let existing = repo.list_branches()?;
    let mut branches = Vec::new();
    for entry in report.entries.iter().filter(|e| e.branch_created) {
        if existing.contains(&entry.created_branch) {
            let moved = has_moved(entry, &repo.get_branch_head(&entry.created_branch)?);
            branches.push((entry.created_branch.as_str(), moved));
        }
    }

    Output::section(format!("Branches created by run {}", report.run_id));
    if branches.is_empty() {
        Output::success("Nothing to clean up");
        return Ok(());
    }
    for (branch, moved) in &branches {
        if *moved {
            Output::bullet(format!("{branch} (has new commits since the run)"));
        } else {
            Output::bullet(branch);
        }
    }

    if !execute {
        Output::spacing();
        Output::warning("DRY RUN - no branches will be deleted");
        Output::info("Run with --execute to delete these branches");
        return Ok(());
    }

    if console::user_attended() {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete {} branches?", branches.len()))
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirmed {
            Output::info("Cleanup cancelled");
            return Ok(());
        }
    }

    let current = repo.current_branch().ok();
    let mut deleted = 0;
    let mut skipped = 0;

    for (branch, moved) in branches {
        if moved && !force {
            Output::warning(format!(
                "Skipped '{branch}': it has commits the run did not make (use --force to delete it)"
            ));
            skipped += 1;
            continue;
        }
        if current.as_deref() == Some(branch) {
            if !force {
                Output::warning(format!(
                    "Skipped '{branch}': it is checked out (use --force to switch to '{}' first)",
                    report.base_ref
                ));
                skipped += 1;
                continue;
            }
            repo.switch_to(&report.base_ref)?;
            Output::info(format!("Switched to '{}'", report.base_ref));
        }

        match repo.delete_branch(branch) {
            Ok(()) => {
                Output::success(format!("Deleted '{branch}'"));
                deleted += 1;
            }
            Err(e) => {
                Output::error(format!("Failed to delete '{branch}': {e}"));
                skipped += 1;
            }
        }
    }

    Output::spacing();
    Output::success(format!("Deleted {deleted} branches"));
    if skipped > 0 {
        Output::warning(format!("{skipped} branches were left in place"));
    }
    Ok(())
}

/// Whether a branch tip no longer matches the commit the run recorded
fn has_moved(entry: &BranchChainEntry, tip: &str) -> bool {
    entry.commit().is_some_and(|commit| commit != tip)
}
