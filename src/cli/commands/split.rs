use super::Workspace;
use crate::changeset::{BranchChainController, GroupOutcome, Manifest, RunReport, TopologyMode};
use crate::cli::output::Output;
use crate::config::runs_dir;
use crate::errors::Result;
use crate::utils::spinner::Spinner;
use console::style;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Run a manifest against the current repository
pub fn run(
    manifest_path: &Path,
    mode: Option<TopologyMode>,
    report_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let manifest = Manifest::load_from_file(manifest_path)?;
    let workspace = Workspace::open()?;
    let options = workspace.run_options(mode, manifest_path)?;
    let mode = options.mode;

    let spinner = Spinner::for_run(
        format!("Splitting into {} change-sets ({mode})...", manifest.len()),
        json,
    );
    let result = BranchChainController::new(&workspace.repo, options).run(&manifest);
    spinner.stop();
    let report = result?.with_manifest(manifest_path);

    let mut saved_to: Option<PathBuf> = None;
    if workspace.settings.split.save_reports {
        let path = report.default_path(&runs_dir(&workspace.root)?);
        match report.save_to_file(&path) {
            Ok(()) => {
                info!("Run report saved to {}", path.display());
                saved_to = Some(path);
            }
            // the branches exist either way; losing the audit file is not fatal
            Err(e) => warn!("Could not save run report to {}: {}", path.display(), e),
        }
    }
    if let Some(path) = report_path {
        match report.save_to_file(path) {
            Ok(()) => saved_to = Some(path.to_path_buf()),
            Err(e) => warn!("Could not save run report to {}: {}", path.display(), e),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, saved_to.as_deref());
    }

    report.into_result().map(|_| ())
}

fn print_report(report: &RunReport, report_path: Option<&Path>) {
    Output::section(format!(
        "Split from '{}' ({} mode)",
        report.base_ref, report.mode
    ));

    for (index, entry) in report.entries.iter().enumerate() {
        let line = match &entry.outcome {
            GroupOutcome::Committed { commit } => format!(
                "{} {} → {} ({} paths, {})",
                style("✓").green(),
                entry.change_set_name,
                style(&entry.created_branch).cyan(),
                entry.paths.len(),
                &commit[..commit.len().min(8)]
            ),
            GroupOutcome::SkippedEmpty => format!(
                "{} {} → {} (nothing pending, no commit)",
                style("○").dim(),
                entry.change_set_name,
                style(&entry.created_branch).cyan()
            ),
            GroupOutcome::Failed { step, reason, .. } => format!(
                "{} {} failed during {}: {}",
                style("✗").red(),
                entry.change_set_name,
                step,
                reason
            ),
        };
        Output::numbered_item(index + 1, line);
    }

    Output::spacing();
    match &report.halt {
        None => Output::success(format!(
            "{} committed, {} empty",
            report.committed_count(),
            report.skipped_count()
        )),
        Some(halt) => {
            Output::error(format!(
                "Stopped at '{}' during {}; later change-sets were not attempted",
                halt.group, halt.step
            ));
            let created = report.created_branches();
            if !created.is_empty() {
                Output::tip("Branches from this run were kept. To remove them before retrying:");
                match report_path {
                    Some(path) => {
                        Output::command_example(format!("cs cleanup {} --execute", path.display()))
                    }
                    None => {
                        for branch in created {
                            Output::command_example(format!("git branch -D {branch}"));
                        }
                    }
                }
            }
        }
    }
}
