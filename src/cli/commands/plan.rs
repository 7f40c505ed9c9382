use super::Workspace;
use crate::changeset::{filter_excluded, plan, Manifest, Plan};
use crate::cli::output::Output;
use crate::errors::Result;
use crate::git::WorkingCopy;
use console::style;
use std::path::Path;

/// Dry run: resolve the manifest against the current pending changes
pub fn run(manifest_path: &Path, json: bool) -> Result<()> {
    let manifest = Manifest::load_from_file(manifest_path)?;
    let workspace = Workspace::open()?;
    let exclude = workspace.exclusions(manifest_path)?;

    let pending = filter_excluded(workspace.repo.pending_changes()?, &exclude);
    let plan = plan(&manifest, &pending);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let existing: Vec<&str> = manifest
        .change_sets()
        .iter()
        .map(|change_set| change_set.branch_name.as_str())
        .filter(|branch| workspace.repo.branch_exists(branch))
        .collect();
    print_plan(&plan, &existing);
    Ok(())
}

fn print_plan(plan: &Plan, existing_branches: &[&str]) {
    Output::section(format!("Plan for {} pending paths", plan.snapshot.len()));

    for (index, assignment) in plan.assignments.iter().enumerate() {
        Output::numbered_item(
            index + 1,
            format!(
                "{} → {} ({} paths)",
                assignment.change_set,
                style(&assignment.branch).cyan(),
                assignment.paths.len()
            ),
        );
        for path in &assignment.paths {
            Output::sub_item(path);
        }
        for path in &assignment.contested {
            Output::warning(format!(
                "'{path}' is already taken by an earlier change-set and will not be committed here"
            ));
        }
    }

    if plan.has_contested_paths() {
        Output::tip("Each path is committed by the first change-set that claims it");
    }

    let empty = plan.empty_change_sets();
    if !empty.is_empty() {
        Output::spacing();
        Output::info(format!("No commit expected for: {}", empty.join(", ")));
    }

    let unclaimed = plan.unclaimed();
    if !unclaimed.is_empty() {
        Output::spacing();
        Output::warning(format!(
            "{} pending paths are not claimed and will stay in the working copy:",
            unclaimed.len()
        ));
        for path in &unclaimed {
            Output::bullet(path);
        }
    }

    if !existing_branches.is_empty() {
        Output::spacing();
        Output::warning(format!(
            "Branches already exist and would stop the run: {}",
            existing_branches.join(", ")
        ));
    }
}
