use super::Workspace;
use crate::changeset::RunReport;
use crate::cli::output::Output;
use crate::config::runs_dir;
use crate::errors::Result;
use std::fs;
use std::path::Path;

const RECENT_RUNS: usize = 5;

/// Show the current branch, pending changes and recent split runs
pub fn run() -> Result<()> {
    let workspace = Workspace::open()?;
    let info = workspace.repo.get_info()?;

    Output::section("Repository");
    Output::sub_item(format!("Path: {}", info.path.display()));
    Output::sub_item(format!("Git dir: {}", info.git_dir.display()));
    match &info.head_branch {
        Some(branch) => Output::sub_item(format!("Current branch: {branch}")),
        None => Output::warning("Detached HEAD: check out a branch before splitting"),
    }
    if let Some(commit) = &info.head_commit {
        Output::sub_item(format!("HEAD commit: {}", &commit[..commit.len().min(12)]));
    }

    Output::section("Pending changes");
    if info.pending.is_empty() {
        Output::success("Working directory clean");
    } else {
        for change in &info.pending {
            Output::bullet(format!("{} {}", change.kind.short_code(), change.path));
        }
    }

    let runs = recent_runs(&runs_dir(&workspace.root)?);
    if !runs.is_empty() {
        Output::section("Recent runs");
        for report in runs {
            let state = match &report.halt {
                None => "complete".to_string(),
                Some(halt) => format!("halted at '{}'", halt.group),
            };
            Output::bullet(format!(
                "{} {} from '{}', {} committed, {}",
                report.started_at.format("%Y-%m-%d %H:%M"),
                report.mode,
                report.base_ref,
                report.committed_count(),
                state
            ));
        }
    }
    Ok(())
}

/// Newest reports first; unreadable files are skipped
fn recent_runs(dir: &Path) -> Vec<RunReport> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut reports: Vec<RunReport> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|path| RunReport::load_from_file(&path).ok())
        .collect();
    reports.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    reports.truncate(RECENT_RUNS);
    reports
}
