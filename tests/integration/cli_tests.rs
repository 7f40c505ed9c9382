use super::test_helpers::*;
use tempfile::TempDir;

fn standard_manifest() -> String {
    manifest_json(&[
        ("app", "split/app", &["src/app.py"]),
        ("docs", "split/docs", &["docs/"]),
        ("cleanup", "split/cleanup", &["legacy.py"]),
    ])
}

#[test]
fn test_split_json_report_and_exit_code() {
    let (_tmp, repo) = create_test_git_repo();
    let home = TempDir::new().unwrap();
    make_mixed_changes(&repo);
    write_file(&repo, ".git/split.json", &standard_manifest());

    let output = cs(&repo, home.path(), &["split", ".git/split.json", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(report["mode"], "sibling");
    assert_eq!(report["base_ref"], "main");
    assert!(report["halt"].is_null());
    let entries = report["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["outcome"]["status"], "committed");

    // saved under the git directory, never as a pending change
    let runs = std::fs::read_dir(repo.join(".git/changeset/runs")).unwrap().count();
    assert_eq!(runs, 1);
    assert!(porcelain(&repo).is_empty());
}

#[test]
fn test_split_stacked_mode_flag_overrides_settings() {
    let (_tmp, repo) = create_test_git_repo();
    let home = TempDir::new().unwrap();
    make_mixed_changes(&repo);
    write_file(&repo, ".git/split.json", &standard_manifest());

    let output = cs(
        &repo,
        home.path(),
        &["split", ".git/split.json", "--mode", "stacked"],
    );
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(current_branch(&repo), "split/cleanup");
    assert_eq!(commits_between(&repo, "main", "split/cleanup").len(), 3);
}

#[test]
fn test_invalid_manifest_changes_nothing() {
    let (_tmp, repo) = create_test_git_repo();
    let home = TempDir::new().unwrap();
    make_mixed_changes(&repo);
    let duplicate = manifest_json(&[
        ("app", "split/same", &["src/app.py"]),
        ("docs", "split/same", &["docs/"]),
    ]);
    write_file(&repo, ".git/split.json", &duplicate);

    let output = cs(&repo, home.path(), &["split", ".git/split.json"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("Invalid manifest"));
    assert_eq!(local_branches(&repo), vec!["main"]);
    assert_eq!(porcelain(&repo).len(), 3);
}

#[test]
fn test_halted_run_names_failing_group() {
    let (_tmp, repo) = create_test_git_repo();
    let home = TempDir::new().unwrap();
    git(&repo, &["branch", "split/docs"]);
    make_mixed_changes(&repo);
    write_file(&repo, ".git/split.json", &standard_manifest());

    let output = cs(
        &repo,
        home.path(),
        &["split", ".git/split.json", "--report", ".git/last-run.json"],
    );
    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("'docs'"), "stderr: {stderr}");
    assert!(stderr.contains("already exists"), "stderr: {stderr}");
    assert!(branch_exists(&repo, "split/app"));
    assert!(!branch_exists(&repo, "split/cleanup"));

    // explicit cleanup of what the halted run created, then a clean retry
    let dry_run = cs(&repo, home.path(), &["cleanup", ".git/last-run.json"]);
    assert!(dry_run.status.success());
    assert!(branch_exists(&repo, "split/app"));

    let cleanup = cs(
        &repo,
        home.path(),
        &["cleanup", ".git/last-run.json", "--execute"],
    );
    assert!(cleanup.status.success(), "stderr: {}", stderr_of(&cleanup));
    assert!(!branch_exists(&repo, "split/app"));
    // not created by the run, so cleanup leaves it alone
    assert!(branch_exists(&repo, "split/docs"));
}

#[test]
fn test_unwritable_report_still_names_failing_group() {
    let (_tmp, repo) = create_test_git_repo();
    let home = TempDir::new().unwrap();
    git(&repo, &["branch", "split/docs"]);
    make_mixed_changes(&repo);
    write_file(&repo, ".git/split.json", &standard_manifest());

    // README.md is a file, so nothing can be written beneath it
    let output = cs(
        &repo,
        home.path(),
        &["split", ".git/split.json", "--report", "README.md/run.json"],
    );
    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("Could not save run report"), "stderr: {stderr}");
    assert!(stderr.contains("'docs'"), "stderr: {stderr}");
    assert!(stdout_of(&output).contains("Stopped at 'docs'"));
}

#[test]
fn test_cleanup_keeps_branches_with_new_commits() {
    let (_tmp, repo) = create_test_git_repo();
    let home = TempDir::new().unwrap();
    make_mixed_changes(&repo);
    write_file(&repo, ".git/split.json", &standard_manifest());

    let output = cs(
        &repo,
        home.path(),
        &["split", ".git/split.json", "--report", ".git/run.json"],
    );
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));

    git(&repo, &["checkout", "-q", "split/app"]);
    write_file(&repo, "src/app.py", "print('follow-up')\n");
    git(&repo, &["commit", "-qam", "Follow-up"]);
    git(&repo, &["checkout", "-q", "main"]);

    let dry_run = cs(&repo, home.path(), &["cleanup", ".git/run.json"]);
    assert!(stdout_of(&dry_run).contains("split/app (has new commits since the run)"));

    let cleanup = cs(&repo, home.path(), &["cleanup", ".git/run.json", "--execute"]);
    assert!(cleanup.status.success(), "stderr: {}", stderr_of(&cleanup));
    assert!(branch_exists(&repo, "split/app"));
    assert!(!branch_exists(&repo, "split/docs"));
    assert!(!branch_exists(&repo, "split/cleanup"));

    let forced = cs(
        &repo,
        home.path(),
        &["cleanup", ".git/run.json", "--execute", "--force"],
    );
    assert!(forced.status.success(), "stderr: {}", stderr_of(&forced));
    assert!(!branch_exists(&repo, "split/app"));
}

#[test]
fn test_manifest_inside_working_copy_is_never_committed() {
    let (_tmp, repo) = create_test_git_repo();
    let home = TempDir::new().unwrap();
    make_mixed_changes(&repo);
    let manifest = manifest_json(&[
        ("app", "split/app", &["src/app.py"]),
        ("rest", "split/rest", &["."]),
    ]);
    write_file(&repo, "split.json", &manifest);

    let output = cs(&repo, home.path(), &["split", "split.json", "--mode", "stacked"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(tip_paths(&repo, "split/rest"), vec!["docs/new.md", "legacy.py"]);
    assert_eq!(porcelain(&repo), vec!["?? split.json"]);
}

#[test]
fn test_toml_manifest_and_validate() {
    let (_tmp, repo) = create_test_git_repo();
    let home = TempDir::new().unwrap();
    write_file(
        &repo,
        ".git/split.toml",
        r#"
[[change_sets]]
name = "app"
branch = "split/app"
message = "Update app"
paths = ["src/app.py"]

[[change_sets]]
name = "rest"
branch = "split/rest"
message = "Everything else"
paths = ["."]
"#,
    );

    let output = cs(&repo, home.path(), &["validate", ".git/split.toml"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert!(stdout_of(&output).contains("2 change-sets"));
}

#[test]
fn test_plan_is_read_only() {
    let (_tmp, repo) = create_test_git_repo();
    let home = TempDir::new().unwrap();
    make_mixed_changes(&repo);
    let manifest = manifest_json(&[
        ("app", "split/app", &["src/app.py"]),
        ("again", "split/again", &["src/app.py", "docs/"]),
    ]);
    write_file(&repo, ".git/split.json", &manifest);

    let output = cs(&repo, home.path(), &["plan", ".git/split.json", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));

    let plan: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(plan["assignments"][0]["paths"], serde_json::json!(["src/app.py"]));
    assert_eq!(plan["assignments"][1]["paths"], serde_json::json!(["docs/new.md"]));
    assert_eq!(
        plan["assignments"][1]["contested"],
        serde_json::json!(["src/app.py"])
    );
    assert_eq!(local_branches(&repo), vec!["main"]);
    assert_eq!(porcelain(&repo).len(), 3);
}

#[test]
fn test_config_roundtrip_and_exclude() {
    let (_tmp, repo) = create_test_git_repo();
    let home = TempDir::new().unwrap();

    let set = cs(&repo, home.path(), &["config", "set", "split.exclude", "notes.md"]);
    assert!(set.status.success(), "stderr: {}", stderr_of(&set));
    let get = cs(&repo, home.path(), &["config", "get", "split.exclude"]);
    assert_eq!(stdout_of(&get).trim(), "notes.md");
    assert!(repo.join(".git/changeset/config.json").exists());

    let bad = cs(&repo, home.path(), &["config", "set", "split.default_mode", "linear"]);
    assert!(!bad.status.success());

    write_file(&repo, "notes.md", "scratch\n");
    write_file(&repo, "src/app.py", "print('app v2')\n");
    write_file(
        &repo,
        ".git/split.json",
        &manifest_json(&[("all", "split/all", &["."])]),
    );
    let output = cs(&repo, home.path(), &["split", ".git/split.json"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(tip_paths(&repo, "split/all"), vec!["src/app.py"]);
    assert_eq!(porcelain(&repo), vec!["?? notes.md"]);
}

#[test]
fn test_status_and_not_a_repository() {
    let (_tmp, repo) = create_test_git_repo();
    let home = TempDir::new().unwrap();
    make_mixed_changes(&repo);

    let status = cs(&repo, home.path(), &["status"]);
    assert!(status.status.success(), "stderr: {}", stderr_of(&status));
    let stdout = stdout_of(&status);
    assert!(stdout.contains("Current branch: main"));
    assert!(stdout.contains("Git dir: "), "stdout: {stdout}");
    assert!(stdout.contains("D legacy.py"));
    assert!(stdout.contains("? docs/new.md"));

    let outside = TempDir::new().unwrap();
    let output = cs(outside.path(), home.path(), &["status"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("Not a git repository"));
}

#[test]
fn test_completions() {
    let (_tmp, repo) = create_test_git_repo();
    let home = TempDir::new().unwrap();
    let output = cs(&repo, home.path(), &["completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("cs"));
}
