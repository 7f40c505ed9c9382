use super::test_helpers::*;
use changeset_cli::changeset::{
    BranchChainController, ChangeSet, GroupOutcome, Manifest, PathSpec, RunOptions, Step,
    TopologyMode,
};
use changeset_cli::git::{get_current_repository, GitRepository, WorkingCopy};
use changeset_cli::ChangesetError;
use serial_test::serial;

fn group(name: &str, paths: &[&str]) -> ChangeSet {
    ChangeSet::new(
        name,
        format!("split/{name}"),
        format!("Add {name}"),
        paths.iter().map(|p| PathSpec::parse(p).unwrap()).collect(),
    )
}

fn options(mode: TopologyMode) -> RunOptions {
    RunOptions {
        mode,
        unstage_first: true,
        exclude: Vec::new(),
    }
}

fn three_groups() -> Manifest {
    Manifest::new(vec![
        group("app", &["src/app.py"]),
        group("docs", &["docs/"]),
        group("cleanup", &["legacy.py"]),
    ])
    .unwrap()
}

#[test]
fn test_sibling_split_creates_independent_branches() {
    let (_tmp, repo_path) = create_test_git_repo();
    make_mixed_changes(&repo_path);
    let repo = GitRepository::open(&repo_path).unwrap();

    let report = BranchChainController::new(&repo, options(TopologyMode::Sibling))
        .run(&three_groups())
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.committed_count(), 3);
    assert_eq!(current_branch(&repo_path), "main");

    assert_eq!(commits_between(&repo_path, "main", "split/app"), vec!["Add app"]);
    assert_eq!(commits_between(&repo_path, "main", "split/docs"), vec!["Add docs"]);
    assert_eq!(
        commits_between(&repo_path, "main", "split/cleanup"),
        vec!["Add cleanup"]
    );
    assert_eq!(tip_paths(&repo_path, "split/app"), vec!["src/app.py"]);
    assert_eq!(tip_paths(&repo_path, "split/docs"), vec!["docs/new.md"]);
    assert_eq!(tip_paths(&repo_path, "split/cleanup"), vec!["legacy.py"]);

    // the deletion really is a deletion on its branch
    let tree = git(&repo_path, &["ls-tree", "-r", "--name-only", "split/cleanup"]);
    assert!(!tree.lines().any(|line| line == "legacy.py"));

    // every slice was committed elsewhere, so main is clean again
    assert!(porcelain(&repo_path).is_empty(), "{:?}", porcelain(&repo_path));
}

#[test]
fn test_stacked_split_builds_a_chain() {
    let (_tmp, repo_path) = create_test_git_repo();
    make_mixed_changes(&repo_path);
    let repo = GitRepository::open(&repo_path).unwrap();

    let report = BranchChainController::new(&repo, options(TopologyMode::Stacked))
        .run(&three_groups())
        .unwrap();

    assert!(report.is_success());
    assert_eq!(current_branch(&repo_path), "split/cleanup");
    assert_eq!(
        commits_between(&repo_path, "main", "split/cleanup"),
        vec!["Add app", "Add docs", "Add cleanup"]
    );
    assert_eq!(
        commits_between(&repo_path, "split/app", "split/docs"),
        vec!["Add docs"]
    );
    assert_eq!(tip_paths(&repo_path, "split/docs"), vec!["docs/new.md"]);

    let parents: Vec<&str> = report.entries.iter().map(|e| e.parent_ref.as_str()).collect();
    assert_eq!(parents, vec!["main", "split/app", "split/docs"]);
    assert!(porcelain(&repo_path).is_empty());
}

#[test]
fn test_catch_all_takes_remaining_paths() {
    let (_tmp, repo_path) = create_test_git_repo();
    make_mixed_changes(&repo_path);
    write_file(&repo_path, "src/util.py", "def util(): return 1\n");
    let repo = GitRepository::open(&repo_path).unwrap();

    let manifest = Manifest::new(vec![group("app", &["src/app.py"]), group("rest", &["."])]).unwrap();
    let report = BranchChainController::new(&repo, options(TopologyMode::Stacked))
        .run(&manifest)
        .unwrap();

    assert_eq!(
        report.entry("rest").unwrap().paths,
        vec!["docs/new.md", "legacy.py", "src/util.py"]
    );
    assert_eq!(
        tip_paths(&repo_path, "split/rest"),
        vec!["docs/new.md", "legacy.py", "src/util.py"]
    );
    assert_eq!(tip_paths(&repo_path, "split/app"), vec!["src/app.py"]);
}

#[test]
fn test_group_without_pending_paths_leaves_branch_at_parent() {
    let (_tmp, repo_path) = create_test_git_repo();
    write_file(&repo_path, "src/app.py", "print('app v2')\n");
    let repo = GitRepository::open(&repo_path).unwrap();

    let manifest =
        Manifest::new(vec![group("docs", &["docs/"]), group("app", &["src/app.py"])]).unwrap();
    let report = BranchChainController::new(&repo, options(TopologyMode::Sibling))
        .run(&manifest)
        .unwrap();

    assert!(report.is_success());
    assert_eq!(
        report.entry("docs").unwrap().outcome,
        GroupOutcome::SkippedEmpty
    );
    assert_eq!(
        git(&repo_path, &["rev-parse", "split/docs"]),
        git(&repo_path, &["rev-parse", "main"])
    );
    assert_eq!(commits_between(&repo_path, "main", "split/app"), vec!["Add app"]);
}

#[test]
fn test_existing_branch_halts_and_keeps_earlier_work() {
    let (_tmp, repo_path) = create_test_git_repo();
    git(&repo_path, &["branch", "split/docs"]);
    make_mixed_changes(&repo_path);
    let repo = GitRepository::open(&repo_path).unwrap();

    let report = BranchChainController::new(&repo, options(TopologyMode::Sibling))
        .run(&three_groups())
        .unwrap();

    let halt = report.halt.clone().unwrap();
    assert_eq!(halt.group, "docs");
    assert_eq!(halt.step, Step::CreateBranch);
    assert!(report.entry("app").unwrap().commit_created());
    assert!(report.entry("cleanup").is_none());
    assert!(!branch_exists(&repo_path, "split/cleanup"));
    assert_eq!(report.created_branches(), vec!["split/app"]);

    // the untouched groups' changes are still pending on main
    assert_eq!(current_branch(&repo_path), "main");
    let pending: Vec<String> = repo
        .pending_changes()
        .unwrap()
        .into_iter()
        .map(|c| c.path)
        .collect();
    assert_eq!(pending, vec!["docs/new.md", "legacy.py"]);

    match report.into_result() {
        Err(ChangesetError::RunHalted { group, .. }) => assert_eq!(group, "docs"),
        other => panic!("expected RunHalted, got {other:?}"),
    }
}

#[test]
fn test_resume_after_explicit_cleanup() {
    let (_tmp, repo_path) = create_test_git_repo();
    git(&repo_path, &["branch", "split/docs"]);
    make_mixed_changes(&repo_path);
    let repo = GitRepository::open(&repo_path).unwrap();

    let first = BranchChainController::new(&repo, options(TopologyMode::Sibling))
        .run(&three_groups())
        .unwrap();
    assert!(!first.is_success());

    // restore the committed slice, then drop every branch in the way
    git(&repo_path, &["checkout", "-q", "split/app", "--", "src/app.py"]);
    git(&repo_path, &["reset", "-q"]);
    repo.delete_branch("split/app").unwrap();
    repo.delete_branch("split/docs").unwrap();

    let second = BranchChainController::new(&repo, options(TopologyMode::Sibling))
        .run(&three_groups())
        .unwrap();
    assert!(second.is_success());
    assert_eq!(second.committed_count(), 3);
}

#[test]
fn test_prestaged_changes_stay_with_their_own_group() {
    let (_tmp, repo_path) = create_test_git_repo();
    make_mixed_changes(&repo_path);
    git(&repo_path, &["add", "-A"]);
    let repo = GitRepository::open(&repo_path).unwrap();

    BranchChainController::new(&repo, options(TopologyMode::Stacked))
        .run(&three_groups())
        .unwrap();

    assert_eq!(tip_paths(&repo_path, "split/app"), vec!["src/app.py"]);
    assert_eq!(tip_paths(&repo_path, "split/cleanup"), vec!["legacy.py"]);
}

#[test]
fn test_deleted_file_inside_directory_group() {
    let (_tmp, repo_path) = create_test_git_repo();
    std::fs::remove_file(repo_path.join("docs/guide.md")).unwrap();
    write_file(&repo_path, "docs/index.md", "# Index\n");
    let repo = GitRepository::open(&repo_path).unwrap();

    let manifest = Manifest::new(vec![group("docs", &["docs/"])]).unwrap();
    let report = BranchChainController::new(&repo, options(TopologyMode::Stacked))
        .run(&manifest)
        .unwrap();

    assert!(report.is_success());
    assert_eq!(
        tip_paths(&repo_path, "split/docs"),
        vec!["docs/guide.md", "docs/index.md"]
    );
}

#[test]
fn test_detached_head_is_rejected_before_any_branch() {
    let (_tmp, repo_path) = create_test_git_repo();
    let head = git(&repo_path, &["rev-parse", "HEAD"]);
    git(&repo_path, &["checkout", "-q", &head]);
    make_mixed_changes(&repo_path);
    let repo = GitRepository::open(&repo_path).unwrap();

    let result = BranchChainController::new(&repo, options(TopologyMode::Sibling)).run(&three_groups());
    assert!(matches!(result, Err(ChangesetError::DetachedHead(_))));
    assert_eq!(local_branches(&repo_path), vec!["main"]);
}

#[test]
#[serial]
fn test_current_repository_is_found_from_subdirectory() {
    let (_tmp, repo_path) = create_test_git_repo();
    let original = std::env::current_dir().unwrap();

    std::env::set_current_dir(repo_path.join("src")).unwrap();
    let result = get_current_repository();
    std::env::set_current_dir(original).unwrap();

    let repo = result.unwrap();
    assert_eq!(
        repo.get_info().unwrap().path.canonicalize().unwrap(),
        repo_path.canonicalize().unwrap()
    );
    assert_eq!(repo.current_branch().unwrap(), "main");
}
