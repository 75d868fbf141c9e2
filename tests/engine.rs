use cleaner::{
    find_targets, process_targets, DeletionTarget, ItemOutcome, MatchCriteria, OutcomeTally,
    Reporter, TargetKind,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

#[derive(Default)]
struct Recorder {
    actions: Vec<PathBuf>,
    failures: usize,
    summary: Option<OutcomeTally>,
}

impl Reporter for Recorder {
    fn on_action(&mut self, target: &DeletionTarget, _delete_mode: bool) {
        self.actions.push(target.path.clone());
    }

    fn on_result(&mut self, _target: &DeletionTarget, outcome: &ItemOutcome) {
        if !outcome.is_success() {
            self.failures += 1;
        }
    }

    fn on_summary(&mut self, tally: &OutcomeTally) {
        self.summary = Some(*tally);
    }
}

fn touch(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "x").unwrap();
    path
}

/// ├─ pkg/__pycache__/a.pyc
/// ├─ pkg/module.py
/// ├─ build/artifact.bin
/// ├─ .pytest_cache/state.json
/// ├─ notes.temp.txt
/// ├─ keep/.venv/__pycache__/ignored.pyc
/// └─ stray.log
fn sample_tree() -> TempDir {
    let dir = tempdir().unwrap();
    for relative in [
        "pkg/__pycache__/a.pyc",
        ".pytest_cache/state.json",
        "build/artifact.bin",
        "notes.temp.txt",
        "pkg/module.py",
        "stray.log",
        "keep/.venv/__pycache__/ignored.pyc",
    ] {
        touch(dir.path(), relative);
    }
    dir
}

/// All file paths below `root`, relative and sorted
fn snapshot(root: &Path) -> Vec<String> {
    fn walk(dir: &Path, root: &Path, out: &mut Vec<String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(&path, root, out);
            } else {
                out.push(relative(root, &path));
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

fn relative(root: &Path, path: &Path) -> String {
    let root = std::path::absolute(root).unwrap();
    path.strip_prefix(&root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn found(root: &Path, targets: &[DeletionTarget]) -> Vec<String> {
    let mut paths: Vec<String> = targets.iter().map(|t| relative(root, &t.path)).collect();
    paths.sort();
    paths
}

fn scenario_a_criteria(root: &Path) -> MatchCriteria {
    MatchCriteria::new(root)
        .with_dir_names(["__pycache__", ".pytest_cache"])
        .with_glob_patterns(["build/**"])
        .with_file_names(["notes.temp.txt"])
}

#[test]
fn test_dry_run_finds_targets_and_mutates_nothing() {
    let dir = sample_tree();
    let before = snapshot(dir.path());

    let targets = find_targets(&scenario_a_criteria(dir.path())).unwrap();
    assert_eq!(
        found(dir.path(), &targets),
        vec![
            ".pytest_cache",
            "build/artifact.bin",
            "keep/.venv/__pycache__",
            "notes.temp.txt",
            "pkg/__pycache__",
        ]
    );

    let mut recorder = Recorder::default();
    let tally = process_targets(&mut recorder, &targets, false);

    assert_eq!(tally.deleted(), targets.len());
    assert_eq!(tally.failed(), 0);
    assert_eq!(recorder.summary, Some(tally));
    assert_eq!(snapshot(dir.path()), before);
}

#[test]
fn test_delete_run_removes_expected() {
    let dir = sample_tree();
    let criteria = scenario_a_criteria(dir.path()).with_ignored_dir_names([".venv"]);

    let targets = find_targets(&criteria).unwrap();
    assert_eq!(targets.len(), 4);

    let mut recorder = Recorder::default();
    let tally = process_targets(&mut recorder, &targets, true);

    assert_eq!(tally.deleted(), 4);
    assert_eq!(tally.failed(), 0);
    assert!(!dir.path().join("pkg/__pycache__").exists());
    assert!(!dir.path().join(".pytest_cache").exists());
    assert!(!dir.path().join("build/artifact.bin").exists());
    assert!(!dir.path().join("notes.temp.txt").exists());
    assert!(dir.path().join("pkg/module.py").exists());
    assert!(dir.path().join("keep/.venv/__pycache__/ignored.pyc").exists());
}

#[test]
fn test_ignored_dirs_and_files() {
    let dir = sample_tree();
    let criteria = MatchCriteria::new(dir.path())
        .with_dir_names(["__pycache__", ".pytest_cache"])
        .with_glob_patterns(["build/**"])
        .with_file_names(["notes.temp.txt", "stray.log"])
        .with_ignored_dir_names(["pkg", ".venv"])
        .with_ignored_file_names(["stray.log"]);

    let targets = find_targets(&criteria).unwrap();
    process_targets(&mut Recorder::default(), &targets, true);

    assert!(dir.path().join("pkg/__pycache__/a.pyc").exists());
    assert!(dir.path().join("stray.log").exists());
    assert!(!dir.path().join(".pytest_cache").exists());
    assert!(!dir.path().join("build/artifact.bin").exists());
    assert!(!dir.path().join("notes.temp.txt").exists());
}

#[test]
fn test_never_touch_venv() {
    let dir = sample_tree();
    let criteria = MatchCriteria::new(dir.path())
        .with_dir_names(["__pycache__"])
        .with_ignored_dir_names([".venv"]);

    let targets = find_targets(&criteria).unwrap();
    process_targets(&mut Recorder::default(), &targets, true);

    assert!(dir.path().join("keep/.venv/__pycache__/ignored.pyc").exists());
    assert!(!dir.path().join("pkg/__pycache__").exists());
}

#[test]
fn test_glob_patterns() {
    let dir = sample_tree();
    let criteria = MatchCriteria::new(dir.path()).with_glob_patterns(["build/**", "*.temp.*"]);

    let targets = find_targets(&criteria).unwrap();
    assert!(targets.iter().all(|t| t.kind == TargetKind::File));
    process_targets(&mut Recorder::default(), &targets, true);

    assert!(!dir.path().join("build/artifact.bin").exists());
    assert!(!dir.path().join("notes.temp.txt").exists());
    assert!(dir.path().join("pkg/module.py").exists());
}

#[test]
fn test_ignored_directory_shields_from_broadest_glob() {
    let dir = sample_tree();
    let criteria = MatchCriteria::new(dir.path())
        .with_glob_patterns(["**", "**/*"])
        .with_file_names(["a.pyc", "ignored.pyc"])
        .with_dir_names(["__pycache__"])
        .with_ignored_dir_names(["pkg", "keep"]);

    let targets = find_targets(&criteria).unwrap();
    for target in &targets {
        let path = relative(dir.path(), &target.path);
        assert!(
            !path.starts_with("pkg") && !path.starts_with("keep"),
            "{path} is inside an ignored directory"
        );
    }
    assert!(!targets.is_empty());
}

#[test]
fn test_no_target_nested_under_another() {
    let dir = sample_tree();
    touch(dir.path(), "build/__pycache__/deep/x.pyc");
    let criteria = MatchCriteria::new(dir.path())
        .with_dir_names(["__pycache__", "build", ".venv"])
        .with_glob_patterns(["**/*.pyc", "**"]);

    let targets = find_targets(&criteria).unwrap();
    for a in &targets {
        for b in &targets {
            if a != b {
                assert!(
                    !b.path.starts_with(&a.path),
                    "{} is nested under {}",
                    b.path.display(),
                    a.path.display()
                );
            }
        }
    }
    assert!(targets
        .iter()
        .any(|t| t.is_dir() && t.path.ends_with("build")));
}

#[test]
fn test_second_delete_run_finds_nothing() {
    let dir = sample_tree();
    let criteria = scenario_a_criteria(dir.path());

    let first = find_targets(&criteria).unwrap();
    let tally = process_targets(&mut Recorder::default(), &first, true);
    assert_eq!(tally.deleted(), first.len());

    let second = find_targets(&criteria).unwrap();
    assert!(second.is_empty());
    let tally = process_targets(&mut Recorder::default(), &second, true);
    assert_eq!(tally, OutcomeTally::default());
}

#[test]
fn test_same_name_differs_by_ancestry() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "app/cache/a.bin");
    touch(dir.path(), "vendor/lib/cache/b.bin");

    let criteria = MatchCriteria::new(dir.path())
        .with_dir_names(["cache"])
        .with_ignored_dir_names(["vendor"]);

    let targets = find_targets(&criteria).unwrap();
    assert_eq!(found(dir.path(), &targets), vec!["app/cache"]);
}

#[test]
fn test_nothing_to_do_is_not_an_error() {
    let dir = sample_tree();
    let criteria = MatchCriteria::new(dir.path()).with_dir_names(["node_modules"]);

    let targets = find_targets(&criteria).unwrap();
    assert!(targets.is_empty());

    let mut recorder = Recorder::default();
    let tally = process_targets(&mut recorder, &targets, true);
    assert_eq!(tally, OutcomeTally::default());
    assert!(recorder.actions.is_empty());
    assert_eq!(recorder.summary, Some(OutcomeTally::default()));
}

#[test]
fn test_decomposed_file_name_matches_composed_criteria() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "cafe\u{301}.log");

    let criteria = MatchCriteria::new(dir.path()).with_file_names(["caf\u{e9}.log"]);
    let targets = find_targets(&criteria).unwrap();

    assert_eq!(targets.len(), 1);
}

#[test]
fn test_vanished_target_is_counted_as_failure() {
    let dir = sample_tree();
    let targets = find_targets(&scenario_a_criteria(dir.path())).unwrap();

    // Remove one target between the scan and the deletion
    fs::remove_file(dir.path().join("notes.temp.txt")).unwrap();

    let mut recorder = Recorder::default();
    let tally = process_targets(&mut recorder, &targets, true);

    assert_eq!(tally.failed(), 1);
    assert_eq!(tally.deleted(), targets.len() - 1);
    assert_eq!(recorder.failures, 1);
    assert_eq!(recorder.actions.len(), targets.len());
}
