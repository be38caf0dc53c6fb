use dupetrim::actions::FileDecision;
use dupetrim::engine::{run, NullObserver, RunOptions, RunRequest};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn canon(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap()
}

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn dry_run() -> RunOptions {
    RunOptions {
        dry_run: true,
        ..RunOptions::default()
    }
}

/// /ref/x.txt, /data/a/x.txt and /data/b/x.txt, all "AAAAAAAAAA".
fn reference_layout() -> (TempDir, PathBuf, PathBuf, PathBuf) {
    let dir = tempdir().unwrap();
    let root = canon(dir.path());
    let reference = root.join("ref");
    let a = root.join("data/a");
    let b = root.join("data/b");
    for d in [&reference, &a, &b] {
        write(&d.join("x.txt"), b"AAAAAAAAAA");
    }
    (dir, reference, a, b)
}

#[test]
fn test_reference_scenario() {
    let (_dir, reference, a, b) = reference_layout();

    let request = RunRequest::new(vec![reference.clone()], vec![a.clone(), b.clone()])
        .with_options(dry_run());
    let outcome = run(&request, &NullObserver).unwrap();

    assert_eq!(outcome.plan.groups.len(), 1);
    let group = &outcome.plan.groups[0];
    assert_eq!(group.size, 10);
    assert_eq!(group.retained.len(), 1);
    assert_eq!(group.retained[0].path, reference.join("x.txt"));
    let deleted: Vec<_> = group.to_delete.iter().map(|f| f.path.clone()).collect();
    assert_eq!(deleted, vec![a.join("x.txt"), b.join("x.txt")]);

    assert_eq!(outcome.stats.total_files, 3);
    assert_eq!(outcome.stats.duplicate_groups, 1);
    assert_eq!(outcome.stats.files_deleted, 2);
    assert_eq!(outcome.stats.bytes_reclaimed, 20);
}

#[test]
fn test_reference_scenario_real_run() {
    let (_dir, reference, a, b) = reference_layout();

    let request = RunRequest::new(vec![reference.clone()], vec![a.clone(), b.clone()]);
    let outcome = run(&request, &NullObserver).unwrap();

    assert!(reference.join("x.txt").exists());
    assert!(!a.join("x.txt").exists());
    assert!(!b.join("x.txt").exists());
    // Candidate roots themselves are never reaped
    assert!(a.exists());
    assert!(b.exists());
    assert!(outcome.removed_dirs.is_empty());
}

#[test]
fn test_reference_files_never_deleted_even_if_discovered_late() {
    let dir = tempdir().unwrap();
    let root = canon(dir.path());
    let reference = root.join("ref");
    let data = root.join("data");
    write(&data.join("a.bin"), b"shared bytes");
    write(&reference.join("z.bin"), b"shared bytes");
    write(&reference.join("y.bin"), b"shared bytes");

    let request = RunRequest::new(vec![reference.clone()], vec![data.clone()]);
    let outcome = run(&request, &NullObserver).unwrap();

    for group in &outcome.plan.groups {
        assert!(group.to_delete.iter().all(|f| !f.is_reference));
    }
    assert!(reference.join("y.bin").exists());
    assert!(reference.join("z.bin").exists());
    assert!(!data.join("a.bin").exists());
}

#[test]
fn test_zero_byte_files_grouped() {
    let dir = tempdir().unwrap();
    let root = canon(dir.path());
    write(&root.join("one/empty1"), b"");
    write(&root.join("two/empty2"), b"");

    let request = RunRequest::new(vec![], vec![root.clone()]).with_options(dry_run());
    let outcome = run(&request, &NullObserver).unwrap();

    assert_eq!(outcome.plan.groups.len(), 1);
    let group = &outcome.plan.groups[0];
    assert_eq!(group.size, 0);
    assert_eq!(group.retained[0].path, root.join("one/empty1"));
    assert_eq!(group.to_delete[0].path, root.join("two/empty2"));
}

#[test]
fn test_same_size_different_head_not_grouped() {
    let dir = tempdir().unwrap();
    let root = canon(dir.path());
    write(&root.join("a"), b"0123456789");
    write(&root.join("b"), b"9876543210");

    let request = RunRequest::new(vec![], vec![root]).with_options(dry_run());
    let outcome = run(&request, &NullObserver).unwrap();

    assert!(outcome.plan.groups.is_empty());
    assert_eq!(outcome.stats.discarded_unique_size, 0);
    assert_eq!(outcome.stats.discarded_unique_head_hash, 2);
    assert_eq!(outcome.stats.full_hashes_seen, 0);
}

#[cfg(unix)]
#[test]
fn test_symlinked_bind_path_counted_once() {
    let dir = tempdir().unwrap();
    let root = canon(dir.path());
    let real = root.join("real");
    write(&real.join("f1.txt"), b"alpha");
    write(&real.join("f2.txt"), b"beta!");
    let tree = root.join("tree");
    fs::create_dir_all(&tree).unwrap();
    std::os::unix::fs::symlink(&real, tree.join("via_link")).unwrap();

    let options = RunOptions {
        follow_symlinks: true,
        dry_run: true,
        ..RunOptions::default()
    };
    let request = RunRequest::new(vec![], vec![real.clone(), tree.clone()]).with_options(options);
    let outcome = run(&request, &NullObserver).unwrap();

    assert_eq!(outcome.stats.total_files, 2);
    assert_eq!(outcome.stats.discarded_dirs, 1);
    assert!(outcome.plan.groups.is_empty());
}

#[test]
fn test_keep_empty_leaves_directories() {
    let dir = tempdir().unwrap();
    let root = canon(dir.path());
    write(&root.join("a/x.txt"), b"duplicate");
    write(&root.join("b/nested/x.txt"), b"duplicate");

    let options = RunOptions {
        keep_empty: true,
        ..RunOptions::default()
    };
    let request = RunRequest::new(vec![], vec![root.clone()]).with_options(options);
    let outcome = run(&request, &NullObserver).unwrap();

    assert!(!root.join("b/nested/x.txt").exists());
    assert!(root.join("b/nested").is_dir());
    assert!(outcome.removed_dirs.is_empty());
    assert_eq!(outcome.stats.dirs_removed, 0);
}

#[test]
fn test_emptied_directories_removed_bottom_up() {
    let dir = tempdir().unwrap();
    let root = canon(dir.path());
    write(&root.join("a/x.txt"), b"duplicate");
    write(&root.join("b/nested/deeper/x.txt"), b"duplicate");
    write(&root.join("c/x.txt"), b"duplicate");
    write(&root.join("c/unique.txt"), b"stays here");

    let request = RunRequest::new(vec![], vec![root.clone()]);
    let outcome = run(&request, &NullObserver).unwrap();

    assert_eq!(
        outcome.removed_dirs,
        vec![
            root.join("b/nested/deeper"),
            root.join("b/nested"),
            root.join("b"),
        ]
    );
    assert!(!root.join("b").exists());
    assert!(root.join("c/unique.txt").exists());
    assert!(root.join("a/x.txt").exists());
    assert!(root.exists());
}

#[test]
fn test_dry_run_reports_same_dirs_as_real_run() {
    let dir = tempdir().unwrap();
    let root = canon(dir.path());
    write(&root.join("a/x.txt"), b"duplicate");
    write(&root.join("b/nested/x.txt"), b"duplicate");

    let request = RunRequest::new(vec![], vec![root.clone()]).with_options(dry_run());
    let simulated = run(&request, &NullObserver).unwrap();
    assert!(root.join("b/nested/x.txt").exists());

    let request = RunRequest::new(vec![], vec![root.clone()]);
    let real = run(&request, &NullObserver).unwrap();

    assert_eq!(simulated.removed_dirs, real.removed_dirs);
    assert_eq!(simulated.plan.delete_count(), real.plan.delete_count());
    assert!(simulated
        .decisions
        .iter()
        .all(|d| !matches!(d, FileDecision::Deleted { dry_run: false, .. })));
}

#[test]
fn test_dry_run_is_idempotent() {
    let dir = tempdir().unwrap();
    let root = canon(dir.path());
    write(&root.join("ref/keep.bin"), &[7u8; 70_000]);
    write(&root.join("data/a/copy.bin"), &[7u8; 70_000]);
    write(&root.join("data/b/copy.bin"), &[7u8; 70_000]);
    write(&root.join("data/b/other.bin"), &[8u8; 70_000]);
    write(&root.join("data/c/small.txt"), b"small");

    let request = RunRequest::new(vec![root.join("ref")], vec![root.join("data")])
        .with_options(dry_run());
    let first = run(&request, &NullObserver).unwrap();
    let second = run(&request, &NullObserver).unwrap();

    assert_eq!(first.stats, second.stats);
    assert_eq!(
        serde_json::to_value(&first.plan).unwrap(),
        serde_json::to_value(&second.plan).unwrap()
    );
    assert_eq!(first.decisions, second.decisions);
    assert_eq!(first.stats.duplicate_groups, 1);
    assert_eq!(first.stats.files_deleted, 2);
}

#[test]
fn test_large_files_differing_after_head_window() {
    let dir = tempdir().unwrap();
    let root = canon(dir.path());
    let mut a = vec![1u8; 100_000];
    let b = a.clone();
    a[90_000] = 2;
    write(&root.join("a.bin"), &a);
    write(&root.join("b.bin"), &b);
    write(&root.join("c.bin"), &b);

    let request = RunRequest::new(vec![], vec![root.clone()]).with_options(dry_run());
    let outcome = run(&request, &NullObserver).unwrap();

    assert_eq!(outcome.plan.groups.len(), 1);
    let group = &outcome.plan.groups[0];
    assert_eq!(group.retained[0].path, root.join("b.bin"));
    assert_eq!(group.to_delete[0].path, root.join("c.bin"));
    assert_eq!(outcome.stats.discarded_unique_hash, 1);
    assert_eq!(outcome.stats.full_hashes_seen, 3);
}

#[cfg(unix)]
#[test]
fn test_dry_run_matches_real_run_through_followed_symlink() {
    let dir = tempdir().unwrap();
    let root = canon(dir.path());
    let data = root.join("data");
    let outside = root.join("outside");
    write(&data.join("a/x.txt"), b"linked copy");
    write(&outside.join("sub/x.txt"), b"linked copy");
    std::os::unix::fs::symlink(&outside, data.join("link")).unwrap();

    let options = RunOptions {
        follow_symlinks: true,
        ..RunOptions::default()
    };
    let simulated = run(
        &RunRequest::new(vec![], vec![data.clone()]).with_options(RunOptions {
            dry_run: true,
            ..options.clone()
        }),
        &NullObserver,
    )
    .unwrap();
    let real = run(
        &RunRequest::new(vec![], vec![data.clone()]).with_options(options),
        &NullObserver,
    )
    .unwrap();

    assert_eq!(simulated.plan.delete_count(), 1);
    assert_eq!(
        simulated.plan.groups[0].to_delete[0].path,
        data.join("link/sub/x.txt")
    );
    assert_eq!(simulated.removed_dirs, real.removed_dirs);
    assert!(real.removed_dirs.is_empty());
    assert!(outside.join("sub").is_dir());
    assert!(data.join("link").exists());
    assert!(data.join("a/x.txt").exists());
}
