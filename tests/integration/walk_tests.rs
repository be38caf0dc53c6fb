use dupetrim::scanner::{FileRecord, ScanError, Walker, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn touch(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

fn collect(walker: Walker) -> Vec<FileRecord> {
    walker.walk().collect::<Result<Vec<_>, _>>().unwrap()
}

#[test]
fn test_references_walked_before_candidates() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    touch(&root.join("cand/a.txt"), b"a");
    touch(&root.join("ref/z.txt"), b"z");

    let walker = Walker::new(
        vec![root.join("ref")],
        vec![root.join("cand")],
        WalkerConfig::default(),
    );
    let files = collect(walker);

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].path, root.join("ref/z.txt"));
    assert!(files[0].is_reference);
    assert_eq!(files[1].path, root.join("cand/a.txt"));
    assert!(!files[1].is_reference);
    assert_eq!(
        files.iter().map(|f| f.index).collect::<Vec<_>>(),
        vec![0, 1]
    );
}

#[test]
fn test_depth_first_sorted_by_name() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    touch(&root.join("b.txt"), b"1");
    touch(&root.join("a/z.txt"), b"2");
    touch(&root.join("a/m/y.txt"), b"3");
    touch(&root.join("c/x.txt"), b"4");

    let files = collect(Walker::new(vec![], vec![root.clone()], WalkerConfig::default()));
    let paths: Vec<PathBuf> = files.into_iter().map(|f| f.path).collect();

    assert_eq!(
        paths,
        vec![
            root.join("a/m/y.txt"),
            root.join("a/z.txt"),
            root.join("b.txt"),
            root.join("c/x.txt"),
        ]
    );
}

#[test]
fn test_nested_root_counted_as_discarded() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    touch(&root.join("inner/file.txt"), b"content");

    let walker = Walker::new(
        vec![],
        vec![root.clone(), root.join("inner")],
        WalkerConfig::default(),
    );
    let mut walk = walker.walk();
    let files: Vec<_> = walk.by_ref().collect::<Result<_, _>>().unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(walk.discarded_dirs(), 1);
    assert_eq!(walk.total_files(), 1);
}

#[test]
fn test_relative_root_resolved_to_physical_path() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    touch(&root.join("sub/file.txt"), b"x");

    let dotted = root.join("sub").join("..").join("sub");
    let mut walk = Walker::new(vec![], vec![dotted], WalkerConfig::default()).walk();
    let files: Vec<_> = walk.by_ref().collect::<Result<_, _>>().unwrap();

    assert_eq!(files[0].path, root.join("sub/file.txt"));
    assert_eq!(walk.resolved_roots()[0].path, root.join("sub"));
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let mut walk = Walker::new(vec![], vec![missing.clone()], WalkerConfig::default()).walk();
    match walk.next() {
        Some(Err(ScanError::PathResolution { path, .. })) => assert_eq!(path, missing),
        other => panic!("expected resolution error, got {:?}", other),
    }
    assert!(walk.next().is_none());
}

#[cfg(unix)]
#[test]
fn test_symlinked_files_never_emitted() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    touch(&root.join("real.txt"), b"data");
    std::os::unix::fs::symlink(root.join("real.txt"), root.join("link.txt")).unwrap();
    std::os::unix::fs::symlink(root.join("gone.txt"), root.join("dangling.txt")).unwrap();

    for follow in [false, true] {
        let files = collect(Walker::new(
            vec![],
            vec![root.clone()],
            WalkerConfig::new(follow),
        ));
        assert_eq!(files.len(), 1, "follow_symlinks = {}", follow);
        assert_eq!(files[0].path, root.join("real.txt"));
    }
}

#[cfg(unix)]
#[test]
fn test_symlink_loop_does_not_hang() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    touch(&root.join("a/file.txt"), b"data");
    std::os::unix::fs::symlink(root.join("a"), root.join("a/loop")).unwrap();

    let mut walk = Walker::new(vec![], vec![root.clone()], WalkerConfig::new(true)).walk();
    let files: Vec<_> = walk.by_ref().collect::<Result<_, _>>().unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(walk.discarded_dirs(), 1);
}
