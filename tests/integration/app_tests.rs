use clap::Parser;
use dupetrim::cli::Cli;
use dupetrim::engine::{run, NullObserver, RunError, RunRequest};
use dupetrim::error::ExitCode;
use dupetrim::scanner::ScanError;
use std::fs;
use tempfile::tempdir;

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["dupetrim", "--quiet"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn test_no_duplicates_exit_code() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"one").unwrap();
    fs::write(dir.path().join("b.txt"), b"two!").unwrap();

    let path = dir.path().to_str().unwrap();
    let code = dupetrim::run_app(cli(&["--dry-run", path])).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_success_exit_code_and_files_removed() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("keep")).unwrap();
    fs::create_dir(dir.path().join("data")).unwrap();
    fs::write(dir.path().join("keep/x.txt"), b"same").unwrap();
    fs::write(dir.path().join("data/x.txt"), b"same").unwrap();

    let reference = dir.path().join("keep");
    let data = dir.path().join("data");
    let code = dupetrim::run_app(cli(&[
        "-r",
        reference.to_str().unwrap(),
        data.to_str().unwrap(),
    ]))
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(reference.join("x.txt").exists());
    assert!(!data.join("x.txt").exists());
    assert!(data.exists());
}

#[test]
fn test_nonexistent_root_is_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let request = RunRequest::new(vec![], vec![missing.clone()]);
    let err = run(&request, &NullObserver).unwrap_err();
    match err {
        RunError::Scan(ScanError::NotFound(path)) => assert_eq!(path, missing),
        other => panic!("unexpected error: {}", other),
    }

    let result = dupetrim::run_app(cli(&[missing.to_str().unwrap()]));
    assert!(result.is_err());
}

#[test]
fn test_file_as_root_is_error() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, b"x").unwrap();

    let request = RunRequest::new(vec![], vec![file]);
    assert!(matches!(
        run(&request, &NullObserver),
        Err(RunError::Scan(ScanError::NotADirectory(_)))
    ));
}

#[test]
fn test_no_candidates_is_error() {
    let dir = tempdir().unwrap();
    let request = RunRequest::new(vec![dir.path().to_path_buf()], vec![]);
    assert!(matches!(
        run(&request, &NullObserver),
        Err(RunError::NoCandidates)
    ));
}
