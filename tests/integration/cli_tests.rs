use clap::Parser;
use mirrormatch::cli::Cli;
use mirrormatch::duplicates::FinderError;
use mirrormatch::error::{ExitCode, StructuredError};
use mirrormatch::run_app;
use tempfile::tempdir;

#[test]
fn test_missing_folder_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");
    let cli = Cli::try_parse_from(["mirrormatch", "-q", "scan", missing.to_str().unwrap()]).unwrap();

    let err = run_app(cli).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinderError>(),
        Some(FinderError::PathNotFound(_))
    ));

    let structured = StructuredError::new(&err, ExitCode::GeneralError);
    assert_eq!(structured.code, "MM001");
    assert!(structured.message.starts_with("Scan failed: Path not found"));
}

#[test]
fn test_file_root_is_an_error() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    std::fs::write(&file, "x").unwrap();
    let cli = Cli::try_parse_from(["mirrormatch", "-q", "scan", file.to_str().unwrap()]).unwrap();

    let err = run_app(cli).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinderError>(),
        Some(FinderError::NotADirectory(_))
    ));
}

#[test]
fn test_config_show_succeeds() {
    let cli = Cli::try_parse_from(["mirrormatch", "-q", "config"]).unwrap();
    assert_eq!(run_app(cli).unwrap(), ExitCode::Success);
}
