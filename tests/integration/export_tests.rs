use clap::Parser;
use mirrormatch::cli::Cli;
use mirrormatch::error::ExitCode;
use mirrormatch::output::csv::CsvReport;
use mirrormatch::run_app;
use std::fs;
use tempfile::tempdir;

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["mirrormatch", "-q"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn test_csv_report_written_for_duplicates() {
    let data = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(data.path().join("file1.txt"), "Hello, World!").unwrap();
    fs::write(data.path().join("file2.txt"), "Hello, World!").unwrap();
    fs::write(data.path().join("file3.txt"), "Different content").unwrap();
    let report = out.path().join("report.csv");

    let code = run(&[
        "scan",
        data.path().to_str().unwrap(),
        "--report",
        report.to_str().unwrap(),
    ])
    .unwrap();
    assert_eq!(code, ExitCode::Success);

    let content = fs::read_to_string(&report).unwrap();
    let lines: Vec<&str> = content.split("\r\n").collect();
    assert_eq!(lines[0], "\"checksum\",\"file_path\",\"duplicate_count\"");
    assert!(lines[1].ends_with("file1.txt\",\"2\""));
    assert!(lines[2].ends_with("file2.txt\",\"2\""));
    assert_eq!(&lines[3..], &["", "", ""]);
    assert!(!content.contains("file3.txt"));
}

#[test]
fn test_generated_report_name_in_report_dir() {
    let data = tempdir().unwrap();
    let out = tempdir().unwrap();
    let root = data.path().join("Holiday");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.jpg"), [1u8, 2, 3]).unwrap();
    fs::write(root.join("b.jpg"), [1u8, 2, 3]).unwrap();

    let code = run(&[
        "scan",
        root.to_str().unwrap(),
        "--report-dir",
        out.path().to_str().unwrap(),
        "--no-progress",
    ])
    .unwrap();
    assert_eq!(code, ExitCode::Success);

    let names: Vec<String> = fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("duplicate_files_Holiday_"));
    assert!(names[0].ends_with(".csv"));
}

#[test]
fn test_no_duplicates_writes_no_report() {
    let data = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(data.path().join("a.txt"), "one").unwrap();
    fs::write(data.path().join("b.txt"), "two!").unwrap();

    let code = run(&[
        "scan",
        data.path().to_str().unwrap(),
        "--report-dir",
        out.path().to_str().unwrap(),
    ])
    .unwrap();

    assert_eq!(code, ExitCode::NoDuplicates);
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_extension_filter_through_cli() {
    let data = tempdir().unwrap();
    fs::write(data.path().join("a.txt"), "same").unwrap();
    fs::write(data.path().join("b.txt"), "same").unwrap();

    let code = run(&[
        "scan",
        data.path().to_str().unwrap(),
        "--ext",
        "png",
        "--output",
        "text",
    ])
    .unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);

    let code = run(&[
        "scan",
        data.path().to_str().unwrap(),
        "--ext",
        ".TXT",
        "--output",
        "json",
    ])
    .unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_report_matches_formatter_output() {
    let data = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(data.path().join("x"), "abc").unwrap();
    fs::write(data.path().join("y"), "abc").unwrap();
    let report = out.path().join("r.csv");

    run(&[
        "scan",
        data.path().to_str().unwrap(),
        "--report",
        report.to_str().unwrap(),
    ])
    .unwrap();

    let finder = mirrormatch::duplicates::DuplicateFinder::with_defaults();
    let outcome = finder.scan(data.path()).unwrap();
    let expected = CsvReport::new(outcome.groups().unwrap()).to_string().unwrap();
    assert_eq!(fs::read_to_string(&report).unwrap(), expected);
}
