use mirrormatch::control::ScanControl;
use mirrormatch::duplicates::{
    scan, DuplicateFinder, DuplicateGroup, FinderConfig, FinderError, ScanOutcome, ScanSummary,
};
use mirrormatch::scanner::{files_identical, DEFAULT_CHUNK_SIZE};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

fn completed(outcome: ScanOutcome) -> (Vec<DuplicateGroup>, ScanSummary) {
    match outcome {
        ScanOutcome::Completed { groups, summary } => (groups, summary),
        ScanOutcome::Cancelled => panic!("scan was cancelled"),
    }
}

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let (groups, summary) = completed(DuplicateFinder::with_defaults().scan(dir.path()).unwrap());

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_two_identical_one_unique() {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let file1 = write(&root, "file1.txt", b"Hello, World!");
    let file2 = write(&root, "file2.txt", b"Hello, World!");
    write(&root, "file3.txt", b"Different content");

    let control = Arc::new(ScanControl::new());
    let (groups, summary) = completed(scan(&root, None, None, control).unwrap());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files, vec![file1, file2]);
    assert!(groups[0].files.iter().all(|p| p.is_absolute()));
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.duplicate_files, 1);
}

#[test]
fn test_scan_filter_excludes_everything() {
    let dir = tempdir().unwrap();
    write(dir.path(), "file1.txt", b"Hello, World!");
    write(dir.path(), "file2.txt", b"Hello, World!");

    let control = Arc::new(ScanControl::new());
    let exts = vec![".png".to_string()];
    let (groups, summary) = completed(scan(dir.path(), Some(&exts), None, control).unwrap());

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
}

#[test]
fn test_scan_filter_is_case_insensitive() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.TXT", b"same");
    write(dir.path(), "b.txt", b"same");
    write(dir.path(), "c.md", b"same");

    let finder = DuplicateFinder::new(FinderConfig::default().with_extensions(["txt"]));
    let (groups, _) = completed(finder.scan(dir.path()).unwrap());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert!(groups[0]
        .files
        .iter()
        .all(|p| p.extension().unwrap().eq_ignore_ascii_case("txt")));
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    write(dir.path(), "top.bin", b"payload");
    write(dir.path(), "a/b/c/deep.bin", b"payload");
    write(dir.path(), "a/other.bin", b"payloaX");

    let (groups, _) = completed(DuplicateFinder::with_defaults().scan(dir.path()).unwrap());

    assert_eq!(groups.len(), 1);
    let names: HashSet<_> = groups[0]
        .files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, HashSet::from(["top.bin".to_string(), "deep.bin".to_string()]));
}

#[test]
fn test_scan_groups_are_disjoint_and_pairwise_identical() {
    let dir = tempdir().unwrap();
    for i in 0..4 {
        write(dir.path(), &format!("x{i}.dat"), b"xxxx");
        write(dir.path(), &format!("y{i}.dat"), b"yyyy");
    }
    write(dir.path(), "z.dat", b"zzzz");

    let (groups, summary) = completed(DuplicateFinder::with_defaults().scan(dir.path()).unwrap());
    assert_eq!(groups.len(), 2);
    assert_eq!(summary.duplicate_files, 6);
    assert_eq!(summary.reclaimable_space, 24);

    let control = ScanControl::new();
    let mut seen = HashSet::new();
    for group in &groups {
        assert!(group.len() >= 2);
        for (i, a) in group.files.iter().enumerate() {
            assert!(seen.insert(a.clone()), "{} in two groups", a.display());
            for b in &group.files[i + 1..] {
                assert!(files_identical(a, b, DEFAULT_CHUNK_SIZE, &control));
            }
        }
    }
}

#[test]
fn test_scan_empty_files_are_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty1", b"");
    write(dir.path(), "empty2", b"");

    let (groups, summary) = completed(DuplicateFinder::with_defaults().scan(dir.path()).unwrap());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].checksum_hex(), "00000000");
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
fn test_scan_small_chunk_size_same_result() {
    let dir = tempdir().unwrap();
    let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    write(dir.path(), "a", &content);
    write(dir.path(), "b", &content);
    let mut altered = content.clone();
    altered[9_999] ^= 1;
    write(dir.path(), "c", &altered);

    let finder = DuplicateFinder::new(FinderConfig::default().with_chunk_size(7));
    let (groups, _) = completed(finder.scan(dir.path()).unwrap());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_scan_rejects_invalid_roots() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "file.txt", b"x");
    let finder = DuplicateFinder::with_defaults();

    assert!(matches!(finder.scan(Path::new("")), Err(FinderError::EmptyRoot)));
    assert!(matches!(
        finder.scan(&dir.path().join("missing")),
        Err(FinderError::PathNotFound(_))
    ));
    assert!(matches!(finder.scan(&file), Err(FinderError::NotADirectory(_))));
}

#[cfg(unix)]
#[test]
fn test_scan_includes_file_symlinks() {
    let dir = tempdir().unwrap();
    let target = write(dir.path(), "target.txt", b"linked content");
    std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

    let (groups, _) = completed(DuplicateFinder::with_defaults().scan(dir.path()).unwrap());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[cfg(unix)]
#[test]
fn test_scan_does_not_follow_dir_symlinks_by_default() {
    let dir = tempdir().unwrap();
    let inner = dir.path().join("inner");
    write(&inner, "only.txt", b"one copy");
    std::os::unix::fs::symlink(&inner, dir.path().join("alias")).unwrap();

    let (groups, _) = completed(DuplicateFinder::with_defaults().scan(dir.path()).unwrap());
    assert!(groups.is_empty());
}
