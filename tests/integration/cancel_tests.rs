use mirrormatch::control::ScanControl;
use mirrormatch::duplicates::{scan, FinderConfig, ScanController, ScanState};
use mirrormatch::progress::ProgressSink;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

fn tree_with_duplicates(pairs: usize) -> TempDir {
    let dir = tempdir().unwrap();
    for i in 0..pairs {
        let content = format!("content number {i:04}");
        fs::write(dir.path().join(format!("a{i}.txt")), &content).unwrap();
        fs::write(dir.path().join(format!("b{i}.txt")), &content).unwrap();
    }
    dir
}

#[test]
fn test_cancel_before_scan_reports_cancelled() {
    let dir = tree_with_duplicates(3);
    let control = Arc::new(ScanControl::new());
    control.cancel();

    let outcome = scan(dir.path(), None, None, control).unwrap();
    assert!(outcome.is_cancelled());
    assert!(outcome.groups().is_none());
}

#[test]
fn test_cancel_during_checksums_discards_results() {
    let dir = tree_with_duplicates(10);
    let control = Arc::new(ScanControl::new());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink_control = Arc::clone(&control);
    let sink_seen = Arc::clone(&seen);
    let sink: Arc<dyn ProgressSink> = Arc::new(move |p: usize, t: usize| {
        sink_seen.lock().unwrap().push((p, t));
        if p == 3 {
            sink_control.cancel();
        }
    });

    let outcome = scan(dir.path(), None, Some(sink), control).unwrap();
    assert!(outcome.is_cancelled());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|&(_, t)| t == 20));
}

#[test]
fn test_progress_is_monotonic_and_ends_at_total() {
    let dir = tree_with_duplicates(5);
    fs::write(dir.path().join("lonely.bin"), b"no size twin here at all").unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    let sink: Arc<dyn ProgressSink> =
        Arc::new(move |p: usize, t: usize| sink_seen.lock().unwrap().push((p, t)));

    let control = Arc::new(ScanControl::new());
    let outcome = scan(dir.path(), None, Some(sink), control).unwrap();
    assert_eq!(outcome.groups().map(|g| g.len()), Some(5));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.last(), Some(&(10, 10)));
    assert_eq!(seen.iter().filter(|&&(p, t)| p == t).count(), 1);
    assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0));
    assert!(seen.iter().all(|&(p, t)| p <= t));
}

#[test]
fn test_controller_pause_resume_completes() {
    let dir = tree_with_duplicates(4);
    let controller = Arc::new(ScanController::new());

    let paused_once = Arc::new(Mutex::new(false));
    let sink_controller = Arc::clone(&controller);
    let sink_flag = Arc::clone(&paused_once);
    let sink: Arc<dyn ProgressSink> = Arc::new(move |_: usize, _: usize| {
        let mut flag = sink_flag.lock().unwrap();
        if !*flag {
            *flag = true;
            sink_controller.pause();
        }
    });

    let handle = controller
        .start(dir.path(), FinderConfig::default().with_progress(sink))
        .unwrap();

    while !*paused_once.lock().unwrap() {
        std::thread::yield_now();
    }
    assert_eq!(controller.state(), ScanState::Paused);
    assert!(controller.resume());

    let outcome = handle.wait().unwrap();
    assert_eq!(outcome.groups().map(|g| g.len()), Some(4));
    assert_eq!(controller.state(), ScanState::Completed);
}

#[test]
fn test_controller_cancel_releases_paused_worker() {
    let dir = tree_with_duplicates(4);
    let controller = Arc::new(ScanController::new());

    let sink_controller = Arc::clone(&controller);
    let sink: Arc<dyn ProgressSink> = Arc::new(move |p: usize, _: usize| {
        if p == 1 {
            sink_controller.pause();
        }
    });

    let handle = controller
        .start(dir.path(), FinderConfig::default().with_progress(sink))
        .unwrap();

    while controller.state() != ScanState::Paused && !handle.is_finished() {
        std::thread::yield_now();
    }
    assert!(controller.cancel());

    assert!(handle.wait().unwrap().is_cancelled());
    assert_eq!(controller.state(), ScanState::Cancelled);
}

#[test]
fn test_cancel_during_verification_discards_results() {
    let dir = tree_with_duplicates(10);
    let control = Arc::new(ScanControl::new());
    let seen = Arc::new(Mutex::new(Vec::new()));

    // Cancel on the last checksum update, so the checksum stage completes
    // and the verification stage is the one that observes it.
    let sink_control = Arc::clone(&control);
    let sink_seen = Arc::clone(&seen);
    let sink: Arc<dyn ProgressSink> = Arc::new(move |p: usize, t: usize| {
        sink_seen.lock().unwrap().push((p, t));
        if p == t {
            sink_control.cancel();
        }
    });

    let outcome = scan(dir.path(), None, Some(sink), control).unwrap();
    assert!(outcome.is_cancelled());
    assert!(outcome.groups().is_none());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 20);
    assert_eq!(seen.last(), Some(&(20, 20)));
}
