//! Tests for watch directory scans.

mod test_utils;

use chrono::NaiveDateTime;
use courier_core::EligibilityWindow;
use courier_watch::{enqueue_eligible, list_post_folders, DispatchQueue, PostValidator};
use std::sync::Arc;
use tempfile::TempDir;
use test_utils::{events, new_log, text_settings, write_folder, RecordingProcessor};

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

#[tokio::test]
async fn test_lists_only_post_folders_sorted() {
    let root = TempDir::new().unwrap();
    for name in ["2025.03.01-10.00", "2025.03.01-09.00", "_published", "notes", "2025.13.01-09.00"] {
        std::fs::create_dir(root.path().join(name)).unwrap();
    }
    std::fs::write(root.path().join("2025.03.01-08.00"), "a file").unwrap();

    let folders = list_post_folders(root.path()).await.unwrap();
    let names: Vec<_> = folders
        .iter()
        .map(|(p, _)| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["2025.03.01-09.00", "2025.03.01-10.00"]);
    assert_eq!(folders[0].1, at("2025-03-01 09:00:00"));
}

#[tokio::test]
async fn test_missing_root_is_a_scan_error() {
    let root = TempDir::new().unwrap();
    let err = list_post_folders(&root.path().join("missing")).await.unwrap_err();
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_symmetric_and_forward_windows() {
    let root = TempDir::new().unwrap();
    for name in ["2025.03.01-08.55", "2025.03.01-09.05", "2025.03.01-09.30"] {
        write_folder(root.path(), name, &text_settings(&["bluesky"], name));
    }
    let now = at("2025-03-01 09:00:00");

    let log = new_log();
    let processor = Arc::new(RecordingProcessor::new(log.clone()));
    let (queue, worker) = DispatchQueue::new(processor, PostValidator::default(), root.path());

    let symmetric = enqueue_eligible(root.path(), EligibilityWindow::symmetric(10), now, &queue)
        .await
        .unwrap();
    let forward = enqueue_eligible(root.path(), EligibilityWindow::forward(10), now, &queue)
        .await
        .unwrap();
    assert_eq!(symmetric, 2);
    assert_eq!(forward, 1);

    drop(queue);
    worker.with_hold_until_due(false).run().await.unwrap();

    assert_eq!(
        events(&log),
        vec![
            "start:2025.03.01-08.55",
            "end:2025.03.01-08.55",
            "start:2025.03.01-09.05",
            "end:2025.03.01-09.05",
        ]
    );
    assert!(root.path().join("2025.03.01-09.30").is_dir());
}
