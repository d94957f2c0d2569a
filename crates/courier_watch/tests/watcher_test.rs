//! Tests for the live watch and the orchestrator.

mod test_utils;

use chrono::{Local, TimeDelta};
use courier_core::{encode_folder_name, truncate_to_minute};
use courier_error::ScheduleErrorKind;
use courier_watch::{arrivals, check_watch_root, Orchestrator, Stabilizer, ValidationConfig, WatchConfig};
use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use test_utils::{events, new_log, text_settings, write_folder, RecordingProcessor};

#[test]
fn test_arrivals_keep_post_named_creations_and_renames() {
    let root = PathBuf::from("/watch");
    let created = Event::new(EventKind::Create(CreateKind::Folder))
        .add_path(root.join("2025.03.01-09.00"));
    let renamed = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
        .add_path(PathBuf::from("/elsewhere/draft"))
        .add_path(root.join("2025.03.01-09.05"));
    let other = Event::new(EventKind::Create(CreateKind::Folder)).add_path(root.join("_published"));
    let removed = Event::new(EventKind::Remove(RemoveKind::Folder)).add_path(root.join("2025.03.01-09.00"));
    let moved_out = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::From)))
        .add_path(root.join("2025.03.01-09.00"));

    assert_eq!(arrivals(&created), vec![root.join("2025.03.01-09.00")]);
    assert_eq!(arrivals(&renamed), vec![root.join("2025.03.01-09.05")]);
    assert!(arrivals(&other).is_empty());
    assert!(arrivals(&removed).is_empty());
    assert!(arrivals(&moved_out).is_empty());
}

#[tokio::test]
async fn test_folder_is_tracked_once() {
    let stabilizer = Stabilizer::new(Duration::from_millis(100), Duration::from_millis(20));
    let folder = Path::new("/watch/2025.03.01-09.00");

    assert!(stabilizer.track(folder));
    assert!(!stabilizer.clone().track(folder));
    assert!(stabilizer.is_tracked(folder));
}

#[tokio::test]
async fn test_stable_after_quiet_period() {
    let root = TempDir::new().unwrap();
    let folder = write_folder(root.path(), "2025.03.01-09.00", &text_settings(&["bluesky"], "hi"));
    let stabilizer = Stabilizer::new(Duration::from_millis(150), Duration::from_millis(20));

    let writer_folder = folder.clone();
    let writer = tokio::spawn(async move {
        for i in 0..3 {
            tokio::time::sleep(Duration::from_millis(60)).await;
            std::fs::write(writer_folder.join(format!("part{}.jpg", i)), vec![0u8; 16]).unwrap();
        }
    });

    assert!(stabilizer.track(&folder));
    assert!(stabilizer.wait_until_stable(&folder).await);
    assert!(!stabilizer.is_tracked(&folder));
    writer.await.unwrap();
    assert_eq!(std::fs::read_dir(&folder).unwrap().count(), 4);
}

#[tokio::test]
async fn test_vanished_folder_is_not_stable() {
    let root = TempDir::new().unwrap();
    let stabilizer = Stabilizer::new(Duration::from_millis(100), Duration::from_millis(20));
    let folder = root.path().join("2025.03.01-09.00");

    assert!(!stabilizer.wait_until_stable(&folder).await);
}

#[tokio::test]
async fn test_invalid_watch_root() {
    let root = TempDir::new().unwrap();
    let file = root.path().join("file");
    std::fs::write(&file, "x").unwrap();

    for path in [PathBuf::new(), root.path().join("missing"), file] {
        let err = check_watch_root(&path).await.unwrap_err();
        assert!(matches!(err.kind(), ScheduleErrorKind::InvalidWatchRoot(_)));
        assert!(err.is_fatal());
    }
}

#[tokio::test]
async fn test_orchestrator_rejects_invalid_root_before_starting() {
    let root = TempDir::new().unwrap();
    let log = new_log();
    let orchestrator = Orchestrator::new(
        WatchConfig::new(root.path().join("missing")),
        ValidationConfig::default(),
        Arc::new(RecordingProcessor::new(log.clone())),
    );

    let err = orchestrator.run_until(async {}).await.unwrap_err();
    assert!(matches!(err.kind(), ScheduleErrorKind::InvalidWatchRoot(_)));
    assert!(events(&log).is_empty());
}

async fn wait_for(path: PathBuf) {
    for _ in 0..200 {
        if path.exists() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

fn current_folder_name(offset_minutes: i64) -> String {
    let now = truncate_to_minute(Local::now().naive_local());
    encode_folder_name(&(now + TimeDelta::minutes(offset_minutes)))
}

#[tokio::test]
async fn test_orchestrator_publishes_backlog_then_stops() {
    let root = TempDir::new().unwrap();
    let name = current_folder_name(-1);
    write_folder(root.path(), &name, &text_settings(&["bluesky"], "backlog"));
    let log = new_log();

    let orchestrator = Orchestrator::new(
        WatchConfig::new(root.path()),
        ValidationConfig::default(),
        Arc::new(RecordingProcessor::new(log.clone())),
    );
    let published = root.path().join("_published").join(&name);
    orchestrator.run_until(wait_for(published.clone())).await.unwrap();

    assert!(published.is_dir());
    assert_eq!(events(&log), vec![format!("start:{}", name), format!("end:{}", name)]);
}

#[tokio::test]
async fn test_orchestrator_picks_up_new_folder() {
    let root = TempDir::new().unwrap();
    let name = current_folder_name(-1);
    let log = new_log();

    let config = WatchConfig::new(root.path())
        .with_stability_quiet_ms(100)
        .with_stability_poll_ms(20);
    let orchestrator = Orchestrator::new(
        config,
        ValidationConfig::default(),
        Arc::new(RecordingProcessor::new(log.clone())),
    );

    let writer_root = root.path().to_path_buf();
    let writer_name = name.clone();
    let writer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        write_folder(&writer_root, &writer_name, &text_settings(&["bluesky"], "live"));
    });

    let published = root.path().join("_published").join(&name);
    orchestrator.run_until(wait_for(published.clone())).await.unwrap();
    writer.await.unwrap();

    assert!(published.is_dir());
    assert_eq!(events(&log).len(), 2);
}
