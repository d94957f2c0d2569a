mod test_utils;

use courier_core::{Platform, PostSettings, PostType, PostUnitBuilder};
use courier_interface::{PostId, StatsSource};
use courier_social::{
    ContainerConfig, PlatformRegistry, PostPublisher, PublishConfig, StatsConfig, StatsReporter,
};
use std::sync::Arc;
use std::time::Duration;
use test_utils::{new_log, reading, MockDirectPlatform, MockStatsSource};

fn reporter(sources: Vec<MockStatsSource>) -> (courier_social::StatsHandle, StatsReporter) {
    let sources = sources
        .into_iter()
        .map(|s| Arc::new(s) as Arc<dyn StatsSource>)
        .collect();
    StatsReporter::new(sources, StatsConfig::default())
}

fn deltas(change: &courier_social::StatsChange) -> Vec<Option<i64>> {
    change.metrics().iter().map(|m| *m.delta()).collect()
}

#[tokio::test]
async fn test_first_reading_has_no_deltas() {
    let (_handle, mut reporter) = reporter(vec![MockStatsSource::new(
        Platform::Mastodon,
        vec![Some(reading("1", 4, 1))],
    )]);

    let changes = reporter.poll_once().await;
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].post_id(), &PostId::from("1"));
    assert_eq!(deltas(&changes[0]), vec![None, None]);
    assert_eq!(changes[0].to_string(), "likes 4, replies 1");
}

#[tokio::test]
async fn test_later_readings_show_change() {
    let (_handle, mut reporter) = reporter(vec![MockStatsSource::new(
        Platform::Bluesky,
        vec![Some(reading("1", 4, 1)), Some(reading("1", 7, 1))],
    )]);

    reporter.poll_once().await;
    let changes = reporter.poll_once().await;
    assert_eq!(deltas(&changes[0]), vec![Some(3), Some(0)]);
    assert_eq!(changes[0].to_string(), "likes 7 (+3), replies 1");
}

#[tokio::test]
async fn test_new_post_is_not_compared_with_old_one() {
    let (_handle, mut reporter) = reporter(vec![MockStatsSource::new(
        Platform::Twitter,
        vec![Some(reading("1", 40, 3)), Some(reading("2", 1, 0))],
    )]);

    reporter.poll_once().await;
    let changes = reporter.poll_once().await;
    assert_eq!(changes[0].post_id(), &PostId::from("2"));
    assert_eq!(deltas(&changes[0]), vec![None, None]);
}

#[tokio::test]
async fn test_reset_clears_last_reading() {
    let (handle, mut reporter) = reporter(vec![MockStatsSource::new(
        Platform::Threads,
        vec![Some(reading("1", 4, 1)), Some(reading("1", 9, 2))],
    )]);

    reporter.poll_once().await;
    assert!(reporter.last().get(Platform::Threads).is_some());

    handle.reset(Platform::Threads);
    let changes = reporter.poll_once().await;
    assert_eq!(deltas(&changes[0]), vec![None, None]);
}

#[tokio::test]
async fn test_failing_source_does_not_stop_report() {
    let (_handle, mut reporter) = reporter(vec![
        MockStatsSource::failing(Platform::Bluesky),
        MockStatsSource::new(Platform::Mastodon, vec![None]),
        MockStatsSource::new(Platform::Twitter, vec![Some(reading("9", 2, 0))]),
    ]);

    let changes = reporter.poll_once().await;
    assert_eq!(changes.len(), 1);
    assert_eq!(*changes[0].platform(), Platform::Twitter);
    assert!(reporter.last().get(Platform::Bluesky).is_none());
    assert!(reporter.last().get(Platform::Mastodon).is_none());
}

#[tokio::test]
async fn test_successful_publish_resets_platform_stats() {
    let (handle, mut reporter) = reporter(vec![MockStatsSource::new(
        Platform::Mastodon,
        vec![Some(reading("1", 4, 1)), Some(reading("1", 5, 1))],
    )]);
    reporter.poll_once().await;

    let log = new_log();
    let mut registry = PlatformRegistry::new();
    registry.register_direct(MockDirectPlatform::new(Platform::Mastodon, log.clone()));
    let publisher = PostPublisher::new(
        registry,
        None,
        ContainerConfig::default(),
        PublishConfig::default(),
    )
    .with_stats(handle);

    let unit = PostUnitBuilder::default()
        .post_type(PostType::Text)
        .body_text("hello")
        .build()
        .unwrap();
    let settings = PostSettings::new(vec![Platform::Mastodon], vec![unit]);
    let report = publisher
        .publish_folder(std::path::Path::new("/watch/2025.03.01-09.00"), &settings)
        .await;
    assert!(report.is_success());

    let changes = reporter.poll_once().await;
    assert_eq!(deltas(&changes[0]), vec![None, None]);
}

#[tokio::test]
async fn test_failed_publish_keeps_platform_stats() {
    let (handle, mut reporter) = reporter(vec![MockStatsSource::new(
        Platform::Mastodon,
        vec![Some(reading("1", 4, 1)), Some(reading("1", 5, 1))],
    )]);
    reporter.poll_once().await;

    let mut registry = PlatformRegistry::new();
    registry.register_direct(MockDirectPlatform::new(Platform::Mastodon, new_log()).failing());
    let publisher = PostPublisher::new(
        registry,
        None,
        ContainerConfig::default(),
        PublishConfig::default(),
    )
    .with_stats(handle);

    let unit = PostUnitBuilder::default()
        .post_type(PostType::Text)
        .body_text("hello")
        .build()
        .unwrap();
    let settings = PostSettings::new(vec![Platform::Mastodon], vec![unit]);
    let report = publisher
        .publish_folder(std::path::Path::new("/watch/2025.03.01-09.00"), &settings)
        .await;
    assert!(!report.is_success());

    let changes = reporter.poll_once().await;
    assert_eq!(deltas(&changes[0]), vec![Some(1), Some(0)]);
}

#[tokio::test(start_paused = true)]
async fn test_reporter_stops_when_handles_drop() {
    let (handle, reporter) = reporter(vec![]);
    let task = tokio::spawn(reporter.run());
    drop(handle);

    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("reporter should stop")
        .unwrap();
}

#[test]
fn test_stats_hours() {
    let config = StatsConfig::default();
    assert_eq!(config.interval(), Duration::from_secs(3600));
    assert!(!config.is_active_hour(0));
    assert!(config.is_active_hour(12));

    let night = StatsConfig::default()
        .with_active_from_hour(22)
        .with_active_until_hour(2);
    assert!(night.is_active_hour(23));
    assert!(night.is_active_hour(1));
    assert!(!night.is_active_hour(2));
    assert!(!night.is_active_hour(12));
}
