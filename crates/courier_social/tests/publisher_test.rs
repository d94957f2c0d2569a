mod test_utils;

use courier_core::{Attachment, Platform, PostSettings, PostType, PostUnit, PostUnitBuilder};
use courier_error::PublishErrorKind;
use courier_interface::FolderProcessor;
use courier_social::{
    ContainerConfig, FailurePolicy, PlatformRegistry, PostPublisher, PublishConfig,
};
use std::path::Path;
use std::sync::Arc;
use test_utils::{
    calls, count, new_log, CallLog, MockContainerPlatform, MockDirectPlatform, MockStaging,
    MockStatus,
};

fn text_unit(body: &str) -> PostUnit {
    PostUnitBuilder::default()
        .post_type(PostType::Text)
        .body_text(body)
        .build()
        .unwrap()
}

fn media_unit(body: &str, files: &[&str]) -> PostUnit {
    PostUnitBuilder::default()
        .post_type(PostType::Media)
        .body_text(body)
        .attachments(
            files
                .iter()
                .map(|f| Attachment::new(*f, format!("alt {f}")))
                .collect::<Vec<_>>(),
        )
        .build()
        .unwrap()
}

fn publisher(registry: PlatformRegistry, staging: Option<MockStaging>, policy: FailurePolicy) -> PostPublisher {
    PostPublisher::new(
        registry,
        staging.map(|s| Arc::new(s) as Arc<dyn courier_interface::MediaStaging>),
        ContainerConfig::default(),
        PublishConfig::default().with_failure_policy(policy),
    )
}

fn folder() -> &'static Path {
    Path::new("/watch/2025.03.01-09.00")
}

#[tokio::test(start_paused = true)]
async fn test_media_is_staged_once_and_deleted_after_all_platforms() {
    let log = new_log();
    let mut registry = PlatformRegistry::new();
    registry.register_container(MockContainerPlatform::new(Platform::Threads, log.clone()));
    registry.register_container(MockContainerPlatform::new(Platform::Instagram, log.clone()));
    registry.register_direct(MockDirectPlatform::new(Platform::Bluesky, log.clone()));
    let publisher = publisher(registry, Some(MockStaging::new(log.clone())), FailurePolicy::Abort);

    let settings = PostSettings::new(
        vec![Platform::Threads, Platform::Instagram, Platform::Bluesky],
        vec![media_unit("sunset", &["a.jpg"])],
    );
    let report = publisher.publish_folder(folder(), &settings).await;

    assert!(report.is_success());
    assert_eq!(count(&log, "staging:upload"), 1);
    assert_eq!(count(&log, "staging:delete"), 1);
    let log = calls(&log);
    assert_eq!(log.first().unwrap(), "staging:upload:a.jpg");
    assert_eq!(log.last().unwrap(), "staging:delete:a.jpg");
    assert!(log.contains(
        &"threads:create:image(https://cdn.test/a.jpg):item=false:reply=-".to_string()
    ));
    assert!(log.contains(&"bluesky:publish:sunset:media=1:reply=-".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_text_post_needs_no_staging() {
    let log = new_log();
    let mut registry = PlatformRegistry::new();
    registry.register_container(MockContainerPlatform::new(Platform::Threads, log.clone()));
    let publisher = publisher(registry, Some(MockStaging::new(log.clone())), FailurePolicy::Abort);

    let settings = PostSettings::new(vec![Platform::Threads], vec![text_unit("hello")]);
    publisher.process(folder(), &settings).await.unwrap();

    assert_eq!(count(&log, "staging:"), 0);
    assert_eq!(count(&log, "threads:publish"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_staging_failure_fails_only_public_url_platforms() {
    let log = new_log();
    let mut registry = PlatformRegistry::new();
    registry.register_container(MockContainerPlatform::new(Platform::Threads, log.clone()));
    registry.register_direct(MockDirectPlatform::new(Platform::Mastodon, log.clone()));
    let publisher = publisher(
        registry,
        Some(MockStaging::failing(log.clone())),
        FailurePolicy::Continue,
    );

    let settings = PostSettings::new(
        vec![Platform::Threads, Platform::Mastodon],
        vec![media_unit("pic", &["a.jpg"])],
    );
    let report = publisher.publish_folder(folder(), &settings).await;

    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, Platform::Threads);
    assert!(matches!(failures[0].1.kind(), PublishErrorKind::Staging(_)));
    assert_eq!(count(&log, "threads:"), 0);
    assert_eq!(count(&log, "mastodon:publish"), 1);
    assert!(report.into_result().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_staging_failure_does_not_abort_remaining_platforms() {
    let log = new_log();
    let mut registry = PlatformRegistry::new();
    registry.register_container(MockContainerPlatform::new(Platform::Threads, log.clone()));
    registry.register_direct(MockDirectPlatform::new(Platform::Mastodon, log.clone()));
    let publisher = PostPublisher::new(
        registry,
        Some(Arc::new(MockStaging::failing(log.clone()))),
        ContainerConfig::default(),
        PublishConfig::default(),
    );
    assert_eq!(*PublishConfig::default().failure_policy(), FailurePolicy::Abort);

    let settings = PostSettings::new(
        vec![Platform::Threads, Platform::Mastodon],
        vec![media_unit("pic", &["a.jpg"])],
    );
    let report = publisher.publish_folder(folder(), &settings).await;

    assert_eq!(report.outcomes().len(), 2);
    assert_eq!(count(&log, "mastodon:publish"), 1);
    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, Platform::Threads);
}

#[tokio::test(start_paused = true)]
async fn test_missing_staging_backend_does_not_abort_direct_platforms() {
    let log = new_log();
    let mut registry = PlatformRegistry::new();
    registry.register_container(MockContainerPlatform::new(Platform::Instagram, log.clone()));
    registry.register_direct(MockDirectPlatform::new(Platform::Bluesky, log.clone()));
    let publisher = publisher(registry, None, FailurePolicy::Abort);

    let settings = PostSettings::new(
        vec![Platform::Instagram, Platform::Bluesky],
        vec![media_unit("pic", &["a.jpg"])],
    );
    let report = publisher.publish_folder(folder(), &settings).await;

    assert_eq!(count(&log, "instagram:"), 0);
    assert_eq!(count(&log, "bluesky:publish"), 1);
    assert!(report.into_result().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_abort_policy_stops_at_first_failure() {
    let log = new_log();
    let mut registry = PlatformRegistry::new();
    registry.register_direct(MockDirectPlatform::new(Platform::Bluesky, log.clone()).failing());
    registry.register_direct(MockDirectPlatform::new(Platform::Mastodon, log.clone()));
    let publisher = publisher(registry, None, FailurePolicy::Abort);

    let settings = PostSettings::new(
        vec![Platform::Bluesky, Platform::Mastodon],
        vec![text_unit("hi")],
    );
    let report = publisher.publish_folder(folder(), &settings).await;

    assert_eq!(report.outcomes().len(), 1);
    assert_eq!(count(&log, "mastodon:"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_continue_policy_attempts_every_platform() {
    let log = new_log();
    let mut registry = PlatformRegistry::new();
    registry.register_direct(MockDirectPlatform::new(Platform::Bluesky, log.clone()).failing());
    registry.register_direct(MockDirectPlatform::new(Platform::Mastodon, log.clone()));
    let publisher = publisher(registry, None, FailurePolicy::Continue);

    let settings = PostSettings::new(
        vec![Platform::Bluesky, Platform::Mastodon],
        vec![text_unit("hi")],
    );
    let err = publisher.process(folder(), &settings).await.unwrap_err();

    assert_eq!(count(&log, "mastodon:publish"), 1);
    match err.kind() {
        PublishErrorKind::PlatformsFailed(summary) => {
            assert!(summary.starts_with("bluesky:"));
            assert!(!summary.contains("mastodon"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_unregistered_platform_is_not_configured() {
    let publisher = publisher(PlatformRegistry::new(), None, FailurePolicy::Abort);
    let settings = PostSettings::new(vec![Platform::Twitter], vec![text_unit("hi")]);

    let report = publisher.publish_folder(folder(), &settings).await;

    let failures = report.failures();
    assert_eq!(
        failures[0].1.kind(),
        &PublishErrorKind::NotConfigured("twitter".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_instagram_rejects_text_posts_without_calls() {
    let log = new_log();
    let mut registry = PlatformRegistry::new();
    registry.register_container(MockContainerPlatform::new(Platform::Instagram, log.clone()));
    let publisher = publisher(registry, None, FailurePolicy::Abort);

    let settings = PostSettings::new(vec![Platform::Instagram], vec![text_unit("words")]);
    let report = publisher.publish_folder(folder(), &settings).await;

    assert!(matches!(
        report.failures()[0].1.kind(),
        PublishErrorKind::Unsupported { .. }
    ));
    assert!(calls(&log).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_platform_without_replies_publishes_first_unit_only() {
    let log = new_log();
    let mut registry = PlatformRegistry::new();
    registry.register_container(MockContainerPlatform::new(Platform::Instagram, log.clone()));
    let publisher = publisher(registry, Some(MockStaging::new(log.clone())), FailurePolicy::Abort);

    let settings = PostSettings::new(
        vec![Platform::Instagram],
        vec![media_unit("first", &["a.jpg"]), media_unit("second", &["b.jpg"])],
    );
    publisher.process(folder(), &settings).await.unwrap();

    assert_eq!(count(&log, "instagram:publish"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_direct_chain_carries_root_and_parent() {
    let log: CallLog = new_log();
    let mut registry = PlatformRegistry::new();
    registry.register_direct(MockDirectPlatform::new(Platform::Bluesky, log.clone()));
    let publisher = publisher(registry, None, FailurePolicy::Abort);

    let settings = PostSettings::new(
        vec![Platform::Bluesky],
        vec![text_unit("one"), text_unit("two"), text_unit("three")],
    );
    publisher.process(folder(), &settings).await.unwrap();

    assert_eq!(
        calls(&log),
        vec![
            "bluesky:publish:one:media=0:reply=-",
            "bluesky:publish:two:media=0:reply=bluesky-1/bluesky-1",
            "bluesky:publish:three:media=0:reply=bluesky-1/bluesky-2",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_container_error_fails_folder() {
    let log = new_log();
    let mut registry = PlatformRegistry::new();
    registry.register_container(
        MockContainerPlatform::new(Platform::Threads, log.clone())
            .with_script(vec![MockStatus::Error("bad media".to_string())]),
    );
    let publisher = publisher(registry, None, FailurePolicy::Abort);

    let settings = PostSettings::new(vec![Platform::Threads], vec![text_unit("hi")]);
    assert!(publisher.process(folder(), &settings).await.is_err());
    assert_eq!(count(&log, "threads:publish"), 0);
}
