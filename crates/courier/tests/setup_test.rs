//! Tests for registry and staging construction.

use courier::{
    CourierConfig, Credentials, Platform, build_registry, build_staging, build_stats_sources,
};
use courier_social::PlatformHandle;
use tempfile::TempDir;

fn config_with(contents: &str) -> CourierConfig {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("courier.toml");
    std::fs::write(&path, contents).unwrap();
    CourierConfig::from_file(&path).unwrap()
}

#[test]
fn test_dry_run_registers_every_platform() {
    let registry = build_registry(&CourierConfig::default(), &Credentials::default(), true);
    assert_eq!(registry.platforms().len(), 5);
    assert!(matches!(
        registry.get(Platform::Threads),
        Some(PlatformHandle::Container(_))
    ));
    assert!(matches!(
        registry.get(Platform::Instagram),
        Some(PlatformHandle::Container(_))
    ));
    assert!(matches!(
        registry.get(Platform::Bluesky),
        Some(PlatformHandle::Direct(_))
    ));
}

#[test]
fn test_only_platforms_with_credentials_are_registered() {
    let credentials = Credentials::default()
        .with_bluesky_identifier("me.bsky.social")
        .with_bluesky_password("app-password")
        .with_twitter_access_token("token")
        .with_threads_user_id("42");

    let registry = build_registry(&CourierConfig::default(), &credentials, false);
    assert_eq!(registry.platforms(), vec![Platform::Bluesky, Platform::Twitter]);
}

#[test]
fn test_mastodon_needs_an_instance_url() {
    let credentials = Credentials::default().with_mastodon_access_token("token");

    let without_url = build_registry(&CourierConfig::default(), &credentials, false);
    assert!(!without_url.has_platform(Platform::Mastodon));

    let config = config_with("[mastodon]\ninstance_url = \"https://mastodon.example\"\n");
    let with_url = build_registry(&config, &credentials, false);
    assert!(with_url.has_platform(Platform::Mastodon));
}

#[test]
fn test_staging_selection() {
    let config = CourierConfig::default();
    assert!(build_staging(&config, &Credentials::default(), true).is_some());
    assert!(build_staging(&config, &Credentials::default(), false).is_none());

    let partial = Credentials::default()
        .with_firebase_api_key("key")
        .with_firebase_email("me@example.com")
        .with_firebase_password("secret");
    assert!(build_staging(&config, &partial, false).is_none());

    let complete = partial.with_firebase_storage_bucket("bucket.appspot.com");
    assert!(build_staging(&config, &complete, false).is_some());
}

#[test]
fn test_stats_sources_skip_instagram() {
    let credentials = Credentials::default()
        .with_instagram_user_id("1")
        .with_instagram_access_token("token")
        .with_threads_user_id("2")
        .with_threads_access_token("token")
        .with_twitter_access_token("token");

    let platforms: Vec<Platform> = build_stats_sources(&CourierConfig::default(), &credentials)
        .iter()
        .map(|source| source.platform())
        .collect();
    assert_eq!(platforms, vec![Platform::Threads, Platform::Twitter]);
}
