//! Tests for layered configuration loading.

use courier::{CourierConfig, expand_home};
use courier_social::FailurePolicy;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("courier.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_bundled_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    let config = CourierConfig::from_file(&path).unwrap();
    assert_eq!(*config.watch().process_interval_minutes(), 5);
    assert_eq!(*config.watch().past_threshold_minutes(), -10);
    assert_eq!(*config.watch().future_threshold_minutes(), 10);
    assert!(*config.watch().hold_until_due());
    assert_eq!(*config.validation().file_wait_timeout_ms(), 10_000);
    assert_eq!(*config.container().max_attempts(), 10);
    assert_eq!(*config.publish().failure_policy(), FailurePolicy::Abort);
    assert_eq!(*config.stats().interval_minutes(), 60);
    assert!(!config.stats().is_active_hour(5));
    assert_eq!(
        config.bluesky().service_url().as_deref(),
        Some("https://bsky.social")
    );
    assert!(config.mastodon().instance_url().is_none());
}

#[test]
fn test_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[watch]
watch_dir = "/srv/posts"
process_interval_minutes = 1
hold_until_due = false

[publish]
failure_policy = "continue"

[mastodon]
instance_url = "https://mastodon.example"
"#,
    );

    let config = CourierConfig::from_file(&path).unwrap();
    assert_eq!(config.watch().watch_dir(), Path::new("/srv/posts"));
    assert_eq!(*config.watch().process_interval_minutes(), 1);
    assert!(!*config.watch().hold_until_due());
    assert_eq!(*config.watch().stability_quiet_ms(), 2_000);
    assert_eq!(*config.publish().failure_policy(), FailurePolicy::Continue);
    assert_eq!(
        config.mastodon().instance_url().as_deref(),
        Some("https://mastodon.example")
    );
}

#[test]
fn test_wrong_type_is_a_fatal_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[watch]\nprocess_interval_minutes = \"soon\"\n");

    let err = CourierConfig::from_file(&path).unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("Configuration"));
}

#[test]
fn test_missing_explicit_file_fails() {
    let dir = TempDir::new().unwrap();
    assert!(CourierConfig::from_file(dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_home_expansion() {
    let Some(home) = dirs::home_dir() else {
        return;
    };
    assert_eq!(expand_home(Path::new("~/posts")), home.join("posts"));
    assert_eq!(expand_home(Path::new("/srv/posts")), PathBuf::from("/srv/posts"));
    assert_eq!(expand_home(Path::new("posts/~")), PathBuf::from("posts/~"));

    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[watch]\nwatch_dir = \"~/scheduled\"\n");
    let config = CourierConfig::from_file(&path).unwrap();
    assert_eq!(config.watch().watch_dir(), &home.join("scheduled"));
}
