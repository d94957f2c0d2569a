//! Building the publisher from configuration and credentials.

use crate::{CourierConfig, Credentials};
use courier_core::Platform;
use courier_interface::{MediaStaging, StatsSource};
use courier_social::{
    BlueskyClient, DryRunContainerClient, DryRunDirectClient, DryRunStaging, FirebaseCredentials,
    FirebaseStaging, InstagramClient, MastodonClient, PlatformRegistry, PostPublisher,
    ThreadsClient, TwitterClient,
};
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{info, warn};

/// Register a client for every platform with credentials.
///
/// With `dry_run`, every platform gets a logging stand-in instead.
pub fn build_registry(config: &CourierConfig, credentials: &Credentials, dry_run: bool) -> PlatformRegistry {
    let mut registry = PlatformRegistry::new();

    if dry_run {
        for platform in Platform::iter() {
            if platform.limits().needs_public_url() {
                registry.register_container(DryRunContainerClient::new(platform));
            } else {
                registry.register_direct(DryRunDirectClient::new(platform));
            }
        }
        return registry;
    }

    if let Some(client) = bluesky_client(config, credentials) {
        registry.register_direct(client);
    }
    if let (Some(user_id), Some(token)) = (
        credentials.instagram_user_id(),
        credentials.instagram_access_token(),
    ) {
        registry.register_container(InstagramClient::new(user_id, token));
    }
    if let Some(client) = mastodon_client(config, credentials) {
        registry.register_direct(client);
    }
    if let Some(client) = threads_client(credentials) {
        registry.register_container(client);
    }
    if let Some(client) = twitter_client(credentials) {
        registry.register_direct(client);
    }

    info!(platforms = registry.platforms().len(), "Platform registry ready");
    registry
}

/// Stats readers for every platform with credentials.
///
/// Instagram has no stats source.
pub fn build_stats_sources(config: &CourierConfig, credentials: &Credentials) -> Vec<Arc<dyn StatsSource>> {
    let mut sources: Vec<Arc<dyn StatsSource>> = Vec::new();
    if let Some(client) = bluesky_client(config, credentials) {
        sources.push(Arc::new(client));
    }
    if let Some(client) = mastodon_client(config, credentials) {
        sources.push(Arc::new(client));
    }
    if let Some(client) = threads_client(credentials) {
        sources.push(Arc::new(client));
    }
    if let Some(client) = twitter_client(credentials) {
        sources.push(Arc::new(client));
    }
    info!(sources = sources.len(), "Stats sources ready");
    sources
}

fn bluesky_client(config: &CourierConfig, credentials: &Credentials) -> Option<BlueskyClient> {
    let (Some(identifier), Some(password)) =
        (credentials.bluesky_identifier(), credentials.bluesky_password())
    else {
        return None;
    };
    let client = BlueskyClient::new(identifier, password);
    Some(match config.bluesky().service_url() {
        Some(url) => client.with_service_url(url),
        None => client,
    })
}

fn mastodon_client(config: &CourierConfig, credentials: &Credentials) -> Option<MastodonClient> {
    let url = credentials
        .mastodon_instance_url()
        .clone()
        .or_else(|| config.mastodon().instance_url().clone());
    match (url, credentials.mastodon_access_token()) {
        (Some(url), Some(token)) => Some(MastodonClient::new(url, token)),
        (None, Some(_)) => {
            warn!("MASTODON_ACCESS_TOKEN is set but no instance URL is configured");
            None
        }
        _ => None,
    }
}

fn threads_client(credentials: &Credentials) -> Option<ThreadsClient> {
    match (credentials.threads_user_id(), credentials.threads_access_token()) {
        (Some(user_id), Some(token)) => Some(ThreadsClient::new(user_id, token)),
        _ => None,
    }
}

fn twitter_client(credentials: &Credentials) -> Option<TwitterClient> {
    credentials.twitter_access_token().as_ref().map(TwitterClient::new)
}

/// Staging backend for platforms that fetch media from a public URL.
///
/// `None` when Firebase is not configured.
pub fn build_staging(
    config: &CourierConfig,
    credentials: &Credentials,
    dry_run: bool,
) -> Option<Arc<dyn MediaStaging>> {
    if dry_run {
        return Some(Arc::new(DryRunStaging));
    }

    let bucket = credentials
        .firebase_storage_bucket()
        .clone()
        .or_else(|| config.firebase().storage_bucket().clone());
    match (
        credentials.firebase_api_key(),
        credentials.firebase_email(),
        credentials.firebase_password(),
        bucket,
    ) {
        (Some(api_key), Some(email), Some(password), Some(bucket)) => {
            info!(bucket = %bucket, "Using Firebase media staging");
            Some(Arc::new(FirebaseStaging::new(FirebaseCredentials::new(
                api_key, email, password, bucket,
            ))))
        }
        _ => {
            info!("Firebase staging not configured");
            None
        }
    }
}

/// Build the publisher and drop platforms that fail authentication.
pub async fn build_publisher(config: &CourierConfig, credentials: &Credentials, dry_run: bool) -> PostPublisher {
    let mut registry = build_registry(config, credentials, dry_run);
    let failed = registry.authenticate_all().await;
    for platform in &failed {
        warn!(%platform, "Authentication failed, posts for this platform will fail");
    }

    let staging = build_staging(config, credentials, dry_run);
    let needs_staging = registry
        .platforms()
        .iter()
        .any(|platform| platform.limits().needs_public_url());
    if staging.is_none() && needs_staging {
        warn!("Media posts for Threads and Instagram need Firebase staging");
    }

    PostPublisher::new(
        registry,
        staging,
        config.container().clone(),
        config.publish().clone(),
    )
}
