//! Platform credentials from the environment.

use derive_getters::Getters;

/// Credentials for every platform and the staging backend.
///
/// A platform whose values are absent is not registered.
#[derive(Debug, Clone, Default, Getters, derive_setters::Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct Credentials {
    /// `BLUESKY_IDENTIFIER`
    bluesky_identifier: Option<String>,
    /// `BLUESKY_PASSWORD`
    bluesky_password: Option<String>,
    /// `INSTAGRAM_USER_ID`
    instagram_user_id: Option<String>,
    /// `INSTAGRAM_ACCESS_TOKEN`
    instagram_access_token: Option<String>,
    /// `MASTODON_INSTANCE_URL`
    mastodon_instance_url: Option<String>,
    /// `MASTODON_ACCESS_TOKEN`
    mastodon_access_token: Option<String>,
    /// `THREADS_USER_ID`
    threads_user_id: Option<String>,
    /// `THREADS_ACCESS_TOKEN`
    threads_access_token: Option<String>,
    /// `TWITTER_ACCESS_TOKEN`
    twitter_access_token: Option<String>,
    /// `FIREBASE_API_KEY`
    firebase_api_key: Option<String>,
    /// `FIREBASE_EMAIL`
    firebase_email: Option<String>,
    /// `FIREBASE_PASSWORD`
    firebase_password: Option<String>,
    /// `FIREBASE_STORAGE_BUCKET`
    firebase_storage_bucket: Option<String>,
}

fn var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Credentials {
    /// Read credentials from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Self {
        Self {
            bluesky_identifier: var("BLUESKY_IDENTIFIER"),
            bluesky_password: var("BLUESKY_PASSWORD"),
            instagram_user_id: var("INSTAGRAM_USER_ID"),
            instagram_access_token: var("INSTAGRAM_ACCESS_TOKEN"),
            mastodon_instance_url: var("MASTODON_INSTANCE_URL"),
            mastodon_access_token: var("MASTODON_ACCESS_TOKEN"),
            threads_user_id: var("THREADS_USER_ID"),
            threads_access_token: var("THREADS_ACCESS_TOKEN"),
            twitter_access_token: var("TWITTER_ACCESS_TOKEN"),
            firebase_api_key: var("FIREBASE_API_KEY"),
            firebase_email: var("FIREBASE_EMAIL"),
            firebase_password: var("FIREBASE_PASSWORD"),
            firebase_storage_bucket: var("FIREBASE_STORAGE_BUCKET"),
        }
    }
}
