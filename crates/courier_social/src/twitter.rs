//! Twitter / X API v2 client using an OAuth 2.0 user access token.

use crate::http::{media_part, read_media, restage, send_json};
use async_trait::async_trait;
use courier_core::{MediaKind, Platform};
use courier_error::{PublishErrorKind, PublishResult};
use courier_interface::{DirectPlatform, LocalMedia, PostDraft, PostStats, PublishedPost, StatsSource};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};

const TWITTER_API_URL: &str = "https://api.x.com";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct IdData {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Timeline {
    /// Absent when the account has no matching tweets.
    #[serde(default)]
    data: Vec<Tweet>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    public_metrics: PublicMetrics,
}

#[derive(Debug, Deserialize)]
struct PublicMetrics {
    like_count: u64,
    retweet_count: u64,
    reply_count: u64,
    quote_count: u64,
    #[serde(default)]
    impression_count: u64,
}

/// Twitter client.
#[derive(Clone)]
pub struct TwitterClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl std::fmt::Debug for TwitterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl TwitterClient {
    /// Creates a new Twitter client.
    ///
    /// # Arguments
    ///
    /// * `access_token` - OAuth 2.0 user token with `tweet.write` and `media.write`
    pub fn new(access_token: impl Into<String>) -> Self {
        debug!("Creating new Twitter client");
        Self {
            client: Client::new(),
            base_url: TWITTER_API_URL.to_string(),
            access_token: access_token.into(),
        }
    }

    /// Point the client at another API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn user_id(&self) -> PublishResult<String> {
        let request = self
            .client
            .get(format!("{}/2/users/me", self.base_url))
            .bearer_auth(&self.access_token);
        let me: Envelope<IdData> = send_json(Platform::Twitter, request).await.map_err(|e| {
            restage(e, |reason| PublishErrorKind::Authentication {
                platform: Platform::Twitter.to_string(),
                reason,
            })
        })?;
        Ok(me.data.id)
    }

    // TODO: videos over 5 MB need the chunked INIT/APPEND/FINALIZE upload.
    #[instrument(skip(self, media), fields(file = %media.path().display()))]
    async fn upload_media(&self, media: &LocalMedia) -> PublishResult<String> {
        let bytes = read_media(Platform::Twitter, media.path()).await?;
        let category = match (media.kind(), *media.mime()) {
            (_, "image/gif") => "tweet_gif",
            (MediaKind::Image, _) => "tweet_image",
            (MediaKind::Video, _) => "tweet_video",
        };
        let form = reqwest::multipart::Form::new()
            .part("media", media_part(Platform::Twitter, media, bytes)?)
            .text("media_category", category);

        let request = self
            .client
            .post(format!("{}/2/media/upload", self.base_url))
            .bearer_auth(&self.access_token)
            .multipart(form);
        let uploaded: Envelope<IdData> = send_json(Platform::Twitter, request).await?;
        info!(id = %uploaded.data.id, "Uploaded media");

        if !media.alt_text().is_empty() {
            let request = self
                .client
                .post(format!("{}/2/media/metadata", self.base_url))
                .bearer_auth(&self.access_token)
                .json(&json!({
                    "id": uploaded.data.id,
                    "metadata": { "alt_text": { "text": media.alt_text() } },
                }));
            let _: serde_json::Value = send_json(Platform::Twitter, request).await?;
        }
        Ok(uploaded.data.id)
    }
}

#[async_trait]
impl DirectPlatform for TwitterClient {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    #[instrument(skip(self))]
    async fn authenticate(&self) -> PublishResult<()> {
        let user = self.user_id().await?;
        debug!(%user, "Authenticated");
        Ok(())
    }

    #[instrument(skip(self, draft), fields(media = draft.media().len()))]
    async fn publish(&self, draft: &PostDraft) -> PublishResult<PublishedPost> {
        let mut media_ids = Vec::with_capacity(draft.media().len());
        for media in draft.media() {
            media_ids.push(self.upload_media(media).await?);
        }

        let mut body = json!({ "text": draft.text() });
        if !media_ids.is_empty() {
            body["media"] = json!({ "media_ids": media_ids });
        }
        if let Some(reply) = draft.reply_to() {
            body["reply"] = json!({ "in_reply_to_tweet_id": reply.parent().id().as_str() });
        }

        let request = self
            .client
            .post(format!("{}/2/tweets", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&body);
        let tweet: Envelope<IdData> = send_json(Platform::Twitter, request).await.map_err(|e| {
            restage(e, |reason| PublishErrorKind::Publish {
                platform: Platform::Twitter.to_string(),
                reason,
            })
        })?;

        let url = format!("https://x.com/i/web/status/{}", tweet.data.id);
        info!(url = %url, "Published on Twitter");
        Ok(PublishedPost::new(tweet.data.id, None, Some(url)))
    }
}

#[async_trait]
impl StatsSource for TwitterClient {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    #[instrument(skip(self))]
    async fn latest_stats(&self) -> PublishResult<Option<PostStats>> {
        let user = self.user_id().await?;
        // The timeline endpoint rejects max_results below 5.
        let request = self
            .client
            .get(format!("{}/2/users/{}/tweets", self.base_url, user))
            .bearer_auth(&self.access_token)
            .query(&[
                ("max_results", "5"),
                ("exclude", "replies,retweets"),
                ("tweet.fields", "public_metrics"),
            ]);
        let timeline: Timeline = send_json(Platform::Twitter, request).await?;
        Ok(timeline.data.into_iter().next().map(|tweet| {
            let m = tweet.public_metrics;
            PostStats::new(
                tweet.id,
                [
                    ("impressions", m.impression_count),
                    ("likes", m.like_count),
                    ("quotes", m.quote_count),
                    ("replies", m.reply_count),
                    ("retweets", m.retweet_count),
                ],
            )
        }))
    }
}
