//! Mastodon REST API client.

use crate::http::{media_part, read_media, restage, send_json};
use async_trait::async_trait;
use courier_core::Platform;
use courier_error::{PublishError, PublishErrorKind, PublishResult};
use courier_interface::{DirectPlatform, LocalMedia, PostDraft, PostStats, PublishedPost, StatsSource};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_retry2::{Retry, RetryError, strategy::FixedInterval};
use tracing::{debug, info, instrument, warn};

const MEDIA_POLL_INTERVAL: Duration = Duration::from_secs(2);
const MEDIA_POLL_ATTEMPTS: usize = 15;

#[derive(Debug, Deserialize)]
struct MediaAttachment {
    id: String,
    /// `None` while the server is still processing the upload.
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatusRequest<'a> {
    status: &'a str,
    visibility: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    media_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    in_reply_to_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct Status {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Account {
    id: String,
    acct: String,
}

#[derive(Debug, Deserialize)]
struct StatusCounts {
    id: String,
    replies_count: u64,
    reblogs_count: u64,
    favourites_count: u64,
}

/// Mastodon client bound to one instance and account token.
#[derive(Clone)]
pub struct MastodonClient {
    client: Client,
    instance_url: String,
    access_token: String,
}

impl std::fmt::Debug for MastodonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MastodonClient")
            .field("instance_url", &self.instance_url)
            .finish_non_exhaustive()
    }
}

impl MastodonClient {
    /// Creates a new Mastodon client.
    ///
    /// # Arguments
    ///
    /// * `instance_url` - Instance root, e.g. `https://mastodon.social`
    /// * `access_token` - Application access token with `write:statuses` and `write:media`
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        debug!("Creating new Mastodon client");
        Self {
            client: Client::new(),
            instance_url: instance_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    #[instrument(skip(self, media), fields(file = %media.path().display()))]
    async fn upload_media(&self, media: &LocalMedia) -> PublishResult<String> {
        let bytes = read_media(Platform::Mastodon, media.path()).await?;
        let mut form = reqwest::multipart::Form::new()
            .part("file", media_part(Platform::Mastodon, media, bytes)?);
        if !media.alt_text().is_empty() {
            form = form.text("description", media.alt_text().clone());
        }

        let request = self
            .client
            .post(format!("{}/api/v2/media", self.instance_url))
            .bearer_auth(&self.access_token)
            .multipart(form);
        let attachment: MediaAttachment = send_json(Platform::Mastodon, request).await?;
        info!(id = %attachment.id, "Uploaded media");

        if attachment.url.is_none() {
            self.wait_for_media(&attachment.id).await?;
        }
        Ok(attachment.id)
    }

    async fn account(&self) -> PublishResult<Account> {
        let request = self
            .client
            .get(format!("{}/api/v1/accounts/verify_credentials", self.instance_url))
            .bearer_auth(&self.access_token);
        send_json(Platform::Mastodon, request).await.map_err(|e| {
            restage(e, |reason| PublishErrorKind::Authentication {
                platform: Platform::Mastodon.to_string(),
                reason,
            })
        })
    }

    /// Large uploads are processed asynchronously; statuses referencing them
    /// are rejected until processing ends.
    async fn wait_for_media(&self, id: &str) -> PublishResult<()> {
        let strategy = FixedInterval::new(MEDIA_POLL_INTERVAL).take(MEDIA_POLL_ATTEMPTS);
        Retry::spawn(strategy, move || async move {
            let request = self
                .client
                .get(format!("{}/api/v1/media/{}", self.instance_url, id))
                .bearer_auth(&self.access_token);
            match send_json::<MediaAttachment>(Platform::Mastodon, request).await {
                Ok(MediaAttachment { url: Some(_), .. }) => Ok(()),
                Ok(_) => {
                    debug!(id, "Media still processing");
                    Err(RetryError::Transient {
                        err: PublishError::new(PublishErrorKind::Publish {
                            platform: Platform::Mastodon.to_string(),
                            reason: format!("media {} still processing", id),
                        }),
                        retry_after: None,
                    })
                }
                Err(e) => Err(RetryError::Permanent(e)),
            }
        })
        .await
    }
}

#[async_trait]
impl DirectPlatform for MastodonClient {
    fn platform(&self) -> Platform {
        Platform::Mastodon
    }

    #[instrument(skip(self))]
    async fn authenticate(&self) -> PublishResult<()> {
        let account = self.account().await?;
        debug!(account = %account.acct, "Authenticated");
        Ok(())
    }

    #[instrument(skip(self, draft), fields(media = draft.media().len()))]
    async fn publish(&self, draft: &PostDraft) -> PublishResult<PublishedPost> {
        let mut media_ids = Vec::with_capacity(draft.media().len());
        for media in draft.media() {
            media_ids.push(self.upload_media(media).await?);
        }

        let in_reply_to_id = draft.reply_to().as_ref().map(|r| r.parent().id().as_str());
        let body = StatusRequest {
            status: draft.text(),
            visibility: "public",
            media_ids,
            in_reply_to_id,
        };
        let request = self
            .client
            .post(format!("{}/api/v1/statuses", self.instance_url))
            .bearer_auth(&self.access_token)
            .json(&body);
        let status: Status = send_json(Platform::Mastodon, request).await.map_err(|e| {
            restage(e, |reason| PublishErrorKind::Publish {
                platform: Platform::Mastodon.to_string(),
                reason,
            })
        })?;

        match &status.url {
            Some(url) => info!(url = %url, "Published on Mastodon"),
            None => warn!(id = %status.id, "Published on Mastodon without a URL"),
        }
        Ok(PublishedPost::new(status.id, None, status.url))
    }
}

#[async_trait]
impl StatsSource for MastodonClient {
    fn platform(&self) -> Platform {
        Platform::Mastodon
    }

    #[instrument(skip(self))]
    async fn latest_stats(&self) -> PublishResult<Option<PostStats>> {
        let account = self.account().await?;
        let request = self
            .client
            .get(format!(
                "{}/api/v1/accounts/{}/statuses",
                self.instance_url, account.id
            ))
            .query(&[
                ("limit", "1"),
                ("exclude_replies", "true"),
                ("exclude_reblogs", "true"),
            ])
            .bearer_auth(&self.access_token);
        let statuses: Vec<StatusCounts> = send_json(Platform::Mastodon, request).await?;
        Ok(statuses.into_iter().next().map(|status| {
            PostStats::new(
                status.id,
                [
                    ("favourites", status.favourites_count),
                    ("reblogs", status.reblogs_count),
                    ("replies", status.replies_count),
                ],
            )
        }))
    }
}
