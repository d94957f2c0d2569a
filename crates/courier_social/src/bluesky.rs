//! Bluesky (AT Protocol XRPC) client.

use crate::http::{read_media, restage, send_json};
use async_trait::async_trait;
use courier_core::{MediaKind, Platform};
use courier_error::{PublishError, PublishErrorKind, PublishResult};
use courier_interface::{DirectPlatform, PostDraft, PostStats, PublishedPost, StatsSource};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::LazyLock;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

const DEFAULT_SERVICE_URL: &str = "https://bsky.social";
const POST_COLLECTION: &str = "app.bsky.feed.post";

static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s]+").expect("link pattern is valid"));

#[derive(Debug, Serialize)]
struct CreateSession<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Session {
    access_jwt: String,
    did: String,
}

#[derive(Debug, Deserialize)]
struct UploadBlob {
    blob: Value,
}

#[derive(Debug, Deserialize)]
struct AuthorFeed {
    feed: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    post: FeedPost,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedPost {
    uri: String,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    repost_count: u64,
    #[serde(default)]
    reply_count: u64,
    #[serde(default)]
    quote_count: u64,
}

#[derive(Debug, Deserialize)]
struct CreatedRecord {
    uri: String,
    cid: String,
}

/// Link facets for `text`, with UTF-8 byte offsets as the protocol requires.
///
/// Trailing sentence punctuation is not part of a link.
///
/// # Examples
///
/// ```
/// use courier_social::link_facets;
///
/// let facets = link_facets("see https://example.com.");
/// assert_eq!(facets.len(), 1);
/// assert_eq!(facets[0]["index"]["byteStart"], 4);
/// assert_eq!(facets[0]["index"]["byteEnd"], 23);
/// ```
pub fn link_facets(text: &str) -> Vec<Value> {
    LINK.find_iter(text)
        .map(|m| {
            let uri = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?', ')', '"', '\'']);
            let end = m.start() + uri.len();
            json!({
                "index": { "byteStart": m.start(), "byteEnd": end },
                "features": [{ "$type": "app.bsky.richtext.facet#link", "uri": uri }],
            })
        })
        .collect()
}

/// Bluesky client using an app password.
pub struct BlueskyClient {
    client: Client,
    service_url: String,
    identifier: String,
    password: String,
    session: RwLock<Option<Session>>,
}

impl std::fmt::Debug for BlueskyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlueskyClient")
            .field("service_url", &self.service_url)
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

impl BlueskyClient {
    /// Creates a new Bluesky client against `https://bsky.social`.
    ///
    /// # Arguments
    ///
    /// * `identifier` - Handle or email
    /// * `password` - App password
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        debug!("Creating new Bluesky client");
        Self {
            client: Client::new(),
            service_url: DEFAULT_SERVICE_URL.to_string(),
            identifier: identifier.into(),
            password: password.into(),
            session: RwLock::new(None),
        }
    }

    /// Use another PDS.
    pub fn with_service_url(mut self, service_url: impl Into<String>) -> Self {
        self.service_url = service_url.into().trim_end_matches('/').to_string();
        self
    }

    fn xrpc(&self, method: &str) -> String {
        format!("{}/xrpc/{}", self.service_url, method)
    }

    async fn login(&self) -> PublishResult<Session> {
        let request = self
            .client
            .post(self.xrpc("com.atproto.server.createSession"))
            .json(&CreateSession {
                identifier: &self.identifier,
                password: &self.password,
            });
        let session: Session = send_json(Platform::Bluesky, request).await.map_err(|e| {
            restage(e, |reason| PublishErrorKind::Authentication {
                platform: Platform::Bluesky.to_string(),
                reason,
            })
        })?;
        debug!(did = %session.did, "Bluesky session created");
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn session(&self) -> PublishResult<Session> {
        if let Some(session) = self.session.read().await.as_ref() {
            return Ok(session.clone());
        }
        self.login().await
    }

    async fn upload_blob(&self, session: &Session, path: &std::path::Path, mime: &str) -> PublishResult<Value> {
        let bytes = read_media(Platform::Bluesky, path).await?;
        let request = self
            .client
            .post(self.xrpc("com.atproto.repo.uploadBlob"))
            .bearer_auth(&session.access_jwt)
            .header("content-type", mime)
            .body(bytes);
        let uploaded: UploadBlob = send_json(Platform::Bluesky, request).await?;
        info!(file = %path.display(), "Uploaded blob");
        Ok(uploaded.blob)
    }
}

#[async_trait]
impl DirectPlatform for BlueskyClient {
    fn platform(&self) -> Platform {
        Platform::Bluesky
    }

    #[instrument(skip(self))]
    async fn authenticate(&self) -> PublishResult<()> {
        self.login().await.map(|_| ())
    }

    #[instrument(skip(self, draft), fields(media = draft.media().len()))]
    async fn publish(&self, draft: &PostDraft) -> PublishResult<PublishedPost> {
        let session = self.session().await?;

        let mut images = Vec::with_capacity(draft.media().len());
        for media in draft.media() {
            if *media.kind() != MediaKind::Image {
                return Err(PublishError::new(PublishErrorKind::Unsupported {
                    platform: Platform::Bluesky.to_string(),
                    reason: format!("video {}", media.path().display()),
                }));
            }
            let blob = self.upload_blob(&session, media.path(), media.mime()).await?;
            images.push(json!({ "alt": media.alt_text(), "image": blob }));
        }

        let mut record = json!({
            "$type": POST_COLLECTION,
            "text": draft.text(),
            "createdAt": chrono::Utc::now().to_rfc3339(),
        });
        let facets = link_facets(draft.text());
        if !facets.is_empty() {
            record["facets"] = Value::Array(facets);
        }
        if !images.is_empty() {
            record["embed"] = json!({ "$type": "app.bsky.embed.images", "images": images });
        }
        if let Some(reply) = draft.reply_to() {
            record["reply"] = json!({
                "root": { "uri": reply.root().id().as_str(), "cid": reply.root().content_id() },
                "parent": { "uri": reply.parent().id().as_str(), "cid": reply.parent().content_id() },
            });
        }

        let request = self
            .client
            .post(self.xrpc("com.atproto.repo.createRecord"))
            .bearer_auth(&session.access_jwt)
            .json(&json!({
                "repo": session.did,
                "collection": POST_COLLECTION,
                "record": record,
            }));
        let created: CreatedRecord = send_json(Platform::Bluesky, request).await.map_err(|e| {
            restage(e, |reason| PublishErrorKind::Publish {
                platform: Platform::Bluesky.to_string(),
                reason,
            })
        })?;

        let rkey = created.uri.rsplit('/').next().unwrap_or_default();
        let url = format!("https://bsky.app/profile/{}/post/{}", session.did, rkey);
        info!(uri = %created.uri, url = %url, "Published on Bluesky");
        Ok(PublishedPost::new(created.uri, Some(created.cid), Some(url)))
    }
}

#[async_trait]
impl StatsSource for BlueskyClient {
    fn platform(&self) -> Platform {
        Platform::Bluesky
    }

    #[instrument(skip(self))]
    async fn latest_stats(&self) -> PublishResult<Option<PostStats>> {
        let session = self.session().await?;
        let request = self
            .client
            .get(self.xrpc("app.bsky.feed.getAuthorFeed"))
            .bearer_auth(&session.access_jwt)
            .query(&[
                ("actor", session.did.as_str()),
                ("limit", "1"),
                ("filter", "posts_no_replies"),
            ]);
        let feed: AuthorFeed = send_json(Platform::Bluesky, request).await?;
        Ok(feed.feed.into_iter().next().map(|item| {
            let post = item.post;
            PostStats::new(
                post.uri,
                [
                    ("likes", post.like_count),
                    ("quotes", post.quote_count),
                    ("replies", post.reply_count),
                    ("reposts", post.repost_count),
                ],
            )
        }))
    }
}
