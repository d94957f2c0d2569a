//! Common plumbing for the Meta Graph APIs (Threads and Instagram).
//!
//! Both APIs take every argument as a query parameter, answer with
//! `{ "id": ... }` on create and publish, and expose container status on the
//! container node itself.

use crate::http::{restage, send_json};
use courier_core::Platform;
use courier_error::{PublishErrorKind, PublishResult};
use courier_interface::{ContainerId, PostId};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Insight {
    name: String,
    #[serde(default)]
    values: Vec<InsightValue>,
    #[serde(default)]
    total_value: Option<InsightValue>,
}

#[derive(Debug, Deserialize)]
struct InsightValue {
    value: u64,
}

/// Graph API endpoint bound to one user and token.
#[derive(Clone)]
pub(crate) struct GraphApi {
    client: Client,
    platform: Platform,
    base_url: String,
    user_id: String,
    access_token: String,
}

impl std::fmt::Debug for GraphApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphApi")
            .field("platform", &self.platform)
            .field("base_url", &self.base_url)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl GraphApi {
    pub(crate) fn new(
        platform: Platform,
        base_url: impl Into<String>,
        user_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            platform,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id: user_id.into(),
            access_token: access_token.into(),
        }
    }

    pub(crate) fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// `GET /me` to check the token.
    #[instrument(skip(self), fields(platform = %self.platform))]
    pub(crate) async fn verify(&self) -> PublishResult<()> {
        let request = self
            .client
            .get(format!("{}/me", self.base_url))
            .query(&[("fields", "id"), ("access_token", self.access_token.as_str())]);
        let me: IdResponse = send_json(self.platform, request).await.map_err(|e| {
            restage(e, |reason| PublishErrorKind::Authentication {
                platform: self.platform.to_string(),
                reason,
            })
        })?;
        debug!(id = %me.id, "Token verified");
        Ok(())
    }

    /// `POST /{user}/{edge}` with container parameters.
    #[instrument(skip(self, params), fields(platform = %self.platform))]
    pub(crate) async fn create_container(
        &self,
        edge: &str,
        params: &[(&str, String)],
    ) -> PublishResult<ContainerId> {
        let request = self
            .client
            .post(format!("{}/{}/{}", self.base_url, self.user_id, edge))
            .query(params)
            .query(&[("access_token", self.access_token.as_str())]);
        let created: IdResponse = send_json(self.platform, request).await.map_err(|e| {
            restage(e, |reason| PublishErrorKind::ContainerCreate {
                platform: self.platform.to_string(),
                reason,
            })
        })?;
        Ok(ContainerId::from(created.id))
    }

    /// `GET /{container}?fields=...`.
    #[instrument(skip(self), fields(platform = %self.platform))]
    pub(crate) async fn container_fields<T: serde::de::DeserializeOwned>(
        &self,
        id: &ContainerId,
        fields: &str,
    ) -> PublishResult<T> {
        let request = self
            .client
            .get(format!("{}/{}", self.base_url, id))
            .query(&[("fields", fields), ("access_token", self.access_token.as_str())]);
        send_json(self.platform, request).await.map_err(|e| {
            restage(e, |reason| PublishErrorKind::StatusCheck {
                container: id.to_string(),
                reason,
            })
        })
    }

    /// `POST /{user}/{edge}?creation_id=...`.
    #[instrument(skip(self), fields(platform = %self.platform))]
    pub(crate) async fn publish(&self, edge: &str, id: &ContainerId) -> PublishResult<PostId> {
        let request = self
            .client
            .post(format!("{}/{}/{}", self.base_url, self.user_id, edge))
            .query(&[
                ("creation_id", id.as_str()),
                ("access_token", self.access_token.as_str()),
            ]);
        let published: IdResponse = send_json(self.platform, request).await.map_err(|e| {
            restage(e, |reason| PublishErrorKind::Publish {
                platform: self.platform.to_string(),
                reason,
            })
        })?;
        Ok(PostId::from(published.id))
    }
}

impl GraphApi {
    /// `GET /{user}/{edge}?limit=1`, the newest media on the account.
    #[instrument(skip(self), fields(platform = %self.platform))]
    pub(crate) async fn latest_media(&self, edge: &str) -> PublishResult<Option<PostId>> {
        let request = self
            .client
            .get(format!("{}/{}/{}", self.base_url, self.user_id, edge))
            .query(&[
                ("fields", "id"),
                ("limit", "1"),
                ("access_token", self.access_token.as_str()),
            ]);
        let page: Page<IdResponse> = send_json(self.platform, request).await?;
        Ok(page.data.into_iter().next().map(|media| PostId::from(media.id)))
    }

    /// `GET /{media}/insights?metric=...` as name and value pairs.
    #[instrument(skip(self), fields(platform = %self.platform))]
    pub(crate) async fn insights(&self, id: &PostId, metrics: &str) -> PublishResult<Vec<(String, u64)>> {
        let request = self
            .client
            .get(format!("{}/{}/insights", self.base_url, id))
            .query(&[("metric", metrics), ("access_token", self.access_token.as_str())]);
        let page: Page<Insight> = send_json(self.platform, request).await?;
        Ok(page
            .data
            .into_iter()
            .map(|insight| {
                let value = insight
                    .values
                    .first()
                    .or(insight.total_value.as_ref())
                    .map(|v| v.value)
                    .unwrap_or_default();
                (insight.name, value)
            })
            .collect())
    }
}

/// Join carousel children the way the Graph API expects them.
pub(crate) fn join_children(children: &[ContainerId]) -> String {
    children
        .iter()
        .map(ContainerId::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
