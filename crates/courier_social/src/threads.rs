//! Threads Graph API client.

use crate::graph::{join_children, GraphApi};
use async_trait::async_trait;
use courier_core::Platform;
use courier_error::PublishResult;
use courier_interface::{
    ContainerId, ContainerOptions, ContainerPlatform, ContainerState, PostId, PostStats,
    StatsSource,
};
use serde::Deserialize;
use tracing::{debug, instrument};

const THREADS_API_URL: &str = "https://graph.threads.net/v1.0";
const THREADS_METRICS: &str = "views,likes,replies,reposts,quotes";

/// Container status as returned by `GET /{container}?fields=status,error_message`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThreadsStatus {
    /// `IN_PROGRESS`, `FINISHED`, `ERROR`, `EXPIRED` or `PUBLISHED`.
    pub status: String,
    /// Present when `status` is `ERROR`.
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ThreadsStatus {
    /// Map to a container state.
    pub fn into_state(self) -> ContainerState {
        ContainerState::from_status(&self.status, self.error_message.as_deref())
    }
}

/// Threads client.
#[derive(Debug, Clone)]
pub struct ThreadsClient {
    api: GraphApi,
}

impl ThreadsClient {
    /// Creates a new Threads client.
    ///
    /// # Arguments
    ///
    /// * `user_id` - Threads user ID
    /// * `access_token` - Long-lived user access token
    pub fn new(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        debug!("Creating new Threads client");
        Self {
            api: GraphApi::new(Platform::Threads, THREADS_API_URL, user_id, access_token),
        }
    }

    /// Point the client at another API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api = self.api.with_base_url(base_url);
        self
    }

    fn base_params(
        media_type: &str,
        text: &str,
        options: &ContainerOptions,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![("media_type", media_type.to_string())];
        if !text.is_empty() {
            params.push(("text", text.to_string()));
        }
        if options.is_carousel_item {
            params.push(("is_carousel_item", "true".to_string()));
        }
        if let Some(parent) = &options.reply_to {
            params.push(("reply_to_id", parent.to_string()));
        }
        params
    }
}

#[async_trait]
impl ContainerPlatform for ThreadsClient {
    fn platform(&self) -> Platform {
        Platform::Threads
    }

    async fn authenticate(&self) -> PublishResult<()> {
        self.api.verify().await
    }

    #[instrument(skip(self, text))]
    async fn create_text_container(
        &self,
        text: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId> {
        let params = Self::base_params("TEXT", text, options);
        self.api.create_container("threads", &params).await
    }

    #[instrument(skip(self, text))]
    async fn create_image_container(
        &self,
        image_url: &str,
        text: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId> {
        let mut params = Self::base_params("IMAGE", text, options);
        params.push(("image_url", image_url.to_string()));
        self.api.create_container("threads", &params).await
    }

    #[instrument(skip(self, text))]
    async fn create_video_container(
        &self,
        video_url: &str,
        text: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId> {
        let mut params = Self::base_params("VIDEO", text, options);
        params.push(("video_url", video_url.to_string()));
        self.api.create_container("threads", &params).await
    }

    #[instrument(skip(self, text))]
    async fn create_carousel_container(
        &self,
        children: &[ContainerId],
        text: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId> {
        let mut params = Self::base_params("CAROUSEL", text, options);
        params.push(("children", join_children(children)));
        self.api.create_container("threads", &params).await
    }

    #[instrument(skip(self))]
    async fn check_container_status(&self, id: &ContainerId) -> PublishResult<ContainerState> {
        let status: ThreadsStatus = self.api.container_fields(id, "status,error_message").await?;
        debug!(status = %status.status, "Container status");
        Ok(status.into_state())
    }

    #[instrument(skip(self))]
    async fn publish(&self, id: &ContainerId) -> PublishResult<PostId> {
        self.api.publish("threads_publish", id).await
    }
}

#[async_trait]
impl StatsSource for ThreadsClient {
    fn platform(&self) -> Platform {
        Platform::Threads
    }

    #[instrument(skip(self))]
    async fn latest_stats(&self) -> PublishResult<Option<PostStats>> {
        let Some(id) = self.api.latest_media("threads").await? else {
            return Ok(None);
        };
        let metrics = self.api.insights(&id, THREADS_METRICS).await?;
        Ok(Some(PostStats::new(id, metrics)))
    }
}
