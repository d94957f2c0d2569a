//! Instagram Graph API client.
//!
//! Instagram cannot publish text-only posts or reply chains. A single video
//! is published as a reel; videos inside a carousel use the `VIDEO` type.

use crate::graph::{join_children, GraphApi};
use async_trait::async_trait;
use courier_core::Platform;
use courier_error::{PublishError, PublishErrorKind, PublishResult};
use courier_interface::{ContainerId, ContainerOptions, ContainerPlatform, ContainerState, PostId};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

const INSTAGRAM_API_URL: &str = "https://graph.instagram.com/v20.0";

/// Container status as returned by `GET /{container}?fields=status_code`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstagramStatus {
    /// `IN_PROGRESS`, `FINISHED`, `ERROR`, `EXPIRED` or `PUBLISHED`.
    pub status_code: String,
}

impl InstagramStatus {
    /// Map to a container state.
    pub fn into_state(self) -> ContainerState {
        ContainerState::from_status(&self.status_code, None)
    }
}

/// Instagram client.
#[derive(Debug, Clone)]
pub struct InstagramClient {
    api: GraphApi,
}

impl InstagramClient {
    /// Creates a new Instagram client.
    ///
    /// # Arguments
    ///
    /// * `user_id` - Instagram professional account ID
    /// * `access_token` - Long-lived user access token
    pub fn new(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        debug!("Creating new Instagram client");
        Self {
            api: GraphApi::new(Platform::Instagram, INSTAGRAM_API_URL, user_id, access_token),
        }
    }

    /// Point the client at another API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api = self.api.with_base_url(base_url);
        self
    }

    fn base_params(caption: &str, options: &ContainerOptions) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if options.is_carousel_item {
            params.push(("is_carousel_item", "true".to_string()));
        } else if !caption.is_empty() {
            params.push(("caption", caption.to_string()));
        }
        if options.reply_to.is_some() {
            warn!("Instagram does not support replies, ignoring reply target");
        }
        params
    }
}

#[async_trait]
impl ContainerPlatform for InstagramClient {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn authenticate(&self) -> PublishResult<()> {
        self.api.verify().await
    }

    async fn create_text_container(
        &self,
        _text: &str,
        _options: &ContainerOptions,
    ) -> PublishResult<ContainerId> {
        Err(PublishError::new(PublishErrorKind::Unsupported {
            platform: Platform::Instagram.to_string(),
            reason: "text-only posts".to_string(),
        }))
    }

    #[instrument(skip(self, caption))]
    async fn create_image_container(
        &self,
        image_url: &str,
        caption: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId> {
        let mut params = Self::base_params(caption, options);
        params.push(("image_url", image_url.to_string()));
        self.api.create_container("media", &params).await
    }

    #[instrument(skip(self, caption))]
    async fn create_video_container(
        &self,
        video_url: &str,
        caption: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId> {
        let mut params = Self::base_params(caption, options);
        let media_type = if options.is_carousel_item { "VIDEO" } else { "REELS" };
        params.push(("media_type", media_type.to_string()));
        params.push(("video_url", video_url.to_string()));
        self.api.create_container("media", &params).await
    }

    #[instrument(skip(self, caption))]
    async fn create_carousel_container(
        &self,
        children: &[ContainerId],
        caption: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId> {
        let mut params = Self::base_params(caption, options);
        params.push(("media_type", "CAROUSEL".to_string()));
        params.push(("children", join_children(children)));
        self.api.create_container("media", &params).await
    }

    #[instrument(skip(self))]
    async fn check_container_status(&self, id: &ContainerId) -> PublishResult<ContainerState> {
        let status: InstagramStatus = self.api.container_fields(id, "status_code").await?;
        debug!(status = %status.status_code, "Container status");
        Ok(status.into_state())
    }

    #[instrument(skip(self))]
    async fn publish(&self, id: &ContainerId) -> PublishResult<PostId> {
        self.api.publish("media_publish", id).await
    }
}
