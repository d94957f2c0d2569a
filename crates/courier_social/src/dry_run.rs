//! Clients that log instead of calling any API.

use async_trait::async_trait;
use courier_core::Platform;
use courier_error::{PublishResult, StagingError};
use courier_interface::{
    ContainerId, ContainerOptions, ContainerPlatform, ContainerState, DirectPlatform,
    MediaStaging, PostDraft, PostId, PublishedPost, StagedMedia,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn synthetic_id(prefix: &str, platform: Platform) -> String {
    format!("dry-run-{}-{}-{}", platform, prefix, NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Container client whose containers finish immediately.
#[derive(Debug, Clone, Copy)]
pub struct DryRunContainerClient {
    platform: Platform,
}

impl DryRunContainerClient {
    /// Stand in for `platform`.
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    fn container(&self, kind: &str, text: &str, options: &ContainerOptions) -> ContainerId {
        let id = synthetic_id("container", self.platform);
        info!(
            platform = %self.platform,
            kind,
            chars = text.chars().count(),
            carousel_item = options.is_carousel_item,
            reply_to = ?options.reply_to,
            container = %id,
            "[dry run] Create container"
        );
        ContainerId::from(id)
    }
}

#[async_trait]
impl ContainerPlatform for DryRunContainerClient {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn create_text_container(
        &self,
        text: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId> {
        Ok(self.container("text", text, options))
    }

    async fn create_image_container(
        &self,
        _image_url: &str,
        text: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId> {
        Ok(self.container("image", text, options))
    }

    async fn create_video_container(
        &self,
        _video_url: &str,
        text: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId> {
        Ok(self.container("video", text, options))
    }

    async fn create_carousel_container(
        &self,
        children: &[ContainerId],
        text: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId> {
        info!(platform = %self.platform, children = children.len(), "[dry run] Carousel");
        Ok(self.container("carousel", text, options))
    }

    async fn check_container_status(&self, _id: &ContainerId) -> PublishResult<ContainerState> {
        Ok(ContainerState::Finished)
    }

    async fn publish(&self, id: &ContainerId) -> PublishResult<PostId> {
        let post = synthetic_id("post", self.platform);
        info!(platform = %self.platform, container = %id, post = %post, "[dry run] Publish");
        Ok(PostId::from(post))
    }
}

/// One-shot client that returns synthetic posts.
#[derive(Debug, Clone, Copy)]
pub struct DryRunDirectClient {
    platform: Platform,
}

impl DryRunDirectClient {
    /// Stand in for `platform`.
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl DirectPlatform for DryRunDirectClient {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn publish(&self, draft: &PostDraft) -> PublishResult<PublishedPost> {
        let id = synthetic_id("post", self.platform);
        info!(
            platform = %self.platform,
            chars = draft.text().chars().count(),
            media = draft.media().len(),
            reply = draft.reply_to().is_some(),
            post = %id,
            "[dry run] Publish"
        );
        Ok(PublishedPost::new(id, Some("dry-run".to_string()), None))
    }
}

/// Staging backend that hands out `file://` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunStaging;

#[async_trait]
impl MediaStaging for DryRunStaging {
    async fn upload_file(&self, path: &Path) -> Result<StagedMedia, StagingError> {
        info!(path = %path.display(), "[dry run] Stage media");
        Ok(StagedMedia::new(
            format!("file://{}", path.display()),
            path.display().to_string(),
        ))
    }

    async fn delete_file(&self, media: &StagedMedia) -> Result<(), StagingError> {
        info!(handle = %media.handle(), "[dry run] Delete staged media");
        Ok(())
    }
}
