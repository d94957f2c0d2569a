//! Trait definitions for platform clients and staging backends.

use crate::{
    ContainerId, ContainerOptions, ContainerState, PostDraft, PostId, PostStats, PublishedPost,
    StagedMedia,
};
use async_trait::async_trait;
use courier_core::{Platform, PostSettings};
use courier_error::{PublishResult, StagingError};
use std::path::Path;

/// A platform that publishes through server-side containers.
///
/// Callers drive the create, poll, publish sequence; implementations only
/// wrap the individual API calls.
#[async_trait]
pub trait ContainerPlatform: Send + Sync {
    /// Platform this client talks to.
    fn platform(&self) -> Platform;

    /// Verify or establish credentials.
    async fn authenticate(&self) -> PublishResult<()> {
        Ok(())
    }

    /// Create a container for a text-only post.
    async fn create_text_container(
        &self,
        text: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId>;

    /// Create a container for an image reachable at `image_url`.
    async fn create_image_container(
        &self,
        image_url: &str,
        text: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId>;

    /// Create a container for a video reachable at `video_url`.
    async fn create_video_container(
        &self,
        video_url: &str,
        text: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId>;

    /// Create a carousel container referencing finished child containers.
    async fn create_carousel_container(
        &self,
        children: &[ContainerId],
        text: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId>;

    /// Current processing state of a container.
    async fn check_container_status(&self, id: &ContainerId) -> PublishResult<ContainerState>;

    /// Publish a finished container.
    async fn publish(&self, id: &ContainerId) -> PublishResult<PostId>;
}

/// A platform that publishes a post in a single call.
#[async_trait]
pub trait DirectPlatform: Send + Sync {
    /// Platform this client talks to.
    fn platform(&self) -> Platform;

    /// Verify or establish credentials.
    async fn authenticate(&self) -> PublishResult<()> {
        Ok(())
    }

    /// Upload any media and publish the post.
    async fn publish(&self, draft: &PostDraft) -> PublishResult<PublishedPost>;
}

/// A storage backend that exposes local files at public URLs.
#[async_trait]
pub trait MediaStaging: Send + Sync {
    /// Upload a file and return where it can be fetched.
    async fn upload_file(&self, path: &Path) -> Result<StagedMedia, StagingError>;

    /// Remove a previously staged file.
    async fn delete_file(&self, media: &StagedMedia) -> Result<(), StagingError>;
}

/// A platform account whose latest post can be inspected.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Platform this client talks to.
    fn platform(&self) -> Platform;

    /// Counters of the account's most recent post, `None` if it has none.
    async fn latest_stats(&self) -> PublishResult<Option<PostStats>>;
}

/// Consumer of validated post folders.
///
/// The dispatch queue hands every valid folder to one processor. `Ok` routes
/// the folder to the published archive, `Err` to the failed archive.
#[async_trait]
pub trait FolderProcessor: Send + Sync {
    /// Publish the post described by `settings`, read from `folder`.
    async fn process(&self, folder: &Path, settings: &PostSettings) -> PublishResult<()>;
}
