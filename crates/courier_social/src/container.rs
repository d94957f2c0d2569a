//! Create, poll, publish flows for container platforms.
//!
//! Every container goes through the same sequence: create it, wait a grace
//! period, poll its status at a fixed interval until it is finished, then
//! publish. An error status or a failed status call aborts at once. Create
//! calls are never retried.

use crate::ContainerConfig;
use courier_core::MediaKind;
use courier_error::{PublishError, PublishErrorKind, PublishResult};
use courier_interface::{ContainerId, ContainerOptions, ContainerPlatform, ContainerState, PostId};
use derive_getters::Getters;
use tokio_retry2::{Retry, RetryError, strategy::FixedInterval};
use tracing::{debug, error, info, instrument};

/// Media staged at a public URL, ready for a container.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct StagedAttachment {
    /// Public URL the platform fetches.
    url: String,
    /// Image or video.
    kind: MediaKind,
}

impl StagedAttachment {
    /// Create a staged attachment.
    pub fn new(url: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }
}

/// One post of a chain, in container form.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ContainerUnit {
    /// Body text or caption.
    text: String,
    /// Attachments; empty for a text post.
    media: Vec<StagedAttachment>,
}

impl ContainerUnit {
    /// Create a unit.
    pub fn new(text: impl Into<String>, media: Vec<StagedAttachment>) -> Self {
        Self {
            text: text.into(),
            media,
        }
    }
}

/// Poll a container until it is ready to publish.
///
/// Sleeps for the grace period, then checks up to `max_attempts` times with
/// `interval` between checks. There is no sleep after the last check.
#[instrument(skip(platform, id, config), fields(platform = %platform.platform(), container = %id))]
pub async fn wait_until_ready(
    platform: &dyn ContainerPlatform,
    id: &ContainerId,
    config: &ContainerConfig,
) -> PublishResult<()> {
    tokio::time::sleep(config.grace()).await;

    let max_attempts = (*config.max_attempts()).max(1);
    let strategy = FixedInterval::new(config.interval()).take(max_attempts as usize - 1);
    let mut attempt = 0u32;

    let result = Retry::spawn(strategy, move || {
        attempt += 1;
        let current = attempt;
        async move {
            match platform.check_container_status(id).await {
                Ok(ContainerState::Finished) => {
                    debug!(attempt = current, "Container finished");
                    Ok(())
                }
                Ok(ContainerState::InProgress) => {
                    debug!(attempt = current, max_attempts, "Container still in progress");
                    Err(RetryError::Transient {
                        err: PublishError::new(PublishErrorKind::NotReady {
                            container: id.to_string(),
                            attempts: current,
                        }),
                        retry_after: None,
                    })
                }
                Ok(ContainerState::Error(message)) => {
                    Err(RetryError::Permanent(PublishError::new(
                        PublishErrorKind::ContainerFailed {
                            container: id.to_string(),
                            message,
                        },
                    )))
                }
                Err(e) => Err(RetryError::Permanent(e)),
            }
        }
    })
    .await;

    if let Err(e) = &result {
        error!(error = %e, "Container did not become ready");
    }
    result
}

async fn create_media_container(
    platform: &dyn ContainerPlatform,
    media: &StagedAttachment,
    text: &str,
    options: &ContainerOptions,
) -> PublishResult<ContainerId> {
    match media.kind {
        MediaKind::Image => platform.create_image_container(&media.url, text, options).await,
        MediaKind::Video => platform.create_video_container(&media.url, text, options).await,
    }
}

/// Publish a text-only post.
#[instrument(skip(platform, text, config), fields(platform = %platform.platform()))]
pub async fn publish_text(
    platform: &dyn ContainerPlatform,
    text: &str,
    options: &ContainerOptions,
    config: &ContainerConfig,
) -> PublishResult<PostId> {
    let id = platform.create_text_container(text, options).await?;
    debug!(container = %id, "Created text container");
    wait_until_ready(platform, &id, config).await?;
    platform.publish(&id).await
}

/// Publish a post with a single attachment.
#[instrument(skip(platform, text, config), fields(platform = %platform.platform()))]
pub async fn publish_single_media(
    platform: &dyn ContainerPlatform,
    media: &StagedAttachment,
    text: &str,
    options: &ContainerOptions,
    config: &ContainerConfig,
) -> PublishResult<PostId> {
    let id = create_media_container(platform, media, text, options).await?;
    debug!(container = %id, kind = %media.kind, "Created media container");
    wait_until_ready(platform, &id, config).await?;
    platform.publish(&id).await
}

/// Publish a carousel.
///
/// Children are created and polled one at a time in listed order before the
/// parent container is created.
#[instrument(skip(platform, media, text, config), fields(platform = %platform.platform(), children = media.len()))]
pub async fn publish_carousel(
    platform: &dyn ContainerPlatform,
    media: &[StagedAttachment],
    text: &str,
    options: &ContainerOptions,
    config: &ContainerConfig,
) -> PublishResult<PostId> {
    let mut children = Vec::with_capacity(media.len());
    for item in media {
        let child = create_media_container(platform, item, "", &ContainerOptions::carousel_item())
            .await?;
        debug!(container = %child, "Created carousel item");
        wait_until_ready(platform, &child, config).await?;
        children.push(child);
    }

    let id = platform
        .create_carousel_container(&children, text, options)
        .await?;
    debug!(container = %id, "Created carousel container");
    wait_until_ready(platform, &id, config).await?;
    platform.publish(&id).await
}

/// Publish one unit, picking the flow from its attachment count.
pub async fn publish_unit(
    platform: &dyn ContainerPlatform,
    unit: &ContainerUnit,
    reply_to: Option<PostId>,
    config: &ContainerConfig,
) -> PublishResult<PostId> {
    let options = ContainerOptions::replying_to(reply_to);
    match unit.media.as_slice() {
        [] => publish_text(platform, &unit.text, &options, config).await,
        [single] => publish_single_media(platform, single, &unit.text, &options, config).await,
        many => publish_carousel(platform, many, &unit.text, &options, config).await,
    }
}

/// Publish a reply chain.
///
/// Each unit replies to the post published for the previous one. A failure
/// stops the chain; units already published stay published.
#[instrument(skip(platform, units, config), fields(platform = %platform.platform(), units = units.len()))]
pub async fn publish_chain(
    platform: &dyn ContainerPlatform,
    units: &[ContainerUnit],
    config: &ContainerConfig,
) -> PublishResult<Vec<PostId>> {
    let mut published: Vec<PostId> = Vec::with_capacity(units.len());
    for (index, unit) in units.iter().enumerate() {
        let parent = published.last().cloned();
        let id = publish_unit(platform, unit, parent, config).await?;
        info!(unit = index + 1, post = %id, "Published");
        published.push(id);
    }
    Ok(published)
}
