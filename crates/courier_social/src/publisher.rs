//! Per-folder publishing across all selected platforms.

use crate::container::{self, ContainerUnit, StagedAttachment};
use crate::{
    ContainerConfig, FailurePolicy, PlatformHandle, PlatformRegistry, PublishConfig, StatsHandle,
};
use async_trait::async_trait;
use courier_core::{mime_type_for, Attachment, MediaKind, Platform, PostSettings, PostUnit};
use courier_error::{PublishError, PublishErrorKind, PublishResult};
use courier_interface::{
    DirectPlatform, FolderProcessor, LocalMedia, MediaStaging, PostDraftBuilder,
    PostId, PublishedPost, ReplyTo, StagedMedia,
};
use derive_getters::Getters;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Result of publishing one folder on one platform.
#[derive(Debug, Getters)]
pub struct PlatformOutcome {
    /// Target platform.
    platform: Platform,
    /// Published post IDs in chain order, or the failure.
    result: PublishResult<Vec<PostId>>,
}

/// Results of publishing one folder.
#[derive(Debug, Default, Getters)]
pub struct PublishReport {
    /// One entry per attempted platform, in dispatch order.
    outcomes: Vec<PlatformOutcome>,
}

impl PublishReport {
    /// Whether every attempted platform succeeded.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Failed platforms and their errors.
    pub fn failures(&self) -> Vec<(Platform, &PublishError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.platform, e)))
            .collect()
    }

    /// Collapse into a single result.
    #[track_caller]
    pub fn into_result(self) -> PublishResult<()> {
        let failures: Vec<String> = self
            .failures()
            .into_iter()
            .map(|(platform, e)| format!("{}: {}", platform, e.kind()))
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(PublishError::new(PublishErrorKind::PlatformsFailed(
                failures.join("; "),
            )))
        }
    }
}

enum Staging {
    NotNeeded,
    Ready(HashMap<String, StagedMedia>),
    Failed(String),
}

/// Publishes validated folders to every platform they name.
///
/// Media is staged once per folder when any selected platform needs public
/// URLs and removed again after all platforms ran.
pub struct PostPublisher {
    registry: PlatformRegistry,
    staging: Option<Arc<dyn MediaStaging>>,
    container: ContainerConfig,
    publish: PublishConfig,
    stats: Option<StatsHandle>,
}

impl PostPublisher {
    /// Create a publisher.
    pub fn new(
        registry: PlatformRegistry,
        staging: Option<Arc<dyn MediaStaging>>,
        container: ContainerConfig,
        publish: PublishConfig,
    ) -> Self {
        Self {
            registry,
            staging,
            container,
            publish,
            stats: None,
        }
    }

    /// Reset the stats report for each platform a post goes out on.
    pub fn with_stats(mut self, stats: StatsHandle) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Registered clients.
    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    /// Publish a folder on each of its platforms in order.
    #[instrument(skip(self, settings), fields(folder = %folder.display()))]
    pub async fn publish_folder(&self, folder: &Path, settings: &PostSettings) -> PublishReport {
        info!(summary = %settings.summary(), "Publishing post");

        let staging = self.stage(folder, settings).await;
        let mut report = PublishReport::default();

        for platform in settings.platforms() {
            info!(%platform, "Publishing on platform");
            let result = self
                .publish_platform(*platform, folder, settings, &staging)
                .await;
            // Staging failures only affect public-URL platforms; the rest proceed.
            let abort = match &result {
                Ok(ids) => {
                    info!(%platform, posts = ids.len(), "Published on platform");
                    if let Some(stats) = &self.stats {
                        stats.reset(*platform);
                    }
                    false
                }
                Err(e) if matches!(e.kind(), PublishErrorKind::Staging(_)) => {
                    error!(%platform, error = %e, "Media staging failed, skipping platform");
                    false
                }
                Err(e) => {
                    error!(%platform, error = %e, "Publishing on platform failed");
                    true
                }
            };
            report.outcomes.push(PlatformOutcome {
                platform: *platform,
                result,
            });

            if abort && *self.publish.failure_policy() == FailurePolicy::Abort {
                warn!("Skipping remaining platforms");
                break;
            }
        }

        self.cleanup(staging).await;
        report
    }

    async fn publish_platform(
        &self,
        platform: Platform,
        folder: &Path,
        settings: &PostSettings,
        staging: &Staging,
    ) -> PublishResult<Vec<PostId>> {
        let handle = self.registry.require(platform)?;
        let units = units_for(platform, settings);

        if !platform.limits().text_only() && units.iter().any(|u| u.attachments().is_empty()) {
            return Err(PublishError::new(PublishErrorKind::Unsupported {
                platform: platform.to_string(),
                reason: "text-only posts".to_string(),
            }));
        }

        match handle {
            PlatformHandle::Container(client) => {
                let units = container_units(platform, units, staging)?;
                container::publish_chain(client.as_ref(), &units, &self.container).await
            }
            PlatformHandle::Direct(client) => {
                publish_direct(client.as_ref(), platform, folder, units).await
            }
        }
    }

    async fn stage(&self, folder: &Path, settings: &PostSettings) -> Staging {
        let needs_urls = settings
            .platforms()
            .iter()
            .any(|p| p.limits().needs_public_url() && self.registry.has_platform(*p));
        if !needs_urls || !settings.has_attachments() {
            return Staging::NotNeeded;
        }

        let Some(backend) = &self.staging else {
            warn!("Media staging is not configured");
            return Staging::Failed("no staging backend configured".to_string());
        };

        let mut staged: HashMap<String, StagedMedia> = HashMap::new();
        for attachment in settings.attachments() {
            if staged.contains_key(attachment.filename()) {
                continue;
            }
            let path = folder.join(attachment.filename());
            info!(file = %attachment.filename(), "Staging media");
            match backend.upload_file(&path).await {
                Ok(media) => {
                    debug!(url = %media.public_url(), "Staged media");
                    staged.insert(attachment.filename().clone(), media);
                }
                Err(e) => {
                    error!(error = %e, "Staging failed");
                    self.cleanup(Staging::Ready(staged)).await;
                    return Staging::Failed(e.kind().to_string());
                }
            }
        }
        Staging::Ready(staged)
    }

    async fn cleanup(&self, staging: Staging) {
        let (Some(backend), Staging::Ready(staged)) = (&self.staging, staging) else {
            return;
        };
        for media in staged.values() {
            match backend.delete_file(media).await {
                Ok(()) => debug!(handle = %media.handle(), "Deleted staged media"),
                Err(e) => warn!(handle = %media.handle(), error = %e, "Failed to delete staged media"),
            }
        }
    }
}

#[async_trait]
impl FolderProcessor for PostPublisher {
    async fn process(&self, folder: &Path, settings: &PostSettings) -> PublishResult<()> {
        self.publish_folder(folder, settings).await.into_result()
    }
}

fn units_for(platform: Platform, settings: &PostSettings) -> &[PostUnit] {
    let units = settings.posts().as_slice();
    if units.len() > 1 && !platform.limits().supports_replies() {
        warn!(
            %platform,
            units = units.len(),
            "Platform does not support reply chains, publishing the first post only"
        );
        return &units[..1];
    }
    units
}

fn media_kind(platform: Platform, attachment: &Attachment) -> PublishResult<MediaKind> {
    attachment
        .extension()
        .and_then(|ext| platform.limits().media_kind(&ext))
        .ok_or_else(|| {
            PublishError::new(PublishErrorKind::Unsupported {
                platform: platform.to_string(),
                reason: format!("file {}", attachment.filename()),
            })
        })
}

fn container_units(
    platform: Platform,
    units: &[PostUnit],
    staging: &Staging,
) -> PublishResult<Vec<ContainerUnit>> {
    let empty = HashMap::new();
    let staged = match staging {
        Staging::Ready(staged) => staged,
        Staging::NotNeeded => &empty,
        Staging::Failed(reason) => {
            return Err(PublishError::new(PublishErrorKind::Staging(reason.clone())));
        }
    };

    units
        .iter()
        .map(|unit| {
            let media = unit
                .attachments()
                .iter()
                .map(|attachment| {
                    let kind = media_kind(platform, attachment)?;
                    let media = staged.get(attachment.filename()).ok_or_else(|| {
                        PublishError::new(PublishErrorKind::Staging(format!(
                            "{} was not staged",
                            attachment.filename()
                        )))
                    })?;
                    Ok(StagedAttachment::new(media.public_url().clone(), kind))
                })
                .collect::<PublishResult<Vec<_>>>()?;
            Ok(ContainerUnit::new(unit.body_text().clone(), media))
        })
        .collect()
}

async fn publish_direct(
    client: &dyn DirectPlatform,
    platform: Platform,
    folder: &Path,
    units: &[PostUnit],
) -> PublishResult<Vec<PostId>> {
    let mut root: Option<PublishedPost> = None;
    let mut parent: Option<PublishedPost> = None;
    let mut ids = Vec::with_capacity(units.len());

    for (index, unit) in units.iter().enumerate() {
        let media = unit
            .attachments()
            .iter()
            .map(|attachment| {
                let kind = media_kind(platform, attachment)?;
                let ext = attachment.extension().unwrap_or_default();
                Ok(LocalMedia::new(
                    folder.join(attachment.filename()),
                    attachment.alt_text().clone(),
                    kind,
                    mime_type_for(&ext),
                ))
            })
            .collect::<PublishResult<Vec<_>>>()?;

        let reply_to = match (&root, &parent) {
            (Some(root), Some(parent)) => Some(ReplyTo::new(root.clone(), parent.clone())),
            _ => None,
        };

        let draft = PostDraftBuilder::default()
            .text(unit.body_text().clone())
            .media(media)
            .reply_to(reply_to)
            .build()
            .map_err(|e| {
                PublishError::new(PublishErrorKind::Publish {
                    platform: platform.to_string(),
                    reason: e.to_string(),
                })
            })?;

        let post = client.publish(&draft).await?;
        info!(%platform, unit = index + 1, post = %post.id(), "Published");
        ids.push(post.id().clone());
        if root.is_none() {
            root = Some(post.clone());
        }
        parent = Some(post);
    }
    Ok(ids)
}
