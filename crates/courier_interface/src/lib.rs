//! Capability traits for publishing platforms and media staging.
//!
//! Platforms come in two shapes:
//! - [`ContainerPlatform`]: two-phase APIs (Threads, Instagram) where a
//!   container is created, polled until ready, then published.
//! - [`DirectPlatform`]: one-shot APIs (Bluesky, Mastodon, Twitter) that take
//!   local media and return the published post.
//!
//! [`MediaStaging`] puts local files at a public URL for platforms that fetch
//! media themselves. [`FolderProcessor`] is the seam between the dispatch
//! queue and whatever publishes a folder. [`StatsSource`] reads engagement
//! counters for the optional stats report.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{ContainerPlatform, DirectPlatform, FolderProcessor, MediaStaging, StatsSource};
pub use types::{
    ContainerId, ContainerOptions, ContainerState, LocalMedia, PostDraft, PostDraftBuilder,
    PostId, PostStats, PublishedPost, ReplyTo, StagedMedia,
};
